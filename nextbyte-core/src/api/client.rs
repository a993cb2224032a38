//! Authenticated GraphQL request client.
//!
//! Every call goes through at most two attempts:
//! 1. Send the request with session cookies attached
//! 2. If the server answers with the "not logged in" error, refresh the
//!    session once (sharing any refresh already in flight) and send the
//!    request again
//!
//! An unauthorized answer to the second attempt is returned to the caller.

use std::sync::Arc;

use futures::FutureExt;
use reqwest::Method;
use serde_json::Value;

use super::error::ApiError;
use super::protocol::{
    data_field, first_error_message, is_unauthorized_message, Operation, REFRESH_TOKEN_MUTATION,
};
use super::session::{RefreshOutcome, SessionState};
use super::transport::{HttpRequest, Transport};

/// Per-call options: HTTP method and extra headers.
#[derive(Debug, Clone)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
}

impl Default for RequestOptions {
    fn default() -> Self {
        Self {
            method: Method::POST,
            headers: Vec::new(),
        }
    }
}

impl RequestOptions {
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }
}

/// Result of a single attempt.
enum Attempt {
    Success(Value),
    Unauthorized(String),
}

/// GraphQL client with transparent session refresh.
#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionState,
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("session", &self.session)
            .finish_non_exhaustive()
    }
}

impl ApiClient {
    /// Creates a client with fresh session state.
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_session(transport, SessionState::new())
    }

    /// Creates a client that shares the given session state.
    pub fn with_session(transport: Arc<dyn Transport>, session: SessionState) -> Self {
        Self { transport, session }
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    /// Sends an operation as a POST request.
    pub async fn request(&self, operation: &Operation) -> Result<Value, ApiError> {
        self.request_with(operation.to_body(), RequestOptions::default())
            .await
    }

    /// Sends an arbitrary JSON body with the given options.
    pub async fn request_with(
        &self,
        body: Value,
        options: RequestOptions,
    ) -> Result<Value, ApiError> {
        let request = HttpRequest {
            method: options.method,
            body,
            headers: options.headers,
        };

        let message = match self.attempt(&request).await? {
            Attempt::Success(body) => return Ok(body),
            Attempt::Unauthorized(message) => message,
        };

        tracing::debug!("Request unauthorized ({}), refreshing session", message);
        self.refresh().await?;

        match self.attempt(&request).await? {
            Attempt::Success(body) => Ok(body),
            Attempt::Unauthorized(message) => {
                tracing::debug!("Request still unauthorized after refresh");
                Err(ApiError::Unauthorized(message))
            }
        }
    }

    /// Refreshes the session, joining a refresh already in flight.
    pub async fn refresh(&self) -> Result<(), ApiError> {
        let transport = Arc::clone(&self.transport);
        self.session
            .join_or_start_refresh(move || refresh_session(transport).boxed())
            .await
            .map(|_| ())
    }

    async fn attempt(&self, request: &HttpRequest) -> Result<Attempt, ApiError> {
        tracing::debug!("Sending {} request", request.method);
        let body = self.transport.execute(request).await?;
        match first_error_message(&body) {
            None => Ok(Attempt::Success(body)),
            Some(message) if is_unauthorized_message(&message) => {
                Ok(Attempt::Unauthorized(message))
            }
            Some(message) => Err(ApiError::Server(message)),
        }
    }
}

/// Calls the refresh mutation once. Any structured error fails the refresh.
async fn refresh_session(transport: Arc<dyn Transport>) -> RefreshOutcome {
    let request = HttpRequest::post(Operation::new(REFRESH_TOKEN_MUTATION).to_body());
    let body = transport.execute(&request).await.map_err(|e| {
        tracing::warn!("Session refresh failed: {}", e);
        ApiError::RefreshFailed(e.to_string())
    })?;

    if let Some(message) = first_error_message(&body) {
        tracing::warn!("Session refresh rejected: {}", message);
        return Err(ApiError::RefreshFailed(message));
    }

    let user_id = data_field(&body, "refreshToken")
        .and_then(|payload| payload.pointer("/user/id"))
        .and_then(id_to_string);
    tracing::debug!("Session refreshed");
    Ok(user_id)
}

/// GraphQL `ID` values may arrive as strings or numbers.
pub(crate) fn id_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
