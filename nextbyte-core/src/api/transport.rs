//! HTTP transport for GraphQL requests.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::cookie::{CookieStore, Jar};
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::{Method, Url};
use serde_json::Value;

use super::error::ApiError;

/// One HTTP exchange with the GraphQL endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpRequest {
    pub method: Method,
    pub body: Value,
    /// Extra headers; each replaces any default of the same name
    pub headers: Vec<(String, String)>,
}

impl HttpRequest {
    /// A POST request with no extra headers.
    pub fn post(body: Value) -> Self {
        Self {
            method: Method::POST,
            body,
            headers: Vec::new(),
        }
    }
}

/// Sends a request to the GraphQL endpoint and returns the parsed JSON body.
///
/// Implementations attach session credentials themselves; callers never
/// build an authorization header.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: &HttpRequest) -> Result<Value, ApiError>;
}

/// reqwest-backed transport with a cookie jar holding the session.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    endpoint: Url,
    jar: Arc<Jar>,
}

impl HttpTransport {
    /// Creates a transport for the given endpoint with an empty cookie jar.
    pub fn new(endpoint: &str) -> Result<Self, ApiError> {
        let endpoint =
            Url::parse(endpoint).map_err(|_| ApiError::InvalidEndpoint(endpoint.to_string()))?;
        let jar = Arc::new(Jar::default());
        let client = reqwest::Client::builder()
            .cookie_provider(Arc::clone(&jar))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            jar,
        })
    }

    /// Returns the endpoint URL.
    pub fn endpoint(&self) -> &str {
        self.endpoint.as_str()
    }

    /// Returns the cookies the jar would send to the endpoint, as a
    /// `name=value; name2=value2` string.
    pub fn export_cookies(&self) -> Option<String> {
        self.jar
            .cookies(&self.endpoint)
            .and_then(|value| value.to_str().ok().map(str::to_string))
    }

    /// Loads cookies previously returned by [`HttpTransport::export_cookies`].
    pub fn import_cookies(&self, cookies: &str) {
        for pair in cookies.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            self.jar.add_cookie_str(pair, &self.endpoint);
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &HttpRequest) -> Result<Value, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        for (name, value) in &request.headers {
            let name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| ApiError::Network(format!("invalid header '{}': {}", name, e)))?;
            let value = HeaderValue::from_str(value)
                .map_err(|e| ApiError::Network(format!("invalid header value: {}", e)))?;
            // Replaces the default for the same name.
            headers.insert(name, value);
        }

        let builder = self
            .client
            .request(request.method.clone(), self.endpoint.clone())
            .headers(headers);

        let body =
            serde_json::to_vec(&request.body).map_err(|e| ApiError::Network(e.to_string()))?;

        let response = builder
            .body(body)
            .send()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ApiError::Network(e.to_string()))?;

        serde_json::from_slice(&bytes).map_err(|e| ApiError::InvalidResponse(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_endpoint() {
        let result = HttpTransport::new("not a url");
        assert_eq!(
            result.unwrap_err(),
            ApiError::InvalidEndpoint("not a url".to_string())
        );
    }

    #[test]
    fn test_cookie_roundtrip() {
        let transport = HttpTransport::new("http://localhost:9000/graphql").unwrap();
        assert_eq!(transport.export_cookies(), None);

        transport.import_cookies("access_token=abc; refresh_token=def");
        let exported = transport.export_cookies().unwrap();
        assert!(exported.contains("access_token=abc"));
        assert!(exported.contains("refresh_token=def"));
    }

    #[test]
    fn test_post_request_defaults() {
        let request = HttpRequest::post(Value::Null);
        assert_eq!(request.method, Method::POST);
        assert!(request.headers.is_empty());
    }
}
