//! API error types.

use thiserror::Error;

/// Errors surfaced by the request client.
///
/// Every variant carries a human-readable message. The type is `Clone` so a
/// single refresh outcome can be handed to every caller waiting on it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// The endpoint URL could not be parsed
    #[error("Invalid GraphQL endpoint '{0}'")]
    InvalidEndpoint(String),

    /// The HTTP call itself failed (connection, TLS, body read)
    #[error("Request failed: {0}")]
    Network(String),

    /// The server answered with something that is not a JSON document
    #[error("Invalid response from server: {0}")]
    InvalidResponse(String),

    /// A structured GraphQL error, surfaced verbatim
    #[error("{0}")]
    Server(String),

    /// The server still rejected the session after a refresh-and-retry
    #[error("{0}")]
    Unauthorized(String),

    /// The credential refresh call failed; the original call was not retried
    #[error("Session refresh failed: {0}")]
    RefreshFailed(String),
}

impl ApiError {
    /// Returns true when the error means the user has to log in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_) | ApiError::RefreshFailed(_))
    }
}
