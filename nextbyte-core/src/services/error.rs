use thiserror::Error;

use crate::api::ApiError;

/// Errors from the repository layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Input rejected before anything was sent
    #[error("{0}")]
    Validation(String),

    /// The server answered without an error but the payload had the wrong shape
    #[error("Unexpected response from server: {0}")]
    UnexpectedResponse(String),

    #[error("{kind} not found: {identifier}")]
    NotFound {
        kind: &'static str,
        identifier: String,
    },
}

impl ServiceError {
    /// Returns true when the user needs to log in again.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ServiceError::Api(e) if e.is_unauthorized())
    }
}
