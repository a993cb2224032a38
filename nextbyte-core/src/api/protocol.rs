//! GraphQL-over-HTTP envelope.
//!
//! Requests are JSON objects of the form `{ "query": ..., "variables": ... }`.
//! Responses carry an optional `data` object and an optional `errors` list of
//! `{ "message": ... }` entries.

use serde::Serialize;
use serde_json::Value;

/// Error message the backend returns when a private route is hit without a
/// valid session.
pub const UNAUTHORIZED_MESSAGE: &str = "Unauthorized request on private route (not logged in)";

/// Substituted when the first error entry has no textual message.
pub const GENERIC_FAILURE_MESSAGE: &str = "Request failed";

/// Mutation used to exchange the refresh cookie for a new access token.
pub const REFRESH_TOKEN_MUTATION: &str = r#"
mutation RefreshToken {
  refreshToken {
    token
    user {
      id
    }
  }
}
"#;

/// A single GraphQL query or mutation.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Operation {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variables: Option<Value>,
}

impl Operation {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            variables: None,
        }
    }

    pub fn with_variables(mut self, variables: Value) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Serializes the operation into a request body.
    pub fn to_body(&self) -> Value {
        // Serializing a String and an optional Value cannot fail.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Extracts the first error message from a response body.
///
/// Returns `None` when the body has no `errors` list or the list is empty.
/// A first entry without a string `message` yields [`GENERIC_FAILURE_MESSAGE`].
pub fn first_error_message(body: &Value) -> Option<String> {
    let first = body.get("errors")?.as_array()?.first()?;
    let message = first
        .get("message")
        .and_then(Value::as_str)
        .unwrap_or(GENERIC_FAILURE_MESSAGE);
    Some(message.to_string())
}

/// Returns true if the message is the backend's "not logged in" error.
pub fn is_unauthorized_message(message: &str) -> bool {
    message == UNAUTHORIZED_MESSAGE
}

/// Returns `data.<field>` from a response body, if present and not null.
pub fn data_field<'a>(body: &'a Value, field: &str) -> Option<&'a Value> {
    body.get("data")?.get(field).filter(|v| !v.is_null())
}
