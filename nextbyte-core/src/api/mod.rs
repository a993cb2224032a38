//! GraphQL API client.
//!
//! ## Flow
//!
//! 1. Operations are serialized as `{ query, variables }` and POSTed to the
//!    configured endpoint by a [`Transport`]
//! 2. Session credentials travel as cookies; client code never builds an
//!    authorization header
//! 3. A "not logged in" error triggers one shared session refresh followed by
//!    a single retry of the original call

mod client;
mod error;
mod protocol;
mod session;
mod transport;

pub use client::{ApiClient, RequestOptions};
pub(crate) use client::id_to_string;
pub use error::ApiError;
pub use protocol::{
    data_field, first_error_message, is_unauthorized_message, Operation,
    GENERIC_FAILURE_MESSAGE, REFRESH_TOKEN_MUTATION, UNAUTHORIZED_MESSAGE,
};
pub use session::{RefreshOutcome, SessionState};
pub use transport::{HttpRequest, HttpTransport, Transport};
