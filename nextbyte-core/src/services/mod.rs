//! Typed wrappers around the backend's GraphQL operations.
//!
//! Each repository owns a clone of the [`ApiClient`](crate::api::ApiClient),
//! so all of them share one session and one in-flight refresh.

mod account;
mod error;
mod recipe_books;
mod recipes;

pub use account::AccountService;
pub use error::ServiceError;
pub use recipe_books::{BookSaveOutcome, RecipeBookRepository};
pub use recipes::{find_recipe, RecipeRepository};

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::api::data_field;

/// Decodes `data.<field>`; a missing or null field yields `None`.
fn decode_field<T: DeserializeOwned>(body: &Value, field: &str) -> Result<Option<T>, ServiceError> {
    data_field(body, field)
        .map(|value| {
            serde_json::from_value(value.clone())
                .map_err(|e| ServiceError::UnexpectedResponse(format!("{}: {}", field, e)))
        })
        .transpose()
}
