//! NextByte Core Library
//!
//! Recipe models, the session-aware GraphQL client, and recipe book
//! membership reconciliation shared by NextByte front ends.

pub mod api;
pub mod models;
pub mod reconcile;
pub mod services;

pub use api::{ApiClient, ApiError, HttpTransport, Operation, SessionState, Transport};
pub use models::{
    AuthPayload, Ingredient, Instruction, Recipe, RecipeBook, RecipeBookInput, RecipeBookSave,
    RecipeInput, User,
};
pub use reconcile::{dedup_ids, MembershipDelta};
pub use services::{
    AccountService, BookSaveOutcome, RecipeBookRepository, RecipeRepository, ServiceError,
};

pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
