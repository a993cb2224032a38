mod recipe;
mod recipe_book;
mod user;

pub use recipe::{Ingredient, Instruction, Recipe, RecipeInput};
pub use recipe_book::{RecipeBook, RecipeBookInput, RecipeBookSave};
pub use user::{AuthPayload, AuthUser, User};

/// Deserialization helpers for loosely typed GraphQL payloads.
pub(crate) mod de {
    use serde::{Deserialize, Deserializer};

    /// Treats an explicit `null` like a missing field.
    pub fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Number(i64),
    }

    /// GraphQL `ID` values may be serialized as strings or integers.
    pub fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(match RawId::deserialize(deserializer)? {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        })
    }

    /// Optional variant of [`id`].
    pub fn optional_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<RawId>::deserialize(deserializer)?.map(|raw| match raw {
            RawId::Text(s) => s,
            RawId::Number(n) => n.to_string(),
        }))
    }
}
