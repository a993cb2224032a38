use serde::{Deserialize, Serialize};
use std::fmt;

use super::de;

/// A named, optionally public collection of recipes.
///
/// Membership is not embedded; it is fetched per book and reconciled on save.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecipeBook {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub name: String,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub is_public: bool,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
    #[serde(default, deserialize_with = "de::optional_id")]
    pub user_id: Option<String>,
}

impl fmt::Display for RecipeBook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;
        writeln!(
            f,
            "Visibility: {}",
            if self.is_public { "public" } else { "private" }
        )?;
        if let Some(created_at) = &self.created_at {
            writeln!(f, "Created: {}", created_at)?;
        }
        if let Some(updated_at) = &self.updated_at {
            writeln!(f, "Updated: {}", updated_at)?;
        }
        Ok(())
    }
}

/// Payload for creating or updating a recipe book.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecipeBookInput {
    pub name: String,
    #[serde(rename = "isPublic")]
    pub is_public: bool,
}

impl RecipeBookInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            is_public: false,
        }
    }

    pub fn with_public(mut self, is_public: bool) -> Self {
        self.is_public = is_public;
        self
    }
}

/// A book save request: the book fields plus the desired recipe membership.
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeBookSave {
    pub book: RecipeBookInput,
    pub recipe_ids: Vec<String>,
}

impl RecipeBookSave {
    pub fn new(book: RecipeBookInput, recipe_ids: Vec<String>) -> Self {
        Self { book, recipe_ids }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_deserialize_book() {
        let book: RecipeBook = serde_json::from_value(json!({
            "id": "b1",
            "name": "Weeknight",
            "is_public": null,
            "created_at": "2025-01-04T10:00:00Z",
            "user_id": 3
        }))
        .unwrap();

        assert_eq!(book.id, "b1");
        assert!(!book.is_public);
        assert_eq!(book.updated_at, None);
        assert_eq!(book.user_id, Some("3".to_string()));
    }

    #[test]
    fn test_input_uses_camel_case_visibility() {
        let input = RecipeBookInput::new("Desserts").with_public(true);
        assert_eq!(
            serde_json::to_value(&input).unwrap(),
            json!({ "name": "Desserts", "isPublic": true })
        );
    }

    #[test]
    fn test_display() {
        let book = RecipeBook {
            id: "b1".into(),
            name: "Soups".into(),
            is_public: true,
            created_at: None,
            updated_at: None,
            user_id: None,
        };
        let output = format!("{}", book);
        assert!(output.starts_with("Soups\n=====\n"));
        assert!(output.contains("Visibility: public"));
    }
}
