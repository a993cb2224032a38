//! Recipe books and their membership.

use serde_json::{json, Value};

use super::recipes::RECIPE_FIELDS;
use super::{decode_field, ServiceError};
use crate::api::{data_field, id_to_string, ApiClient, Operation};
use crate::models::{Recipe, RecipeBook, RecipeBookInput, RecipeBookSave};
use crate::reconcile::{dedup_ids, MembershipDelta};

const RECIPE_BOOKS: &str = r#"
query RecipeBooks {
  recipeBooks {
    id
    name
    is_public
    created_at
    updated_at
    user_id
  }
}
"#;

const CREATE_RECIPE_BOOK: &str = r#"
mutation CreateRecipeBook($input: RecipeBookInput!) {
  createRecipeBook(recipeBookInput: $input)
}
"#;

const UPDATE_RECIPE_BOOK: &str = r#"
mutation UpdateRecipeBook($input: updateRecipeBookInput!) {
  updateRecipeBook(updateRecipeBookInput: $input)
}
"#;

const DELETE_RECIPE_BOOK: &str = r#"
mutation DeleteRecipeBook($id: ID!) {
  deleteRecipeBook(recipeBookId: $id)
}
"#;

const ADD_RECIPES: &str = r#"
mutation AddRecipesToRecipeBook($id: ID!, $recipeIds: [ID!]!) {
  addRecipesToRecipeBook(recipeBookId: $id, recipeIds: $recipeIds)
}
"#;

const REMOVE_RECIPES: &str = r#"
mutation RemoveRecipesFromRecipeBook($id: ID!, $recipeIds: [ID!]!) {
  removeRecipesFromRecipeBook(recipeBookId: $id, recipeIds: $recipeIds)
}
"#;

fn book_recipes_query() -> String {
    format!(
        "query RecipeBookRecipes($id: ID!) {{\n  recipeBookRecipes(recipeBookId: $id) {{{}  }}\n}}\n",
        RECIPE_FIELDS
    )
}

/// Result of [`RecipeBookRepository::save`].
#[derive(Debug, Clone, PartialEq)]
pub struct BookSaveOutcome {
    pub book_id: String,
    pub created: bool,
    pub delta: MembershipDelta,
}

/// Recipe books owned by the logged-in user.
#[derive(Debug, Clone)]
pub struct RecipeBookRepository {
    client: ApiClient,
}

impl RecipeBookRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<RecipeBook>, ServiceError> {
        let body = self.client.request(&Operation::new(RECIPE_BOOKS)).await?;
        Ok(decode_field(&body, "recipeBooks")?.unwrap_or_default())
    }

    /// Looks a book up by exact id, then by case-insensitive name.
    pub async fn find(&self, identifier: &str) -> Result<RecipeBook, ServiceError> {
        let books = self.list().await?;
        books
            .iter()
            .find(|b| b.id == identifier)
            .or_else(|| {
                books
                    .iter()
                    .find(|b| b.name.eq_ignore_ascii_case(identifier.trim()))
            })
            .cloned()
            .ok_or_else(|| ServiceError::NotFound {
                kind: "Recipe book",
                identifier: identifier.to_string(),
            })
    }

    /// Recipes currently linked to the book.
    pub async fn recipes(&self, book_id: &str) -> Result<Vec<Recipe>, ServiceError> {
        let op = Operation::new(book_recipes_query()).with_variables(json!({ "id": book_id }));
        let body = self.client.request(&op).await?;
        Ok(decode_field(&body, "recipeBookRecipes")?.unwrap_or_default())
    }

    /// Creates a book and returns its id.
    pub async fn create(&self, input: &RecipeBookInput) -> Result<String, ServiceError> {
        validate(input)?;
        let op = Operation::new(CREATE_RECIPE_BOOK).with_variables(json!({ "input": input }));
        let body = self.client.request(&op).await?;

        let id = data_field(&body, "createRecipeBook")
            .and_then(|value| match value {
                Value::Object(_) => value.get("id").and_then(id_to_string),
                other => id_to_string(other),
            })
            .ok_or_else(|| {
                ServiceError::UnexpectedResponse("createRecipeBook returned no id".into())
            })?;
        tracing::info!("Created recipe book '{}' ({})", input.name, id);
        Ok(id)
    }

    pub async fn update(&self, id: &str, input: &RecipeBookInput) -> Result<(), ServiceError> {
        validate(input)?;
        let op = Operation::new(UPDATE_RECIPE_BOOK).with_variables(json!({
            "input": { "id": id, "name": input.name, "isPublic": input.is_public }
        }));
        self.client.request(&op).await?;
        tracing::info!("Updated recipe book {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let op = Operation::new(DELETE_RECIPE_BOOK).with_variables(json!({ "id": id }));
        self.client.request(&op).await?;
        tracing::info!("Deleted recipe book {}", id);
        Ok(())
    }

    pub async fn add_recipes(&self, book_id: &str, recipe_ids: &[String]) -> Result<(), ServiceError> {
        let op = Operation::new(ADD_RECIPES)
            .with_variables(json!({ "id": book_id, "recipeIds": recipe_ids }));
        self.client.request(&op).await?;
        Ok(())
    }

    pub async fn remove_recipes(
        &self,
        book_id: &str,
        recipe_ids: &[String],
    ) -> Result<(), ServiceError> {
        let op = Operation::new(REMOVE_RECIPES)
            .with_variables(json!({ "id": book_id, "recipeIds": recipe_ids }));
        self.client.request(&op).await?;
        Ok(())
    }

    /// Upserts a book, then makes its membership match `save.recipe_ids`.
    ///
    /// Order: create or update the book, fetch its current recipes, add the
    /// missing ones, remove the extra ones. A failed upsert leaves membership
    /// untouched. A failed add or remove is returned as is; steps that already
    /// succeeded stay applied.
    pub async fn save(
        &self,
        existing_id: Option<&str>,
        save: &RecipeBookSave,
    ) -> Result<BookSaveOutcome, ServiceError> {
        let desired = dedup_ids(save.recipe_ids.iter().cloned());

        let (book_id, created) = match existing_id {
            Some(id) => {
                self.update(id, &save.book).await?;
                (id.to_string(), false)
            }
            None => (self.create(&save.book).await?, true),
        };

        let current = self.recipes(&book_id).await?;
        let delta = MembershipDelta::compute(desired, current.into_iter().map(|r| r.id));
        self.apply_delta(&book_id, &delta).await?;

        Ok(BookSaveOutcome {
            book_id,
            created,
            delta,
        })
    }

    /// Links `recipe_ids` to the book, keeping its other recipes.
    pub async fn include(
        &self,
        book_id: &str,
        recipe_ids: &[String],
    ) -> Result<MembershipDelta, ServiceError> {
        let current: Vec<String> = self.recipes(book_id).await?.into_iter().map(|r| r.id).collect();
        let desired: Vec<String> = current.iter().chain(recipe_ids.iter()).cloned().collect();
        let delta = MembershipDelta::compute(desired, current);
        self.apply_delta(book_id, &delta).await?;
        Ok(delta)
    }

    /// Unlinks `recipe_ids` from the book, keeping its other recipes.
    pub async fn exclude(
        &self,
        book_id: &str,
        recipe_ids: &[String],
    ) -> Result<MembershipDelta, ServiceError> {
        let current: Vec<String> = self.recipes(book_id).await?.into_iter().map(|r| r.id).collect();
        let desired: Vec<String> = current
            .iter()
            .filter(|id| !recipe_ids.contains(*id))
            .cloned()
            .collect();
        let delta = MembershipDelta::compute(desired, current);
        self.apply_delta(book_id, &delta).await?;
        Ok(delta)
    }

    async fn apply_delta(&self, book_id: &str, delta: &MembershipDelta) -> Result<(), ServiceError> {
        if !delta.to_add.is_empty() {
            self.add_recipes(book_id, &delta.to_add).await?;
            tracing::debug!("Added {} recipe(s) to book {}", delta.to_add.len(), book_id);
        }
        if !delta.to_remove.is_empty() {
            self.remove_recipes(book_id, &delta.to_remove).await?;
            tracing::debug!(
                "Removed {} recipe(s) from book {}",
                delta.to_remove.len(),
                book_id
            );
        }
        Ok(())
    }
}

fn validate(input: &RecipeBookInput) -> Result<(), ServiceError> {
    if input.name.trim().is_empty() {
        return Err(ServiceError::Validation(
            "Recipe book name is required.".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Recorder;

    fn recipes(ids: &[&str]) -> Value {
        let list: Vec<Value> = ids
            .iter()
            .map(|id| json!({ "id": id, "name": format!("Recipe {}", id) }))
            .collect();
        json!({ "data": { "recipeBookRecipes": list } })
    }

    fn ok(field: &str) -> Value {
        let mut data = serde_json::Map::new();
        data.insert(field.to_string(), Value::Bool(true));
        json!({ "data": data })
    }

    fn save(ids: &[&str]) -> RecipeBookSave {
        RecipeBookSave::new(
            RecipeBookInput::new("Weeknight"),
            ids.iter().map(|s| s.to_string()).collect(),
        )
    }

    #[tokio::test]
    async fn test_save_existing_book_reconciles_membership() {
        let recorder = Recorder::new(vec![
            ok("updateRecipeBook"),
            recipes(&["2", "3", "4"]),
            ok("addRecipesToRecipeBook"),
            ok("removeRecipesFromRecipeBook"),
        ]);
        let repo = RecipeBookRepository::new(recorder.client());

        let outcome = repo.save(Some("b1"), &save(&["1", "2", "3"])).await.unwrap();
        assert_eq!(outcome.book_id, "b1");
        assert!(!outcome.created);
        assert_eq!(outcome.delta.to_add, vec!["1"]);
        assert_eq!(outcome.delta.to_remove, vec!["4"]);

        let queries = recorder.queries();
        assert!(queries[0].contains("updateRecipeBook"));
        assert!(queries[1].contains("recipeBookRecipes"));
        assert!(queries[2].contains("addRecipesToRecipeBook"));
        assert!(queries[3].contains("removeRecipesFromRecipeBook"));
        assert_eq!(recorder.variables(2)["recipeIds"], json!(["1"]));
        assert_eq!(recorder.variables(3)["recipeIds"], json!(["4"]));
    }

    #[tokio::test]
    async fn test_save_empty_selection_only_removes() {
        let recorder = Recorder::new(vec![
            ok("updateRecipeBook"),
            recipes(&["5"]),
            ok("removeRecipesFromRecipeBook"),
        ]);
        let repo = RecipeBookRepository::new(recorder.client());

        let outcome = repo.save(Some("b1"), &save(&[])).await.unwrap();
        assert!(outcome.delta.to_add.is_empty());

        let queries = recorder.queries();
        assert_eq!(queries.len(), 3);
        assert!(!queries.iter().any(|q| q.contains("addRecipesToRecipeBook")));
    }

    #[tokio::test]
    async fn test_save_new_book_uses_created_id() {
        let recorder = Recorder::new(vec![
            json!({ "data": { "createRecipeBook": "b42" } }),
            recipes(&[]),
            ok("addRecipesToRecipeBook"),
        ]);
        let repo = RecipeBookRepository::new(recorder.client());

        let outcome = repo.save(None, &save(&["7", "7", "8"])).await.unwrap();
        assert_eq!(outcome.book_id, "b42");
        assert!(outcome.created);
        assert_eq!(recorder.variables(1)["id"], "b42");
        assert_eq!(recorder.variables(2)["recipeIds"], json!(["7", "8"]));
    }

    #[tokio::test]
    async fn test_save_unchanged_membership_sends_no_mutations() {
        let recorder = Recorder::new(vec![ok("updateRecipeBook"), recipes(&["1", "2"])]);
        let repo = RecipeBookRepository::new(recorder.client());

        let outcome = repo.save(Some("b1"), &save(&["2", "1"])).await.unwrap();
        assert!(outcome.delta.is_empty());
        assert_eq!(recorder.queries().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_upsert_skips_membership() {
        let recorder = Recorder::new(vec![json!({
            "errors": [{ "message": "Recipe book not found" }]
        })]);
        let repo = RecipeBookRepository::new(recorder.client());

        let err = repo.save(Some("missing"), &save(&["1"])).await.unwrap_err();
        assert_eq!(err.to_string(), "Recipe book not found");
        assert_eq!(recorder.queries().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_remove_keeps_add() {
        let recorder = Recorder::new(vec![
            ok("updateRecipeBook"),
            recipes(&["2"]),
            ok("addRecipesToRecipeBook"),
            json!({ "errors": [{ "message": "Remove failed" }] }),
        ]);
        let repo = RecipeBookRepository::new(recorder.client());

        let err = repo.save(Some("b1"), &save(&["1"])).await.unwrap_err();
        assert_eq!(err.to_string(), "Remove failed");
        // the add was already sent and is not rolled back
        assert_eq!(recorder.queries().len(), 4);
    }

    #[tokio::test]
    async fn test_create_without_id_is_an_error() {
        let recorder = Recorder::new(vec![json!({ "data": { "createRecipeBook": null } })]);
        let repo = RecipeBookRepository::new(recorder.client());

        let err = repo.create(&RecipeBookInput::new("Soups")).await.unwrap_err();
        assert!(matches!(err, ServiceError::UnexpectedResponse(_)));
    }

    #[tokio::test]
    async fn test_create_accepts_object_payload() {
        let recorder = Recorder::new(vec![json!({ "data": { "createRecipeBook": { "id": 3 } } })]);
        let repo = RecipeBookRepository::new(recorder.client());

        let id = repo.create(&RecipeBookInput::new("Soups")).await.unwrap();
        assert_eq!(id, "3");
        assert_eq!(recorder.variables(0)["input"]["isPublic"], false);
    }

    #[tokio::test]
    async fn test_blank_name_is_rejected() {
        let recorder = Recorder::new(vec![]);
        let repo = RecipeBookRepository::new(recorder.client());

        let blank = RecipeBookSave::new(RecipeBookInput::new("  "), vec!["1".into()]);
        let err = repo.save(None, &blank).await.unwrap_err();
        assert_eq!(err.to_string(), "Recipe book name is required.");
        assert!(recorder.queries().is_empty());
    }

    #[tokio::test]
    async fn test_include_and_exclude() {
        let recorder = Recorder::new(vec![
            recipes(&["1"]),
            ok("addRecipesToRecipeBook"),
            recipes(&["1", "2"]),
            ok("removeRecipesFromRecipeBook"),
        ]);
        let repo = RecipeBookRepository::new(recorder.client());

        let added = repo.include("b1", &["1".into(), "2".into()]).await.unwrap();
        assert_eq!(added.to_add, vec!["2"]);
        assert!(added.to_remove.is_empty());

        let removed = repo.exclude("b1", &["1".into()]).await.unwrap();
        assert!(removed.to_add.is_empty());
        assert_eq!(removed.to_remove, vec!["1"]);
    }

    #[tokio::test]
    async fn test_list_books() {
        let recorder = Recorder::new(vec![json!({
            "data": { "recipeBooks": [
                { "id": "b1", "name": "Soups", "is_public": true },
                { "id": "b2", "name": "Bakes", "is_public": false }
            ] }
        })]);
        let repo = RecipeBookRepository::new(recorder.client());

        let books = repo.list().await.unwrap();
        assert_eq!(books.len(), 2);
        assert!(books[0].is_public);
    }
}
