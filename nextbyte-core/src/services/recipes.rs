//! Recipe CRUD.

use serde_json::{json, Value};

use super::{decode_field, ServiceError};
use crate::api::{ApiClient, Operation};
use crate::models::{Recipe, RecipeInput};

/// Selection set shared by every query that returns recipes.
pub(crate) const RECIPE_FIELDS: &str = r#"
    id
    name
    description
    servings
    prep_time
    cook_time
    ingredients {
      id
      display_text
    }
    instructions {
      id
      position
      description
    }
"#;

const CREATE_RECIPE: &str = r#"
mutation CreateRecipe($input: RecipeInput!) {
  createRecipe(recipeInput: $input)
}
"#;

const UPDATE_RECIPE: &str = r#"
mutation UpdateRecipe($input: updateRecipeInput!) {
  updateRecipe(updateRecipeInput: $input)
}
"#;

const DELETE_RECIPE: &str = r#"
mutation DeleteRecipe($id: ID!) {
  deleteRecipe(recipeId: $id)
}
"#;

fn recipes_query() -> String {
    format!("query Recipes {{\n  recipes {{{}  }}\n}}\n", RECIPE_FIELDS)
}

/// Finds a recipe by exact id, falling back to a case-insensitive name match.
pub fn find_recipe<'a>(recipes: &'a [Recipe], identifier: &str) -> Option<&'a Recipe> {
    recipes.iter().find(|r| r.id == identifier).or_else(|| {
        recipes
            .iter()
            .find(|r| r.name.eq_ignore_ascii_case(identifier.trim()))
    })
}

/// Recipes owned by the logged-in user.
#[derive(Debug, Clone)]
pub struct RecipeRepository {
    client: ApiClient,
}

impl RecipeRepository {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Lists the current user's recipes. A missing list is an empty list.
    pub async fn list(&self) -> Result<Vec<Recipe>, ServiceError> {
        let body = self.client.request(&Operation::new(recipes_query())).await?;
        Ok(decode_field(&body, "recipes")?.unwrap_or_default())
    }

    /// Looks a recipe up by id or name.
    pub async fn find(&self, identifier: &str) -> Result<Recipe, ServiceError> {
        let recipes = self.list().await?;
        find_recipe(&recipes, identifier)
            .cloned()
            .ok_or_else(|| ServiceError::NotFound {
                kind: "Recipe",
                identifier: identifier.to_string(),
            })
    }

    pub async fn create(&self, input: RecipeInput) -> Result<(), ServiceError> {
        let input = validated(input)?;
        let op = Operation::new(CREATE_RECIPE).with_variables(json!({ "input": input }));
        self.client.request(&op).await?;
        tracing::info!("Created recipe '{}'", input.name);
        Ok(())
    }

    pub async fn update(&self, id: &str, input: RecipeInput) -> Result<(), ServiceError> {
        let input = validated(input)?;
        let mut payload = serde_json::to_value(&input)
            .map_err(|e| ServiceError::Validation(e.to_string()))?;
        if let Value::Object(map) = &mut payload {
            map.insert("id".to_string(), Value::String(id.to_string()));
        }

        let op = Operation::new(UPDATE_RECIPE).with_variables(json!({ "input": payload }));
        self.client.request(&op).await?;
        tracing::info!("Updated recipe {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        let op = Operation::new(DELETE_RECIPE).with_variables(json!({ "id": id }));
        self.client.request(&op).await?;
        tracing::info!("Deleted recipe {}", id);
        Ok(())
    }
}

fn validated(input: RecipeInput) -> Result<RecipeInput, ServiceError> {
    let input = input.normalized();
    if input.name.is_empty() {
        return Err(ServiceError::Validation("Recipe name is required.".to_string()));
    }
    Ok(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::testing::Recorder;

    fn recipe(id: &str, name: &str) -> Value {
        json!({ "id": id, "name": name, "ingredients": [], "instructions": [] })
    }

    #[tokio::test]
    async fn test_list_recipes() {
        let recorder = Recorder::new(vec![json!({
            "data": { "recipes": [recipe("1", "Pancakes"), recipe("2", "Omelette")] }
        })]);
        let repo = RecipeRepository::new(recorder.client());

        let recipes = repo.list().await.unwrap();
        assert_eq!(recipes.len(), 2);
        assert_eq!(recipes[1].name, "Omelette");
        assert!(recorder.queries()[0].contains("display_text"));
    }

    #[tokio::test]
    async fn test_missing_list_is_empty() {
        let recorder = Recorder::new(vec![json!({ "data": { "recipes": null } })]);
        let repo = RecipeRepository::new(recorder.client());

        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_find_by_name() {
        let recorder = Recorder::new(vec![
            json!({ "data": { "recipes": [recipe("1", "Pancakes")] } }),
            json!({ "data": { "recipes": [recipe("1", "Pancakes")] } }),
        ]);
        let repo = RecipeRepository::new(recorder.client());

        assert_eq!(repo.find("pancakes").await.unwrap().id, "1");
        let err = repo.find("waffles").await.unwrap_err();
        assert_eq!(err.to_string(), "Recipe not found: waffles");
    }

    #[tokio::test]
    async fn test_create_rejects_blank_name() {
        let recorder = Recorder::new(vec![]);
        let repo = RecipeRepository::new(recorder.client());

        let err = repo.create(RecipeInput::new("   ")).await.unwrap_err();
        assert_eq!(err.to_string(), "Recipe name is required.");
        assert!(recorder.queries().is_empty());
    }

    #[tokio::test]
    async fn test_update_sends_id_with_input() {
        let recorder = Recorder::new(vec![json!({ "data": { "updateRecipe": true } })]);
        let repo = RecipeRepository::new(recorder.client());

        let input = RecipeInput::new("Chili").with_servings(6);
        repo.update("r9", input).await.unwrap();

        let variables = recorder.variables(0);
        assert_eq!(variables["input"]["id"], "r9");
        assert_eq!(variables["input"]["name"], "Chili");
        assert_eq!(variables["input"]["servings"], 6);
    }

    #[tokio::test]
    async fn test_delete() {
        let recorder = Recorder::new(vec![json!({ "data": { "deleteRecipe": true } })]);
        let repo = RecipeRepository::new(recorder.client());

        repo.delete("r3").await.unwrap();
        assert!(recorder.queries()[0].contains("deleteRecipe(recipeId: $id)"));
        assert_eq!(recorder.variables(0)["id"], "r3");
    }

    #[test]
    fn test_find_recipe_prefers_id() {
        let recipes: Vec<Recipe> = vec![
            serde_json::from_value(recipe("Pie", "Cake")).unwrap(),
            serde_json::from_value(recipe("2", "Pie")).unwrap(),
        ];
        assert_eq!(find_recipe(&recipes, "Pie").unwrap().name, "Cake");
        assert_eq!(find_recipe(&recipes, "pie").unwrap().id, "2");
        assert!(find_recipe(&recipes, "Tart").is_none());
    }
}
