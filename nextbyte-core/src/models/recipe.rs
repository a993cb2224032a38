use serde::{Deserialize, Serialize};
use std::fmt;

use super::de;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Ingredient {
    #[serde(default, deserialize_with = "de::optional_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub display_text: String,
}

impl Ingredient {
    pub fn new(display_text: impl Into<String>) -> Self {
        Self {
            id: None,
            display_text: display_text.into(),
        }
    }
}

impl fmt::Display for Ingredient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_text)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Instruction {
    #[serde(default, deserialize_with = "de::optional_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub position: i32,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub description: String,
}

impl Instruction {
    pub fn new(position: i32, description: impl Into<String>) -> Self {
        Self {
            id: None,
            position,
            description: description.into(),
        }
    }
}

/// A recipe as returned by the server.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recipe {
    #[serde(deserialize_with = "de::id")]
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub servings: Option<i32>,
    pub prep_time: Option<i32>, // minutes
    pub cook_time: Option<i32>, // minutes
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub ingredients: Vec<Ingredient>,
    #[serde(default, deserialize_with = "de::null_as_default")]
    pub instructions: Vec<Instruction>,
}

impl Recipe {
    pub fn total_time(&self) -> Option<i32> {
        match (self.prep_time, self.cook_time) {
            (Some(prep), Some(cook)) => Some(prep.saturating_add(cook)),
            (Some(prep), None) => Some(prep),
            (None, Some(cook)) => Some(cook),
            (None, None) => None,
        }
    }

    /// Case-insensitive substring match on the recipe name.
    pub fn matches_search(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty() || self.name.to_lowercase().contains(&query)
    }
}

impl fmt::Display for Recipe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.name)?;
        writeln!(f, "{}", "=".repeat(self.name.chars().count()))?;

        if let Some(description) = self.description.as_deref().filter(|d| !d.is_empty()) {
            writeln!(f, "{}\n", description)?;
        }

        if let Some(servings) = self.servings {
            writeln!(f, "Servings: {}", servings)?;
        }

        if let Some(total) = self.total_time() {
            let parts: Vec<String> = [
                self.prep_time.map(|t| format!("prep: {} min", t)),
                self.cook_time.map(|t| format!("cook: {} min", t)),
            ]
            .into_iter()
            .flatten()
            .collect();
            writeln!(f, "Time: {} min ({})", total, parts.join(", "))?;
        }

        if !self.ingredients.is_empty() {
            writeln!(f, "\nIngredients:")?;
            for ingredient in &self.ingredients {
                writeln!(f, "  - {}", ingredient)?;
            }
        }

        if !self.instructions.is_empty() {
            writeln!(f, "\nInstructions:")?;
            let mut steps: Vec<&Instruction> = self.instructions.iter().collect();
            steps.sort_by_key(|step| step.position);
            for step in steps {
                writeln!(f, "  {}. {}", step.position, step.description)?;
            }
        }

        Ok(())
    }
}

/// Payload for creating or updating a recipe.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct RecipeInput {
    pub name: String,
    pub description: Option<String>,
    pub prep_time: Option<i32>,
    pub cook_time: Option<i32>,
    pub servings: Option<i32>,
    pub ingredients: Vec<Ingredient>,
    pub instructions: Vec<Instruction>,
    pub is_public: bool,
}

impl RecipeInput {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            prep_time: None,
            cook_time: None,
            servings: None,
            ingredients: Vec::new(),
            instructions: Vec::new(),
            is_public: true,
        }
    }

    /// Starts an input from an existing recipe, keeping ingredient and
    /// instruction ids so the server updates rows in place.
    pub fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            name: recipe.name.clone(),
            description: recipe.description.clone(),
            prep_time: recipe.prep_time,
            cook_time: recipe.cook_time,
            servings: recipe.servings,
            ingredients: recipe.ingredients.clone(),
            instructions: recipe.instructions.clone(),
            is_public: true,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_prep_time(mut self, minutes: i32) -> Self {
        self.prep_time = Some(minutes);
        self
    }

    pub fn with_cook_time(mut self, minutes: i32) -> Self {
        self.cook_time = Some(minutes);
        self
    }

    pub fn with_servings(mut self, servings: i32) -> Self {
        self.servings = Some(servings);
        self
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Ingredient::new).collect();
        self
    }

    /// Replaces the instructions; positions follow the given order, from 1.
    pub fn with_instructions<I, S>(mut self, steps: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.instructions = steps
            .into_iter()
            .enumerate()
            .map(|(index, step)| Instruction::new(index as i32 + 1, step))
            .collect();
        self
    }

    /// Trims text fields and drops empty values.
    ///
    /// Blank description becomes `None`, zero or negative times and servings
    /// become `None`, and blank ingredients and steps are removed. Steps keep
    /// the position they were given.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.prep_time = self.prep_time.filter(|t| *t > 0);
        self.cook_time = self.cook_time.filter(|t| *t > 0);
        self.servings = self.servings.filter(|s| *s > 0);

        for ingredient in &mut self.ingredients {
            ingredient.display_text = ingredient.display_text.trim().to_string();
        }
        self.ingredients.retain(|i| !i.display_text.is_empty());

        for step in &mut self.instructions {
            step.description = step.description.trim().to_string();
        }
        self.instructions.retain(|s| !s.description.is_empty());
        self
    }
}
