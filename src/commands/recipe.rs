use clap::{Args, Subcommand};
use nextbyte_core::{Ingredient, RecipeInput, RecipeRepository};

use super::{confirm, truncate, OutputFormat};
use crate::session::Session;

#[derive(Args)]
pub struct RecipeCommand {
    #[command(subcommand)]
    pub command: RecipeSubcommand,
}

#[derive(Subcommand)]
pub enum RecipeSubcommand {
    /// Create a new recipe
    Create {
        /// Name of the recipe
        name: String,

        /// Short description
        #[arg(long)]
        description: Option<String>,

        /// Prep time in minutes
        #[arg(long)]
        prep_time: Option<i32>,

        /// Cook time in minutes
        #[arg(long)]
        cook_time: Option<i32>,

        /// Number of servings
        #[arg(long)]
        servings: Option<i32>,

        /// Ingredient line, e.g. "2 cups flour" (can be repeated)
        #[arg(long = "ingredient", value_name = "TEXT")]
        ingredients: Vec<String>,

        /// Instruction step, in order (can be repeated)
        #[arg(long = "step", value_name = "TEXT")]
        steps: Vec<String>,
    },

    /// List all recipes
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Only show recipes whose name contains this text
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a recipe's details
    Show {
        /// Recipe ID or name
        identifier: String,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update an existing recipe
    Update {
        /// Recipe ID or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// New description
        #[arg(long)]
        description: Option<String>,

        /// Prep time in minutes
        #[arg(long)]
        prep_time: Option<i32>,

        /// Cook time in minutes
        #[arg(long)]
        cook_time: Option<i32>,

        /// Number of servings
        #[arg(long)]
        servings: Option<i32>,

        /// Append an ingredient (can be repeated)
        #[arg(long = "add-ingredient", value_name = "TEXT")]
        add_ingredients: Vec<String>,

        /// Remove ingredients matching this text (can be repeated)
        #[arg(long = "remove-ingredient", value_name = "TEXT")]
        remove_ingredients: Vec<String>,

        /// Replace all steps with these, in order (can be repeated)
        #[arg(long = "step", value_name = "TEXT")]
        steps: Vec<String>,
    },

    /// Delete a recipe
    Delete {
        /// Recipe ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl RecipeCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        let repo = RecipeRepository::new(session.client().clone());

        match &self.command {
            RecipeSubcommand::Create {
                name,
                description,
                prep_time,
                cook_time,
                servings,
                ingredients,
                steps,
            } => {
                let mut input = RecipeInput::new(name.as_str())
                    .with_ingredients(ingredients.iter().cloned())
                    .with_instructions(steps.iter().cloned());

                if let Some(description) = description {
                    input = input.with_description(description.as_str());
                }
                if let Some(prep_time) = prep_time {
                    input = input.with_prep_time(*prep_time);
                }
                if let Some(cook_time) = cook_time {
                    input = input.with_cook_time(*cook_time);
                }
                if let Some(servings) = servings {
                    input = input.with_servings(*servings);
                }

                repo.create(input).await?;
                println!("Created recipe: {}", name.trim());
                Ok(())
            }

            RecipeSubcommand::List { format, search } => {
                let recipes = repo.list().await?;
                let recipes: Vec<_> = match search {
                    Some(query) => recipes
                        .into_iter()
                        .filter(|r| r.matches_search(query))
                        .collect(),
                    None => recipes,
                };

                if recipes.is_empty() {
                    println!("No recipes found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipes)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<24}  {:<30}  TIME", "ID", "NAME");
                        println!("{}", "-".repeat(70));
                        for recipe in &recipes {
                            let time = recipe
                                .total_time()
                                .map(|t| format!("{} min", t))
                                .unwrap_or_default();
                            println!(
                                "{:<24}  {:<30}  {}",
                                truncate(&recipe.id, 24),
                                truncate(&recipe.name, 30),
                                time
                            );
                        }
                        println!("\nTotal: {} recipe(s)", recipes.len());
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Show { identifier, format } => {
                let recipe = repo.find(identifier).await?;
                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&recipe)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", recipe);
                    }
                }
                Ok(())
            }

            RecipeSubcommand::Update {
                identifier,
                name,
                description,
                prep_time,
                cook_time,
                servings,
                add_ingredients,
                remove_ingredients,
                steps,
            } => {
                let has_updates = name.is_some()
                    || description.is_some()
                    || prep_time.is_some()
                    || cook_time.is_some()
                    || servings.is_some()
                    || !add_ingredients.is_empty()
                    || !remove_ingredients.is_empty()
                    || !steps.is_empty();

                if !has_updates {
                    return Err("Nothing to update. Provide at least one option.".into());
                }

                let recipe = repo.find(identifier).await?;
                let mut input = RecipeInput::from_recipe(&recipe);

                if let Some(new_name) = name {
                    input.name = new_name.clone();
                }
                if let Some(new_description) = description {
                    input.description = Some(new_description.clone());
                }
                if let Some(new_prep_time) = prep_time {
                    input.prep_time = Some(*new_prep_time);
                }
                if let Some(new_cook_time) = cook_time {
                    input.cook_time = Some(*new_cook_time);
                }
                if let Some(new_servings) = servings {
                    input.servings = Some(*new_servings);
                }

                for text in remove_ingredients {
                    let text = text.to_lowercase();
                    input
                        .ingredients
                        .retain(|i| !i.display_text.to_lowercase().contains(&text));
                }
                input.ingredients.extend(
                    add_ingredients
                        .iter()
                        .map(|text| Ingredient::new(text.as_str())),
                );

                if !steps.is_empty() {
                    input = input.with_instructions(steps.iter().cloned());
                }

                repo.update(&recipe.id, input).await?;
                println!("Updated recipe: {}", name.as_deref().unwrap_or(&recipe.name));
                Ok(())
            }

            RecipeSubcommand::Delete { identifier, force } => {
                let recipe = repo.find(identifier).await?;

                // Confirm deletion unless --force is used
                if !force && !confirm(&format!("Delete recipe '{}'?", recipe.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                repo.delete(&recipe.id).await?;
                println!("Deleted recipe: {}", recipe.name);
                Ok(())
            }
        }
    }
}
