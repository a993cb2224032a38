//! Recipe book commands.
//!
//! `create` and `update` take the full desired membership through repeated
//! `--recipe` flags and reconcile the book against it. `add` and `remove`
//! change membership without touching the other recipes.

use clap::{Args, Subcommand};
use nextbyte_core::services::find_recipe;
use nextbyte_core::{
    MembershipDelta, RecipeBookInput, RecipeBookRepository, RecipeBookSave, RecipeRepository,
    ServiceError,
};

use super::{confirm, truncate, OutputFormat};
use crate::session::Session;

#[derive(Args)]
pub struct BookCommand {
    #[command(subcommand)]
    pub command: BookSubcommand,
}

#[derive(Subcommand)]
pub enum BookSubcommand {
    /// Create a recipe book
    Create {
        /// Name of the book
        name: String,

        /// Make the book visible to other users
        #[arg(long)]
        public: bool,

        /// Recipe ID or name to include (can be repeated)
        #[arg(long = "recipe", value_name = "RECIPE")]
        recipes: Vec<String>,
    },

    /// List your recipe books
    List {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Show a book and its recipes
    Show {
        /// Book ID or name
        identifier: String,

        /// Only show recipes whose name contains this text
        #[arg(long)]
        search: Option<String>,

        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Update a book; --recipe flags replace its membership
    Update {
        /// Book ID or name
        identifier: String,

        /// New name
        #[arg(long)]
        name: Option<String>,

        /// Make the book public
        #[arg(long, conflicts_with = "private")]
        public: bool,

        /// Make the book private
        #[arg(long)]
        private: bool,

        /// Recipe ID or name the book should contain (can be repeated)
        #[arg(long = "recipe", value_name = "RECIPE")]
        recipes: Vec<String>,

        /// Remove every recipe from the book
        #[arg(long, conflicts_with = "recipes")]
        clear: bool,
    },

    /// Delete a recipe book
    Delete {
        /// Book ID or name
        identifier: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },

    /// Add recipes to a book
    Add {
        /// Book ID or name
        book: String,

        /// Recipe ID or name (can be repeated)
        #[arg(long = "recipe", value_name = "RECIPE", required = true)]
        recipes: Vec<String>,
    },

    /// Remove recipes from a book
    Remove {
        /// Book ID or name
        book: String,

        /// Recipe ID or name (can be repeated)
        #[arg(long = "recipe", value_name = "RECIPE", required = true)]
        recipes: Vec<String>,
    },
}

impl BookCommand {
    pub async fn run(&self, session: &Session) -> Result<(), Box<dyn std::error::Error>> {
        let books = RecipeBookRepository::new(session.client().clone());
        let recipes = RecipeRepository::new(session.client().clone());

        match &self.command {
            BookSubcommand::Create {
                name,
                public,
                recipes: wanted,
            } => {
                let recipe_ids = resolve_recipe_ids(&recipes, wanted).await?;
                let save = RecipeBookSave::new(
                    RecipeBookInput::new(name.trim()).with_public(*public),
                    recipe_ids,
                );

                let outcome = books.save(None, &save).await?;
                println!("Created recipe book: {} ({})", name.trim(), outcome.book_id);
                print_delta(&outcome.delta);
                Ok(())
            }

            BookSubcommand::List { format } => {
                let list = books.list().await?;
                if list.is_empty() {
                    println!("No recipe books found");
                    return Ok(());
                }

                match format {
                    OutputFormat::Json => {
                        println!("{}", serde_json::to_string_pretty(&list)?);
                    }
                    OutputFormat::Text => {
                        println!("{:<24}  {:<30}  VISIBILITY", "ID", "NAME");
                        println!("{}", "-".repeat(70));
                        for book in &list {
                            println!(
                                "{:<24}  {:<30}  {}",
                                truncate(&book.id, 24),
                                truncate(&book.name, 30),
                                if book.is_public { "public" } else { "private" }
                            );
                        }
                        println!("\nTotal: {} book(s)", list.len());
                    }
                }
                Ok(())
            }

            BookSubcommand::Show {
                identifier,
                search,
                format,
            } => {
                let book = books.find(identifier).await?;
                let mut members = books.recipes(&book.id).await?;
                if let Some(query) = search {
                    members.retain(|r| r.matches_search(query));
                }

                match format {
                    OutputFormat::Json => {
                        let value = serde_json::json!({ "book": book, "recipes": members });
                        println!("{}", serde_json::to_string_pretty(&value)?);
                    }
                    OutputFormat::Text => {
                        println!("{}", book);
                        if members.is_empty() {
                            match search {
                                Some(query) => println!("No recipes match '{}'", query),
                                None => println!("This book has no recipes yet"),
                            }
                        } else {
                            println!("Recipes:");
                            for recipe in &members {
                                println!("  - {} ({})", recipe.name, recipe.id);
                            }
                        }
                    }
                }
                Ok(())
            }

            BookSubcommand::Update {
                identifier,
                name,
                public,
                private,
                recipes: wanted,
                clear,
            } => {
                let book = books.find(identifier).await?;

                let is_public = if *public {
                    true
                } else if *private {
                    false
                } else {
                    book.is_public
                };
                let input = RecipeBookInput::new(name.as_deref().unwrap_or(&book.name).trim())
                    .with_public(is_public);

                if wanted.is_empty() && !clear {
                    // Membership is left alone unless asked for.
                    books.update(&book.id, &input).await?;
                    println!("Updated recipe book: {}", input.name);
                    return Ok(());
                }

                let recipe_ids = resolve_recipe_ids(&recipes, wanted).await?;
                let outcome = books
                    .save(Some(&book.id), &RecipeBookSave::new(input.clone(), recipe_ids))
                    .await?;
                println!("Updated recipe book: {}", input.name);
                print_delta(&outcome.delta);
                Ok(())
            }

            BookSubcommand::Delete { identifier, force } => {
                let book = books.find(identifier).await?;

                if !force && !confirm(&format!("Delete recipe book '{}'?", book.name))? {
                    println!("Deletion cancelled.");
                    return Ok(());
                }

                books.delete(&book.id).await?;
                println!("Deleted recipe book: {}", book.name);
                Ok(())
            }

            BookSubcommand::Add {
                book,
                recipes: wanted,
            } => {
                let book = books.find(book).await?;
                let recipe_ids = resolve_recipe_ids(&recipes, wanted).await?;
                let delta = books.include(&book.id, &recipe_ids).await?;
                if delta.is_empty() {
                    println!("'{}' already contains those recipes", book.name);
                } else {
                    println!("Added {} recipe(s) to '{}'", delta.to_add.len(), book.name);
                }
                Ok(())
            }

            BookSubcommand::Remove {
                book,
                recipes: wanted,
            } => {
                let book = books.find(book).await?;
                let recipe_ids = resolve_recipe_ids(&recipes, wanted).await?;
                let delta = books.exclude(&book.id, &recipe_ids).await?;
                if delta.is_empty() {
                    println!("'{}' does not contain those recipes", book.name);
                } else {
                    println!(
                        "Removed {} recipe(s) from '{}'",
                        delta.to_remove.len(),
                        book.name
                    );
                }
                Ok(())
            }
        }
    }
}

/// Maps recipe ids or names to ids with a single list request.
async fn resolve_recipe_ids(
    repo: &RecipeRepository,
    identifiers: &[String],
) -> Result<Vec<String>, ServiceError> {
    if identifiers.is_empty() {
        return Ok(Vec::new());
    }

    let all = repo.list().await?;
    identifiers
        .iter()
        .map(|identifier| {
            find_recipe(&all, identifier)
                .map(|r| r.id.clone())
                .ok_or_else(|| ServiceError::NotFound {
                    kind: "Recipe",
                    identifier: identifier.clone(),
                })
        })
        .collect()
}

fn print_delta(delta: &MembershipDelta) {
    if delta.is_empty() {
        println!("  Recipes unchanged");
        return;
    }
    if !delta.to_add.is_empty() {
        println!("  Added {} recipe(s)", delta.to_add.len());
    }
    if !delta.to_remove.is_empty() {
        println!("  Removed {} recipe(s)", delta.to_remove.len());
    }
}
