use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod session;

use commands::{AccountCommand, AuthCommand, BookCommand, ConfigCommand, RecipeCommand};
use config::Config;
use nextbyte_core::ServiceError;
use session::Session;

#[derive(Parser)]
#[command(name = "nextbyte")]
#[command(version)]
#[command(about = "Manage recipes and recipe books on a NextByte server", long_about = None)]
struct Cli {
    /// Path to config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign up, log in and out
    Auth(AuthCommand),

    /// View or deactivate your account
    Account(AccountCommand),

    /// Manage recipes
    Recipe(RecipeCommand),

    /// Manage recipe books
    Book(BookCommand),

    /// Manage configuration
    Config(ConfigCommand),
}

#[tokio::main]
async fn main() {
    // Logs go to stderr so command output stays clean
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        let unauthorized = e
            .downcast_ref::<ServiceError>()
            .is_some_and(ServiceError::is_unauthorized);
        if unauthorized {
            eprintln!("Run 'nextbyte auth login' to sign in again.");
        }
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Load configuration
    let config = Config::load(cli.config)?;

    let command = match cli.command {
        Some(command) => command,
        None => {
            println!("Use --help to see available commands");
            return Ok(());
        }
    };
    if let Commands::Config(cmd) = &command {
        return cmd.run(&config);
    }

    let session = Session::open(&config)?;
    tracing::debug!("Using endpoint {}", session.endpoint());

    let result = match &command {
        Commands::Auth(cmd) => cmd.run(&session).await,
        Commands::Account(cmd) => cmd.run(&session).await,
        Commands::Recipe(cmd) => cmd.run(&session).await.map(|()| false),
        Commands::Book(cmd) => cmd.run(&session).await.map(|()| false),
        Commands::Config(cmd) => cmd.run(&config).map(|()| false),
    };
    let ends_session = matches!(result, Ok(true));

    // Cookies may have been rotated by a refresh even when the command failed.
    if !ends_session {
        if let Err(e) = session.persist() {
            tracing::warn!("Could not save session: {}", e);
        }
    }

    result.map(|_| ())
}
