use clap::{Args, Subcommand};
use nextbyte_core::AccountService;

use super::{confirm, OutputFormat};
use crate::session::Session;

/// Account settings
#[derive(Args)]
pub struct AccountCommand {
    #[command(subcommand)]
    pub command: AccountSubcommand,
}

#[derive(Subcommand)]
pub enum AccountSubcommand {
    /// Show the logged-in user
    Show {
        /// Output format
        #[arg(long, short, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Deactivate the account (it can be recovered later)
    Deactivate {
        /// Skip confirmation prompt
        #[arg(long, short)]
        force: bool,
    },
}

impl AccountCommand {
    /// Runs the command. Returns true once the account has been deactivated,
    /// after which the local session is gone and must not be written back.
    pub async fn run(&self, session: &Session) -> Result<bool, Box<dyn std::error::Error>> {
        let account = AccountService::new(session.client().clone());

        match &self.command {
            AccountSubcommand::Show { format } => {
                let user = account
                    .current_user()
                    .await?
                    .ok_or("Not logged in. Run 'nextbyte auth login' to authenticate.")?;

                match format {
                    OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
                    OutputFormat::Text => {
                        println!("Welcome, {}", user.username);
                        if let Some(created_at) = &user.created_at {
                            println!("Member since: {}", created_at);
                        }
                    }
                }
                Ok(false)
            }

            AccountSubcommand::Deactivate { force } => {
                if !force && !confirm("Deactivate your account?")? {
                    println!("Deactivation cancelled.");
                    return Ok(false);
                }
                account.deactivate_account().await?;
                session.forget()?;
                println!("Account deactivated. Use 'nextbyte auth recover' to restore it.");
                Ok(true)
            }
        }
    }
}
