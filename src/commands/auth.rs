//! Authentication commands for the NextByte CLI.
//!
//! Provides signup, login, logout, status and account recovery.

use clap::{Args, Subcommand};
use nextbyte_core::{AccountService, ServiceError};

use super::prompt;
use crate::session::Session;

/// Authentication commands
#[derive(Args)]
pub struct AuthCommand {
    #[command(subcommand)]
    pub command: AuthSubcommand,
}

#[derive(Subcommand)]
pub enum AuthSubcommand {
    /// Create a new account
    Signup {
        /// Username for the new account
        #[arg(long)]
        username: String,

        /// Email address
        #[arg(long)]
        email: String,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log in with email and password
    Login {
        /// Email address
        #[arg(long)]
        email: Option<String>,

        /// Password (prompted for when omitted)
        #[arg(long)]
        password: Option<String>,
    },

    /// Log out and forget the saved session
    Logout,

    /// Show who is logged in
    Status,

    /// Reactivate a deactivated account
    Recover {
        /// Email of the account to recover
        #[arg(long)]
        email: String,
    },
}

impl AuthCommand {
    /// Runs the command. Returns true if it ended the session, so nothing
    /// should be written back to disk afterwards.
    pub async fn run(&self, session: &Session) -> Result<bool, Box<dyn std::error::Error>> {
        let account = AccountService::new(session.client().clone());

        match &self.command {
            AuthSubcommand::Signup {
                username,
                email,
                password,
            } => {
                let password = match password {
                    Some(p) => p.clone(),
                    None => prompt("Choose a password: ")?,
                };
                if let Err(e) = account.create_user(username, &password, email).await {
                    if matches!(e, ServiceError::Api(_)) {
                        eprintln!(
                            "If {} belongs to a deactivated account, run 'nextbyte auth recover --email {}'.",
                            email, email
                        );
                    }
                    return Err(e.into());
                }
                println!("Account created for {}. Run 'nextbyte auth login' to sign in.", email);
                Ok(false)
            }

            AuthSubcommand::Login { email, password } => {
                let email = match email {
                    Some(e) => e.clone(),
                    None => prompt("Enter your email: ")?,
                };
                if email.is_empty() {
                    return Err("Email cannot be empty".into());
                }
                let password = match password {
                    Some(p) => p.clone(),
                    None => prompt("Enter your password: ")?,
                };

                account.login(&email, &password).await?;
                match account.current_user().await? {
                    Some(user) => println!("Logged in as {}", user.username),
                    None => println!("Logged in as {}", email),
                }
                Ok(false)
            }

            AuthSubcommand::Logout => {
                if !session.has_credentials() {
                    println!("Already logged out.");
                    return Ok(false);
                }
                // The local session goes away even if the server call fails.
                let result = account.logout().await;
                session.forget()?;
                match result {
                    Ok(()) => println!("Logged out."),
                    Err(e) => println!("Logged out locally (server said: {}).", e),
                }
                Ok(true)
            }

            AuthSubcommand::Status => {
                if !session.has_credentials() {
                    println!("Not logged in. Run 'nextbyte auth login' to authenticate.");
                    return Ok(false);
                }
                match account.current_user().await {
                    Ok(Some(user)) => {
                        println!("Logged in as {}", user.username);
                        println!("Endpoint: {}", session.endpoint());
                    }
                    Ok(None) => println!("Not logged in."),
                    Err(e) if e.is_unauthorized() => {
                        println!("Session expired. Run 'nextbyte auth login' to authenticate.")
                    }
                    Err(e) => return Err(e.into()),
                }
                Ok(false)
            }

            AuthSubcommand::Recover { email } => {
                account.recover_account(email).await?;
                println!("Account {} reactivated. You can log in again.", email);
                Ok(false)
            }
        }
    }
}
