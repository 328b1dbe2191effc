//! Session token commands.

use std::sync::Arc;

use clap::{Args, Subcommand};
use serde::Serialize;

use gatepass_auth::jwt::JwtEncoder;
use gatepass_core::config::{AppConfig, StoreBackend};
use gatepass_core::error::AppError;
use gatepass_core::traits::{Clock, SystemClock};
use gatepass_database::MemoryStore;
use gatepass_database::repositories::UserRepository;
use gatepass_database::store::UserDirectory;
use gatepass_entity::user::User;

use crate::output::{self, OutputFormat};

/// Arguments for session commands
#[derive(Debug, Args)]
pub struct SessionArgs {
    /// Session subcommand
    #[command(subcommand)]
    pub command: SessionCommand,
}

/// Session subcommands
#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Mint a bearer token for an existing user
    Mint {
        /// Username to authenticate as
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Debug, Serialize)]
struct MintedToken {
    username: String,
    role: String,
    access_token: String,
    expires_at: String,
}

/// Execute session commands
pub async fn execute(
    args: &SessionArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        SessionCommand::Mint { username } => {
            let user = find_user(config, username)
                .await?
                .ok_or_else(|| AppError::not_found(format!("No user named '{username}'")))?;

            let encoder = JwtEncoder::new(&config.auth, Arc::new(SystemClock));
            let (token, expires_at) = encoder.generate_access_token(&user.principal())?;

            let minted = MintedToken {
                username: user.username.clone(),
                role: user.role.to_string(),
                access_token: token,
                expires_at: expires_at.to_rfc3339(),
            };
            output::print_item(
                &minted,
                &[
                    ("User", minted.username.clone()),
                    ("Role", minted.role.clone()),
                    ("Expires", minted.expires_at.clone()),
                    ("Token", minted.access_token.clone()),
                ],
                format,
            );
        }
    }

    Ok(())
}

/// Resolve a user from the configured backend. With the memory backend the
/// directory is the `dev_users` list the server also seeds from.
async fn find_user(config: &AppConfig, username: &str) -> Result<Option<User>, AppError> {
    match config.database.backend {
        StoreBackend::Memory => {
            MemoryStore::with_seed_users(&config.dev_users, SystemClock.now())?
                .find_by_username(username)
                .await
        }
        StoreBackend::Postgres => {
            let pool = super::connect(config).await?;
            let user = UserRepository::new(pool.pool().clone())
                .find_by_username(username)
                .await;
            pool.close().await;
            user
        }
    }
}
