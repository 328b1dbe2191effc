//! CLI command definitions and dispatch.

pub mod events;
pub mod migrate;
pub mod pass;
pub mod session;

use clap::{Parser, Subcommand};

use gatepass_core::config::AppConfig;
use gatepass_core::error::AppError;
use gatepass_database::DatabasePool;

use crate::output::OutputFormat;

/// GatePass: single-use QR passes for the front gate
#[derive(Debug, Parser)]
#[command(name = "gatepass", version, about, long_about = None)]
pub struct Cli {
    /// Base configuration file, without extension
    #[arg(short, long, default_value = "config/default")]
    pub config: String,

    /// Environment overlay (`config/{env}.toml`)
    #[arg(short, long, env = "GATEPASS_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Bearer session tokens
    Session(session::SessionArgs),
    /// Pass inspection and ledger lookup
    Pass(pass::PassArgs),
    /// Gate access log
    Events(events::EventsArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load_from(&self.config, &self.env)?;
        match &self.command {
            Commands::Migrate(args) => migrate::execute(args, &config).await,
            Commands::Session(args) => session::execute(args, &config, self.format).await,
            Commands::Pass(args) => pass::execute(args, &config, self.format).await,
            Commands::Events(args) => events::execute(args, &config, self.format).await,
        }
    }
}

/// Helper: connect to PostgreSQL using the configured pool settings
pub async fn connect(config: &AppConfig) -> Result<DatabasePool, AppError> {
    DatabasePool::connect(&config.database).await
}
