//! Gate access log commands.

use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use gatepass_core::config::AppConfig;
use gatepass_core::error::AppError;
use gatepass_database::repositories::AccessLogRepository;

use crate::output::{self, OutputFormat, or_dash};

/// Arguments for events commands
#[derive(Debug, Args)]
pub struct EventsArgs {
    /// Events subcommand
    #[command(subcommand)]
    pub command: EventsCommand,
}

/// Events subcommands
#[derive(Debug, Subcommand)]
pub enum EventsCommand {
    /// Show the most recent access events
    Recent {
        /// Maximum number of events
        #[arg(short, long, default_value_t = 20)]
        limit: i64,
    },
}

/// Access event display row
#[derive(Debug, Serialize, Tabled)]
struct EventRow {
    /// Scan time
    scanned_at: String,
    /// Username
    username: String,
    /// Role
    role: String,
    /// Shift label
    shift: String,
    /// Within shift
    in_shift: String,
    /// Client IP
    ip: String,
}

/// Execute events commands
pub async fn execute(
    args: &EventsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let pool = super::connect(config).await?;
    let access_log = AccessLogRepository::new(pool.pool().clone());

    match &args.command {
        EventsCommand::Recent { limit } => {
            let events = access_log.recent((*limit).max(1)).await?;
            let rows: Vec<EventRow> = events
                .iter()
                .map(|e| EventRow {
                    scanned_at: e.scanned_at.format("%Y-%m-%d %H:%M:%S").to_string(),
                    username: e.username.clone(),
                    role: e.role.to_string(),
                    shift: or_dash(e.shift.as_deref()),
                    in_shift: if e.within_shift { "✓" } else { "✗" }.to_string(),
                    ip: or_dash(e.ip_address.as_deref()),
                })
                .collect();
            output::print_list(&rows, format);
        }
    }

    pool.close().await;
    Ok(())
}
