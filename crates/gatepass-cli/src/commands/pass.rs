//! Pass inspection and ledger lookup.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use uuid::Uuid;

use gatepass_auth::pass::{PassClaims, PassCodec};
use gatepass_core::config::AppConfig;
use gatepass_core::error::AppError;
use gatepass_database::repositories::{AccessLogRepository, QrTokenRepository, UserRepository};
use gatepass_database::store::{AccessLog, TokenLedger, UserDirectory};

use crate::output::{self, OutputFormat, or_dash};

/// Arguments for pass commands
#[derive(Debug, Args)]
pub struct PassArgs {
    /// Pass subcommand
    #[command(subcommand)]
    pub command: PassCommand,
}

/// Pass subcommands
#[derive(Debug, Subcommand)]
pub enum PassCommand {
    /// Check a token's signature and expiry without consuming it
    Inspect {
        /// The token, or a full verification URL
        token: String,
    },
    /// Show the ledger row and access event for a nonce
    Status {
        /// Pass nonce (JWT `jti`)
        nonce: Uuid,
    },
    /// Count a user's passes that are neither consumed nor expired
    Live {
        /// Username
        #[arg(short, long)]
        username: String,
    },
}

#[derive(Debug, Serialize)]
struct Inspection {
    valid: bool,
    reason: Option<String>,
    claims: Option<PassClaims>,
}

#[derive(Debug, Serialize)]
struct PassStatus {
    nonce: Uuid,
    state: &'static str,
    subject_id: Uuid,
    issued_at: String,
    expires_at: String,
    consumed_at: Option<String>,
    scanned_by_ip: Option<String>,
    within_shift: Option<bool>,
}

/// Execute pass commands
pub async fn execute(
    args: &PassArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    match &args.command {
        PassCommand::Inspect { token } => {
            inspect(config, token, format);
            Ok(())
        }
        PassCommand::Status { nonce } => status(config, *nonce, format).await,
        PassCommand::Live { username } => live(config, username).await,
    }
}

/// Strip a verification URL down to its `token` parameter.
fn token_from_input(input: &str) -> &str {
    match input.split_once("token=") {
        Some((_, rest)) => rest.split('&').next().unwrap_or(rest),
        None => input.trim(),
    }
}

fn inspect(config: &AppConfig, input: &str, format: OutputFormat) {
    let codec = PassCodec::new(&config.qr);
    let inspection = match codec.verify(token_from_input(input), Utc::now()) {
        Ok(claims) => Inspection {
            valid: true,
            reason: None,
            claims: Some(claims),
        },
        Err(reason) => Inspection {
            valid: false,
            reason: Some(reason.to_string()),
            claims: None,
        },
    };

    let mut pairs = vec![("Valid", inspection.valid.to_string())];
    if let Some(reason) = &inspection.reason {
        pairs.push(("Reason", reason.clone()));
    }
    if let Some(claims) = &inspection.claims {
        pairs.push(("Subject", claims.sub.to_string()));
        pairs.push(("Nonce", claims.jti.to_string()));
        pairs.push(("Issued", or_dash(claims.issued_at().map(|t| t.to_rfc3339()))));
        pairs.push(("Expires", or_dash(claims.expires_at().map(|t| t.to_rfc3339()))));
    }
    output::print_item(&inspection, &pairs, format);
}

async fn status(config: &AppConfig, nonce: Uuid, format: OutputFormat) -> Result<(), AppError> {
    let pool = super::connect(config).await?;
    let ledger = QrTokenRepository::new(pool.pool().clone());
    let access_log = AccessLogRepository::new(pool.pool().clone());

    let row = ledger
        .find(nonce)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No pass with nonce {nonce}")))?;
    let event = access_log.find_by_nonce(nonce).await?;

    let now = Utc::now();
    let state = if row.is_consumed() {
        "consumed"
    } else if row.is_expired_at(now) {
        "expired"
    } else {
        "issued"
    };

    let status = PassStatus {
        nonce,
        state,
        subject_id: row.subject_id,
        issued_at: row.issued_at.to_rfc3339(),
        expires_at: row.expires_at.to_rfc3339(),
        consumed_at: row.consumed_at.map(|t| t.to_rfc3339()),
        scanned_by_ip: event.as_ref().and_then(|e| e.ip_address.clone()),
        within_shift: event.as_ref().map(|e| e.within_shift),
    };

    output::print_item(
        &status,
        &[
            ("Nonce", status.nonce.to_string()),
            ("State", status.state.to_string()),
            ("Subject", status.subject_id.to_string()),
            ("Issued", status.issued_at.clone()),
            ("Expires", status.expires_at.clone()),
            ("Consumed", or_dash(status.consumed_at.clone())),
            ("Scanned from", or_dash(status.scanned_by_ip.clone())),
            ("Within shift", or_dash(status.within_shift)),
        ],
        format,
    );

    pool.close().await;
    Ok(())
}

async fn live(config: &AppConfig, username: &str) -> Result<(), AppError> {
    let pool = super::connect(config).await?;
    let users = UserRepository::new(pool.pool().clone());
    let ledger = QrTokenRepository::new(pool.pool().clone());

    let user = users
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("No user named '{username}'")))?;
    let count = ledger.count_live_by_subject(user.id, Utc::now()).await?;

    output::print_kv("Live passes", &count.to_string());
    if count > 1 {
        output::print_warning("More than one unconsumed pass is outstanding for this user.");
    }

    pool.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_from_input() {
        assert_eq!(token_from_input("abc.def.ghi"), "abc.def.ghi");
        assert_eq!(
            token_from_input("https://gate.example/validar.html?token=abc.def.ghi"),
            "abc.def.ghi"
        );
        assert_eq!(
            token_from_input("https://gate.example/v?token=abc.def&lang=es"),
            "abc.def"
        );
    }
}
