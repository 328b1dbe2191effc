//! GatePass Server: single-use QR passes for the front gate.
//!
//! Main entry point that wires all crates together and starts the server.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use gatepass_api::AppState;
use gatepass_api::state::Stores;
use gatepass_core::config::{AppConfig, StoreBackend};
use gatepass_core::error::AppError;
use gatepass_core::traits::{Clock, SystemClock};
use gatepass_database::repositories::{AccessLogRepository, QrTokenRepository, UserRepository};
use gatepass_database::{DatabasePool, MemoryStore};

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let base = std::env::var("GATEPASS_CONFIG").unwrap_or_else(|_| "config/default".to_string());
    let env = std::env::var("GATEPASS_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load_from(&base, &env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> Result<(), AppError> {
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "Starting GatePass");

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let (stores, db_pool) = match config.database.backend {
        StoreBackend::Postgres => {
            if !config.dev_users.is_empty() {
                tracing::warn!("dev_users are ignored by the postgres backend");
            }
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.run_migrations {
                tracing::info!("Running database migrations...");
                gatepass_database::migration::run_migrations(pool.pool()).await?;
            }
            let pg = pool.pool().clone();
            let stores = Stores {
                ledger: Arc::new(QrTokenRepository::new(pg.clone())),
                users: Arc::new(UserRepository::new(pg.clone())),
                access_log: Arc::new(AccessLogRepository::new(pg)),
            };
            (stores, Some(pool))
        }
        StoreBackend::Memory => {
            tracing::warn!("Using the in-memory store; passes and access events are not durable");
            let store = MemoryStore::with_seed_users(&config.dev_users, clock.now())?;
            tracing::info!(users = config.dev_users.len(), "Seeded in-memory user directory");
            let stores = Stores {
                ledger: Arc::new(store.clone()),
                users: Arc::new(store.clone()),
                access_log: Arc::new(store),
            };
            (stores, None)
        }
    };

    let server = config.server.clone();
    let state = AppState::build(config, clock, stores, db_pool.clone())?;

    gatepass_api::run_server(&server, state).await?;

    if let Some(pool) = db_pool {
        pool.close().await;
    }

    tracing::info!("GatePass server shut down gracefully");
    Ok(())
}
