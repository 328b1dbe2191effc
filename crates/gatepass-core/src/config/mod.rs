//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod qr;
pub mod seed;
pub mod shift;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::logging::LoggingConfig;
pub use self::qr::QrConfig;
pub use self::seed::SeedUser;
pub use self::shift::ShiftConfig;

use crate::error::AppError;

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session bearer-token settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// QR pass settings.
    #[serde(default)]
    pub qr: QrConfig,
    /// Shift classification settings.
    #[serde(default)]
    pub shifts: ShiftConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Users preloaded into the in-memory store.
    #[serde(default)]
    pub dev_users: Vec<SeedUser>,
}

/// Prefix of the shipped secret placeholders.
const PLACEHOLDER_PREFIX: &str = "CHANGE_ME";

impl AppConfig {
    /// Load configuration from TOML files.
    ///
    /// Merges `config/default.toml` with the `config/{env}.toml` overlay
    /// and environment variables prefixed with `GATEPASS__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration using an explicit base file path (without extension).
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("GATEPASS")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let loaded: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        loaded.validate()?;
        Ok(loaded)
    }

    /// Reject configurations that would make passes unsafe or unusable.
    pub fn validate(&self) -> Result<(), AppError> {
        if self.qr.ttl_seconds == 0 {
            return Err(AppError::configuration("qr.ttl_seconds must be positive"));
        }
        if self.qr.secret.is_empty() {
            return Err(AppError::configuration("qr.secret must not be empty"));
        }
        if self.database.backend == StoreBackend::Postgres {
            if self.qr.secret.starts_with(PLACEHOLDER_PREFIX) {
                return Err(AppError::configuration(
                    "qr.secret is a placeholder; set GATEPASS__QR__SECRET",
                ));
            }
            if self.auth.jwt_secret.starts_with(PLACEHOLDER_PREFIX) {
                return Err(AppError::configuration(
                    "auth.jwt_secret is a placeholder; set GATEPASS__AUTH__JWT_SECRET",
                ));
            }
        }
        if self.qr.secret == self.auth.jwt_secret {
            return Err(AppError::configuration(
                "qr.secret must differ from auth.jwt_secret",
            ));
        }
        if let Some(offset) = self.shifts.utc_offset_minutes {
            if offset.abs() >= 24 * 60 {
                return Err(AppError::configuration(
                    "shifts.utc_offset_minutes must be within one day",
                ));
            }
        }
        if self.qr.verify_page_url.contains('#') {
            return Err(AppError::configuration(
                "qr.verify_page_url must not carry a fragment",
            ));
        }
        let mut usernames = std::collections::HashSet::new();
        let mut ids = std::collections::HashSet::new();
        for user in &self.dev_users {
            if !usernames.insert(user.username.as_str()) || !ids.insert(user.id) {
                return Err(AppError::configuration(format!(
                    "dev_users entry '{}' duplicates another user",
                    user.username
                )));
            }
        }
        Ok(())
    }
}
