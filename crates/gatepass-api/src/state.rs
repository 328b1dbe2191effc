//! Application state shared across all handlers and middleware.

use std::sync::Arc;

use gatepass_auth::jwt::JwtDecoder;
use gatepass_auth::pass::PassCodec;
use gatepass_core::config::AppConfig;
use gatepass_core::error::AppError;
use gatepass_core::traits::Clock;
use gatepass_database::DatabasePool;
use gatepass_database::store::{AccessLog, TokenLedger, UserDirectory};
use gatepass_service::{IssuanceService, ShiftClassifier, VerificationService};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped for cheap cloning across tasks.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Time source shared by every expiry decision
    pub clock: Arc<dyn Clock>,
    /// PostgreSQL pool; `None` when running on the in-memory store
    pub db_pool: Option<DatabasePool>,
    /// Session bearer-token validator
    pub jwt_decoder: Arc<JwtDecoder>,
    /// Pass issuance
    pub issuance: Arc<IssuanceService>,
    /// Pass verification
    pub verification: Arc<VerificationService>,
}

/// Storage backends the services are built on.
#[derive(Clone)]
pub struct Stores {
    /// Nonce ledger.
    pub ledger: Arc<dyn TokenLedger>,
    /// User directory.
    pub users: Arc<dyn UserDirectory>,
    /// Access log.
    pub access_log: Arc<dyn AccessLog>,
}

impl AppState {
    /// Wire codecs and services from configuration and storage.
    pub fn build(
        config: AppConfig,
        clock: Arc<dyn Clock>,
        stores: Stores,
        db_pool: Option<DatabasePool>,
    ) -> Result<Self, AppError> {
        let codec = Arc::new(PassCodec::new(&config.qr));
        let classifier = ShiftClassifier::new(&config.shifts)?;
        let jwt_decoder = Arc::new(JwtDecoder::new(&config.auth, Arc::clone(&clock)));

        let issuance = Arc::new(IssuanceService::new(
            Arc::clone(&codec),
            Arc::clone(&stores.ledger),
            Arc::clone(&clock),
            &config.qr,
        ));
        let verification = Arc::new(VerificationService::new(
            codec,
            stores.ledger,
            stores.users,
            stores.access_log,
            classifier,
            Arc::clone(&clock),
        ));

        Ok(Self {
            config: Arc::new(config),
            clock,
            db_pool,
            jwt_decoder,
            issuance,
            verification,
        })
    }
}
