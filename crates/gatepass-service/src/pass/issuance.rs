//! Pass issuance.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use gatepass_auth::pass::PassCodec;
use gatepass_core::config::QrConfig;
use gatepass_core::error::AppError;
use gatepass_core::traits::Clock;
use gatepass_database::store::{RegisterOutcome, TokenLedger};
use gatepass_entity::pass::NewIssuedToken;
use gatepass_entity::user::Principal;

/// Produces nonces for new passes.
pub type NonceSource = Arc<dyn Fn() -> Uuid + Send + Sync>;

/// A freshly issued pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssuedPass {
    /// Verification URL to render as a QR code.
    pub url: String,
    /// The signed token embedded in `url`.
    pub token: String,
    /// Ledger nonce.
    pub nonce: Uuid,
    /// Expiry instant (whole seconds).
    pub expires_at: DateTime<Utc>,
}

/// Issues single-use passes to authenticated principals.
#[derive(Clone)]
pub struct IssuanceService {
    codec: Arc<PassCodec>,
    ledger: Arc<dyn TokenLedger>,
    clock: Arc<dyn Clock>,
    nonces: NonceSource,
    ttl_seconds: u64,
    verify_page_url: String,
}

impl std::fmt::Debug for IssuanceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IssuanceService")
            .field("ttl_seconds", &self.ttl_seconds)
            .field("verify_page_url", &self.verify_page_url)
            .finish_non_exhaustive()
    }
}

impl IssuanceService {
    /// Creates a new issuance service. Nonces are random v4 UUIDs drawn
    /// from the operating system CSPRNG.
    pub fn new(
        codec: Arc<PassCodec>,
        ledger: Arc<dyn TokenLedger>,
        clock: Arc<dyn Clock>,
        config: &QrConfig,
    ) -> Self {
        Self {
            codec,
            ledger,
            clock,
            nonces: Arc::new(Uuid::new_v4),
            ttl_seconds: config.ttl_seconds,
            verify_page_url: config.verify_page_url.clone(),
        }
    }

    /// Replace the nonce source.
    pub fn with_nonce_source(mut self, nonces: NonceSource) -> Self {
        self.nonces = nonces;
        self
    }

    /// Issue one fresh pass for `principal`.
    ///
    /// A nonce collision yields a transient error; the caller may retry.
    pub async fn issue_pass(&self, principal: &Principal) -> Result<IssuedPass, AppError> {
        let nonce = (self.nonces)();
        let now = self.clock.now();
        let token = self
            .codec
            .issue(principal.id, nonce, self.ttl_seconds, now)?;

        // The codec truncates to whole seconds; the ledger must agree with it.
        let issued_at = DateTime::from_timestamp(now.timestamp(), 0)
            .ok_or_else(|| AppError::internal("Clock out of range"))?;
        let expires_at = issued_at + Duration::seconds(self.ttl_seconds as i64);

        let record = NewIssuedToken {
            nonce,
            subject_id: principal.id,
            issued_at,
            expires_at,
        };

        match self.ledger.register(&record).await? {
            RegisterOutcome::Registered => {}
            RegisterOutcome::DuplicateNonce => {
                warn!(%nonce, subject_id = %principal.id, "Pass nonce collision");
                return Err(AppError::service_unavailable(
                    "Could not issue a pass, please try again",
                ));
            }
        }

        info!(
            %nonce,
            subject_id = %principal.id,
            expires_at = %expires_at,
            "Pass issued"
        );

        Ok(IssuedPass {
            url: pass_url(&self.verify_page_url, &token),
            token,
            nonce,
            expires_at,
        })
    }
}

/// Append `token` to `base` as the `token` query parameter, keeping any
/// query the page URL already has.
fn pass_url(base: &str, token: &str) -> String {
    let separator = if !base.contains('?') {
        "?"
    } else if base.ends_with('?') || base.ends_with('&') {
        ""
    } else {
        "&"
    };
    format!("{base}{separator}token={token}")
}
