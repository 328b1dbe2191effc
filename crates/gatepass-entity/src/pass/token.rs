//! Issued QR token ledger row.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A nonce registered at issuance.
///
/// Rows are never deleted; `consumed_at` is written at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct IssuedToken {
    /// Pass nonce (the JWT `jti`).
    pub nonce: Uuid,
    /// The principal the pass was issued to.
    pub subject_id: Uuid,
    /// When the pass was signed.
    pub issued_at: DateTime<Utc>,
    /// First instant at which the pass is no longer accepted.
    pub expires_at: DateTime<Utc>,
    /// When the pass was scanned, if ever.
    pub consumed_at: Option<DateTime<Utc>>,
}

impl IssuedToken {
    /// Whether the pass has already been scanned.
    pub fn is_consumed(&self) -> bool {
        self.consumed_at.is_some()
    }

    /// Whether the pass has expired at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    /// Whether the pass could still be consumed at `now`.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_consumed() && !self.is_expired_at(now)
    }
}

/// Data required to register a new nonce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssuedToken {
    /// Pass nonce.
    pub nonce: Uuid,
    /// Owning principal.
    pub subject_id: Uuid,
    /// Signing instant.
    pub issued_at: DateTime<Utc>,
    /// Expiry instant; must be after `issued_at`.
    pub expires_at: DateTime<Utc>,
}

impl From<NewIssuedToken> for IssuedToken {
    fn from(data: NewIssuedToken) -> Self {
        Self {
            nonce: data.nonce,
            subject_id: data.subject_id,
            issued_at: data.issued_at,
            expires_at: data.expires_at,
            consumed_at: None,
        }
    }
}
