//! QR pass claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Value of the `typ` claim on pass tokens.
pub const PASS_TOKEN_TYPE: &str = "qr";

/// Payload of a QR pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassClaims {
    /// Subject: the principal the pass was issued to.
    pub sub: Uuid,
    /// Nonce registered in the ledger.
    pub jti: Uuid,
    /// Token type discriminator; always `"qr"`.
    pub typ: String,
    /// Issued-at, epoch seconds.
    pub iat: i64,
    /// Expiry, epoch seconds. The pass is rejected from this second on.
    pub exp: i64,
}

impl PassClaims {
    /// The subject ID.
    pub fn subject_id(&self) -> Uuid {
        self.sub
    }

    /// The ledger nonce.
    pub fn nonce(&self) -> Uuid {
        self.jti
    }

    /// Issued-at as a timestamp.
    pub fn issued_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.iat, 0)
    }

    /// Expiry as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}
