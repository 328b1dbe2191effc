//! Tagged result of a pass verification.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatepass_entity::user::{User, UserRole};

/// Why a presented pass was not admitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// No token was presented.
    Missing,
    /// Bad signature, malformed payload, or past the token's own expiry.
    InvalidOrExpired,
    /// Correctly signed but the nonce was never registered.
    Unknown,
    /// The nonce was already consumed.
    Reused,
    /// The ledger considers the nonce expired.
    Expired,
    /// The pass holder no longer exists.
    UnknownUser,
    /// Storage or other internal failure. Do not retry automatically.
    ServerError,
}

impl RejectReason {
    /// Wire name of the reason.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Missing => "missing",
            Self::InvalidOrExpired => "invalid_or_expired",
            Self::Unknown => "unknown",
            Self::Reused => "reused",
            Self::Expired => "expired",
            Self::UnknownUser => "unknown_user",
            Self::ServerError => "server_error",
        }
    }

    /// Whether this rejection points at a bug or data inconsistency rather
    /// than ordinary traffic.
    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, Self::Unknown | Self::UnknownUser)
    }
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Public attributes of the pass holder shown to the gate operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassHolder {
    /// User ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Role.
    pub role: UserRole,
    /// National ID.
    pub national_id: Option<String>,
    /// Shift label.
    pub shift: Option<String>,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
}

impl From<&User> for PassHolder {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            role: user.role,
            national_id: user.national_id.clone(),
            shift: user.shift.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

/// A pass that was admitted exactly once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmittedPass {
    /// The holder at scan time.
    pub user: PassHolder,
    /// The consumed nonce.
    pub nonce: Uuid,
    /// Issued-at, epoch seconds.
    pub issued_at: i64,
    /// Expiry, epoch seconds.
    pub expires_at: i64,
    /// Consumption instant recorded in the access log.
    pub scanned_at: DateTime<Utc>,
    /// Whether the scan fell inside the holder's shift.
    pub within_shift: bool,
}

/// Result of presenting a pass at the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VerificationOutcome {
    /// Admitted; an access event was recorded.
    Valid(AdmittedPass),
    /// Rejected.
    Rejected(RejectReason),
}

impl VerificationOutcome {
    /// Whether the pass was admitted.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid(_))
    }

    /// The rejection reason, if rejected.
    pub fn reason(&self) -> Option<RejectReason> {
        match self {
            Self::Valid(_) => None,
            Self::Rejected(reason) => Some(*reason),
        }
    }
}
