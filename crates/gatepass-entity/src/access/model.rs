//! Access event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::user::{User, UserRole};

/// An immutable record of one successful gate scan.
///
/// Principal attributes are copied at scan time so historical reports do
/// not change when a profile is edited later.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AccessEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// The consumed pass nonce. At most one event exists per nonce.
    pub nonce: Uuid,
    /// The principal who passed the gate.
    pub subject_id: Uuid,
    /// Username snapshot.
    pub username: String,
    /// Given name snapshot.
    pub first_name: Option<String>,
    /// Family name snapshot.
    pub last_name: Option<String>,
    /// Role snapshot.
    pub role: UserRole,
    /// National ID snapshot.
    pub national_id: Option<String>,
    /// Shift label snapshot.
    pub shift: Option<String>,
    /// Whether the scan fell inside the principal's shift window.
    pub within_shift: bool,
    /// Client IP address as reported by the gate request.
    pub ip_address: Option<String>,
    /// Client User-Agent.
    pub user_agent: Option<String>,
    /// When the pass was consumed.
    pub scanned_at: DateTime<Utc>,
}

/// Network metadata of the device presenting a pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client User-Agent.
    pub user_agent: Option<String>,
}

/// Data required to append an access event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewAccessEvent {
    /// The consumed pass nonce.
    pub nonce: Uuid,
    /// The principal who passed the gate.
    pub subject_id: Uuid,
    /// Username snapshot.
    pub username: String,
    /// Given name snapshot.
    pub first_name: Option<String>,
    /// Family name snapshot.
    pub last_name: Option<String>,
    /// Role snapshot.
    pub role: UserRole,
    /// National ID snapshot.
    pub national_id: Option<String>,
    /// Shift label snapshot.
    pub shift: Option<String>,
    /// Shift compliance verdict.
    pub within_shift: bool,
    /// Client IP address.
    pub ip_address: Option<String>,
    /// Client User-Agent.
    pub user_agent: Option<String>,
    /// Consumption instant.
    pub scanned_at: DateTime<Utc>,
}

impl NewAccessEvent {
    /// Snapshot `user` for a scan of `nonce` at `scanned_at`.
    pub fn snapshot(
        nonce: Uuid,
        user: &User,
        scanned_at: DateTime<Utc>,
        within_shift: bool,
        client: ClientInfo,
    ) -> Self {
        Self {
            nonce,
            subject_id: user.id,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            role: user.role,
            national_id: user.national_id.clone(),
            shift: user.shift.clone(),
            within_shift,
            ip_address: client.ip_address,
            user_agent: client.user_agent,
            scanned_at,
        }
    }

    /// Materialize the row with a fresh identifier.
    pub fn into_event(self, id: Uuid) -> AccessEvent {
        AccessEvent {
            id,
            nonce: self.nonce,
            subject_id: self.subject_id,
            username: self.username,
            first_name: self.first_name,
            last_name: self.last_name,
            role: self.role,
            national_id: self.national_id,
            shift: self.shift,
            within_shift: self.within_shift,
            ip_address: self.ip_address,
            user_agent: self.user_agent,
            scanned_at: self.scanned_at,
        }
    }
}
