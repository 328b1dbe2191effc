//! User entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::role::UserRole;

/// A registered person in the institution directory.
///
/// Owned by the identity layer; GatePass only reads it.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Unique user identifier.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Given name.
    pub first_name: Option<String>,
    /// Family name.
    pub last_name: Option<String>,
    /// National identity document number.
    pub national_id: Option<String>,
    /// Role in the institution.
    pub role: UserRole,
    /// Assigned shift label, e.g. `"morning"` or `"tarde"`.
    pub shift: Option<String>,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Full name when known, otherwise the username.
    pub fn display_name(&self) -> String {
        let parts: Vec<&str> = [self.first_name.as_deref(), self.last_name.as_deref()]
            .into_iter()
            .flatten()
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .collect();

        if parts.is_empty() {
            self.username.clone()
        } else {
            parts.join(" ")
        }
    }

    /// The read-only projection passed to pass issuance.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.id,
            username: self.username.clone(),
            display_name: self.display_name(),
            role: self.role,
            shift: self.shift.clone(),
        }
    }
}

/// An authenticated identity as seen by the pass subsystem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Principal {
    /// User ID.
    pub id: Uuid,
    /// Login name.
    pub username: String,
    /// Human-readable name.
    pub display_name: String,
    /// Role at the time of authentication.
    pub role: UserRole,
    /// Assigned shift label.
    pub shift: Option<String>,
}
