//! Session JWT claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatepass_entity::user::{Principal, UserRole};

/// Value of the `typ` claim on session tokens.
pub const SESSION_TOKEN_TYPE: &str = "session";

/// Claims carried by a bearer session token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the user ID.
    pub sub: Uuid,
    /// Login name.
    pub username: String,
    /// Display name.
    pub name: String,
    /// Role at the time of token issuance.
    pub role: UserRole,
    /// Assigned shift label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shift: Option<String>,
    /// Issued-at timestamp (seconds since epoch).
    pub iat: i64,
    /// Expiration timestamp (seconds since epoch).
    pub exp: i64,
    /// Token ID.
    pub jti: Uuid,
    /// Token type discriminator.
    pub typ: String,
}

impl Claims {
    /// Returns the user ID from the subject claim.
    pub fn user_id(&self) -> Uuid {
        self.sub
    }

    /// Returns the expiration as a `DateTime<Utc>`.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }

    /// The principal this token authenticates.
    pub fn principal(&self) -> Principal {
        Principal {
            id: self.sub,
            username: self.username.clone(),
            display_name: self.name.clone(),
            role: self.role,
            shift: self.shift.clone(),
        }
    }
}
