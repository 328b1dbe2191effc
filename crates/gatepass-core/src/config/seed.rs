//! Users preloaded into the in-memory store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A `[[dev_users]]` entry.
///
/// Only read when `database.backend = "memory"`. The ID is fixed so that
/// session tokens minted by the CLI resolve against a running server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    /// User ID.
    pub id: Uuid,
    /// Unique login name.
    pub username: String,
    /// Given name.
    #[serde(default)]
    pub first_name: Option<String>,
    /// Family name.
    #[serde(default)]
    pub last_name: Option<String>,
    /// National identity document number.
    #[serde(default)]
    pub national_id: Option<String>,
    /// Role name, e.g. `"student"`.
    #[serde(default = "default_role")]
    pub role: String,
    /// Shift label.
    #[serde(default)]
    pub shift: Option<String>,
}

fn default_role() -> String {
    "student".to_string()
}
