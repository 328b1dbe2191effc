//! Shift classification configuration.

use serde::{Deserialize, Serialize};

/// Controls which local time scans are classified in.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShiftConfig {
    /// Fixed offset from UTC in minutes. When unset the server's local
    /// timezone is used.
    #[serde(default)]
    pub utc_offset_minutes: Option<i32>,
}
