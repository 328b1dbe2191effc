//! Request DTOs.

use serde::{Deserialize, Serialize};

/// Query string of `GET /api/qr/verify`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifyQuery {
    /// The scanned pass token.
    pub token: Option<String>,
}
