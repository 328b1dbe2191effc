//! Response DTOs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use gatepass_service::{IssuedPass, PassHolder, RejectReason, VerificationOutcome};

/// Standard success response wrapper.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `ok` or `degraded`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// `connected`, `unavailable`, or `memory`.
    pub database: String,
}

/// Body of `POST /api/qr/issue`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IssueResponse {
    /// Verification URL to render as a QR code.
    pub url: String,
    /// Expiry, epoch seconds.
    pub exp: i64,
}

impl From<IssuedPass> for IssueResponse {
    fn from(pass: IssuedPass) -> Self {
        Self {
            url: pass.url,
            exp: pass.expires_at.timestamp(),
        }
    }
}

/// Body of a successful `GET /api/qr/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidPassResponse {
    /// Always `true`.
    pub valid: bool,
    /// The pass holder.
    pub user: PassHolder,
    /// Consumed nonce.
    pub jti: Uuid,
    /// Issued-at, epoch seconds.
    pub iat: i64,
    /// Expiry, epoch seconds.
    pub exp: i64,
    /// Scan instant.
    pub scanned_at: DateTime<Utc>,
    /// Whether the scan fell inside the holder's shift.
    pub within_shift: bool,
}

/// Body of a rejected `GET /api/qr/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RejectedPassResponse {
    /// Always `false`.
    pub valid: bool,
    /// Why the pass was rejected.
    pub reason: RejectReason,
}

/// Body of `GET /api/qr/verify`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VerifyResponse {
    /// Admitted.
    Valid(ValidPassResponse),
    /// Rejected.
    Rejected(RejectedPassResponse),
}

impl From<VerificationOutcome> for VerifyResponse {
    fn from(outcome: VerificationOutcome) -> Self {
        match outcome {
            VerificationOutcome::Valid(pass) => Self::Valid(ValidPassResponse {
                valid: true,
                user: pass.user,
                jti: pass.nonce,
                iat: pass.issued_at,
                exp: pass.expires_at,
                scanned_at: pass.scanned_at,
                within_shift: pass.within_shift,
            }),
            VerificationOutcome::Rejected(reason) => Self::Rejected(RejectedPassResponse {
                valid: false,
                reason,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejected_body_shape() {
        let body = VerifyResponse::from(VerificationOutcome::Rejected(RejectReason::Reused));
        assert_eq!(
            serde_json::to_value(body).unwrap(),
            serde_json::json!({"valid": false, "reason": "reused"})
        );
    }
}
