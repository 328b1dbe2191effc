//! QR pass issuance and verification.

pub mod issuance;
pub mod outcome;
pub mod verification;

pub use issuance::{IssuanceService, IssuedPass};
pub use outcome::{AdmittedPass, PassHolder, RejectReason, VerificationOutcome};
pub use verification::VerificationService;
