//! # gatepass-service
//!
//! Business logic for GatePass. Services orchestrate the pass codec, the
//! ledger, the user directory, and the access log.
//!
//! Services follow constructor injection: all dependencies are provided
//! at construction time via `Arc` references.

pub mod context;
pub mod pass;
pub mod shift;

pub use context::RequestContext;
pub use pass::{
    AdmittedPass, IssuanceService, IssuedPass, PassHolder, RejectReason, VerificationOutcome,
    VerificationService,
};
pub use shift::{Shift, ShiftClassifier, within_shift};
