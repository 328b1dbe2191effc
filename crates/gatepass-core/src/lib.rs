//! # gatepass-core
//!
//! Core crate for GatePass. Contains configuration schemas, the unified
//! error system, and the wall-clock abstraction shared by every service.
//!
//! This crate has **no** internal dependencies on other GatePass crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;

pub use error::AppError;
pub use result::AppResult;
