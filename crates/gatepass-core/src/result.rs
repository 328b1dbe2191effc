//! Convenience result type alias for GatePass.

use crate::error::AppError;

/// A specialized `Result` type for GatePass operations.
pub type AppResult<T> = Result<T, AppError>;
