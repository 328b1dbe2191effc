//! # gatepass-api
//!
//! HTTP API layer for GatePass built on Axum.
//!
//! Provides the pass issuance and verification endpoints, the health
//! check, the bearer-token extractor, DTOs, and error mapping.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, run_server};
pub use error::ApiError;
pub use state::AppState;
