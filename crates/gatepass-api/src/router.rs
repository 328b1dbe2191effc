//! Route definitions for the GatePass HTTP API.
//!
//! All routes are mounted under `/api`.

use axum::Router;
use axum::routing::{get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the API router and thread `AppState` through every route.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new().merge(qr_routes()).merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Pass issuance and verification.
fn qr_routes() -> Router<AppState> {
    Router::new()
        .route("/qr/issue", post(handlers::qr::issue))
        .route("/qr/verify", get(handlers::qr::verify))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
