//! Health check handler.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let (status, database) = match &state.db_pool {
        None => ("ok", "memory"),
        Some(pool) => match pool.health_check().await {
            Ok(true) => ("ok", "connected"),
            Ok(false) => ("degraded", "unavailable"),
            Err(e) => {
                tracing::warn!(error = %e, "Database health check failed");
                ("degraded", "unavailable")
            }
        },
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
    }))
}
