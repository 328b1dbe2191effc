//! Application builder: wires router, middleware, and state into an Axum app.

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::extract::Request;
use axum::middleware as axum_middleware;
use tower_http::trace::TraceLayer;

use gatepass_core::config::{CorsConfig, ServerConfig};
use gatepass_core::error::AppError;

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState, cors_config: &CorsConfig) -> Router {
    build_router(state)
        .layer(axum_middleware::from_fn(request_logging))
        .layer(build_cors_layer(cors_config))
        .layer(
            // Spans carry the path only; query strings hold pass tokens.
            TraceLayer::new_for_http().make_span_with(|request: &Request| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    path = %request.uri().path(),
                )
            }),
        )
}

/// Binds the configured address and serves `state` until a shutdown
/// signal arrives.
pub async fn run_server(server: &ServerConfig, state: AppState) -> Result<(), AppError> {
    let app = build_app(state, &server.cors);
    let addr = format!("{}:{}", server.host, server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "GatePass server listening");

    let grace = Duration::from_secs(server.shutdown_grace_seconds);
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(grace))
    .await
    .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    tracing::info!("GatePass server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM, then arms a hard-exit timer for
/// connections that outlive `grace`.
async fn shutdown_signal(grace: Duration) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!(grace_seconds = grace.as_secs(), "Shutdown signal received");
    tokio::spawn(async move {
        tokio::time::sleep(grace).await;
        tracing::warn!("Graceful shutdown timed out, exiting");
        std::process::exit(1);
    });
}
