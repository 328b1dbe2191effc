//! QR pass handlers.

use axum::Json;
use axum::extract::{Query, State};
use axum::http::StatusCode;

use gatepass_service::{RejectReason, VerificationOutcome};

use crate::dto::request::VerifyQuery;
use crate::dto::response::{IssueResponse, VerifyResponse};
use crate::error::ApiError;
use crate::extractors::{AuthUser, ClientMeta};
use crate::state::AppState;

/// POST /api/qr/issue
pub async fn issue(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<IssueResponse>, ApiError> {
    let pass = state.issuance.issue_pass(&auth.principal).await?;
    Ok(Json(IssueResponse::from(pass)))
}

/// GET /api/qr/verify?token=...
pub async fn verify(
    State(state): State<AppState>,
    ClientMeta(client): ClientMeta,
    Query(query): Query<VerifyQuery>,
) -> (StatusCode, Json<VerifyResponse>) {
    let outcome = state
        .verification
        .verify(query.token.as_deref(), client)
        .await;

    let status = match &outcome {
        VerificationOutcome::Valid(_) => StatusCode::OK,
        VerificationOutcome::Rejected(RejectReason::ServerError) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
        VerificationOutcome::Rejected(_) => StatusCode::BAD_REQUEST,
    };

    (status, Json(VerifyResponse::from(outcome)))
}
