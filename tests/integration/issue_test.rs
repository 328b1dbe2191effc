//! Integration tests for pass issuance.

use chrono::Duration;
use http::StatusCode;

use gatepass_auth::pass::PassCodec;
use gatepass_database::store::TokenLedger;
use gatepass_entity::user::UserRole;

use crate::helpers::{TestApp, t0, token_from_url};

#[tokio::test]
async fn test_issue_returns_url_and_expiry() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));
    let session = app.session_token(&user);

    let response = app.post("/api/qr/issue", Some(&session)).await;
    assert_eq!(response.status, StatusCode::OK);

    let url = response.body["url"].as_str().unwrap();
    assert!(url.starts_with("https://gate.example/paginas/validar.html?token="));
    assert_eq!(
        response.body["exp"].as_i64(),
        Some((t0() + Duration::seconds(60)).timestamp())
    );
    assert_eq!(app.store.token_count(), 1);
    assert!(!token_from_url(url).is_empty());
}

#[tokio::test]
async fn test_each_request_registers_a_new_nonce() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));

    let a = app.issue_pass(&user).await;
    let b = app.issue_pass(&user).await;
    assert_ne!(a, b);
    assert_eq!(app.store.token_count(), 2);
}

#[tokio::test]
async fn test_issue_requires_authentication() {
    let app = TestApp::new();

    let response = app.post("/api/qr/issue", None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["error"], "UNAUTHORIZED");

    let response = app.post("/api/qr/issue", Some("not-a-jwt")).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    assert_eq!(app.store.token_count(), 0);
}

#[tokio::test]
async fn test_pass_is_not_a_session_token() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));
    let pass = app.issue_pass(&user).await;

    let response = app.post("/api/qr/issue", Some(&pass)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(app.store.token_count(), 1);
}

#[tokio::test]
async fn test_expired_session_is_rejected() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));
    let session = app.session_token(&user);

    app.clock.advance(Duration::hours(2));
    let response = app.post("/api/qr/issue", Some(&session)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_ledger_row_matches_token() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Staff, None);
    let token = app.issue_pass(&user).await;

    let codec = PassCodec::new(&app.config.qr);
    let claims = codec.verify(&token, t0()).unwrap();
    assert_eq!(claims.subject_id(), user.id);
    assert_eq!(claims.exp - claims.iat, 60);

    let row = app.store.find(claims.nonce()).await.unwrap().unwrap();
    assert_eq!(row.subject_id, user.id);
    assert_eq!(row.issued_at, t0());
    assert_eq!(row.expires_at, t0() + Duration::seconds(60));
    assert!(row.consumed_at.is_none());
    assert!(app.store.events().is_empty());
}
