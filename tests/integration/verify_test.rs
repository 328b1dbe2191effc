//! Integration tests for pass verification at the gate.

use chrono::{Duration, TimeZone, Utc};
use http::StatusCode;

use gatepass_entity::user::UserRole;

use crate::helpers::{TestApp, send};

#[tokio::test]
async fn test_afternoon_scan_then_replay_then_stale_pass() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));

    let first = app.issue_pass(&user).await;

    app.clock.set(Utc.with_ymd_and_hms(2025, 3, 10, 13, 5, 30).unwrap());
    let response = app.verify(Some(&first)).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["valid"], true);
    assert_eq!(response.body["within_shift"], true);
    assert_eq!(response.body["user"]["username"], "ana");
    assert_eq!(response.body["user"]["shift"], "tarde");
    assert_eq!(response.body["user"]["role"], "student");
    let iat = response.body["iat"].as_i64().unwrap();
    let exp = response.body["exp"].as_i64().unwrap();
    assert_eq!(exp - iat, 60);
    assert!(response.body["jti"].is_string());

    app.clock.set(Utc.with_ymd_and_hms(2025, 3, 10, 13, 5, 40).unwrap());
    let response = app.verify(Some(&first)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["valid"], false);
    assert_eq!(response.reason(), Some("reused"));

    let second = app.issue_pass(&user).await;
    app.clock.set(Utc.with_ymd_and_hms(2025, 3, 10, 13, 7, 0).unwrap());
    let response = app.verify(Some(&second)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.reason(), Some("invalid_or_expired"));

    assert_eq!(app.store.events().len(), 1);
}

#[tokio::test]
async fn test_missing_token() {
    let app = TestApp::new();

    let response = app.verify(None).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.reason(), Some("missing"));

    let response = app.verify(Some("")).await;
    assert_eq!(response.reason(), Some("missing"));
}

#[tokio::test]
async fn test_tampered_token_leaves_ledger_untouched() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));
    let token = app.issue_pass(&user).await;

    // Swap one signature character for a different base64url symbol.
    let mut chars: Vec<char> = token.chars().collect();
    let i = chars.len() - 5;
    chars[i] = if chars[i] == 'A' { 'B' } else { 'A' };
    let tampered: String = chars.into_iter().collect();

    let response = app.verify(Some(&tampered)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.reason(), Some("invalid_or_expired"));

    // The genuine token is still good.
    let response = app.verify(Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_session_token_is_not_a_pass() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));
    let session = app.session_token(&user);

    let response = app.verify(Some(&session)).await;
    assert_eq!(response.reason(), Some("invalid_or_expired"));
}

#[tokio::test]
async fn test_deleted_user_is_rejected() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));
    let token = app.issue_pass(&user).await;
    app.store.remove_user(user.id);

    let response = app.verify(Some(&token)).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.reason(), Some("unknown_user"));
    assert!(app.store.events().is_empty());
}

#[tokio::test]
async fn test_scan_outside_shift_is_flagged() {
    let app = TestApp::new();
    let user = app.create_user("leo", UserRole::Staff, Some("morning"));
    let token = app.issue_pass(&user).await;

    let response = app.verify(Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["within_shift"], false);

    let events = app.store.events();
    assert_eq!(events.len(), 1);
    assert!(!events[0].within_shift);
    assert_eq!(events[0].shift.as_deref(), Some("morning"));
}

#[tokio::test]
async fn test_client_metadata_is_recorded() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));
    let token = app.issue_pass(&user).await;

    let path = format!("/api/qr/verify?token={token}");
    let response = app
        .request(
            "GET",
            &path,
            None,
            &[
                ("x-forwarded-for", "203.0.113.9, 10.0.0.1"),
                ("user-agent", "gate-scanner/2.1"),
            ],
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let event = &app.store.events()[0];
    assert_eq!(event.ip_address.as_deref(), Some("203.0.113.9"));
    assert_eq!(event.user_agent.as_deref(), Some("gate-scanner/2.1"));
    assert_eq!(event.subject_id, user.id);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_concurrent_scans_admit_exactly_once() {
    let app = TestApp::new();
    let user = app.create_user("ana", UserRole::Student, Some("tarde"));
    let token = app.issue_pass(&user).await;
    app.clock.advance(Duration::seconds(2));

    let path = format!("/api/qr/verify?token={token}");
    let handles: Vec<_> = (0..24)
        .map(|_| {
            let router = app.router.clone();
            let path = path.clone();
            tokio::spawn(async move { send(router, "GET", &path, None, &[]).await })
        })
        .collect();

    let responses: Vec<_> = futures::future::join_all(handles)
        .await
        .into_iter()
        .map(|r| r.unwrap())
        .collect();

    let admitted = responses
        .iter()
        .filter(|r| r.status == StatusCode::OK)
        .count();
    assert_eq!(admitted, 1);
    assert!(
        responses
            .iter()
            .filter(|r| r.status != StatusCode::OK)
            .all(|r| r.reason() == Some("reused"))
    );
    assert_eq!(app.store.events().len(), 1);
}
