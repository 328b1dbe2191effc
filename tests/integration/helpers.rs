//! Shared test helpers for integration tests.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use chrono::{DateTime, TimeZone, Utc};
use http::{Request, StatusCode};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use gatepass_api::state::Stores;
use gatepass_api::{AppState, build_app};
use gatepass_auth::jwt::JwtEncoder;
use gatepass_core::config::AppConfig;
use gatepass_core::traits::ManualClock;
use gatepass_database::MemoryStore;
use gatepass_entity::user::{User, UserRole};

/// 2025-03-10 13:05:00 UTC, inside the afternoon shift.
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 3, 10, 13, 5, 0).unwrap()
}

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Backing store for direct inspection
    pub store: MemoryStore,
    /// Pinned server clock
    pub clock: Arc<ManualClock>,
    /// Application config
    pub config: AppConfig,
}

impl TestApp {
    /// Create a new test application with the clock at [`t0`] and shifts
    /// evaluated in UTC.
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-session-secret".to_string();
        config.qr.secret = "integration-qr-secret".to_string();
        config.qr.verify_page_url = "https://gate.example/paginas/validar.html".to_string();
        config.shifts.utc_offset_minutes = Some(0);
        config.validate().expect("test config is valid");

        Self::with_store(config, MemoryStore::new())
    }

    /// Build the application over an existing store and config.
    pub fn with_store(config: AppConfig, store: MemoryStore) -> Self {
        let clock = Arc::new(ManualClock::new(t0()));
        let stores = Stores {
            ledger: Arc::new(store.clone()),
            users: Arc::new(store.clone()),
            access_log: Arc::new(store.clone()),
        };

        let state = AppState::build(config.clone(), clock.clone(), stores, None)
            .expect("Failed to build app state");
        let router = build_app(state, &config.server.cors);

        Self {
            router,
            store,
            clock,
            config,
        }
    }

    /// Insert a user into the directory
    pub fn create_user(&self, username: &str, role: UserRole, shift: Option<&str>) -> User {
        let user = User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            first_name: Some("Ana".to_string()),
            last_name: Some("Paz".to_string()),
            national_id: Some("30111222".to_string()),
            role,
            shift: shift.map(String::from),
            created_at: t0(),
            updated_at: t0(),
        };
        self.store.upsert_user(user.clone());
        user
    }

    /// Mint a bearer session token for `user` at the current clock time
    pub fn session_token(&self, user: &User) -> String {
        let encoder = JwtEncoder::new(&self.config.auth, self.clock.clone());
        encoder
            .generate_access_token(&user.principal())
            .expect("Failed to mint session token")
            .0
    }

    /// Issue a pass through the API and return the token carried in its URL
    pub async fn issue_pass(&self, user: &User) -> String {
        let token = self.session_token(user);
        let response = self.post("/api/qr/issue", Some(&token)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        let url = response.body["url"].as_str().expect("url in body");
        token_from_url(url).to_string()
    }

    /// GET /api/qr/verify with an optional token
    pub async fn verify(&self, token: Option<&str>) -> TestResponse {
        let path = match token {
            Some(token) => format!("/api/qr/verify?token={token}"),
            None => "/api/qr/verify".to_string(),
        };
        self.request("GET", &path, None, &[]).await
    }

    /// POST with an optional bearer token
    pub async fn post(&self, path: &str, token: Option<&str>) -> TestResponse {
        self.request("POST", path, token, &[]).await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        token: Option<&str>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        send(self.router.clone(), method, path, token, headers).await
    }
}

/// Send one request through a router clone
pub async fn send(
    router: Router,
    method: &str,
    path: &str,
    token: Option<&str>,
    headers: &[(&str, &str)],
) -> TestResponse {
    let mut req = Request::builder().method(method).uri(path);

    if let Some(token) = token {
        req = req.header("Authorization", format!("Bearer {token}"));
    }
    for (name, value) in headers {
        req = req.header(*name, *value);
    }

    let req = req.body(Body::empty()).expect("Failed to build request");

    let response = router.oneshot(req).await.expect("Failed to send request");

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("Failed to read body");

    let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

    TestResponse { status, body }
}

/// The `token` query parameter of a verification URL
pub fn token_from_url(url: &str) -> &str {
    url.rsplit_once("token=").map(|(_, t)| t).unwrap_or(url)
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `reason` of a rejected verification
    pub fn reason(&self) -> Option<&str> {
        self.body["reason"].as_str()
    }
}
