//! The shipped development configuration serves seeded users end to end.

use http::StatusCode;

use gatepass_core::config::{AppConfig, StoreBackend};
use gatepass_database::MemoryStore;
use gatepass_database::store::UserDirectory;

use crate::helpers::{TestApp, t0};

#[tokio::test]
async fn test_development_config_admits_seeded_user() {
    let mut config =
        AppConfig::load_from("config/default", "development").expect("development config loads");
    assert_eq!(config.database.backend, StoreBackend::Memory);
    assert!(!config.dev_users.is_empty());
    config.shifts.utc_offset_minutes = Some(0);

    let store = MemoryStore::with_seed_users(&config.dev_users, t0()).unwrap();
    let app = TestApp::with_store(config, store.clone());

    let ana = store
        .find_by_username("ana")
        .await
        .unwrap()
        .expect("ana is seeded");
    let pass = app.issue_pass(&ana).await;

    let response = app.verify(Some(&pass)).await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["valid"], true);
    assert_eq!(response.body["user"]["username"], "ana");
    assert_eq!(store.events().len(), 1);
}
