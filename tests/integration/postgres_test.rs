//! Ledger, directory, and access log against a real PostgreSQL database.
//!
//! Run with `DATABASE_URL` pointing at a disposable database:
//! `cargo test --test integration -- --ignored`.

use std::sync::Arc;

use chrono::{DateTime, Duration, SubsecRound, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatepass_auth::pass::PassCodec;
use gatepass_core::config::{DatabaseConfig, ShiftConfig};
use gatepass_core::error::ErrorKind;
use gatepass_core::traits::SystemClock;
use gatepass_database::repositories::{AccessLogRepository, QrTokenRepository, UserRepository};
use gatepass_database::DatabasePool;
use gatepass_database::store::{
    AccessLog, ConsumeOutcome, RegisterOutcome, TokenLedger, UserDirectory,
};
use gatepass_entity::access::{ClientInfo, NewAccessEvent};
use gatepass_entity::pass::NewIssuedToken;
use gatepass_service::{RejectReason, ShiftClassifier, VerificationOutcome, VerificationService};

async fn pool() -> PgPool {
    let url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let config = DatabaseConfig {
        url,
        max_connections: 32,
        min_connections: 1,
        ..DatabaseConfig::default()
    };
    let pool = DatabasePool::connect(&config)
        .await
        .expect("Failed to connect to test database");
    gatepass_database::migration::run_migrations(pool.pool())
        .await
        .expect("Failed to run migrations");
    pool.pool().clone()
}

fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(0)
}

async fn insert_user(pool: &PgPool, shift: &str) -> Uuid {
    sqlx::query_scalar(
        "INSERT INTO users (username, first_name, role, shift) \
         VALUES ($1, 'Ana', 'student', $2) RETURNING id",
    )
    .bind(format!("ana-{}", Uuid::new_v4()))
    .bind(shift)
    .fetch_one(pool)
    .await
    .expect("Failed to insert user")
}

fn pass(subject_id: Uuid, issued_at: DateTime<Utc>, ttl: i64) -> NewIssuedToken {
    NewIssuedToken {
        nonce: Uuid::new_v4(),
        subject_id,
        issued_at,
        expires_at: issued_at + Duration::seconds(ttl),
    }
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_register_reports_duplicate_nonce() {
    let pool = pool().await;
    let ledger = QrTokenRepository::new(pool.clone());
    let subject = insert_user(&pool, "tarde").await;
    let token = pass(subject, now(), 60);

    assert_eq!(
        ledger.register(&token).await.unwrap(),
        RegisterOutcome::Registered
    );
    assert_eq!(
        ledger.register(&token).await.unwrap(),
        RegisterOutcome::DuplicateNonce
    );

    let row = ledger.find(token.nonce).await.unwrap().unwrap();
    assert_eq!(row.subject_id, subject);
    assert_eq!(row.expires_at, token.expires_at);
    assert!(row.consumed_at.is_none());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
#[ignore = "requires DATABASE_URL"]
async fn test_concurrent_consume_admits_once() {
    let pool = pool().await;
    let ledger = Arc::new(QrTokenRepository::new(pool.clone()));
    let subject = insert_user(&pool, "tarde").await;
    let issued_at = now();
    let token = pass(subject, issued_at, 60);
    ledger.register(&token).await.unwrap();

    let nonce = token.nonce;
    let scan_at = issued_at + Duration::seconds(5);
    let attempts = (0..24).map(|_| {
        let ledger = Arc::clone(&ledger);
        tokio::spawn(async move { ledger.try_consume(nonce, scan_at).await })
    });
    let outcomes: Vec<ConsumeOutcome> = futures::future::join_all(attempts)
        .await
        .into_iter()
        .map(|joined| joined.unwrap().unwrap())
        .collect();

    let consumed = outcomes
        .iter()
        .filter(|o| matches!(o, ConsumeOutcome::Consumed { .. }))
        .count();
    assert_eq!(consumed, 1);
    assert!(
        outcomes
            .iter()
            .all(|o| matches!(o, ConsumeOutcome::Consumed { .. } | ConsumeOutcome::AlreadyConsumed))
    );

    let row = ledger.find(nonce).await.unwrap().unwrap();
    assert_eq!(row.consumed_at, Some(scan_at));
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_unconsumable_rows_are_classified() {
    let pool = pool().await;
    let ledger = QrTokenRepository::new(pool.clone());
    let subject = insert_user(&pool, "tarde").await;
    let issued_at = now();

    assert_eq!(
        ledger.try_consume(Uuid::new_v4(), issued_at).await.unwrap(),
        ConsumeOutcome::Unknown
    );

    let stale = pass(subject, issued_at, 60);
    ledger.register(&stale).await.unwrap();
    assert_eq!(
        ledger.try_consume(stale.nonce, stale.expires_at).await.unwrap(),
        ConsumeOutcome::Expired
    );
    assert!(ledger.find(stale.nonce).await.unwrap().unwrap().consumed_at.is_none());

    let used = pass(subject, issued_at, 60);
    ledger.register(&used).await.unwrap();
    assert!(matches!(
        ledger.try_consume(used.nonce, issued_at).await.unwrap(),
        ConsumeOutcome::Consumed { subject_id, .. } if subject_id == subject
    ));
    let later = used.expires_at + Duration::seconds(30);
    assert_eq!(
        ledger.try_consume(used.nonce, later).await.unwrap(),
        ConsumeOutcome::AlreadyConsumed
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_live_pass_count() {
    let pool = pool().await;
    let ledger = QrTokenRepository::new(pool.clone());
    let subject = insert_user(&pool, "tarde").await;
    let issued_at = now();

    let a = pass(subject, issued_at, 60);
    let b = pass(subject, issued_at, 60);
    ledger.register(&a).await.unwrap();
    ledger.register(&b).await.unwrap();
    ledger.try_consume(a.nonce, issued_at).await.unwrap();

    assert_eq!(ledger.count_live_by_subject(subject, issued_at).await.unwrap(), 1);
    assert_eq!(
        ledger
            .count_live_by_subject(subject, b.expires_at)
            .await
            .unwrap(),
        0
    );
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_second_event_for_a_nonce_is_a_conflict() {
    let pool = pool().await;
    let ledger = QrTokenRepository::new(pool.clone());
    let users = UserRepository::new(pool.clone());
    let log = AccessLogRepository::new(pool.clone());
    let subject = insert_user(&pool, "tarde").await;
    let token = pass(subject, now(), 60);
    ledger.register(&token).await.unwrap();

    let user = users.find_by_id(subject).await.unwrap().unwrap();
    let event = NewAccessEvent::snapshot(
        token.nonce,
        &user,
        token.issued_at,
        true,
        ClientInfo {
            ip_address: Some("10.0.0.7".to_string()),
            user_agent: Some("gate-scanner/1.0".to_string()),
        },
    );

    let recorded = log.append(&event).await.unwrap();
    assert_eq!(recorded.subject_id, subject);
    assert_eq!(recorded.ip_address.as_deref(), Some("10.0.0.7"));

    let err = log.append(&event).await.unwrap_err();
    assert_eq!(err.kind, ErrorKind::Conflict);

    let found = log.find_by_nonce(token.nonce).await.unwrap().unwrap();
    assert_eq!(found.id, recorded.id);
}

#[tokio::test]
#[ignore = "requires DATABASE_URL"]
async fn test_deleted_holder_is_unknown_user() {
    let pool = pool().await;
    let ledger = Arc::new(QrTokenRepository::new(pool.clone()));
    let subject = insert_user(&pool, "tarde").await;

    let codec = Arc::new(PassCodec::from_secret(b"postgres-test-qr-secret"));
    let nonce = Uuid::new_v4();
    let issued_at = now();
    let token = codec.issue(subject, nonce, 60, issued_at).unwrap();
    ledger
        .register(&NewIssuedToken {
            nonce,
            subject_id: subject,
            issued_at,
            expires_at: issued_at + Duration::seconds(60),
        })
        .await
        .unwrap();

    // The identity layer may remove users who hold outstanding passes.
    sqlx::query("DELETE FROM users WHERE id = $1")
        .bind(subject)
        .execute(&pool)
        .await
        .expect("user with an issued pass can be deleted");

    let verification = VerificationService::new(
        codec,
        ledger,
        Arc::new(UserRepository::new(pool.clone())),
        Arc::new(AccessLogRepository::new(pool.clone())),
        ShiftClassifier::new(&ShiftConfig::default()).unwrap(),
        Arc::new(SystemClock),
    );

    let outcome = verification.verify(Some(token.as_str()), ClientInfo::default()).await;
    assert_eq!(
        outcome,
        VerificationOutcome::Rejected(RejectReason::UnknownUser)
    );
}
