//! Store traits the pass services are written against.
//!
//! Each trait has a PostgreSQL implementation in [`crate::repositories`]
//! and an in-memory implementation in [`crate::memory`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use gatepass_core::result::AppResult;
use gatepass_entity::access::{AccessEvent, NewAccessEvent};
use gatepass_entity::pass::{IssuedToken, NewIssuedToken};
use gatepass_entity::user::User;

/// Result of registering a nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The nonce was stored.
    Registered,
    /// A row with this nonce already exists; nothing was written.
    DuplicateNonce,
}

/// Result of an attempt to consume a nonce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumeOutcome {
    /// This call consumed the nonce.
    Consumed {
        /// Owner recorded at issuance.
        subject_id: Uuid,
        /// The instant written to `consumed_at`.
        consumed_at: DateTime<Utc>,
    },
    /// The nonce was consumed earlier.
    AlreadyConsumed,
    /// No such nonce was ever registered.
    Unknown,
    /// The nonce is unconsumed but past its expiry.
    Expired,
}

/// Durable record of issued nonces and their single-use state.
#[async_trait]
pub trait TokenLedger: Send + Sync + 'static {
    /// Insert a new nonce. Fails with a validation error if
    /// `expires_at <= issued_at`.
    async fn register(&self, token: &NewIssuedToken) -> AppResult<RegisterOutcome>;

    /// Atomically mark `nonce` consumed at `now` if it exists, is
    /// unconsumed, and `now < expires_at`.
    ///
    /// Among any number of concurrent callers for the same nonce at most
    /// one observes [`ConsumeOutcome::Consumed`]. When a nonce is both
    /// consumed and expired, [`ConsumeOutcome::AlreadyConsumed`] wins.
    async fn try_consume(&self, nonce: Uuid, now: DateTime<Utc>) -> AppResult<ConsumeOutcome>;

    /// Look up a ledger row.
    async fn find(&self, nonce: Uuid) -> AppResult<Option<IssuedToken>>;
}

/// Read access to the institution's user directory.
#[async_trait]
pub trait UserDirectory: Send + Sync + 'static {
    /// Find a user by ID.
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>>;

    /// Find a user by username.
    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>>;
}

/// Append-only gate access log.
#[async_trait]
pub trait AccessLog: Send + Sync + 'static {
    /// Append an event. Fails with a conflict error if an event for the
    /// same nonce already exists.
    async fn append(&self, event: &NewAccessEvent) -> AppResult<AccessEvent>;

    /// Find the event produced by `nonce`, if any.
    async fn find_by_nonce(&self, nonce: Uuid) -> AppResult<Option<AccessEvent>>;
}

/// Classify a failed consume from the row's current state.
pub(crate) fn classify_unconsumable(
    row: Option<(Option<DateTime<Utc>>, DateTime<Utc>)>,
    now: DateTime<Utc>,
) -> ConsumeOutcome {
    match row {
        None => ConsumeOutcome::Unknown,
        Some((Some(_), _)) => ConsumeOutcome::AlreadyConsumed,
        Some((None, expires_at)) if now >= expires_at => ConsumeOutcome::Expired,
        // Lost a race between the update and this read; the winner consumed it.
        Some((None, _)) => ConsumeOutcome::AlreadyConsumed,
    }
}
