//! In-memory store implementation using dashmap.
//!
//! Implements every store trait with the same atomicity guarantees as the
//! PostgreSQL repositories, scoped to a single process. Used by tests and
//! by `database.backend = "memory"` development runs.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;
use uuid::Uuid;

use gatepass_core::config::SeedUser;
use gatepass_core::error::AppError;
use gatepass_core::result::AppResult;
use gatepass_entity::access::{AccessEvent, NewAccessEvent};
use gatepass_entity::pass::{IssuedToken, NewIssuedToken};
use gatepass_entity::user::{User, UserRole};

use crate::store::{AccessLog, ConsumeOutcome, RegisterOutcome, TokenLedger, UserDirectory};

/// Process-local ledger, user directory, and access log.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    tokens: Arc<DashMap<Uuid, IssuedToken>>,
    users: Arc<DashMap<Uuid, User>>,
    /// Keyed by nonce, which enforces one event per pass.
    events: Arc<DashMap<Uuid, AccessEvent>>,
}

impl MemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose user directory holds `seeds`.
    pub fn with_seed_users(seeds: &[SeedUser], now: DateTime<Utc>) -> AppResult<Self> {
        let store = Self::new();
        for seed in seeds {
            let role: UserRole = seed.role.parse().map_err(|e: String| {
                AppError::configuration(format!("dev_users '{}': {e}", seed.username))
            })?;
            store.upsert_user(User {
                id: seed.id,
                username: seed.username.clone(),
                first_name: seed.first_name.clone(),
                last_name: seed.last_name.clone(),
                national_id: seed.national_id.clone(),
                role,
                shift: seed.shift.clone(),
                created_at: now,
                updated_at: now,
            });
        }
        Ok(store)
    }

    /// Insert or replace a user.
    pub fn upsert_user(&self, user: User) {
        self.users.insert(user.id, user);
    }

    /// Remove a user, returning it if present.
    pub fn remove_user(&self, id: Uuid) -> Option<User> {
        self.users.remove(&id).map(|(_, user)| user)
    }

    /// All recorded access events, oldest first.
    pub fn events(&self) -> Vec<AccessEvent> {
        let mut events: Vec<AccessEvent> = self.events.iter().map(|e| e.value().clone()).collect();
        events.sort_by_key(|e| e.scanned_at);
        events
    }

    /// Number of registered nonces.
    pub fn token_count(&self) -> usize {
        self.tokens.len()
    }
}

#[async_trait]
impl TokenLedger for MemoryStore {
    async fn register(&self, token: &NewIssuedToken) -> AppResult<RegisterOutcome> {
        if token.expires_at <= token.issued_at {
            return Err(AppError::validation("Pass must expire after it is issued"));
        }

        match self.tokens.entry(token.nonce) {
            Entry::Occupied(_) => Ok(RegisterOutcome::DuplicateNonce),
            Entry::Vacant(slot) => {
                slot.insert(token.clone().into());
                Ok(RegisterOutcome::Registered)
            }
        }
    }

    async fn try_consume(&self, nonce: Uuid, now: DateTime<Utc>) -> AppResult<ConsumeOutcome> {
        // The shard write lock held by `get_mut` makes check-and-set atomic.
        let Some(mut row) = self.tokens.get_mut(&nonce) else {
            return Ok(ConsumeOutcome::Unknown);
        };

        if row.consumed_at.is_some() {
            return Ok(ConsumeOutcome::AlreadyConsumed);
        }
        if row.is_expired_at(now) {
            return Ok(ConsumeOutcome::Expired);
        }

        row.consumed_at = Some(now);
        debug!(%nonce, "Pass consumed");
        Ok(ConsumeOutcome::Consumed {
            subject_id: row.subject_id,
            consumed_at: now,
        })
    }

    async fn find(&self, nonce: Uuid) -> AppResult<Option<IssuedToken>> {
        Ok(self.tokens.get(&nonce).map(|row| row.value().clone()))
    }
}

#[async_trait]
impl UserDirectory for MemoryStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.users.get(&id).map(|u| u.value().clone()))
    }

    async fn find_by_username(&self, username: &str) -> AppResult<Option<User>> {
        Ok(self
            .users
            .iter()
            .find(|u| u.username == username)
            .map(|u| u.value().clone()))
    }
}

#[async_trait]
impl AccessLog for MemoryStore {
    async fn append(&self, event: &NewAccessEvent) -> AppResult<AccessEvent> {
        match self.events.entry(event.nonce) {
            Entry::Occupied(_) => Err(AppError::conflict(
                "An access event already exists for this pass",
            )),
            Entry::Vacant(slot) => {
                let row = event.clone().into_event(Uuid::new_v4());
                slot.insert(row.clone());
                Ok(row)
            }
        }
    }

    async fn find_by_nonce(&self, nonce: Uuid) -> AppResult<Option<AccessEvent>> {
        Ok(self.events.get(&nonce).map(|e| e.value().clone()))
    }
}
