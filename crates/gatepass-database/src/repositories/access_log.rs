//! Access event repository.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use gatepass_core::error::{AppError, ErrorKind};
use gatepass_core::result::AppResult;
use gatepass_entity::access::{AccessEvent, NewAccessEvent};

use crate::store::AccessLog;

/// Append-only repository over the `access_events` table.
#[derive(Debug, Clone)]
pub struct AccessLogRepository {
    pool: PgPool,
}

impl AccessLogRepository {
    /// Create a new access log repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Most recent events, newest first.
    pub async fn recent(&self, limit: i64) -> AppResult<Vec<AccessEvent>> {
        sqlx::query_as::<_, AccessEvent>(
            "SELECT * FROM access_events ORDER BY scanned_at DESC LIMIT $1",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list access events", e))
    }
}

#[async_trait]
impl AccessLog for AccessLogRepository {
    async fn append(&self, event: &NewAccessEvent) -> AppResult<AccessEvent> {
        sqlx::query_as::<_, AccessEvent>(
            "INSERT INTO access_events \
             (nonce, subject_id, username, first_name, last_name, role, national_id, shift, \
              within_shift, ip_address, user_agent, scanned_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12) RETURNING *",
        )
        .bind(event.nonce)
        .bind(event.subject_id)
        .bind(&event.username)
        .bind(&event.first_name)
        .bind(&event.last_name)
        .bind(event.role)
        .bind(&event.national_id)
        .bind(&event.shift)
        .bind(event.within_shift)
        .bind(&event.ip_address)
        .bind(&event.user_agent)
        .bind(event.scanned_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            let duplicate = e
                .as_database_error()
                .is_some_and(|db| db.is_unique_violation());
            if duplicate {
                AppError::conflict("An access event already exists for this pass")
            } else {
                AppError::with_source(ErrorKind::Database, "Failed to append access event", e)
            }
        })
    }

    async fn find_by_nonce(&self, nonce: Uuid) -> AppResult<Option<AccessEvent>> {
        sqlx::query_as::<_, AccessEvent>("SELECT * FROM access_events WHERE nonce = $1")
            .bind(nonce)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find access event", e))
    }
}
