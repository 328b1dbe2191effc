//! QR token ledger repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use gatepass_core::error::{AppError, ErrorKind};
use gatepass_core::result::AppResult;
use gatepass_entity::pass::{IssuedToken, NewIssuedToken};

use crate::store::{ConsumeOutcome, RegisterOutcome, TokenLedger, classify_unconsumable};

/// PostgreSQL-backed [`TokenLedger`] over the `qr_tokens` table.
#[derive(Debug, Clone)]
pub struct QrTokenRepository {
    pool: PgPool,
}

impl QrTokenRepository {
    /// Create a new ledger repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Count passes issued to a subject that are still unconsumed and unexpired.
    pub async fn count_live_by_subject(
        &self,
        subject_id: Uuid,
        now: DateTime<Utc>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM qr_tokens \
             WHERE subject_id = $1 AND consumed_at IS NULL AND expires_at > $2",
        )
        .bind(subject_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count live passes", e))
    }
}

#[async_trait]
impl TokenLedger for QrTokenRepository {
    async fn register(&self, token: &NewIssuedToken) -> AppResult<RegisterOutcome> {
        if token.expires_at <= token.issued_at {
            return Err(AppError::validation("Pass must expire after it is issued"));
        }

        let result = sqlx::query(
            "INSERT INTO qr_tokens (nonce, subject_id, issued_at, expires_at) \
             VALUES ($1, $2, $3, $4) ON CONFLICT (nonce) DO NOTHING",
        )
        .bind(token.nonce)
        .bind(token.subject_id)
        .bind(token.issued_at)
        .bind(token.expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to register pass", e))?;

        if result.rows_affected() == 0 {
            Ok(RegisterOutcome::DuplicateNonce)
        } else {
            Ok(RegisterOutcome::Registered)
        }
    }

    async fn try_consume(&self, nonce: Uuid, now: DateTime<Utc>) -> AppResult<ConsumeOutcome> {
        // Single conditional update: the row lock taken by UPDATE serializes
        // concurrent scans, and only one of them can see consumed_at IS NULL.
        let consumed: Option<(Uuid, DateTime<Utc>)> = sqlx::query_as(
            "UPDATE qr_tokens SET consumed_at = $2 \
             WHERE nonce = $1 AND consumed_at IS NULL AND expires_at > $2 \
             RETURNING subject_id, consumed_at",
        )
        .bind(nonce)
        .bind(now)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to consume pass", e))?;

        if let Some((subject_id, consumed_at)) = consumed {
            return Ok(ConsumeOutcome::Consumed {
                subject_id,
                consumed_at,
            });
        }

        let row: Option<(Option<DateTime<Utc>>, DateTime<Utc>)> =
            sqlx::query_as("SELECT consumed_at, expires_at FROM qr_tokens WHERE nonce = $1")
                .bind(nonce)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to read pass state", e)
                })?;

        Ok(classify_unconsumable(row, now))
    }

    async fn find(&self, nonce: Uuid) -> AppResult<Option<IssuedToken>> {
        sqlx::query_as::<_, IssuedToken>(
            "SELECT nonce, subject_id, issued_at, expires_at, consumed_at \
             FROM qr_tokens WHERE nonce = $1",
        )
        .bind(nonce)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find pass", e))
    }
}
