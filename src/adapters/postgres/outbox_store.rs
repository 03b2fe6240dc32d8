//! PostgreSQL implementation of OutboxStore and OutboxHealthRepository.
//!
//! Rows live in `sync_outbox`; the health summary is the singleton row
//! `id = 1` of `sync_outbox_status`.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, OutboxEventId, Timestamp};
use crate::domain::outbox::{
    backoff_secs, BacklogSnapshot, HealthStatus, HealthUpdate, NewOutboxEvent, OutboxEvent, OutboxHealth,
    OutboxStatus,
};
use crate::ports::{OutboxHealthRepository, OutboxStore};

/// PostgreSQL implementation of the outbox ports.
///
/// Claims use `FOR UPDATE SKIP LOCKED` so any number of processes can
/// drain the same table.
#[derive(Clone)]
pub struct PostgresOutboxStore {
    pool: PgPool,
    max_attempts: Option<u32>,
}

impl PostgresOutboxStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            max_attempts: None,
        }
    }

    /// Parks events as `dead` once they reach `max_attempts` failures.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }
}

/// Database row representation of an outbox event.
#[derive(Debug, sqlx::FromRow)]
struct OutboxRow {
    id: Uuid,
    event_type: String,
    payload: Value,
    status: String,
    attempts: i32,
    last_error: Option<String>,
    next_retry_at: DateTime<Utc>,
    locked_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OutboxRow> for OutboxEvent {
    type Error = DomainError;

    fn try_from(row: OutboxRow) -> Result<Self, Self::Error> {
        let status: OutboxStatus = row.status.parse().map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStatus,
                format!("Invalid outbox status value: {}", row.status),
            )
        })?;

        Ok(OutboxEvent {
            id: OutboxEventId::from_uuid(row.id),
            event_type: row.event_type,
            payload: row.payload,
            status,
            attempts: u32::try_from(row.attempts).unwrap_or(0),
            last_error: row.last_error,
            next_retry_at: Timestamp::from_datetime(row.next_retry_at),
            locked_at: row.locked_at.map(Timestamp::from_datetime),
            created_at: Timestamp::from_datetime(row.created_at),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

/// Database row representation of the health summary.
#[derive(Debug, sqlx::FromRow)]
struct StatusRow {
    status: String,
    pending_count: i32,
    oldest_pending_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
    last_degraded_at: Option<DateTime<Utc>>,
    last_recovered_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<StatusRow> for OutboxHealth {
    type Error = DomainError;

    fn try_from(row: StatusRow) -> Result<Self, Self::Error> {
        let status: HealthStatus = row.status.parse().map_err(|_| {
            DomainError::new(
                ErrorCode::InvalidStatus,
                format!("Invalid outbox health value: {}", row.status),
            )
        })?;

        Ok(OutboxHealth {
            status,
            pending_count: u64::try_from(row.pending_count).unwrap_or(0),
            oldest_pending_at: row.oldest_pending_at.map(Timestamp::from_datetime),
            last_error: row.last_error,
            last_degraded_at: row.last_degraded_at.map(Timestamp::from_datetime),
            last_recovered_at: row.last_recovered_at.map(Timestamp::from_datetime),
            updated_at: Timestamp::from_datetime(row.updated_at),
        })
    }
}

const EVENT_COLUMNS: &str = "id, event_type, payload, status, attempts, last_error, \
                             next_retry_at, locked_at, created_at, updated_at";

#[async_trait]
impl OutboxStore for PostgresOutboxStore {
    async fn enqueue(&self, event: NewOutboxEvent) -> Result<OutboxEventId, DomainError> {
        sqlx::query(
            r#"
            INSERT INTO sync_outbox (id, event_type, payload, attempts, last_error, next_retry_at)
            VALUES ($1, $2, $3, 0, $4, NOW())
            ON CONFLICT (id) DO NOTHING
            "#,
        )
        .bind(event.id.as_uuid())
        .bind(&event.event_type)
        .bind(&event.payload)
        .bind(&event.last_error)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to enqueue outbox event", e))?;

        Ok(event.id)
    }

    async fn claim_batch(&self, limit: u32) -> Result<Vec<OutboxEvent>, DomainError> {
        let sql = format!(
            r#"
            WITH cte AS (
                SELECT id
                FROM sync_outbox
                WHERE status = 'pending' AND next_retry_at <= NOW()
                ORDER BY created_at ASC
                LIMIT $1
                FOR UPDATE SKIP LOCKED
            )
            UPDATE sync_outbox
            SET status = 'processing', locked_at = NOW(), updated_at = NOW()
            WHERE id IN (SELECT id FROM cte)
            RETURNING {EVENT_COLUMNS}
            "#
        );

        let mut rows: Vec<OutboxRow> = sqlx::query_as(&sql)
            .bind(i64::from(limit))
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to claim outbox batch", e))?;

        // RETURNING does not preserve the CTE ordering.
        rows.sort_by_key(|row| row.created_at);
        rows.into_iter().map(OutboxEvent::try_from).collect()
    }

    async fn ack(&self, id: OutboxEventId) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM sync_outbox WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| DomainError::database("Failed to ack outbox event", e))?;
        Ok(())
    }

    async fn nack(&self, id: OutboxEventId, attempts: u32, error: &str) -> Result<(), DomainError> {
        let retry_in = backoff_secs(attempts.saturating_add(1));
        let cap = self.max_attempts.map(|n| i32::try_from(n).unwrap_or(i32::MAX));

        sqlx::query(
            r#"
            UPDATE sync_outbox
            SET status = CASE
                    WHEN $4::int IS NOT NULL AND attempts + 1 >= $4::int THEN 'dead'
                    ELSE 'pending'
                END,
                attempts = attempts + 1,
                last_error = $2,
                next_retry_at = NOW() + make_interval(secs => $3::double precision),
                locked_at = NULL,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .bind(error)
        .bind(retry_in as f64)
        .bind(cap)
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to nack outbox event", e))?;

        Ok(())
    }

    async fn backlog_snapshot(&self) -> Result<BacklogSnapshot, DomainError> {
        let (pending_count, oldest_pending_at): (i64, Option<DateTime<Utc>>) = sqlx::query_as(
            r#"
            SELECT COUNT(*)::bigint, MIN(created_at)
            FROM sync_outbox
            WHERE status = 'pending'
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to count pending outbox events", e))?;

        let last_error: Option<String> = sqlx::query_scalar(
            r#"
            SELECT last_error
            FROM sync_outbox
            WHERE last_error IS NOT NULL
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to read latest outbox error", e))?;

        Ok(BacklogSnapshot {
            pending_count: u64::try_from(pending_count).unwrap_or(0),
            oldest_pending_at: oldest_pending_at.map(Timestamp::from_datetime),
            last_error,
        })
    }

    async fn reclaim_stale(&self, older_than: Duration) -> Result<u64, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE sync_outbox
            SET status = 'pending', locked_at = NULL, updated_at = NOW()
            WHERE status = 'processing'
              AND (locked_at IS NULL OR locked_at <= NOW() - make_interval(secs => $1::double precision))
            "#,
        )
        .bind(older_than.as_secs_f64())
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to reclaim stale outbox claims", e))?;

        Ok(result.rows_affected())
    }
}

#[async_trait]
impl OutboxHealthRepository for PostgresOutboxStore {
    async fn load(&self) -> Result<Option<OutboxHealth>, DomainError> {
        let row: Option<StatusRow> = sqlx::query_as(
            r#"
            SELECT status, pending_count, oldest_pending_at, last_error,
                   last_degraded_at, last_recovered_at, updated_at
            FROM sync_outbox_status
            WHERE id = 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to load outbox status", e))?;

        row.map(OutboxHealth::try_from).transpose()
    }

    async fn save(&self, update: &HealthUpdate) -> Result<OutboxHealth, DomainError> {
        let row: StatusRow = sqlx::query_as(
            r#"
            INSERT INTO sync_outbox_status
                (id, status, pending_count, oldest_pending_at, last_error,
                 last_degraded_at, last_recovered_at, updated_at)
            VALUES (1, $1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO UPDATE SET
                status = EXCLUDED.status,
                pending_count = EXCLUDED.pending_count,
                oldest_pending_at = EXCLUDED.oldest_pending_at,
                last_error = EXCLUDED.last_error,
                last_degraded_at = COALESCE(EXCLUDED.last_degraded_at, sync_outbox_status.last_degraded_at),
                last_recovered_at = COALESCE(EXCLUDED.last_recovered_at, sync_outbox_status.last_recovered_at),
                updated_at = EXCLUDED.updated_at
            RETURNING status, pending_count, oldest_pending_at, last_error,
                      last_degraded_at, last_recovered_at, updated_at
            "#,
        )
        .bind(update.status.as_str())
        .bind(i32::try_from(update.pending_count).unwrap_or(i32::MAX))
        .bind(update.oldest_pending_at.map(|t| *t.as_datetime()))
        .bind(&update.last_error)
        .bind(update.degraded_at.map(|t| *t.as_datetime()))
        .bind(update.recovered_at.map(|t| *t.as_datetime()))
        .bind(update.at.as_datetime())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| DomainError::database("Failed to save outbox status", e))?;

        OutboxHealth::try_from(row)
    }
}
