//! OutboxStore port - durable log of events awaiting delivery.
//!
//! Every other outbox component works through this narrow interface:
//! enqueue, claim, ack, nack.
//!
//! ## Claim contract
//!
//! `claim_batch` must be safe under uncoordinated concurrent callers
//! (request-triggered flushes, cron drains, other processes). Two claimers
//! never receive the same row: the Postgres adapter uses
//! `FOR UPDATE SKIP LOCKED` inside a single `UPDATE ... RETURNING`.
//!
//! ```text
//! enqueue ──> pending ──claim──> processing ──ack──> (deleted)
//!                ^                    │
//!                └──────nack──────────┘   next_retry_at = now + backoff
//! ```

use std::time::Duration;

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, OutboxEventId};
use crate::domain::outbox::{BacklogSnapshot, NewOutboxEvent, OutboxEvent};

/// Port for the outbox event log.
#[async_trait]
pub trait OutboxStore: Send + Sync {
    /// Inserts a pending event with `attempts = 0`, due immediately.
    ///
    /// Idempotent on the generated id only; logically equal events are
    /// stored twice.
    async fn enqueue(&self, event: NewOutboxEvent) -> Result<OutboxEventId, DomainError>;

    /// Atomically claims up to `limit` due events, oldest `created_at` first.
    ///
    /// Claimed rows move to `processing` with `locked_at = now`. Returns an
    /// empty vector when nothing is eligible.
    async fn claim_batch(&self, limit: u32) -> Result<Vec<OutboxEvent>, DomainError>;

    /// Deletes a delivered event. A missing row is not an error.
    async fn ack(&self, id: OutboxEventId) -> Result<(), DomainError>;

    /// Returns a claimed event to `pending` after a failed attempt.
    ///
    /// The stored count goes up by one. `attempts` is the value seen at
    /// claim time; the next retry is scheduled with the backoff for
    /// `attempts + 1`.
    async fn nack(&self, id: OutboxEventId, attempts: u32, error: &str) -> Result<(), DomainError>;

    /// Pending count, oldest pending timestamp and most recent error.
    async fn backlog_snapshot(&self) -> Result<BacklogSnapshot, DomainError>;

    /// Releases `processing` rows whose claim is older than `older_than`.
    ///
    /// Returns how many rows went back to `pending`.
    async fn reclaim_stale(&self, older_than: Duration) -> Result<u64, DomainError>;
}
