//! In-Memory Outbox Store Adapter
//!
//! Holds outbox rows and the health summary behind a single mutex.
//! Useful for testing and local development without Postgres.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::foundation::{DomainError, OutboxEventId, Timestamp};
use crate::domain::outbox::{
    BacklogSnapshot, HealthUpdate, NewOutboxEvent, OutboxEvent, OutboxHealth, OutboxStatus,
};
use crate::ports::{OutboxHealthRepository, OutboxStore};

#[derive(Debug, Default)]
struct State {
    events: Vec<OutboxEvent>,
    health: Option<OutboxHealth>,
}

/// In-memory outbox with the same claim semantics as the Postgres adapter.
#[derive(Debug, Clone, Default)]
pub struct InMemoryOutboxStore {
    state: Arc<Mutex<State>>,
    max_attempts: Option<u32>,
}

impl InMemoryOutboxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parks events as `dead` once they reach `max_attempts` failures.
    pub fn with_max_attempts(mut self, max_attempts: Option<u32>) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Snapshot of every stored row, in insertion order.
    pub async fn events(&self) -> Vec<OutboxEvent> {
        self.state.lock().await.events.clone()
    }

    pub async fn get(&self, id: OutboxEventId) -> Option<OutboxEvent> {
        self.state
            .lock()
            .await
            .events
            .iter()
            .find(|e| e.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.events.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Inserts a fully-formed row (tests seed legacy or unknown rows this way).
    pub async fn insert(&self, event: OutboxEvent) {
        self.state.lock().await.events.push(event);
    }

    /// Makes every pending row due now, as if the backoff had elapsed.
    pub async fn make_all_due(&self) {
        let now = Timestamp::now();
        for event in self.state.lock().await.events.iter_mut() {
            if event.status == OutboxStatus::Pending {
                event.next_retry_at = now;
            }
        }
    }

    /// Backdates the claim on a processing row.
    pub async fn backdate_claim(&self, id: OutboxEventId, secs: u64) {
        let mut state = self.state.lock().await;
        if let Some(event) = state.events.iter_mut().find(|e| e.id == id) {
            event.locked_at = event.locked_at.map(|t| t.minus_secs(secs));
        }
    }
}

#[async_trait]
impl OutboxStore for InMemoryOutboxStore {
    async fn enqueue(&self, event: NewOutboxEvent) -> Result<OutboxEventId, DomainError> {
        let mut state = self.state.lock().await;
        let id = event.id;
        if state.events.iter().any(|e| e.id == id) {
            return Ok(id);
        }
        state.events.push(OutboxEvent::from_new(event, Timestamp::now()));
        Ok(id)
    }

    async fn claim_batch(&self, limit: u32) -> Result<Vec<OutboxEvent>, DomainError> {
        let now = Timestamp::now();
        let mut state = self.state.lock().await;

        let mut due: Vec<usize> = state
            .events
            .iter()
            .enumerate()
            .filter(|(_, e)| e.is_claimable(now))
            .map(|(i, _)| i)
            .collect();
        due.sort_by_key(|&i| state.events[i].created_at);
        due.truncate(limit as usize);

        let mut claimed = Vec::with_capacity(due.len());
        for i in due {
            let event = &mut state.events[i];
            event.claim(now);
            claimed.push(event.clone());
        }
        Ok(claimed)
    }

    async fn ack(&self, id: OutboxEventId) -> Result<(), DomainError> {
        self.state.lock().await.events.retain(|e| e.id != id);
        Ok(())
    }

    async fn nack(&self, id: OutboxEventId, attempts: u32, error: &str) -> Result<(), DomainError> {
        let mut state = self.state.lock().await;
        if let Some(event) = state.events.iter_mut().find(|e| e.id == id) {
            event.fail(attempts, error, Timestamp::now(), self.max_attempts);
        }
        Ok(())
    }

    async fn backlog_snapshot(&self) -> Result<BacklogSnapshot, DomainError> {
        let state = self.state.lock().await;
        let pending = state
            .events
            .iter()
            .filter(|e| e.status == OutboxStatus::Pending);

        let pending_count = pending.clone().count() as u64;
        let oldest_pending_at = pending.map(|e| e.created_at).min();
        let last_error = state
            .events
            .iter()
            .filter(|e| e.last_error.is_some())
            .max_by_key(|e| e.updated_at)
            .and_then(|e| e.last_error.clone());

        Ok(BacklogSnapshot {
            pending_count,
            oldest_pending_at,
            last_error,
        })
    }

    async fn reclaim_stale(&self, older_than: Duration) -> Result<u64, DomainError> {
        let now = Timestamp::now();
        let cutoff = now.minus_secs(older_than.as_secs());
        let mut reclaimed = 0;
        for event in self.state.lock().await.events.iter_mut() {
            let stale = event.status == OutboxStatus::Processing
                && event.locked_at.map_or(true, |at| !cutoff.is_before(&at));
            if stale {
                event.release(now);
                reclaimed += 1;
            }
        }
        Ok(reclaimed)
    }
}

#[async_trait]
impl OutboxHealthRepository for InMemoryOutboxStore {
    async fn load(&self) -> Result<Option<OutboxHealth>, DomainError> {
        Ok(self.state.lock().await.health.clone())
    }

    async fn save(&self, update: &HealthUpdate) -> Result<OutboxHealth, DomainError> {
        let mut state = self.state.lock().await;
        let next = OutboxHealth::apply(state.health.as_ref(), update);
        state.health = Some(next.clone());
        Ok(next)
    }
}
