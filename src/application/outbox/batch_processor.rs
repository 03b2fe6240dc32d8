//! BatchProcessor - claims outbox rows and delivers them.
//!
//! ## Entry points
//!
//! | Method | Used by | Health refresh |
//! |--------|---------|----------------|
//! | `process_once` | flush middleware, background worker | after every call |
//! | `drain_until_empty` | `process-outbox` binary | once at the end |
//! | `drain_detached` | admin endpoints | once at the end |
//!
//! `drain_detached` runs the drain on its own task. Dropping the returned
//! future (a request timeout, a client disconnect) does not stop it, so
//! every claimed row is still acked or nacked.
//!
//! Both are safe to call concurrently from any number of tasks or
//! processes; claim exclusivity comes from the store.
//!
//! A drain terminates even when every delivery fails: a nack'd row's
//! `next_retry_at` lies in the future, so the next claim skips it.

use std::ops::AddAssign;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use super::HealthMonitor;
use crate::domain::foundation::{DomainError, ErrorCode};
use crate::domain::outbox::{normalize_payload, OutboxEvent};
use crate::ports::{AdminSyncClient, OutboxStore};

/// Delivered and failed counts for one or more batches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchResult {
    pub processed: u32,
    pub failed: u32,
}

impl BatchResult {
    pub fn is_empty(&self) -> bool {
        self.processed == 0 && self.failed == 0
    }
}

impl AddAssign for BatchResult {
    fn add_assign(&mut self, other: Self) {
        self.processed += other.processed;
        self.failed += other.failed;
    }
}

/// Configuration for the BatchProcessor.
#[derive(Debug, Clone)]
pub struct BatchProcessorConfig {
    /// Claims older than this return to `pending` before each run.
    /// `None` disables the reclaim.
    pub stale_claim_after: Option<Duration>,
}

impl Default for BatchProcessorConfig {
    fn default() -> Self {
        Self {
            stale_claim_after: Some(Duration::from_secs(600)),
        }
    }
}

impl BatchProcessorConfig {
    pub fn with_stale_claim_after(mut self, after: Option<Duration>) -> Self {
        self.stale_claim_after = after;
        self
    }
}

/// Delivers claimed outbox rows through the admin sync client.
#[derive(Clone)]
pub struct BatchProcessor {
    store: Arc<dyn OutboxStore>,
    client: Arc<dyn AdminSyncClient>,
    health: HealthMonitor,
    config: BatchProcessorConfig,
}

impl BatchProcessor {
    pub fn new(
        store: Arc<dyn OutboxStore>,
        client: Arc<dyn AdminSyncClient>,
        health: HealthMonitor,
    ) -> Self {
        Self::with_config(store, client, health, BatchProcessorConfig::default())
    }

    pub fn with_config(
        store: Arc<dyn OutboxStore>,
        client: Arc<dyn AdminSyncClient>,
        health: HealthMonitor,
        config: BatchProcessorConfig,
    ) -> Self {
        Self {
            store,
            client,
            health,
            config,
        }
    }

    pub fn health(&self) -> &HealthMonitor {
        &self.health
    }

    /// Claims and handles one batch of at most `limit` rows, then refreshes
    /// health (also when nothing was claimed).
    pub async fn process_once(&self, limit: u32) -> Result<BatchResult, DomainError> {
        self.reclaim_stale().await?;

        let batch = self.store.claim_batch(limit).await?;
        let result = self.handle_batch(batch).await?;

        self.health.refresh(None).await?;
        Ok(result)
    }

    /// Repeats claim-and-handle until a claim comes back empty.
    pub async fn drain_until_empty(&self, limit: u32) -> Result<BatchResult, DomainError> {
        self.reclaim_stale().await?;

        let mut total = BatchResult::default();
        loop {
            let batch = self.store.claim_batch(limit).await?;
            if batch.is_empty() {
                break;
            }
            total += self.handle_batch(batch).await?;
        }

        self.health.refresh(None).await?;
        Ok(total)
    }

    /// `drain_until_empty` on a spawned task; cancelling the caller leaves
    /// the drain running to completion.
    pub async fn drain_detached(&self, limit: u32) -> Result<BatchResult, DomainError> {
        let processor = self.clone();
        tokio::spawn(async move { processor.drain_until_empty(limit).await })
            .await
            .map_err(|e| {
                DomainError::new(ErrorCode::InternalError, format!("Outbox drain task failed: {}", e))
            })?
    }

    async fn reclaim_stale(&self) -> Result<(), DomainError> {
        let Some(after) = self.config.stale_claim_after else {
            return Ok(());
        };
        let reclaimed = self.store.reclaim_stale(after).await?;
        if reclaimed > 0 {
            tracing::warn!(reclaimed, stale_after_secs = after.as_secs(), "Reclaimed stale outbox claims");
        }
        Ok(())
    }

    async fn handle_batch(&self, batch: Vec<OutboxEvent>) -> Result<BatchResult, DomainError> {
        let mut result = BatchResult::default();

        for event in batch {
            let Some(kind) = event.known_type() else {
                let message = format!("Unknown event type: {}", event.event_type);
                tracing::warn!(
                    event_id = %event.id,
                    event_type = %event.event_type,
                    attempts = event.attempts,
                    "Outbox event has unknown type"
                );
                self.store.nack(event.id, event.attempts, &message).await?;
                result.failed += 1;
                continue;
            };

            let payload = normalize_payload(&event.payload);
            match self.client.send(kind.delivery_path(), &payload).await {
                Ok(()) => {
                    self.store.ack(event.id).await?;
                    tracing::debug!(event_id = %event.id, event_type = %kind, "Outbox event delivered");
                    result.processed += 1;
                }
                Err(e) => {
                    let message = e.to_string();
                    tracing::warn!(
                        event_id = %event.id,
                        event_type = %kind,
                        attempts = event.attempts,
                        error = %message,
                        "Outbox delivery failed"
                    );
                    self.store.nack(event.id, event.attempts, &message).await?;
                    result.failed += 1;
                }
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::admin_sync::MockAdminSyncClient;
    use crate::adapters::storage::InMemoryOutboxStore;
    use crate::domain::foundation::{OutboxEventId, Timestamp};
    use crate::domain::outbox::{HealthStatus, NewOutboxEvent, OutboxStatus};
    use crate::ports::{AdminSyncError, OutboxHealthRepository};
    use serde_json::{json, Value};

    fn processor(store: &InMemoryOutboxStore, admin: &MockAdminSyncClient) -> BatchProcessor {
        let health = HealthMonitor::new(Arc::new(store.clone()), Arc::new(store.clone()));
        BatchProcessor::new(Arc::new(store.clone()), Arc::new(admin.clone()), health)
    }

    async fn enqueue(store: &InMemoryOutboxStore, kind: &str, payload: Value) -> OutboxEventId {
        store
            .enqueue(NewOutboxEvent::with_raw_type(kind, payload, None))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn process_once_delivers_and_deletes() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        let payload = json!({"studioId": "S1", "clientId": "C1", "deltaCount": 1, "deltaBytes": 2048});
        enqueue(&store, "client.stats", payload.clone()).await;

        let result = processor(&store, &admin).process_once(25).await.unwrap();

        assert_eq!(result, BatchResult { processed: 1, failed: 0 });
        assert!(store.is_empty().await);
        let calls = admin.calls_to("/clients/stats");
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].payload, payload);
    }

    #[tokio::test]
    async fn unknown_type_is_nacked_without_sending() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        let id = enqueue(&store, "unknown.kind", json!({})).await;

        let result = processor(&store, &admin).process_once(25).await.unwrap();

        assert_eq!(result, BatchResult { processed: 0, failed: 1 });
        assert_eq!(admin.call_count(), 0);
        let row = store.get(id).await.unwrap();
        assert_eq!(row.status, OutboxStatus::Pending);
        assert_eq!(row.attempts, 1);
        assert!(row.last_error.unwrap().contains("unknown.kind"));
    }

    #[tokio::test]
    async fn string_payload_is_parsed_and_garbage_becomes_empty_object() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        enqueue(&store, "studio.sync", Value::String(r#"{"id":"st_1"}"#.into())).await;
        tokio::time::sleep(Duration::from_millis(2)).await;
        enqueue(&store, "studio.sync", Value::String("{not json".into())).await;

        let result = processor(&store, &admin).process_once(25).await.unwrap();

        assert_eq!(result.processed, 2);
        let calls = admin.calls();
        assert_eq!(calls[0].payload, json!({"id": "st_1"}));
        assert_eq!(calls[1].payload, json!({}));
    }

    #[tokio::test]
    async fn failed_delivery_reschedules_with_first_backoff_step() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        admin.fail_with(AdminSyncError::rejected(503, "down"));
        let id = enqueue(&store, "client.sync", json!({})).await;

        let before = Timestamp::now();
        let result = processor(&store, &admin).process_once(25).await.unwrap();

        assert_eq!(result.failed, 1);
        let row = store.get(id).await.unwrap();
        assert_eq!(row.attempts, 1);
        assert_eq!(row.last_error.as_deref(), Some("Admin sync failed (503): down"));
        let delay = row.next_retry_at.duration_since(&before).num_seconds();
        assert!((15..=16).contains(&delay), "delay was {}", delay);
    }

    #[tokio::test]
    async fn process_once_respects_limit_and_refreshes_health() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        for n in 0..3 {
            enqueue(&store, "studio.sync", json!({ "n": n })).await;
        }
        let processor = processor(&store, &admin);

        let result = processor.process_once(2).await.unwrap();
        assert_eq!(result.processed, 2);
        let health = store.load().await.unwrap().unwrap();
        assert_eq!(health.pending_count, 1);
        assert_eq!(health.status, HealthStatus::Degraded);

        processor.process_once(2).await.unwrap();
        let health = store.load().await.unwrap().unwrap();
        assert_eq!(health.status, HealthStatus::Healthy);
    }

    #[tokio::test]
    async fn empty_process_once_still_refreshes_health() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();

        let result = processor(&store, &admin).process_once(5).await.unwrap();

        assert!(result.is_empty());
        assert!(store.load().await.unwrap().is_some());
    }

    #[tokio::test]
    async fn drain_terminates_when_everything_fails() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        admin.fail_with(AdminSyncError::rejected(500, "nope"));
        enqueue(&store, "client.sync", json!({"clientId": "C1"})).await;
        enqueue(&store, "client.sync", json!({"clientId": "C1"})).await;

        let result = processor(&store, &admin).drain_until_empty(1).await.unwrap();

        assert_eq!(result, BatchResult { processed: 0, failed: 2 });
        assert_eq!(admin.call_count(), 2);
        for row in store.events().await {
            assert_eq!(row.attempts, 1);
            assert_eq!(row.status, OutboxStatus::Pending);
        }
    }

    #[tokio::test]
    async fn drain_aggregates_across_batches() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        for n in 0..7 {
            enqueue(&store, "studio.sync", json!({ "n": n })).await;
        }

        let result = processor(&store, &admin).drain_until_empty(3).await.unwrap();

        assert_eq!(result.processed, 7);
        assert!(store.is_empty().await);
        assert_eq!(
            store.load().await.unwrap().unwrap().status,
            HealthStatus::Healthy
        );
    }

    async fn wait_until_no_claims(store: &InMemoryOutboxStore) {
        for _ in 0..300 {
            let claimed = store
                .events()
                .await
                .iter()
                .any(|e| e.status == OutboxStatus::Processing);
            if !claimed {
                return;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("rows still claimed");
    }

    #[tokio::test]
    async fn detached_drain_matches_inline_drain() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        for n in 0..4 {
            enqueue(&store, "studio.sync", json!({ "n": n })).await;
        }

        let result = processor(&store, &admin).drain_detached(3).await.unwrap();

        assert_eq!(result.processed, 4);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn cancelled_drain_still_settles_every_claimed_row() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        admin.fail_with(AdminSyncError::rejected(503, "down"));
        admin.with_delay(Duration::from_millis(200));
        for n in 0..5 {
            enqueue(&store, "studio.sync", json!({ "n": n })).await;
        }
        let processor = processor(&store, &admin);

        let cut_short =
            tokio::time::timeout(Duration::from_millis(100), processor.drain_detached(25)).await;
        assert!(cut_short.is_err());

        wait_until_no_claims(&store).await;
        for row in store.events().await {
            assert_eq!(row.status, OutboxStatus::Pending);
            assert_eq!(row.attempts, 1);
        }
        let health = processor.health().refresh(None).await.unwrap();
        assert_eq!(health.status, HealthStatus::Degraded);
        assert_eq!(health.pending_count, 5);
    }

    #[tokio::test]
    async fn stale_claims_are_reclaimed_before_processing() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        let id = enqueue(&store, "studio.sync", json!({})).await;
        store.claim_batch(1).await.unwrap();
        store.backdate_claim(id, 3600).await;

        let result = processor(&store, &admin).process_once(5).await.unwrap();

        assert_eq!(result.processed, 1);
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn reclaim_can_be_disabled() {
        let store = InMemoryOutboxStore::new();
        let admin = MockAdminSyncClient::new();
        let id = enqueue(&store, "studio.sync", json!({})).await;
        store.claim_batch(1).await.unwrap();
        store.backdate_claim(id, 3600).await;

        let health = HealthMonitor::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let processor = BatchProcessor::with_config(
            Arc::new(store.clone()),
            Arc::new(admin.clone()),
            health,
            BatchProcessorConfig::default().with_stale_claim_after(None),
        );

        assert!(processor.process_once(5).await.unwrap().is_empty());
        assert_eq!(store.get(id).await.unwrap().status, OutboxStatus::Processing);
    }
}
