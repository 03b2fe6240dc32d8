//! OutboxEventLog - enqueue side of the outbox.

use std::sync::Arc;

use serde_json::Value;

use super::HealthMonitor;
use crate::domain::foundation::{DomainError, OutboxEventId};
use crate::domain::outbox::{HealthStatus, NewOutboxEvent, OutboxEventType};
use crate::ports::OutboxStore;

/// Writes events and immediately marks the outbox degraded.
#[derive(Clone)]
pub struct OutboxEventLog {
    store: Arc<dyn OutboxStore>,
    health: HealthMonitor,
}

impl OutboxEventLog {
    pub fn new(store: Arc<dyn OutboxStore>, health: HealthMonitor) -> Self {
        Self { store, health }
    }

    /// Stores a pending event due now.
    ///
    /// The row is durable once this returns `Ok`. A failure to refresh the
    /// health summary afterwards is logged, not returned.
    pub async fn enqueue(
        &self,
        event_type: OutboxEventType,
        payload: Value,
        last_error: Option<String>,
    ) -> Result<OutboxEventId, DomainError> {
        let id = self
            .store
            .enqueue(NewOutboxEvent::new(event_type, payload, last_error))
            .await?;

        tracing::debug!(event_id = %id, event_type = %event_type, "Outbox event enqueued");

        if let Err(e) = self.health.refresh(Some(HealthStatus::Degraded)).await {
            tracing::warn!(event_id = %id, error = %e, "Failed to mark outbox degraded");
        }

        Ok(id)
    }
}
