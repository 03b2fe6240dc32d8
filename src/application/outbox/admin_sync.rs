//! AdminSync - fire-and-remember delivery used by CRUD code paths.
//!
//! Each call tries the admin system once. On any failure the payload goes
//! to the outbox under the matching event kind, carrying the error message,
//! and the call still returns normally. Nothing here ever returns an error:
//! a studio rename must succeed locally even when the admin system is down.

use std::sync::Arc;

use serde::Serialize;

use super::OutboxEventLog;
use crate::domain::outbox::{
    OutboxEventType, SyncClientPayload, SyncClientStatsPayload, SyncStudioOwnerPayload,
    SyncStudioPayload,
};
use crate::ports::AdminSyncClient;

/// What happened to one sync call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncOutcome {
    /// The admin system accepted the payload.
    Delivered,
    /// Delivery failed; the payload is in the outbox.
    Queued,
    /// Delivery failed and the outbox write failed too. Logged at error level.
    Dropped,
}

/// Sync facade, one method per event kind.
#[derive(Clone)]
pub struct AdminSync {
    client: Arc<dyn AdminSyncClient>,
    event_log: OutboxEventLog,
}

impl AdminSync {
    pub fn new(client: Arc<dyn AdminSyncClient>, event_log: OutboxEventLog) -> Self {
        Self { client, event_log }
    }

    pub async fn sync_studio(&self, payload: &SyncStudioPayload) -> SyncOutcome {
        self.deliver(OutboxEventType::StudioSync, payload).await
    }

    pub async fn sync_client(&self, payload: &SyncClientPayload) -> SyncOutcome {
        self.deliver(OutboxEventType::ClientSync, payload).await
    }

    /// Client deletion travels as `client.sync` with `deleted: true`.
    pub async fn delete_client(&self, studio_id: &str, client_id: &str) -> SyncOutcome {
        self.sync_client(&SyncClientPayload::deleted(studio_id, client_id))
            .await
    }

    pub async fn sync_client_stats(&self, payload: &SyncClientStatsPayload) -> SyncOutcome {
        self.deliver(OutboxEventType::ClientStats, payload).await
    }

    pub async fn sync_studio_owner(&self, payload: &SyncStudioOwnerPayload) -> SyncOutcome {
        self.deliver(OutboxEventType::StudioOwnerSync, payload).await
    }

    async fn deliver<P>(&self, event_type: OutboxEventType, payload: &P) -> SyncOutcome
    where
        P: Serialize + Sync,
    {
        let body = match serde_json::to_value(payload) {
            Ok(body) => body,
            Err(e) => {
                tracing::error!(event_type = %event_type, error = %e, "Admin sync payload not serializable");
                return SyncOutcome::Dropped;
            }
        };

        let error = match self.client.send(event_type.delivery_path(), &body).await {
            Ok(()) => return SyncOutcome::Delivered,
            Err(e) => e.to_string(),
        };

        match self
            .event_log
            .enqueue(event_type, body, Some(error.clone()))
            .await
        {
            Ok(event_id) => {
                tracing::warn!(
                    event_type = %event_type,
                    event_id = %event_id,
                    error = %error,
                    "Admin sync failed, queued for retry"
                );
                SyncOutcome::Queued
            }
            Err(e) => {
                tracing::error!(
                    event_type = %event_type,
                    error = %error,
                    enqueue_error = %e,
                    "Admin sync failed and could not be queued"
                );
                SyncOutcome::Dropped
            }
        }
    }
}
