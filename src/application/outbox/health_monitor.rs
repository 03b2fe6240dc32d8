//! HealthMonitor - recomputes and persists the outbox health summary.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, Timestamp};
use crate::domain::outbox::{HealthStatus, HealthUpdate, OutboxHealth};
use crate::ports::{OutboxHealthRepository, OutboxStore};

/// Derives the singleton health summary from the backlog.
#[derive(Clone)]
pub struct HealthMonitor {
    store: Arc<dyn OutboxStore>,
    repository: Arc<dyn OutboxHealthRepository>,
}

impl HealthMonitor {
    pub fn new(store: Arc<dyn OutboxStore>, repository: Arc<dyn OutboxHealthRepository>) -> Self {
        Self { store, repository }
    }

    /// Recomputes the summary and persists it.
    ///
    /// `override_status` replaces the status derived from `pending_count`
    /// (enqueue forces `Degraded`). Transition stamps are only set when the
    /// status actually changes.
    pub async fn refresh(
        &self,
        override_status: Option<HealthStatus>,
    ) -> Result<OutboxHealth, DomainError> {
        let snapshot = self.store.backlog_snapshot().await?;
        let previous = self.repository.load().await?.map(|h| h.status);
        let update = HealthUpdate::derive(previous, snapshot, override_status, Timestamp::now());

        let saved = self.repository.save(&update).await?;

        if update.degraded_at.is_some() {
            tracing::warn!(
                pending_count = saved.pending_count,
                last_error = saved.last_error.as_deref().unwrap_or(""),
                "Outbox degraded"
            );
        } else if update.recovered_at.is_some() {
            tracing::info!("Outbox recovered");
        }

        Ok(saved)
    }

    /// The persisted summary, computed once if it was never written.
    pub async fn status(&self) -> Result<OutboxHealth, DomainError> {
        match self.repository.load().await? {
            Some(health) => Ok(health),
            None => self.refresh(None).await,
        }
    }
}
