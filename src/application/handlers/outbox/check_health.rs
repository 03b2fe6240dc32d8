//! CheckHealthHandler - liveness query that folds in the outbox summary.
//!
//! Recomputes the summary as a side effect. Never fails: an outbox error
//! is logged and reported as an absent summary.

use crate::application::outbox::HealthMonitor;
use crate::domain::foundation::Timestamp;
use crate::domain::outbox::OutboxHealth;

#[derive(Debug, Clone, Default)]
pub struct CheckHealthQuery;

#[derive(Debug, Clone)]
pub struct CheckHealthResult {
    pub timestamp: Timestamp,
    /// `None` when the summary could not be computed.
    pub outbox: Option<OutboxHealth>,
}

pub struct CheckHealthHandler {
    health: HealthMonitor,
}

impl CheckHealthHandler {
    pub fn new(health: HealthMonitor) -> Self {
        Self { health }
    }

    pub async fn handle(&self, _query: CheckHealthQuery) -> CheckHealthResult {
        let outbox = match self.health.refresh(None).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                tracing::error!(error = %e, "Health outbox status error");
                None
            }
        };

        CheckHealthResult {
            timestamp: Timestamp::now(),
            outbox,
        }
    }
}
