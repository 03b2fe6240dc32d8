//! GetOutboxStatusHandler - Query handler for the persisted health summary.

use crate::application::outbox::HealthMonitor;
use crate::domain::foundation::DomainError;
use crate::domain::outbox::OutboxHealth;

#[derive(Debug, Clone, Default)]
pub struct GetOutboxStatusQuery;

pub type GetOutboxStatusResult = OutboxHealth;

pub struct GetOutboxStatusHandler {
    health: HealthMonitor,
}

impl GetOutboxStatusHandler {
    pub fn new(health: HealthMonitor) -> Self {
        Self { health }
    }

    pub async fn handle(&self, _query: GetOutboxStatusQuery) -> Result<GetOutboxStatusResult, DomainError> {
        self.health.status().await
    }
}
