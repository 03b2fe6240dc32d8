//! OutboxHealthRepository port - the persisted singleton health summary.

use async_trait::async_trait;

use crate::domain::foundation::DomainError;
use crate::domain::outbox::{HealthUpdate, OutboxHealth};

/// Port for reading and writing the outbox health summary row.
#[async_trait]
pub trait OutboxHealthRepository: Send + Sync {
    /// Returns the summary, or `None` if it was never written.
    async fn load(&self) -> Result<Option<OutboxHealth>, DomainError>;

    /// Upserts the summary.
    ///
    /// Transition stamps in `update` that are `None` must not overwrite
    /// stored values (coalescing write). Returns the row as stored.
    async fn save(&self, update: &HealthUpdate) -> Result<OutboxHealth, DomainError>;
}
