//! ProcessOutboxHandler - Command handler for an unconditional drain.

use crate::application::outbox::{BatchProcessor, BatchResult};
use crate::domain::foundation::DomainError;

/// Command to drain the outbox until a claim comes back empty.
#[derive(Debug, Clone)]
pub struct ProcessOutboxCommand {
    pub batch_size: u32,
}

impl Default for ProcessOutboxCommand {
    fn default() -> Self {
        Self { batch_size: 25 }
    }
}

/// Result of a drain.
pub type ProcessOutboxResult = BatchResult;

/// Handler for operator and cron triggered drains.
pub struct ProcessOutboxHandler {
    processor: BatchProcessor,
}

impl ProcessOutboxHandler {
    pub fn new(processor: BatchProcessor) -> Self {
        Self { processor }
    }

    pub async fn handle(&self, cmd: ProcessOutboxCommand) -> Result<ProcessOutboxResult, DomainError> {
        let result = self.processor.drain_detached(cmd.batch_size).await?;
        tracing::info!(
            processed = result.processed,
            failed = result.failed,
            "Outbox drain finished"
        );
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::admin_sync::MockAdminSyncClient;
    use crate::adapters::storage::InMemoryOutboxStore;
    use crate::application::outbox::HealthMonitor;
    use crate::domain::outbox::{NewOutboxEvent, OutboxEventType};
    use crate::ports::OutboxStore;
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn drains_everything_due() {
        let store = InMemoryOutboxStore::new();
        for _ in 0..30 {
            store
                .enqueue(NewOutboxEvent::new(OutboxEventType::ClientSync, json!({}), None))
                .await
                .unwrap();
        }
        let health = HealthMonitor::new(Arc::new(store.clone()), Arc::new(store.clone()));
        let processor = BatchProcessor::new(
            Arc::new(store.clone()),
            Arc::new(MockAdminSyncClient::new()),
            health,
        );

        let result = ProcessOutboxHandler::new(processor)
            .handle(ProcessOutboxCommand::default())
            .await
            .unwrap();

        assert_eq!(result.processed, 30);
        assert_eq!(result.failed, 0);
        assert!(store.is_empty().await);
    }
}
