//! ProcessOutboxIfNeededHandler - drain only when the backlog is non-empty.
//!
//! Meant for frequent schedulers: a refresh is cheap, a drain only runs
//! when the refreshed summary reports pending rows.

use crate::application::outbox::BatchProcessor;
use crate::domain::foundation::DomainError;
use crate::domain::outbox::HealthStatus;

/// Command to drain the outbox if anything is pending.
#[derive(Debug, Clone)]
pub struct ProcessOutboxIfNeededCommand {
    pub batch_size: u32,
}

impl Default for ProcessOutboxIfNeededCommand {
    fn default() -> Self {
        Self { batch_size: 25 }
    }
}

/// Result of a conditional drain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessOutboxIfNeededResult {
    pub skipped: bool,
    pub processed: u32,
    pub failed: u32,
    pub pending_count: u64,
    pub status: HealthStatus,
}

pub struct ProcessOutboxIfNeededHandler {
    processor: BatchProcessor,
}

impl ProcessOutboxIfNeededHandler {
    pub fn new(processor: BatchProcessor) -> Self {
        Self { processor }
    }

    pub async fn handle(
        &self,
        cmd: ProcessOutboxIfNeededCommand,
    ) -> Result<ProcessOutboxIfNeededResult, DomainError> {
        let before = self.processor.health().refresh(None).await?;
        if before.pending_count == 0 {
            return Ok(ProcessOutboxIfNeededResult {
                skipped: true,
                processed: 0,
                failed: 0,
                pending_count: 0,
                status: before.status,
            });
        }

        let result = self.processor.drain_detached(cmd.batch_size).await?;
        let after = self.processor.health().refresh(None).await?;

        tracing::info!(
            processed = result.processed,
            failed = result.failed,
            pending_count = after.pending_count,
            "Outbox drain finished"
        );

        Ok(ProcessOutboxIfNeededResult {
            skipped: false,
            processed: result.processed,
            failed: result.failed,
            pending_count: after.pending_count,
            status: after.status,
        })
    }
}
