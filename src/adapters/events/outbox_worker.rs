//! OutboxWorker - optional background poller for the outbox.
//!
//! Request-triggered flushes and cron drains are enough on their own; the
//! worker is for deployments with little inbound traffic. It calls the same
//! `BatchProcessor::process_once` as every other entry point, so it can run
//! next to them (and in several processes) without coordination.
//!
//! ## Configuration
//!
//! | Setting | Default | Description |
//! |---------|---------|-------------|
//! | `poll_interval` | 5s | How often to claim a batch |
//! | `batch_size` | 25 | Max events per poll |
//!
//! ## Graceful Shutdown
//!
//! The worker listens for a shutdown signal and runs one final batch
//! before stopping.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};

use crate::application::outbox::{BatchProcessor, BatchResult};
use crate::domain::foundation::DomainError;

/// Configuration for the OutboxWorker.
#[derive(Debug, Clone)]
pub struct OutboxWorkerConfig {
    /// How often to poll for due events.
    pub poll_interval: Duration,

    /// Maximum events to process per poll.
    pub batch_size: u32,
}

impl Default for OutboxWorkerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(5),
            batch_size: 25,
        }
    }
}

impl OutboxWorkerConfig {
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_batch_size(mut self, size: u32) -> Self {
        self.batch_size = size;
        self
    }
}

/// Background loop around [`BatchProcessor::process_once`].
pub struct OutboxWorker {
    processor: BatchProcessor,
    config: OutboxWorkerConfig,
}

impl OutboxWorker {
    pub fn new(processor: BatchProcessor, config: OutboxWorkerConfig) -> Self {
        Self { processor, config }
    }

    /// Runs until `shutdown` flips to `true`.
    ///
    /// Store errors are logged and the loop keeps polling; a database blip
    /// must not stop delivery for the life of the process.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) {
        let mut interval = time::interval(self.config.poll_interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            poll_interval_ms = self.config.poll_interval.as_millis() as u64,
            batch_size = self.config.batch_size,
            "Outbox worker started"
        );

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        self.poll_logged().await;
                        tracing::info!("Outbox worker stopped");
                        return;
                    }
                }

                _ = interval.tick() => {
                    self.poll_logged().await;
                }
            }
        }
    }

    /// Runs exactly one poll cycle.
    pub async fn poll_once(&self) -> Result<BatchResult, DomainError> {
        self.processor.process_once(self.config.batch_size).await
    }

    async fn poll_logged(&self) {
        match self.poll_once().await {
            Ok(result) if !result.is_empty() => {
                tracing::debug!(processed = result.processed, failed = result.failed, "Outbox poll");
            }
            Ok(_) => {}
            Err(e) => tracing::error!(error = %e, "Outbox poll failed"),
        }
    }
}
