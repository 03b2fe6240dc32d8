//! Outbox processing configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::events::{FlushSchedulerConfig, OutboxWorkerConfig};
use crate::application::outbox::BatchProcessorConfig;

/// Batch sizes, flush cadence and retry policy.
#[derive(Debug, Clone, Deserialize)]
pub struct OutboxConfig {
    /// Run opportunistic flushes on ordinary requests
    #[serde(default = "default_true")]
    pub flush_enabled: bool,

    /// Minimum milliseconds between request-triggered flushes
    #[serde(default = "default_flush_interval_ms")]
    pub flush_interval_ms: u64,

    /// Events per request-triggered flush
    #[serde(default = "default_flush_batch_size")]
    pub flush_batch_size: u32,

    /// Events per claim in admin drains and the `process-outbox` binary
    #[serde(default = "default_drain_batch_size")]
    pub drain_batch_size: u32,

    /// Seconds after which a `processing` claim is considered abandoned (0 disables)
    #[serde(default = "default_stale_claim_after_secs")]
    pub stale_claim_after_secs: u64,

    /// Failures after which an event is parked as `dead`; unset retries forever
    #[serde(default)]
    pub max_attempts: Option<u32>,

    /// Run the background poller in the server process
    #[serde(default)]
    pub worker_enabled: bool,

    #[serde(default = "default_worker_poll_interval_ms")]
    pub worker_poll_interval_ms: u64,
}

impl OutboxConfig {
    pub fn processor_config(&self) -> BatchProcessorConfig {
        let stale = (self.stale_claim_after_secs > 0)
            .then(|| Duration::from_secs(self.stale_claim_after_secs));
        BatchProcessorConfig::default().with_stale_claim_after(stale)
    }

    pub fn flush_config(&self) -> FlushSchedulerConfig {
        FlushSchedulerConfig {
            interval: Duration::from_millis(self.flush_interval_ms),
            batch_size: self.flush_batch_size,
        }
    }

    pub fn worker_config(&self) -> OutboxWorkerConfig {
        OutboxWorkerConfig::default()
            .with_poll_interval(Duration::from_millis(self.worker_poll_interval_ms))
            .with_batch_size(self.drain_batch_size)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.flush_batch_size == 0 {
            return Err(ValidationError::MustBePositive("outbox.flush_batch_size"));
        }
        if self.drain_batch_size == 0 {
            return Err(ValidationError::MustBePositive("outbox.drain_batch_size"));
        }
        if self.max_attempts == Some(0) {
            return Err(ValidationError::MustBePositive("outbox.max_attempts"));
        }
        if self.worker_enabled && self.worker_poll_interval_ms == 0 {
            return Err(ValidationError::MustBePositive("outbox.worker_poll_interval_ms"));
        }
        Ok(())
    }
}

impl Default for OutboxConfig {
    fn default() -> Self {
        Self {
            flush_enabled: true,
            flush_interval_ms: default_flush_interval_ms(),
            flush_batch_size: default_flush_batch_size(),
            drain_batch_size: default_drain_batch_size(),
            stale_claim_after_secs: default_stale_claim_after_secs(),
            max_attempts: None,
            worker_enabled: false,
            worker_poll_interval_ms: default_worker_poll_interval_ms(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_flush_interval_ms() -> u64 {
    30_000
}

fn default_flush_batch_size() -> u32 {
    5
}

fn default_drain_batch_size() -> u32 {
    25
}

fn default_stale_claim_after_secs() -> u64 {
    600
}

fn default_worker_poll_interval_ms() -> u64 {
    5_000
}
