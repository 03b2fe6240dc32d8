//! FlushScheduler - opportunistic outbox flushing piggybacked on requests.
//!
//! One scheduler per process. Each qualifying request calls
//! [`FlushScheduler::maybe_flush`]; if no flush is running and the interval
//! has elapsed since the last one started, a `process_once` is spawned and
//! the request continues without waiting for it.

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;

use crate::application::outbox::BatchProcessor;

/// Configuration for the FlushScheduler.
#[derive(Debug, Clone)]
pub struct FlushSchedulerConfig {
    /// Minimum time between two flush starts.
    pub interval: Duration,

    /// Batch size for each flush.
    pub batch_size: u32,
}

impl Default for FlushSchedulerConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_millis(30_000),
            batch_size: 5,
        }
    }
}

#[derive(Debug, Default)]
struct Gate {
    in_flight: bool,
    last_flush_at: Option<Instant>,
}

/// Process-wide flush gate.
#[derive(Clone)]
pub struct FlushScheduler {
    processor: BatchProcessor,
    config: FlushSchedulerConfig,
    gate: Arc<Mutex<Gate>>,
}

/// Clears `in_flight` when the flush task ends, including by panic.
struct InFlightGuard(Arc<Mutex<Gate>>);

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        let mut gate = self.0.lock().unwrap_or_else(|e| e.into_inner());
        gate.in_flight = false;
    }
}

impl FlushScheduler {
    pub fn new(processor: BatchProcessor, config: FlushSchedulerConfig) -> Self {
        Self {
            processor,
            config,
            gate: Arc::new(Mutex::new(Gate::default())),
        }
    }

    /// Starts a background flush if one is due. Never waits for it.
    ///
    /// Returns the spawned task, or `None` when the gate is closed.
    pub fn maybe_flush(&self) -> Option<JoinHandle<()>> {
        {
            let mut gate = self.gate.lock().unwrap_or_else(|e| e.into_inner());
            let now = Instant::now();
            let due = gate
                .last_flush_at
                .map_or(true, |last| now.duration_since(last) >= self.config.interval);
            if gate.in_flight || !due {
                return None;
            }
            gate.in_flight = true;
            gate.last_flush_at = Some(now);
        }

        let guard = InFlightGuard(Arc::clone(&self.gate));
        let processor = self.processor.clone();
        let batch_size = self.config.batch_size;

        Some(tokio::spawn(async move {
            let _guard = guard;
            match processor.process_once(batch_size).await {
                Ok(result) if !result.is_empty() => {
                    tracing::debug!(
                        processed = result.processed,
                        failed = result.failed,
                        "Outbox flush"
                    );
                }
                Ok(_) => {}
                Err(e) => tracing::error!(error = %e, "Outbox flush error"),
            }
        }))
    }

    pub fn is_in_flight(&self) -> bool {
        self.gate.lock().unwrap_or_else(|e| e.into_inner()).in_flight
    }
}
