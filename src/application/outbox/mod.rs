//! Outbox services.
//!
//! - `OutboxEventLog` - enqueue, forcing health to degraded
//! - `AdminSync` - sync facade: deliver directly, fall back to the outbox
//! - `BatchProcessor` - claim, deliver, ack/nack
//! - `HealthMonitor` - recompute and persist the health summary

mod admin_sync;
mod batch_processor;
mod event_log;
mod health_monitor;

pub use admin_sync::{AdminSync, SyncOutcome};
pub use batch_processor::{BatchProcessor, BatchProcessorConfig, BatchResult};
pub use event_log::OutboxEventLog;
pub use health_monitor::HealthMonitor;
