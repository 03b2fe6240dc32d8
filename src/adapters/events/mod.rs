//! Background outbox delivery.
//!
//! - `FlushScheduler` - Request-piggybacked, rate-limited flushes
//! - `OutboxWorker` - Optional polling loop with graceful shutdown

mod flush_scheduler;
mod outbox_worker;

pub use flush_scheduler::{FlushScheduler, FlushSchedulerConfig};
pub use outbox_worker::{OutboxWorker, OutboxWorkerConfig};
