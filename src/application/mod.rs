//! Application layer - Services, Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports.
//! `outbox` holds the long-lived services; `handlers` holds the
//! command/query handlers the HTTP layer and binaries call.

pub mod handlers;
pub mod outbox;

pub use outbox::{
    AdminSync, BatchProcessor, BatchProcessorConfig, BatchResult, HealthMonitor, OutboxEventLog,
    SyncOutcome,
};
