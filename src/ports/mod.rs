//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Outbox Ports
//!
//! - `OutboxStore` - Durable event log (enqueue, claim, ack, nack)
//! - `OutboxHealthRepository` - Singleton health summary row
//!
//! ## Delivery Ports
//!
//! - `AdminSyncClient` - Outbound POST to the admin system

mod admin_sync_client;
mod outbox_health_repository;
mod outbox_store;

pub use admin_sync_client::{AdminSyncClient, AdminSyncError};
pub use outbox_health_repository::OutboxHealthRepository;
pub use outbox_store::OutboxStore;
