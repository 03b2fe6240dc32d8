//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `postgres` - sqlx-backed outbox store
//! - `storage` - In-memory outbox store (tests, local development)
//! - `admin_sync` - reqwest client for the admin system, plus a mock
//! - `events` - Flush scheduler and background worker
//! - `http` - axum routes and middleware

pub mod admin_sync;
pub mod events;
pub mod http;
pub mod postgres;
pub mod storage;

pub use admin_sync::{HttpAdminSyncClient, MockAdminSyncClient};
pub use events::{FlushScheduler, FlushSchedulerConfig, OutboxWorker, OutboxWorkerConfig};
pub use postgres::PostgresOutboxStore;
pub use storage::InMemoryOutboxStore;
