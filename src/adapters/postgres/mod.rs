//! PostgreSQL adapters - Database implementations for repository ports.
//!
//! This module provides adapters for PostgreSQL-backed persistence:
//! - `PostgresOutboxStore` - Outbox event log and health summary

mod outbox_store;

pub use outbox_store::PostgresOutboxStore;
