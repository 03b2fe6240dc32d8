//! Studio Sync - reliable delivery of studio data to the admin system
//!
//! Changes to studios, clients, client stats and studio owners are pushed
//! to the admin system over HTTP. When a push fails the change is written
//! to a Postgres-backed outbox and retried with backoff until it is
//! delivered. A singleton health row tracks whether the backlog is draining.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod observability;
pub mod ports;
