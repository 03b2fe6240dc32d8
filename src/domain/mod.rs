//! Domain layer - pure types and rules, no I/O.
//!
//! - `foundation` - identifiers, timestamps, error types
//! - `outbox` - outbox events, backoff schedule, health summary, sync payloads

pub mod foundation;
pub mod outbox;
