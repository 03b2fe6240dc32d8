//! Outbox domain - events awaiting delivery to the admin system.
//!
//! An event is claimable iff `status = pending` and `next_retry_at <= now`.
//! Success deletes the row; failure puts it back to `pending` with a
//! later `next_retry_at` taken from the fixed backoff table.

mod backoff;
mod event;
mod event_type;
mod health;
mod payloads;

pub use backoff::{backoff_secs, next_retry_at};
pub use event::{normalize_payload, NewOutboxEvent, OutboxEvent, OutboxStatus};
pub use event_type::OutboxEventType;
pub use health::{BacklogSnapshot, HealthStatus, HealthUpdate, OutboxHealth};
pub use payloads::{
    SyncClientPayload, SyncClientStatsPayload, SyncStudioOwnerPayload, SyncStudioPayload,
};
