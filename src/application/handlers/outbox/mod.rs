//! Outbox handlers.
//!
//! ## Commands
//! - Drain the outbox unconditionally
//! - Drain the outbox only when rows are pending
//!
//! ## Queries
//! - Get the persisted health summary
//! - Liveness check with the outbox summary folded in

mod check_health;
mod get_outbox_status;
mod process_outbox;
mod process_outbox_if_needed;

// Commands
pub use process_outbox::{ProcessOutboxCommand, ProcessOutboxHandler, ProcessOutboxResult};
pub use process_outbox_if_needed::{
    ProcessOutboxIfNeededCommand, ProcessOutboxIfNeededHandler, ProcessOutboxIfNeededResult,
};

// Queries
pub use check_health::{CheckHealthHandler, CheckHealthQuery, CheckHealthResult};
pub use get_outbox_status::{GetOutboxStatusHandler, GetOutboxStatusQuery, GetOutboxStatusResult};
