//! Application handlers.
//!
//! Command and query handlers that orchestrate outbox operations.

pub mod outbox;

pub use outbox::{
    CheckHealthHandler, CheckHealthQuery, CheckHealthResult, GetOutboxStatusHandler,
    GetOutboxStatusQuery, GetOutboxStatusResult, ProcessOutboxCommand, ProcessOutboxHandler,
    ProcessOutboxIfNeededCommand, ProcessOutboxIfNeededHandler, ProcessOutboxIfNeededResult,
    ProcessOutboxResult,
};
