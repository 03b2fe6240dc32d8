//! Outbox HTTP adapter: admin drain endpoints and liveness.

mod dto;
mod handlers;
mod routes;

pub use dto::{
    ErrorResponse, HealthOutboxSection, HealthResponse, OutboxStatusResponse,
    ProcessOutboxIfNeededResponse, ProcessOutboxResponse,
};
pub use handlers::{OutboxApiError, OutboxAppState};
pub use routes::{health_routes, outbox_router, outbox_routes, OUTBOX_ROUTE_PREFIX};
