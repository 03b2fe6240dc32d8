//! HTTP adapters - REST API implementations.
//!
//! - `outbox` - Admin drain endpoints and liveness
//! - `middleware` - Admin auth and the opportunistic flush layer
//! - `router` - Assembles the service router

pub mod middleware;
pub mod outbox;
pub mod router;

// Re-export key types for convenience
pub use outbox::{outbox_router, OutboxAppState};
pub use router::{app_router, with_http_layers};
