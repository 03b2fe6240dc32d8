//! HTTP middleware for axum.
//!
//! This module contains middleware layers for cross-cutting concerns:
//!
//! - `admin_auth` - Shared-secret and scheduler authentication for internal routes
//! - `outbox_flush` - Opportunistic outbox flushing on ordinary traffic

pub mod admin_auth;
pub mod outbox_flush;

pub use admin_auth::{require_admin_or_cron, require_admin_secret, AdminAuthState, CRON_HEADER};
pub use outbox_flush::outbox_flush_middleware;
