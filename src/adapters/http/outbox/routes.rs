//! Axum router configuration for outbox endpoints.

use axum::{
    middleware,
    routing::{get, post},
    Router,
};

use super::handlers::{
    get_outbox_status, health_check, process_outbox, process_outbox_if_needed, OutboxAppState,
};
use crate::adapters::http::middleware::{require_admin_or_cron, require_admin_secret, AdminAuthState};

/// Prefix under which all outbox admin routes are mounted.
pub const OUTBOX_ROUTE_PREFIX: &str = "/api/internal/outbox";

/// Create the outbox admin router.
///
/// # Routes
///
/// ## Admin Endpoints (require `x-admin-sync-secret`)
/// - `POST /process` - Drain until empty
/// - `GET /status` - Persisted health summary
///
/// ## Scheduler Endpoints (secret, or cron caller when enabled)
/// - `POST|GET /process-if-needed` - Drain only when rows are pending
pub fn outbox_routes(auth: AdminAuthState) -> Router<OutboxAppState> {
    let admin = Router::new()
        .route("/process", post(process_outbox))
        .route("/status", get(get_outbox_status))
        .route_layer(middleware::from_fn_with_state(auth.clone(), require_admin_secret));

    let scheduled = Router::new()
        .route(
            "/process-if-needed",
            post(process_outbox_if_needed).get(process_outbox_if_needed),
        )
        .route_layer(middleware::from_fn_with_state(auth, require_admin_or_cron));

    admin.merge(scheduled)
}

/// Create the liveness router.
///
/// # Routes
/// - `GET /health` - Liveness plus outbox summary (no auth)
pub fn health_routes() -> Router<OutboxAppState> {
    Router::new().route("/health", get(health_check))
}

/// Create the complete outbox module router.
///
/// ```ignore
/// let app = outbox_router(auth).with_state(OutboxAppState::new(processor, 25));
/// ```
pub fn outbox_router(auth: AdminAuthState) -> Router<OutboxAppState> {
    Router::new()
        .nest(OUTBOX_ROUTE_PREFIX, outbox_routes(auth))
        .merge(health_routes())
}
