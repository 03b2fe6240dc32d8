//! Top-level router assembly.

use std::time::Duration;

use axum::{http::HeaderValue, middleware, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use super::middleware::{outbox_flush_middleware, AdminAuthState};
use super::outbox::{outbox_router, OutboxAppState};
use crate::adapters::events::FlushScheduler;
use crate::config::ServerConfig;

/// Routes plus the opportunistic flush layer, without transport concerns.
///
/// Passing `None` for `scheduler` turns request-triggered flushing off.
pub fn app_router(
    state: OutboxAppState,
    auth: AdminAuthState,
    scheduler: Option<FlushScheduler>,
) -> Router {
    let router = outbox_router(auth).with_state(state);
    match scheduler {
        Some(scheduler) => {
            router.layer(middleware::from_fn_with_state(scheduler, outbox_flush_middleware))
        }
        None => router,
    }
}

/// Adds tracing, CORS and the request timeout from server configuration.
pub fn with_http_layers(router: Router, server: &ServerConfig) -> Router {
    router
        .layer(TimeoutLayer::new(Duration::from_secs(server.request_timeout_secs)))
        .layer(cors_layer(&server.cors_origins_list()))
        .layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| HeaderValue::from_str(o).ok())
        .collect();

    if parsed.is_empty() {
        CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
    } else {
        CorsLayer::new()
            .allow_origin(parsed)
            .allow_methods(Any)
            .allow_headers(Any)
    }
}
