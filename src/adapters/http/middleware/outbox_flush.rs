//! Opportunistic outbox flush middleware.
//!
//! Runs [`FlushScheduler::maybe_flush`] before handing the request on. The
//! flush is detached, so the request never waits for it. Requests under the
//! outbox admin prefix are skipped so a drain call does not trigger a flush.
//!
//! # Example
//!
//! ```ignore
//! let app = Router::new()
//!     .route("/api/studios", get(handler))
//!     .layer(middleware::from_fn_with_state(scheduler, outbox_flush_middleware));
//! ```

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::adapters::events::FlushScheduler;
use crate::adapters::http::outbox::OUTBOX_ROUTE_PREFIX;

const SKIP_PATH_PREFIXES: &[&str] = &[OUTBOX_ROUTE_PREFIX];

fn should_skip(path: &str) -> bool {
    SKIP_PATH_PREFIXES.iter().any(|prefix| path.starts_with(prefix))
}

pub async fn outbox_flush_middleware(
    State(scheduler): State<FlushScheduler>,
    request: Request,
    next: Next,
) -> Response {
    if !should_skip(request.uri().path()) {
        // Detached; the handle is dropped on purpose.
        let _ = scheduler.maybe_flush();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_outbox_admin_paths() {
        assert!(should_skip("/api/internal/outbox/process"));
        assert!(should_skip("/api/internal/outbox/status"));
        assert!(!should_skip("/api/studios"));
        assert!(!should_skip("/health"));
    }
}
