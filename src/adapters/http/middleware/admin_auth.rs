//! Shared-secret authentication for internal admin endpoints.
//!
//! - `require_admin_secret` - `x-admin-sync-secret` must match the configured secret
//! - `require_admin_or_cron` - same, or a platform scheduler call when `allow_cron` is on
//!
//! An unset secret rejects every secret-authenticated call.
//!
//! # Example
//!
//! ```ignore
//! let auth = AdminAuthState::new(Some(secret), false);
//!
//! let app = Router::new()
//!     .route("/process", post(handler))
//!     .route_layer(middleware::from_fn_with_state(auth, require_admin_secret));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

use crate::adapters::admin_sync::ADMIN_SYNC_SECRET_HEADER;
use crate::adapters::http::outbox::ErrorResponse;

/// Header set by the hosting platform's cron scheduler.
pub const CRON_HEADER: &str = "x-vercel-cron";

/// Admin auth middleware state.
#[derive(Clone)]
pub struct AdminAuthState {
    secret: Option<Arc<SecretString>>,
    allow_cron: bool,
}

impl AdminAuthState {
    pub fn new(secret: Option<SecretString>, allow_cron: bool) -> Self {
        Self {
            secret: secret
                .filter(|s| !s.expose_secret().is_empty())
                .map(Arc::new),
            allow_cron,
        }
    }

    /// Constant-time comparison of the presented header against the secret.
    fn secret_matches(&self, headers: &HeaderMap) -> bool {
        let Some(expected) = &self.secret else {
            return false;
        };
        let Some(provided) = headers.get(ADMIN_SYNC_SECRET_HEADER) else {
            return false;
        };
        provided
            .as_bytes()
            .ct_eq(expected.expose_secret().as_bytes())
            .into()
    }

    fn is_cron_call(&self, headers: &HeaderMap) -> bool {
        if !self.allow_cron {
            return false;
        }
        if headers.get(CRON_HEADER).map(|v| v.as_bytes()) == Some(b"1") {
            return true;
        }
        headers
            .get(axum::http::header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(|ua| ua.to_ascii_lowercase().contains("vercel-cron"))
            .unwrap_or(false)
    }
}

/// Requires the shared admin secret.
pub async fn require_admin_secret(
    State(auth): State<AdminAuthState>,
    request: Request,
    next: Next,
) -> Response {
    if !auth.secret_matches(request.headers()) {
        tracing::warn!(path = %request.uri().path(), "Rejected internal request without valid admin secret");
        return unauthorized();
    }
    next.run(request).await
}

/// Requires the shared admin secret or, when enabled, a scheduler call.
pub async fn require_admin_or_cron(
    State(auth): State<AdminAuthState>,
    request: Request,
    next: Next,
) -> Response {
    let headers = request.headers();
    if !auth.secret_matches(headers) && !auth.is_cron_call(headers) {
        tracing::warn!(path = %request.uri().path(), "Rejected scheduled request");
        return unauthorized();
    }
    next.run(request).await
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(ErrorResponse::new("Unauthorized"))).into_response()
}
