//! HTTP handlers for the outbox admin endpoints and the liveness check.
//!
//! These handlers connect Axum routes to application layer command/query handlers.

use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::application::handlers::outbox::{
    CheckHealthHandler, CheckHealthQuery, GetOutboxStatusHandler, GetOutboxStatusQuery,
    ProcessOutboxCommand, ProcessOutboxHandler, ProcessOutboxIfNeededCommand,
    ProcessOutboxIfNeededHandler,
};
use crate::application::outbox::{BatchProcessor, HealthMonitor};
use crate::domain::foundation::DomainError;

use super::dto::{
    ErrorResponse, HealthResponse, OutboxStatusResponse, ProcessOutboxIfNeededResponse,
    ProcessOutboxResponse,
};

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for outbox endpoints.
#[derive(Clone)]
pub struct OutboxAppState {
    pub processor: BatchProcessor,
    /// Batch size for admin-triggered drains.
    pub drain_batch_size: u32,
}

impl OutboxAppState {
    pub fn new(processor: BatchProcessor, drain_batch_size: u32) -> Self {
        Self {
            processor,
            drain_batch_size,
        }
    }

    fn health(&self) -> HealthMonitor {
        self.processor.health().clone()
    }

    pub fn process_outbox_handler(&self) -> ProcessOutboxHandler {
        ProcessOutboxHandler::new(self.processor.clone())
    }

    pub fn process_outbox_if_needed_handler(&self) -> ProcessOutboxIfNeededHandler {
        ProcessOutboxIfNeededHandler::new(self.processor.clone())
    }

    pub fn get_outbox_status_handler(&self) -> GetOutboxStatusHandler {
        GetOutboxStatusHandler::new(self.health())
    }

    pub fn check_health_handler(&self) -> CheckHealthHandler {
        CheckHealthHandler::new(self.health())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error wrapper for outbox endpoints.
pub struct OutboxApiError(DomainError);

impl From<DomainError> for OutboxApiError {
    fn from(err: DomainError) -> Self {
        Self(err)
    }
}

impl IntoResponse for OutboxApiError {
    fn into_response(self) -> Response {
        tracing::error!(error = %self.0, "Outbox endpoint failed");
        let body = ErrorResponse::with_code(self.0.message.clone(), self.0.code.to_string());
        (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/internal/outbox/process
pub async fn process_outbox(
    State(state): State<OutboxAppState>,
) -> Result<Json<ProcessOutboxResponse>, OutboxApiError> {
    let cmd = ProcessOutboxCommand {
        batch_size: state.drain_batch_size,
    };
    let result = state.process_outbox_handler().handle(cmd).await?;
    Ok(Json(result.into()))
}

/// POST|GET /api/internal/outbox/process-if-needed
pub async fn process_outbox_if_needed(
    State(state): State<OutboxAppState>,
) -> Result<Json<ProcessOutboxIfNeededResponse>, OutboxApiError> {
    let cmd = ProcessOutboxIfNeededCommand {
        batch_size: state.drain_batch_size,
    };
    let result = state.process_outbox_if_needed_handler().handle(cmd).await?;
    Ok(Json(result.into()))
}

/// GET /api/internal/outbox/status
pub async fn get_outbox_status(
    State(state): State<OutboxAppState>,
) -> Result<Json<OutboxStatusResponse>, OutboxApiError> {
    let health = state
        .get_outbox_status_handler()
        .handle(GetOutboxStatusQuery)
        .await?;
    Ok(Json(health.into()))
}

/// GET /health
///
/// Always 200; the outbox section reports `"unknown"` when the store is down.
pub async fn health_check(State(state): State<OutboxAppState>) -> Json<HealthResponse> {
    let result = state.check_health_handler().handle(CheckHealthQuery).await;
    Json(result.into())
}
