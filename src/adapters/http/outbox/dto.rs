//! Data Transfer Objects for outbox and health endpoints.

use serde::{Deserialize, Serialize};

use crate::application::handlers::outbox::{CheckHealthResult, ProcessOutboxIfNeededResult};
use crate::application::outbox::BatchResult;
use crate::domain::outbox::{HealthStatus, OutboxHealth};

/// Response for `POST /api/internal/outbox/process`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessOutboxResponse {
    pub success: bool,
    pub processed: u32,
    pub failed: u32,
}

impl From<BatchResult> for ProcessOutboxResponse {
    fn from(result: BatchResult) -> Self {
        Self {
            success: true,
            processed: result.processed,
            failed: result.failed,
        }
    }
}

/// Response for `/api/internal/outbox/process-if-needed`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessOutboxIfNeededResponse {
    pub success: bool,
    pub skipped: bool,
    pub processed: u32,
    pub failed: u32,
    pub pending_count: u64,
    pub status: HealthStatus,
}

impl From<ProcessOutboxIfNeededResult> for ProcessOutboxIfNeededResponse {
    fn from(result: ProcessOutboxIfNeededResult) -> Self {
        Self {
            success: true,
            skipped: result.skipped,
            processed: result.processed,
            failed: result.failed,
            pending_count: result.pending_count,
            status: result.status,
        }
    }
}

/// Full persisted summary, for `GET /api/internal/outbox/status`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct OutboxStatusResponse {
    pub status: HealthStatus,
    pub pending_count: u64,
    pub oldest_pending_at: Option<String>,
    pub last_error: Option<String>,
    pub last_degraded_at: Option<String>,
    pub last_recovered_at: Option<String>,
    pub updated_at: String,
}

impl From<OutboxHealth> for OutboxStatusResponse {
    fn from(health: OutboxHealth) -> Self {
        Self {
            status: health.status,
            pending_count: health.pending_count,
            oldest_pending_at: health.oldest_pending_at.map(|t| t.to_rfc3339()),
            last_error: health.last_error,
            last_degraded_at: health.last_degraded_at.map(|t| t.to_rfc3339()),
            last_recovered_at: health.last_recovered_at.map(|t| t.to_rfc3339()),
            updated_at: health.updated_at.to_rfc3339(),
        }
    }
}

/// Outbox section of the liveness response.
///
/// Only `status` is present (`"unknown"`) when the summary is unavailable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthOutboxSection {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pending_count: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_degraded_at: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_recovered_at: Option<Option<String>>,
}

impl HealthOutboxSection {
    pub fn unknown() -> Self {
        Self {
            status: "unknown".to_string(),
            pending_count: None,
            last_degraded_at: None,
            last_recovered_at: None,
        }
    }
}

impl From<OutboxHealth> for HealthOutboxSection {
    fn from(health: OutboxHealth) -> Self {
        Self {
            status: health.status.as_str().to_string(),
            pending_count: Some(health.pending_count),
            last_degraded_at: Some(health.last_degraded_at.map(|t| t.to_rfc3339())),
            last_recovered_at: Some(health.last_recovered_at.map(|t| t.to_rfc3339())),
        }
    }
}

/// Response for `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: String,
    pub outbox: HealthOutboxSection,
}

impl From<CheckHealthResult> for HealthResponse {
    fn from(result: CheckHealthResult) -> Self {
        Self {
            status: "ok".to_string(),
            timestamp: result.timestamp.to_rfc3339(),
            outbox: result
                .outbox
                .map(HealthOutboxSection::from)
                .unwrap_or_else(HealthOutboxSection::unknown),
        }
    }
}

/// Standard error response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Human-readable error message.
    pub error: String,
    /// Error code for programmatic handling.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: None,
        }
    }

    pub fn with_code(error: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            code: Some(code.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::Timestamp;
    use serde_json::json;

    #[test]
    fn unknown_health_section_serializes_status_only() {
        let value = serde_json::to_value(HealthOutboxSection::unknown()).unwrap();
        assert_eq!(value, json!({"status": "unknown"}));
    }

    #[test]
    fn known_health_section_keeps_null_stamps() {
        let section = HealthOutboxSection::from(OutboxHealth::initial(Timestamp::now()));
        let value = serde_json::to_value(section).unwrap();

        assert_eq!(
            value,
            json!({
                "status": "healthy",
                "pending_count": 0,
                "last_degraded_at": null,
                "last_recovered_at": null
            })
        );
    }

    #[test]
    fn error_response_omits_missing_code() {
        let value = serde_json::to_value(ErrorResponse::new("Unauthorized")).unwrap();
        assert_eq!(value, json!({"error": "Unauthorized"}));
    }
}
