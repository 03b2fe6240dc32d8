//! AdminSyncClient port - outbound delivery to the admin system.
//!
//! One call is one POST. There is no retry here: the sync facade falls
//! back to the outbox and the batch processor reschedules.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Delivery failures. The display string is what lands in `last_error`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AdminSyncError {
    /// Base URL or shared secret not configured.
    #[error("Admin sync config missing")]
    NotConfigured,

    /// Admin system answered with a non-2xx status.
    #[error("Admin sync failed ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The request did not complete within the configured timeout.
    #[error("Admin sync timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// Connection, DNS or other transport failure.
    #[error("Admin sync transport error: {0}")]
    Transport(String),
}

impl AdminSyncError {
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        AdminSyncError::Rejected {
            status,
            body: body.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        AdminSyncError::Transport(message.into())
    }
}

/// Port for posting one payload to the admin ingestion API.
#[async_trait]
pub trait AdminSyncClient: Send + Sync {
    /// POSTs `payload` as JSON to `base_url + path` with the shared secret.
    async fn send(&self, path: &str, payload: &Value) -> Result<(), AdminSyncError>;
}
