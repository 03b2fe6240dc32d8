//! Mock admin sync client for testing.
//!
//! Supports:
//! - Call tracking
//! - Error injection (every call, or the next N calls)
//! - Per-path failures
//! - Response latency

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use crate::ports::{AdminSyncClient, AdminSyncError};

/// One recorded `send`.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub path: String,
    pub payload: Value,
}

#[derive(Default)]
struct MockState {
    calls: Vec<RecordedCall>,
    error: Option<AdminSyncError>,
    fail_next: usize,
    path_errors: HashMap<String, AdminSyncError>,
    delay: Option<Duration>,
}

/// Configurable in-process admin system.
///
/// # Example
///
/// ```ignore
/// let admin = MockAdminSyncClient::new();
/// admin.fail_with(AdminSyncError::rejected(503, "down"));
/// // ... exercise code ...
/// admin.succeed();
/// assert_eq!(admin.call_count(), 2);
/// ```
#[derive(Clone, Default)]
pub struct MockAdminSyncClient {
    inner: Arc<Mutex<MockState>>,
}

impl MockAdminSyncClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every subsequent call fails with `error` until [`succeed`](Self::succeed).
    pub fn fail_with(&self, error: AdminSyncError) {
        self.lock().error = Some(error);
    }

    /// The next `n` calls fail with a 503, then calls succeed again.
    pub fn fail_next(&self, n: usize) {
        self.lock().fail_next = n;
    }

    /// Calls to `path` fail with `error`.
    pub fn fail_path(&self, path: impl Into<String>, error: AdminSyncError) {
        self.lock().path_errors.insert(path.into(), error);
    }

    /// Every call waits `delay` before answering.
    pub fn with_delay(&self, delay: Duration) {
        self.lock().delay = Some(delay);
    }

    /// Clears all injected failures.
    pub fn succeed(&self) {
        let mut state = self.lock();
        state.error = None;
        state.fail_next = 0;
        state.path_errors.clear();
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    pub fn calls_to(&self, path: &str) -> Vec<RecordedCall> {
        self.lock()
            .calls
            .iter()
            .filter(|c| c.path == path)
            .cloned()
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        // A panicking test thread must not poison later assertions.
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl AdminSyncClient for MockAdminSyncClient {
    async fn send(&self, path: &str, payload: &Value) -> Result<(), AdminSyncError> {
        let delay = {
            let mut state = self.lock();
            state.calls.push(RecordedCall {
                path: path.to_string(),
                payload: payload.clone(),
            });
            state.delay
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut state = self.lock();

        if let Some(err) = state.path_errors.get(path) {
            return Err(err.clone());
        }
        if state.fail_next > 0 {
            state.fail_next -= 1;
            return Err(AdminSyncError::rejected(503, "Service Unavailable"));
        }
        match &state.error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}
