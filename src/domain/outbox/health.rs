//! Outbox health summary and its transition rules.
//!
//! `last_degraded_at` and `last_recovered_at` are stamped only when the
//! status actually flips; a same-state recompute keeps the prior values.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{Timestamp, ValidationError};

/// Two-state health signal derived from the backlog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HealthStatus::Healthy => "healthy",
            HealthStatus::Degraded => "degraded",
        }
    }

    /// Degraded whenever anything is pending.
    pub fn from_pending_count(pending_count: u64) -> Self {
        if pending_count > 0 {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HealthStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "healthy" => Ok(HealthStatus::Healthy),
            "degraded" => Ok(HealthStatus::Degraded),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown health status '{}'", other),
            )),
        }
    }
}

/// Point-in-time view of the backlog read from the event store.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BacklogSnapshot {
    /// Rows with `status = pending` (claimed rows are not counted).
    pub pending_count: u64,
    pub oldest_pending_at: Option<Timestamp>,
    /// Most recently updated non-null `last_error` across all rows.
    pub last_error: Option<String>,
}

/// What a recompute writes to the summary row.
///
/// `degraded_at`/`recovered_at` are `Some` only on a transition; the
/// store coalesces them with the stored values.
#[derive(Debug, Clone, PartialEq)]
pub struct HealthUpdate {
    pub status: HealthStatus,
    pub pending_count: u64,
    pub oldest_pending_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub degraded_at: Option<Timestamp>,
    pub recovered_at: Option<Timestamp>,
    pub at: Timestamp,
}

impl HealthUpdate {
    /// Derives the next summary.
    ///
    /// A missing previous row counts as `healthy`. An explicit override
    /// (forced degraded at enqueue time) wins over the derived status.
    pub fn derive(
        previous: Option<HealthStatus>,
        snapshot: BacklogSnapshot,
        override_status: Option<HealthStatus>,
        now: Timestamp,
    ) -> Self {
        let previous = previous.unwrap_or(HealthStatus::Healthy);
        let status = override_status
            .unwrap_or_else(|| HealthStatus::from_pending_count(snapshot.pending_count));

        let degraded_at = (previous != HealthStatus::Degraded
            && status == HealthStatus::Degraded)
            .then_some(now);
        let recovered_at = (previous != HealthStatus::Healthy
            && status == HealthStatus::Healthy)
            .then_some(now);

        Self {
            status,
            pending_count: snapshot.pending_count,
            oldest_pending_at: snapshot.oldest_pending_at,
            last_error: snapshot.last_error,
            degraded_at,
            recovered_at,
            at: now,
        }
    }
}

/// The persisted singleton summary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxHealth {
    pub status: HealthStatus,
    pub pending_count: u64,
    pub oldest_pending_at: Option<Timestamp>,
    pub last_error: Option<String>,
    pub last_degraded_at: Option<Timestamp>,
    pub last_recovered_at: Option<Timestamp>,
    pub updated_at: Timestamp,
}

impl OutboxHealth {
    /// Summary used when nothing has ever been recorded.
    #[cfg(test)]
    pub fn initial(now: Timestamp) -> Self {
        Self {
            status: HealthStatus::Healthy,
            pending_count: 0,
            oldest_pending_at: None,
            last_error: None,
            last_degraded_at: None,
            last_recovered_at: None,
            updated_at: now,
        }
    }

    /// Applies an update with coalescing transition stamps.
    pub fn apply(previous: Option<&OutboxHealth>, update: &HealthUpdate) -> Self {
        Self {
            status: update.status,
            pending_count: update.pending_count,
            oldest_pending_at: update.oldest_pending_at,
            last_error: update.last_error.clone(),
            last_degraded_at: update
                .degraded_at
                .or_else(|| previous.and_then(|p| p.last_degraded_at)),
            last_recovered_at: update
                .recovered_at
                .or_else(|| previous.and_then(|p| p.last_recovered_at)),
            updated_at: update.at,
        }
    }
}
