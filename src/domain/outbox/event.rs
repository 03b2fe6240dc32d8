//! Outbox event rows and their lifecycle.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use super::backoff::next_retry_at;
use super::event_type::OutboxEventType;
use crate::domain::foundation::{OutboxEventId, Timestamp, ValidationError};

/// Delivery state of a stored event.
///
/// There is no success state: a delivered event is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutboxStatus {
    /// Waiting for `next_retry_at`, then claimable.
    Pending,
    /// Claimed by a worker; invisible to other claimers.
    Processing,
    /// Exceeded the configured attempt cap. Only reachable when a cap is set.
    Dead,
}

impl OutboxStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxStatus::Pending => "pending",
            OutboxStatus::Processing => "processing",
            OutboxStatus::Dead => "dead",
        }
    }
}

impl fmt::Display for OutboxStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutboxStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(OutboxStatus::Pending),
            "processing" => Ok(OutboxStatus::Processing),
            "dead" => Ok(OutboxStatus::Dead),
            other => Err(ValidationError::invalid_format(
                "status",
                format!("unknown value '{}'", other),
            )),
        }
    }
}

/// A row to insert into the outbox.
#[derive(Debug, Clone, PartialEq)]
pub struct NewOutboxEvent {
    pub id: OutboxEventId,
    pub event_type: String,
    pub payload: Value,
    pub last_error: Option<String>,
}

impl NewOutboxEvent {
    /// Builds a new event with a fresh id. A `null` payload is stored as `{}`.
    pub fn new(event_type: OutboxEventType, payload: Value, last_error: Option<String>) -> Self {
        Self::with_raw_type(event_type.as_str(), payload, last_error)
    }

    /// Builds an event from a stored wire name, known or not.
    pub fn with_raw_type(
        event_type: impl Into<String>,
        payload: Value,
        last_error: Option<String>,
    ) -> Self {
        let payload = if payload.is_null() {
            Value::Object(Default::default())
        } else {
            payload
        };
        Self {
            id: OutboxEventId::new(),
            event_type: event_type.into(),
            payload,
            last_error,
        }
    }
}

/// A stored outbox event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboxEvent {
    pub id: OutboxEventId,
    /// Raw wire name; may be a kind this build does not know.
    pub event_type: String,
    pub payload: Value,
    pub status: OutboxStatus,
    pub attempts: u32,
    pub last_error: Option<String>,
    pub next_retry_at: Timestamp,
    pub locked_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OutboxEvent {
    /// Materializes an inserted row: pending, zero attempts, due immediately.
    pub fn from_new(new: NewOutboxEvent, now: Timestamp) -> Self {
        Self {
            id: new.id,
            event_type: new.event_type,
            payload: new.payload,
            status: OutboxStatus::Pending,
            attempts: 0,
            last_error: new.last_error,
            next_retry_at: now,
            locked_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// The known kind for this row, if any.
    pub fn known_type(&self) -> Option<OutboxEventType> {
        OutboxEventType::from_wire(&self.event_type)
    }

    pub fn is_claimable(&self, now: Timestamp) -> bool {
        self.status == OutboxStatus::Pending && !now.is_before(&self.next_retry_at)
    }

    /// Takes the claim.
    pub fn claim(&mut self, now: Timestamp) {
        self.status = OutboxStatus::Processing;
        self.locked_at = Some(now);
        self.updated_at = now;
    }

    /// Records a failed attempt.
    ///
    /// The stored count is incremented from the row itself, matching the
    /// `attempts = attempts + 1` update in Postgres. `claimed_attempts` is
    /// the count the worker saw at claim time and picks the backoff step.
    /// With a cap, reaching it parks the row as `dead` instead of rescheduling.
    pub fn fail(
        &mut self,
        claimed_attempts: u32,
        error: impl Into<String>,
        now: Timestamp,
        max_attempts: Option<u32>,
    ) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_error = Some(error.into());
        self.locked_at = None;
        self.updated_at = now;
        self.next_retry_at = next_retry_at(now, claimed_attempts);
        self.status = match max_attempts {
            Some(cap) if self.attempts >= cap => OutboxStatus::Dead,
            _ => OutboxStatus::Pending,
        };
    }

    /// Returns an abandoned claim to the queue without counting an attempt.
    pub fn release(&mut self, now: Timestamp) {
        self.status = OutboxStatus::Pending;
        self.locked_at = None;
        self.updated_at = now;
    }
}

/// Payload as sent downstream.
///
/// A string payload (legacy rows stored as text) is parsed; if it does not
/// parse it becomes an empty object rather than failing the batch.
pub fn normalize_payload(payload: &Value) -> Value {
    match payload {
        Value::String(raw) => serde_json::from_str(raw)
            .unwrap_or_else(|_| Value::Object(Default::default())),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored(kind: &str) -> OutboxEvent {
        OutboxEvent::from_new(
            NewOutboxEvent::with_raw_type(kind, json!({"a": 1}), None),
            Timestamp::now(),
        )
    }

    #[test]
    fn new_event_is_pending_and_due_now() {
        let now = Timestamp::now();
        let event = OutboxEvent::from_new(
            NewOutboxEvent::new(OutboxEventType::ClientStats, json!({}), Some("boom".into())),
            now,
        );

        assert_eq!(event.status, OutboxStatus::Pending);
        assert_eq!(event.attempts, 0);
        assert_eq!(event.next_retry_at, now);
        assert_eq!(event.last_error.as_deref(), Some("boom"));
        assert!(event.is_claimable(now));
    }

    #[test]
    fn null_payload_becomes_empty_object() {
        let new = NewOutboxEvent::new(OutboxEventType::StudioSync, Value::Null, None);
        assert_eq!(new.payload, json!({}));
    }

    #[test]
    fn claimed_event_is_not_claimable() {
        let mut event = stored("client.sync");
        let now = Timestamp::now();
        event.claim(now);

        assert_eq!(event.status, OutboxStatus::Processing);
        assert_eq!(event.locked_at, Some(now));
        assert!(!event.is_claimable(now));
    }

    #[test]
    fn failure_reschedules_with_backoff() {
        let mut event = stored("client.sync");
        let now = Timestamp::now();
        event.claim(now);
        event.fail(0, "Admin sync failed (503): down", now, None);

        assert_eq!(event.status, OutboxStatus::Pending);
        assert_eq!(event.attempts, 1);
        assert_eq!(event.next_retry_at, now.plus_secs(15));
        assert!(event.locked_at.is_none());
        assert!(!event.is_claimable(now));
        assert!(event.is_claimable(now.plus_secs(15)));
    }

    #[test]
    fn failure_at_cap_parks_event() {
        let mut event = stored("client.sync");
        event.attempts = 2;
        let now = Timestamp::now();
        event.fail(2, "still down", now, Some(3));

        assert_eq!(event.attempts, 3);
        assert_eq!(event.status, OutboxStatus::Dead);
        assert!(!event.is_claimable(now.plus_secs(100_000)));
    }

    #[test]
    fn failure_without_cap_never_parks() {
        let mut event = stored("client.sync");
        event.attempts = 10_000;
        event.fail(10_000, "still down", Timestamp::now(), None);
        assert_eq!(event.attempts, 10_001);
        assert_eq!(event.status, OutboxStatus::Pending);
    }

    #[test]
    fn failure_counts_from_the_stored_attempts() {
        let mut event = stored("client.sync");
        event.attempts = 4;
        let now = Timestamp::now();
        event.fail(1, "down", now, Some(5));

        assert_eq!(event.attempts, 5);
        assert_eq!(event.status, OutboxStatus::Dead);
        assert_eq!(event.next_retry_at, now.plus_secs(60));
    }

    #[test]
    fn unknown_type_has_no_known_kind() {
        assert_eq!(stored("unknown.kind").known_type(), None);
        assert_eq!(
            stored("studio.owner.sync").known_type(),
            Some(OutboxEventType::StudioOwnerSync)
        );
    }

    #[test]
    fn normalize_parses_string_payloads() {
        let raw = Value::String(r#"{"studioId":"S1"}"#.to_string());
        assert_eq!(normalize_payload(&raw), json!({"studioId": "S1"}));
    }

    #[test]
    fn normalize_coerces_garbage_to_empty_object() {
        let raw = Value::String("{not json".to_string());
        assert_eq!(normalize_payload(&raw), json!({}));
    }

    #[test]
    fn normalize_passes_objects_through() {
        let payload = json!({"clientId": "C1", "deltaBytes": 2048});
        assert_eq!(normalize_payload(&payload), payload);
    }

    #[test]
    fn status_round_trips_through_str() {
        for status in [OutboxStatus::Pending, OutboxStatus::Processing, OutboxStatus::Dead] {
            assert_eq!(status.as_str().parse::<OutboxStatus>().unwrap(), status);
        }
        assert!("failed".parse::<OutboxStatus>().is_err());
    }
}
