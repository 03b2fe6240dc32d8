//! The closed set of event kinds delivered to the admin system.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Kind of outbox event, each bound to one admin ingestion path.
///
/// Client deletes travel as `client.sync` with `deleted: true` in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OutboxEventType {
    #[serde(rename = "studio.sync")]
    StudioSync,
    #[serde(rename = "client.sync")]
    ClientSync,
    #[serde(rename = "client.stats")]
    ClientStats,
    #[serde(rename = "studio.owner.sync")]
    StudioOwnerSync,
}

impl OutboxEventType {
    pub const ALL: [OutboxEventType; 4] = [
        OutboxEventType::StudioSync,
        OutboxEventType::ClientSync,
        OutboxEventType::ClientStats,
        OutboxEventType::StudioOwnerSync,
    ];

    /// Wire name stored in `sync_outbox.event_type`.
    pub fn as_str(&self) -> &'static str {
        match self {
            OutboxEventType::StudioSync => "studio.sync",
            OutboxEventType::ClientSync => "client.sync",
            OutboxEventType::ClientStats => "client.stats",
            OutboxEventType::StudioOwnerSync => "studio.owner.sync",
        }
    }

    /// Admin system path this kind is posted to.
    pub fn delivery_path(&self) -> &'static str {
        match self {
            OutboxEventType::StudioSync => "/studios/sync",
            OutboxEventType::ClientSync => "/clients/sync",
            OutboxEventType::ClientStats => "/clients/stats",
            OutboxEventType::StudioOwnerSync => "/studios/owners/sync",
        }
    }

    /// Looks up a stored wire name. `None` for kinds this build does not know.
    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == name)
    }
}

impl fmt::Display for OutboxEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OutboxEventType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_wire(s).ok_or_else(|| {
            ValidationError::invalid_format("event_type", format!("unknown event type '{}'", s))
        })
    }
}
