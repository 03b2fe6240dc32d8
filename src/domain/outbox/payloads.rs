//! Bodies posted to the admin system, one per event kind.
//!
//! Field names match the admin ingestion API, which mixes camelCase ids
//! with snake_case attributes. Absent optional fields are omitted.
//!
//! Nullable attributes are `Option<Option<T>>`: `None` leaves the key out
//! (admin keeps its value), `Some(None)` sends `null` (admin clears it).

use serde::{Deserialize, Deserializer, Serialize};

/// Keeps an explicit `null` as `Some(None)`; a missing key stays `None`
/// through `#[serde(default)]`.
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Body for `studio.sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncStudioPayload {
    pub id: String,
    pub name: String,
    pub slug: String,
    pub status: String,
    pub plan: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

/// Body for `client.sync`, covering create, update and delete.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncClientPayload {
    #[serde(rename = "studioId")]
    pub studio_id: String,
    #[serde(rename = "clientId")]
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub subheading: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub event_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub status: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

impl SyncClientPayload {
    /// Delete notification: ids plus `deleted: true`.
    pub fn deleted(studio_id: impl Into<String>, client_id: impl Into<String>) -> Self {
        Self {
            studio_id: studio_id.into(),
            client_id: client_id.into(),
            deleted: Some(true),
            ..Default::default()
        }
    }
}

/// Body for `client.stats`: photo count and storage deltas or absolutes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncClientStatsPayload {
    pub studio_id: String,
    pub client_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delta_bytes: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_count: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_bytes: Option<i64>,
}

impl SyncClientStatsPayload {
    /// A delta update after photos were added (positive) or removed (negative).
    pub fn delta(
        studio_id: impl Into<String>,
        client_id: impl Into<String>,
        delta_count: i64,
        delta_bytes: i64,
    ) -> Self {
        Self {
            studio_id: studio_id.into(),
            client_id: client_id.into(),
            delta_count: Some(delta_count),
            delta_bytes: Some(delta_bytes),
            ..Default::default()
        }
    }
}

/// Body for `studio.owner.sync`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncStudioOwnerPayload {
    pub studio_id: String,
    pub owner_id: String,
    pub email: String,
    pub role: String,
    pub auth_provider: String,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub display_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn stats_delta_serializes_camel_case() {
        let payload = SyncClientStatsPayload::delta("S1", "C1", 1, 2048);
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({"studioId": "S1", "clientId": "C1", "deltaCount": 1, "deltaBytes": 2048})
        );
    }

    #[test]
    fn client_payload_mixes_id_and_attribute_casing() {
        let payload = SyncClientPayload {
            studio_id: "S1".into(),
            client_id: "C1".into(),
            name: Some("Smith Wedding".into()),
            event_date: Some(Some("2025-06-01".into())),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "studioId": "S1",
                "clientId": "C1",
                "name": "Smith Wedding",
                "event_date": "2025-06-01"
            })
        );
    }

    #[test]
    fn client_delete_carries_flag() {
        let value = serde_json::to_value(SyncClientPayload::deleted("S1", "C9")).unwrap();
        assert_eq!(value, json!({"studioId": "S1", "clientId": "C9", "deleted": true}));
    }

    #[test]
    fn owner_payload_uses_camel_case() {
        let payload = SyncStudioOwnerPayload {
            studio_id: "S1".into(),
            owner_id: "U1".into(),
            email: "owner@example.com".into(),
            role: "owner".into(),
            auth_provider: "google".into(),
            display_name: Some(None),
            avatar_url: Some(Some("https://cdn.example.com/a.png".into())),
            created_at: None,
            deleted: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["authProvider"], "google");
        assert_eq!(value["avatarUrl"], "https://cdn.example.com/a.png");
        assert_eq!(value.get("displayName"), Some(&Value::Null));
        assert!(value.get("createdAt").is_none());
    }

    #[test]
    fn cleared_client_fields_are_sent_as_null() {
        let payload = SyncClientPayload {
            studio_id: "S1".into(),
            client_id: "C1".into(),
            name: Some("n".into()),
            subheading: Some(None),
            event_date: Some(None),
            ..Default::default()
        };
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!({
                "studioId": "S1",
                "clientId": "C1",
                "name": "n",
                "subheading": null,
                "event_date": null
            })
        );
    }

    #[test]
    fn explicit_null_survives_a_stored_round_trip() {
        let stored = json!({"studioId": "S1", "clientId": "C1", "subheading": null});
        let payload: SyncClientPayload = serde_json::from_value(stored.clone()).unwrap();

        assert_eq!(payload.subheading, Some(None));
        assert_eq!(payload.status, None);
        assert_eq!(serde_json::to_value(&payload).unwrap(), stored);
    }

    #[test]
    fn studio_payload_omits_missing_created_at() {
        let payload = SyncStudioPayload {
            id: "S1".into(),
            name: "Lumen".into(),
            slug: "lumen".into(),
            status: "active".into(),
            plan: "pro".into(),
            created_at: None,
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert!(value.get("created_at").is_none());
    }
}
