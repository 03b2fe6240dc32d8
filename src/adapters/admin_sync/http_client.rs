//! HTTP Admin Sync Client - POSTs sync payloads to the admin ingestion API.
//!
//! # Configuration
//!
//! ```ignore
//! let config = AdminSyncClientConfig::new("https://admin.example.com/api/sync", secret)
//!     .with_timeout(Duration::from_secs(10));
//!
//! let client = HttpAdminSyncClient::new(config)?;
//! client.send("/studios/sync", &payload).await?;
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;

use crate::ports::{AdminSyncClient, AdminSyncError};

/// Header carrying the shared secret on every admin sync request.
pub const ADMIN_SYNC_SECRET_HEADER: &str = "x-admin-sync-secret";

/// Configuration for the HTTP admin sync client.
///
/// Either value may be absent; every send then fails with
/// [`AdminSyncError::NotConfigured`] and the event is kept in the outbox.
#[derive(Debug, Clone)]
pub struct AdminSyncClientConfig {
    pub base_url: Option<String>,
    secret: Option<SecretString>,
    pub timeout: Duration,
}

impl AdminSyncClientConfig {
    pub fn new(base_url: impl Into<String>, secret: SecretString) -> Self {
        Self {
            base_url: Some(base_url.into()),
            secret: Some(secret),
            timeout: Duration::from_secs(10),
        }
    }

    /// A configuration with neither URL nor secret.
    pub fn unconfigured() -> Self {
        Self {
            base_url: None,
            secret: None,
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_base_url(mut self, base_url: Option<String>) -> Self {
        self.base_url = base_url.filter(|u| !u.trim().is_empty());
        self
    }

    pub fn with_secret(mut self, secret: Option<SecretString>) -> Self {
        self.secret = secret.filter(|s| !s.expose_secret().is_empty());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some() && self.secret.is_some()
    }
}

/// reqwest-backed implementation of [`AdminSyncClient`].
pub struct HttpAdminSyncClient {
    config: AdminSyncClientConfig,
    client: Client,
}

impl HttpAdminSyncClient {
    pub fn new(config: AdminSyncClientConfig) -> Result<Self, AdminSyncError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| AdminSyncError::transport(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }
}

/// Resolves `path` relative to `base`, treating `base` as a directory.
///
/// `https://h/api/sync` + `/clients/sync` gives `https://h/api/sync/clients/sync`.
pub fn join_url(base: &str, path: &str) -> Result<Url, AdminSyncError> {
    let base = if base.ends_with('/') {
        base.to_string()
    } else {
        format!("{}/", base)
    };
    Url::parse(&base)
        .and_then(|b| b.join(path.trim_start_matches('/')))
        .map_err(|e| AdminSyncError::transport(format!("Invalid admin sync URL: {}", e)))
}

#[async_trait]
impl AdminSyncClient for HttpAdminSyncClient {
    async fn send(&self, path: &str, payload: &Value) -> Result<(), AdminSyncError> {
        let (Some(base_url), Some(secret)) = (&self.config.base_url, &self.config.secret) else {
            return Err(AdminSyncError::NotConfigured);
        };
        let url = join_url(base_url, path)?;

        let response = self
            .client
            .post(url)
            .header(ADMIN_SYNC_SECRET_HEADER, secret.expose_secret().as_str())
            .json(payload)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    AdminSyncError::Timeout {
                        timeout_secs: self.config.timeout.as_secs(),
                    }
                } else if e.is_connect() {
                    AdminSyncError::transport(format!("Connection failed: {}", e))
                } else {
                    AdminSyncError::transport(e.to_string())
                }
            })?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(AdminSyncError::rejected(status.as_u16(), body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn client_for(url: &str) -> HttpAdminSyncClient {
        let config = AdminSyncClientConfig::new(url, SecretString::new("s3cret".to_string()));
        HttpAdminSyncClient::new(config).unwrap()
    }

    #[test]
    fn join_url_treats_base_as_directory() {
        let url = join_url("https://admin.test/api/sync", "/clients/sync").unwrap();
        assert_eq!(url.as_str(), "https://admin.test/api/sync/clients/sync");

        let url = join_url("https://admin.test/api/sync/", "studios/sync").unwrap();
        assert_eq!(url.as_str(), "https://admin.test/api/sync/studios/sync");
    }

    #[test]
    fn join_url_rejects_garbage() {
        assert!(matches!(
            join_url("not a url", "/x"),
            Err(AdminSyncError::Transport(_))
        ));
    }

    #[test]
    fn blank_values_count_as_unconfigured() {
        let config = AdminSyncClientConfig::unconfigured()
            .with_base_url(Some("  ".into()))
            .with_secret(Some(SecretString::new(String::new())));
        assert!(!config.is_configured());
    }

    #[tokio::test]
    async fn send_posts_json_with_secret_header() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/api/sync/studios/sync")
            .match_header(ADMIN_SYNC_SECRET_HEADER, "s3cret")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(json!({ "id": "st_1", "name": "Lumen" })))
            .with_status(200)
            .create_async()
            .await;

        let client = client_for(&format!("{}/api/sync", server.url()));
        let result = client
            .send("/studios/sync", &json!({ "id": "st_1", "name": "Lumen" }))
            .await;

        assert!(result.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn non_success_status_is_rejected_with_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/clients/sync")
            .with_status(503)
            .with_body("maintenance")
            .create_async()
            .await;

        let client = client_for(&server.url());
        let err = client.send("/clients/sync", &json!({})).await.unwrap_err();

        assert_eq!(err, AdminSyncError::rejected(503, "maintenance"));
        assert_eq!(err.to_string(), "Admin sync failed (503): maintenance");
    }

    #[tokio::test]
    async fn missing_config_fails_without_request() {
        let client = HttpAdminSyncClient::new(AdminSyncClientConfig::unconfigured()).unwrap();
        let err = client.send("/clients/sync", &json!({})).await.unwrap_err();

        assert_eq!(err, AdminSyncError::NotConfigured);
    }

    #[tokio::test]
    async fn connection_failure_is_transport_error() {
        let client = client_for("http://127.0.0.1:9");
        let err = client.send("/clients/sync", &json!({})).await.unwrap_err();

        assert!(matches!(
            err,
            AdminSyncError::Transport(_) | AdminSyncError::Timeout { .. }
        ));
    }
}
