//! Admin system delivery configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use super::server::Environment;
use crate::adapters::admin_sync::AdminSyncClientConfig;

/// Where and how sync payloads are posted.
///
/// URL and secret are optional: without them every direct delivery fails
/// and events accumulate in the outbox until configuration is fixed.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminSyncConfig {
    /// Base URL of the admin ingestion API, e.g. `https://admin.example.com/api/sync`
    pub url: Option<String>,

    /// Shared secret sent as `x-admin-sync-secret` and expected on internal routes
    pub secret: Option<SecretString>,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Accept platform cron calls on `process-if-needed` without the secret
    #[serde(default)]
    pub allow_cron: bool,
}

impl AdminSyncConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn is_configured(&self) -> bool {
        self.url.as_deref().is_some_and(|u| !u.trim().is_empty())
            && self
                .secret
                .as_ref()
                .is_some_and(|s| !s.expose_secret().is_empty())
    }

    pub fn client_config(&self) -> AdminSyncClientConfig {
        AdminSyncClientConfig::unconfigured()
            .with_base_url(self.url.clone())
            .with_secret(self.secret.clone())
            .with_timeout(self.request_timeout())
    }

    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if let Some(url) = self.url.as_deref().filter(|u| !u.trim().is_empty()) {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ValidationError::InvalidAdminSyncUrl);
            }
            if *environment == Environment::Production && !url.starts_with("https://") {
                return Err(ValidationError::AdminSyncUrlMustBeHttps);
            }
        }
        if self.request_timeout_secs == 0 || self.request_timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for AdminSyncConfig {
    fn default() -> Self {
        Self {
            url: None,
            secret: None,
            request_timeout_secs: default_request_timeout(),
            allow_cron: false,
        }
    }
}

fn default_request_timeout() -> u64 {
    10
}
