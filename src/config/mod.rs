//! Application configuration module
//!
//! Type-safe configuration loaded from environment variables with the
//! `config` and `dotenvy` crates. Variables use the `STUDIO_SYNC` prefix
//! and `__` between nested keys.
//!
//! # Example
//!
//! ```no_run
//! use studio_sync::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//! ```

mod admin_sync;
mod database;
mod error;
mod outbox;
mod server;

pub use admin_sync::AdminSyncConfig;
pub use database::DatabaseConfig;
pub use error::{ConfigError, ValidationError};
pub use outbox::OutboxConfig;
pub use server::{Environment, ServerConfig};

use serde::Deserialize;

/// Environment variable prefix.
pub const ENV_PREFIX: &str = "STUDIO_SYNC";

/// Root application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, logging)
    #[serde(default)]
    pub server: ServerConfig,

    /// Database configuration (PostgreSQL connection)
    pub database: DatabaseConfig,

    /// Admin system delivery (URL, shared secret)
    #[serde(default)]
    pub admin_sync: AdminSyncConfig,

    /// Outbox batch sizes, flush cadence, retry policy
    #[serde(default)]
    pub outbox: OutboxConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `STUDIO_SYNC` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `STUDIO_SYNC__DATABASE__URL=...` -> `database.url = ...`
    /// - `STUDIO_SYNC__ADMIN_SYNC__SECRET=...` -> `admin_sync.secret = ...`
    /// - `STUDIO_SYNC__OUTBOX__FLUSH_INTERVAL_MS=30000` -> `outbox.flush_interval_ms = 30000`
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.database.validate()?;
        self.admin_sync.validate(&self.server.environment)?;
        self.outbox.validate()?;
        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
