//! # Configuration System
//!
//! Settings for the API process: application identity, database connection and
//! pool sizing, the pgBackRest invocation and web server limits.
//!
//! ## Architecture
//!
//! - **Layered Sources**: built-in defaults, an optional TOML file, then flat
//!   environment variables (`DB_HOST`, `PGBACKREST_STANZA`, ...)
//! - **Explicit Validation**: pool bounds and timeouts are checked once at load
//! - **Owned, Not Global**: the loaded [`Settings`] are handed to the web state
//!   at startup and never mutated afterwards
//!
//! ## Usage
//!
//! ```rust,no_run
//! use pgha_api::config::ConfigManager;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let settings = ConfigManager::load()?;
//! let database_url = settings.database.database_url();
//! let stanza = &settings.backup.stanza;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod loader;

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use error::{ConfigResult, ConfigurationError};
pub use loader::ConfigManager;

/// Root settings structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Application identity and listener
    pub app: AppConfig,

    /// Database connection and pooling
    pub database: DatabaseConfig,

    /// pgBackRest invocation
    pub backup: BackupConfig,

    /// HTTP server limits
    pub web: WebConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub name: String,
    pub version: String,
    pub host: String,
    pub port: u16,
    pub debug: bool,
}

impl AppConfig {
    /// Socket address string the server binds to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub host: String,
    pub port: u16,
    pub name: String,
    pub user: String,
    pub password: String,
    pub pool_min_size: u32,
    pub pool_max_size: u32,
    pub acquire_timeout_seconds: u64,
}

impl DatabaseConfig {
    /// Build a PostgreSQL connection URL from the individual components
    ///
    /// Prefer [`DatabaseConfig::connect_options`] for actual connections; it
    /// does not require escaping the password.
    pub fn database_url(&self) -> String {
        format!(
            "postgresql://{}:{}@{}:{}/{}",
            self.user, self.password, self.host, self.port, self.name
        )
    }

    pub fn connect_options(&self) -> sqlx::postgres::PgConnectOptions {
        sqlx::postgres::PgConnectOptions::new()
            .host(&self.host)
            .port(self.port)
            .database(&self.name)
            .username(&self.user)
            .password(&self.password)
    }

    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BackupConfig {
    /// pgBackRest stanza queried by `GET /backups`
    pub stanza: String,
    /// Executable name or path
    pub command: String,
    pub timeout_seconds: u64,
}

impl BackupConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WebConfig {
    pub request_timeout_seconds: u64,
}

impl WebConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

impl Settings {
    /// Validate cross-field constraints after deserialization
    pub fn validate(&self) -> ConfigResult<()> {
        let db = &self.database;
        if db.pool_max_size == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.pool_max_size",
                db.pool_max_size.to_string(),
                "pool must allow at least one connection",
            ));
        }
        if db.pool_min_size > db.pool_max_size {
            return Err(ConfigurationError::invalid_value(
                "database.pool_min_size",
                db.pool_min_size.to_string(),
                format!("must not exceed pool_max_size ({})", db.pool_max_size),
            ));
        }
        if db.acquire_timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "database.acquire_timeout_seconds",
                "0",
                "timeout must be positive",
            ));
        }
        if self.backup.stanza.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "stanza",
                "backup",
            ));
        }
        if self.backup.command.trim().is_empty() {
            return Err(ConfigurationError::missing_required_field(
                "command",
                "backup",
            ));
        }
        if self.backup.timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "backup.timeout_seconds",
                "0",
                "timeout must be positive",
            ));
        }
        if self.web.request_timeout_seconds == 0 {
            return Err(ConfigurationError::invalid_value(
                "web.request_timeout_seconds",
                "0",
                "timeout must be positive",
            ));
        }
        Ok(())
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppConfig {
                name: "PostgreSQL HA/DR Demo API".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                host: "0.0.0.0".to_string(),
                port: 8000,
                debug: false,
            },
            database: DatabaseConfig {
                host: "localhost".to_string(),
                port: 5432,
                name: "postgres".to_string(),
                user: "postgres".to_string(),
                password: String::new(),
                pool_min_size: 5,
                pool_max_size: 20,
                acquire_timeout_seconds: 30,
            },
            backup: BackupConfig {
                stanza: "pgha-dev-postgres".to_string(),
                command: "pgbackrest".to_string(),
                timeout_seconds: 30,
            },
            web: WebConfig {
                request_timeout_seconds: 60,
            },
        }
    }
}
