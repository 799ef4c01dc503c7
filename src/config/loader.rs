//! Configuration Loader
//!
//! Layers built-in defaults, an optional TOML file and flat environment
//! variables into a validated [`Settings`] value.

use super::error::ConfigResult;
use super::Settings;
use config::{Config, File};
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming an alternative settings file
pub const CONFIG_FILE_ENV: &str = "PGHA_CONFIG_FILE";

/// Settings file consulted when [`CONFIG_FILE_ENV`] is unset; absence is not an error
pub const DEFAULT_CONFIG_FILE: &str = "config/pgha.toml";

/// Flat environment variables mapped onto nested settings keys
const ENV_BINDINGS: &[(&str, &str)] = &[
    ("app.name", "APP_NAME"),
    ("app.version", "APP_VERSION"),
    ("app.host", "HOST"),
    ("app.port", "PORT"),
    ("app.debug", "DEBUG"),
    ("database.host", "DB_HOST"),
    ("database.port", "DB_PORT"),
    ("database.name", "DB_NAME"),
    ("database.user", "DB_USER"),
    ("database.password", "DB_PASSWORD"),
    ("database.pool_min_size", "DB_POOL_MIN_SIZE"),
    ("database.pool_max_size", "DB_POOL_MAX_SIZE"),
    ("database.acquire_timeout_seconds", "DB_ACQUIRE_TIMEOUT_SECONDS"),
    ("backup.stanza", "PGBACKREST_STANZA"),
    ("backup.command", "PGBACKREST_COMMAND"),
    ("backup.timeout_seconds", "PGBACKREST_TIMEOUT_SECONDS"),
    ("web.request_timeout_seconds", "REQUEST_TIMEOUT_SECONDS"),
];

/// Loads process settings once at startup
pub struct ConfigManager;

impl ConfigManager {
    /// Load settings from the default file location and the process environment
    pub fn load() -> ConfigResult<Settings> {
        let config_file = env::var(CONFIG_FILE_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_FILE));

        Self::load_with(Some(&config_file), |name| env::var(name).ok())
    }

    /// Load settings from an explicit file and variable lookup
    ///
    /// Tests pass a closure over a fixed map instead of mutating the process
    /// environment.
    pub fn load_with<F>(config_file: Option<&Path>, lookup: F) -> ConfigResult<Settings>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = Config::builder().add_source(Config::try_from(&Settings::default())?);

        if let Some(path) = config_file {
            debug!(path = %path.display(), "Adding optional settings file");
            builder = builder.add_source(File::from(path).required(false));
        }

        for (key, variable) in ENV_BINDINGS {
            builder = builder.set_override_option(*key, lookup(variable))?;
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;

        debug!(
            settings = %Self::sanitize_for_logging(&settings),
            "Settings loaded"
        );
        info!(
            app = %settings.app.name,
            version = %settings.app.version,
            database_host = %settings.database.host,
            database_name = %settings.database.name,
            pool_max_size = settings.database.pool_max_size,
            stanza = %settings.backup.stanza,
            "Configuration loaded successfully"
        );

        Ok(settings)
    }

    /// JSON view of the settings with secrets masked
    pub fn sanitize_for_logging(settings: &Settings) -> serde_json::Value {
        let mut value = serde_json::json!(settings);
        let sensitive_patterns = ["password", "secret", "token", "credential"];
        Self::sanitize_json_recursive(&mut value, &sensitive_patterns);
        value
    }

    fn sanitize_json_recursive(value: &mut serde_json::Value, sensitive_patterns: &[&str]) {
        match value {
            serde_json::Value::Object(map) => {
                for (key, val) in map.iter_mut() {
                    let key_lower = key.to_lowercase();
                    let is_sensitive = sensitive_patterns
                        .iter()
                        .any(|pattern| key_lower.contains(pattern));

                    if !is_sensitive {
                        Self::sanitize_json_recursive(val, sensitive_patterns);
                        continue;
                    }

                    *val = match val {
                        serde_json::Value::String(s) if s.is_empty() => {
                            serde_json::Value::String("[EMPTY]".to_string())
                        }
                        _ => serde_json::Value::String("[MASKED]".to_string()),
                    };
                }
            }
            serde_json::Value::Array(arr) => {
                for item in arr.iter_mut() {
                    Self::sanitize_json_recursive(item, sensitive_patterns);
                }
            }
            _ => {}
        }
    }
}
