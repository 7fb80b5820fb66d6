//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section.

pub mod app;
pub mod auth;
pub mod database;
pub mod logging;
pub mod mail;
pub mod reminder;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::database::DatabaseConfig;
pub use self::logging::LoggingConfig;
pub use self::mail::MailConfig;
pub use self::reminder::ReminderConfig;
pub use self::storage::StorageConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Prefix for environment variable overrides (`COMPLY__SERVER__PORT`).
pub const ENV_PREFIX: &str = "COMPLY";

/// Root application configuration.
///
/// This struct is the top-level deserialization target for the merged
/// TOML configuration files (default.toml + environment overlay).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication settings.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Uploaded document storage settings.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Outgoing mail settings.
    #[serde(default)]
    pub mail: MailConfig,
    /// Deadline reminder settings.
    #[serde(default)]
    pub reminder: ReminderConfig,
    /// Background scheduler settings.
    #[serde(default)]
    pub worker: WorkerConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration for the given environment name.
    ///
    /// Merges `config/default`, `config/{env}`, and environment variables
    /// prefixed with `COMPLY__`.
    pub fn load(env: &str) -> Result<Self, AppError> {
        Self::load_from("config/default", env)
    }

    /// Load configuration using an explicit base file (without extension).
    pub fn load_from(base: &str, env: &str) -> Result<Self, AppError> {
        let overlay = match std::path::Path::new(base).parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.join(env).display().to_string(),
            _ => env.to_string(),
        };

        let config = config::Config::builder()
            .add_source(config::File::with_name(base).required(false))
            .add_source(config::File::with_name(&overlay).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allowed_origins")
                    .with_list_parse_key("reminder.offsets_days")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }

    /// Configuration suitable for tests: defaults everywhere plus the given DB URL.
    pub fn for_tests(database_url: impl Into<String>) -> Self {
        Self {
            server: ServerConfig::default(),
            database: DatabaseConfig::with_url(database_url),
            auth: AuthConfig::default(),
            storage: StorageConfig::default(),
            mail: MailConfig::default(),
            reminder: ReminderConfig::default(),
            worker: WorkerConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_for_tests() {
        let cfg = AppConfig::for_tests("postgres://localhost/comply_test");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.reminder.offsets_days, vec![30, 14, 7, 1]);
        assert!(!cfg.reminder.deduplicate);
        assert_eq!(cfg.storage.max_upload_bytes, 10 * 1024 * 1024);
        assert_eq!(cfg.auth.signed_url_ttl_seconds, 300);
        assert!(!cfg.mail.enabled);
    }

    #[test]
    fn test_load_missing_files_uses_defaults() {
        // SAFETY: tests in this module are the only writers of this variable.
        unsafe {
            std::env::set_var("COMPLY__DATABASE__URL", "postgres://env/comply");
        }
        let cfg = AppConfig::load_from("does/not/exist/default", "test")
            .expect("config should load from env");
        assert_eq!(cfg.database.url, "postgres://env/comply");
        assert_eq!(cfg.logging.level, "info");
        unsafe {
            std::env::remove_var("COMPLY__DATABASE__URL");
        }
    }
}
