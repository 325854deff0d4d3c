//! Application configuration schemas.
//!
//! All configuration structs are deserialized from TOML files via the
//! `config` crate. Each sub-module represents a logical configuration
//! section. Every section has defaults so an empty file is a valid config.

pub mod app;
pub mod cli;
pub mod database;
pub mod log_stream;
pub mod logging;
pub mod notification;

use serde::{Deserialize, Serialize};

pub use self::app::ServerConfig;
pub use self::cli::CliConfig;
pub use self::database::{DatabaseConfig, StoreBackend};
pub use self::log_stream::LogStreamConfig;
pub use self::logging::LoggingConfig;
pub use self::notification::NotificationConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Database connection settings.
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Notification registry and dispatch settings.
    #[serde(default)]
    pub notification: NotificationConfig,
    /// Build log streaming settings.
    #[serde(default)]
    pub log_stream: LogStreamConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
    /// Client-side settings used by the CLI.
    #[serde(default)]
    pub cli: CliConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file.
    ///
    /// The file is optional. Environment variables prefixed with `CDS__`
    /// override file values, e.g. `CDS__DATABASE__URL`.
    pub fn load(path: &str) -> Result<Self, AppError> {
        Self::load_layered(&[path])
    }

    /// Load several optional TOML files, later files overriding earlier
    /// ones, then apply `CDS__` environment overrides.
    pub fn load_layered(paths: &[&str]) -> Result<Self, AppError> {
        let mut builder = config::Config::builder();
        for path in paths {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix("CDS")
                    .prefix_separator("__")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("notification.destinations")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))
    }
}
