//! CDS notification engine server.
//!
//! Main entry point that loads configuration, initialises logging, and
//! hands off to the API crate which wires every component together.

use tracing_subscriber::{EnvFilter, fmt};

use cds_core::config::AppConfig;
use cds_core::error::AppError;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = cds_api::run_server(config).await {
        tracing::error!(error = %e, "Server error");
        std::process::exit(1);
    }
}

/// Load the base config file, then the per-environment overlay.
fn load_configuration() -> Result<AppConfig, AppError> {
    let config_path =
        std::env::var("CDS_CONFIG").unwrap_or_else(|_| "config/default.toml".to_string());
    let env = std::env::var("CDS_ENV").unwrap_or_else(|_| "development".to_string());
    let env_config_path = format!("config/{env}.toml");

    AppConfig::load_layered(&[&config_path, &env_config_path])
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}
