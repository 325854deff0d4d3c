//! CLI command definitions and dispatch.

pub mod logs;
pub mod migrate;
pub mod notification;
pub mod serve;

use std::process::ExitCode;

use clap::{Parser, Subcommand};

use crate::output::OutputFormat;
use cds_core::config::AppConfig;
use cds_core::error::AppError;

/// CDS notification engine
#[derive(Debug, Parser)]
#[command(name = "cds", version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Engine API base URL, overriding `cli.api_url`
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the notification engine
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// Follow a build's log
    #[command(alias = "log")]
    Logs(logs::LogsArgs),
    /// Notification settings
    Notification(notification::NotificationArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<ExitCode, AppError> {
        let mut config = load_config(&self.config)?;
        if let Some(ref url) = self.api_url {
            config.cli.api_url = url.clone();
        }

        match &self.command {
            Commands::Serve(args) => serve::execute(args, config).await,
            Commands::Migrate(args) => migrate::execute(args, &config, self.format).await,
            Commands::Logs(args) => logs::execute(args, &config, self.format).await,
            Commands::Notification(args) => {
                notification::execute(args, &config, self.format).await
            }
        }
    }
}

/// Helper: load configuration from file
pub fn load_config(config_path: &str) -> Result<AppConfig, AppError> {
    AppConfig::load(config_path)
}
