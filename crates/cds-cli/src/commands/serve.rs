//! Start the notification engine.

use std::process::ExitCode;

use clap::Args;

use cds_core::config::{AppConfig, StoreBackend};
use cds_core::error::AppError;

/// Arguments for the serve command
#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Override the server port
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Override the server host
    #[arg(long)]
    pub host: Option<String>,

    /// Keep notification settings in memory instead of PostgreSQL
    #[arg(long)]
    pub memory: bool,

    /// Skip database migrations on startup
    #[arg(long)]
    pub no_migrate: bool,
}

/// Execute the serve command
pub async fn execute(args: &ServeArgs, mut config: AppConfig) -> Result<ExitCode, AppError> {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(ref host) = args.host {
        config.server.host = host.clone();
    }
    if args.memory {
        config.database.backend = StoreBackend::Memory;
    }
    if args.no_migrate {
        config.database.migrate_on_start = false;
    }

    println!("Starting CDS notification engine...");
    println!("  Host: {}", config.server.host);
    println!("  Port: {}", config.server.port);

    cds_api::run_server(config).await?;
    Ok(ExitCode::SUCCESS)
}
