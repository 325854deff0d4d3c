//! Application builder and server runner.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::middleware::from_fn;
use tokio_util::sync::CancellationToken;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use cds_core::config::{AppConfig, StoreBackend};
use cds_core::error::{AppError, ErrorKind};
use cds_core::result::AppResult;
use cds_database::migration::run_migrations;
use cds_database::{
    DatabasePool, MemoryNotificationStore, NotificationRepository, NotificationStore,
};
use cds_logstream::LogHub;
use cds_notification::{
    BuildNotifier, Dispatcher, NotificationRegistry, StaticDirectory, spawn_event_listener,
    transition_channel,
};

use crate::middleware::cors::build_cors_layer;
use crate::middleware::logging::request_logging;
use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application with all routes and middleware.
pub fn build_app(state: AppState) -> Router {
    let cors = build_cors_layer(&state.config.server);
    build_router(state)
        .layer(from_fn(request_logging))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Open the configured notification store.
pub async fn open_store(
    config: &AppConfig,
) -> AppResult<(Arc<dyn NotificationStore>, Option<DatabasePool>)> {
    match config.database.backend {
        StoreBackend::Memory => {
            warn!("Using in-memory notification store; settings are lost on restart");
            let store: Arc<dyn NotificationStore> = Arc::new(MemoryNotificationStore::new());
            Ok((store, None))
        }
        StoreBackend::Postgres => {
            let pool = DatabasePool::connect(&config.database).await?;
            if config.database.migrate_on_start {
                run_migrations(pool.pool()).await?;
            }
            let store: Arc<dyn NotificationStore> =
                Arc::new(NotificationRepository::new(pool.pool().clone()));
            Ok((store, Some(pool)))
        }
    }
}

/// Wire every component and serve until a shutdown signal arrives.
pub async fn run_server(config: AppConfig) -> AppResult<()> {
    info!(version = env!("CARGO_PKG_VERSION"), "Starting CDS notification engine");

    // ── Store ────────────────────────────────────────────────────
    let (store, pool) = open_store(&config).await?;

    // ── Notification routing ─────────────────────────────────────
    let registry = Arc::new(NotificationRegistry::from_config(&config.notification)?);
    let dispatcher = Dispatcher::new(
        registry,
        Duration::from_secs(config.notification.dispatch_timeout_seconds),
    )?;
    let notifier = Arc::new(BuildNotifier::new(
        Arc::clone(&store),
        dispatcher,
        Arc::new(StaticDirectory::new()),
    ));

    let shutdown = CancellationToken::new();
    let (transitions, rx) = transition_channel(config.notification.event_buffer_size);
    let listener_handle = spawn_event_listener(Arc::clone(&notifier), rx, shutdown.clone());

    // ── Log streaming ────────────────────────────────────────────
    let log_hub = LogHub::from_config(&config.log_stream);

    // ── HTTP server ──────────────────────────────────────────────
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState::new(Arc::new(config), store, notifier, transitions, log_hub);
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(&addr).await.map_err(|e| {
        AppError::with_source(ErrorKind::Configuration, format!("Failed to bind {addr}"), e)
    })?;
    info!(%addr, "CDS notification engine listening");

    let server_shutdown = shutdown.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, draining connections");
            server_shutdown.cancel();
        })
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Internal, "Server error", e))?;

    shutdown.cancel();
    if tokio::time::timeout(grace, listener_handle).await.is_err() {
        warn!("Transition listener did not stop within the grace period");
    }
    if let Some(pool) = pool {
        pool.close().await;
    }

    info!("CDS notification engine stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Cannot listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Cannot listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
