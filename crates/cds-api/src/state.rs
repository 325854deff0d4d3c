//! Application state shared across all handlers.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::mpsc;

use cds_core::config::AppConfig;
use cds_database::NotificationStore;
use cds_logstream::LogHub;
use cds_notification::{BuildNotifier, BuildTransition};

/// Passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    /// Notification settings store.
    pub store: Arc<dyn NotificationStore>,
    /// Used directly when the transition queue cannot take an event.
    pub notifier: Arc<BuildNotifier>,
    /// Queue drained by the transition listener.
    pub transitions: mpsc::Sender<BuildTransition>,
    pub log_hub: LogHub,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        config: Arc<AppConfig>,
        store: Arc<dyn NotificationStore>,
        notifier: Arc<BuildNotifier>,
        transitions: mpsc::Sender<BuildTransition>,
        log_hub: LogHub,
    ) -> Self {
        Self {
            config,
            store,
            notifier,
            transitions,
            log_hub,
            started_at: Instant::now(),
        }
    }
}
