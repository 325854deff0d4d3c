//! Shared test helpers for integration tests.
#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use cds_api::{AppState, build_app};
use cds_core::config::AppConfig;
use cds_database::{MemoryNotificationStore, NotificationStore};
use cds_logstream::LogHub;
use cds_notification::{
    BuildNotifier, Dispatcher, NotificationRegistry, StaticDirectory, spawn_event_listener,
    transition_channel,
};

/// Calls received by a stand-in dispatch backend: `(kind, body)`.
pub type Calls = Arc<Mutex<Vec<(String, Value)>>>;

/// A running engine bound to an ephemeral port.
pub struct TestEngine {
    pub base_url: String,
    pub store: Arc<dyn NotificationStore>,
    pub log_hub: LogHub,
    pub http: reqwest::Client,
    shutdown: CancellationToken,
}

impl TestEngine {
    /// Start an engine dispatching to `destinations` (`kind:url` entries).
    pub async fn start(destinations: Vec<String>) -> Self {
        let config = Arc::new(AppConfig::default());
        let store: Arc<dyn NotificationStore> = Arc::new(MemoryNotificationStore::new());
        let registry = Arc::new(
            NotificationRegistry::new(destinations, "http://localhost:9000")
                .expect("valid destinations"),
        );
        let dispatcher =
            Dispatcher::new(registry, Duration::from_secs(2)).expect("dispatcher");
        let directory = StaticDirectory::new()
            .with_address("alice", "alice@example.com")
            .with_group_members(100, vec!["ops@example.com".to_string()]);
        let notifier = Arc::new(BuildNotifier::new(
            Arc::clone(&store),
            dispatcher,
            Arc::new(directory),
        ));

        let shutdown = CancellationToken::new();
        let (tx, rx) = transition_channel(16);
        spawn_event_listener(Arc::clone(&notifier), rx, shutdown.clone());

        let log_hub = LogHub::new(16);
        let state = AppState::new(config, Arc::clone(&store), notifier, tx, log_hub.clone());
        let app = build_app(state);

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind engine");
        let addr = listener.local_addr().expect("engine addr");
        let server_shutdown = shutdown.clone();
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(server_shutdown.cancelled_owned())
                .await
                .expect("engine server");
        });

        Self {
            base_url: format!("http://{addr}/api"),
            store,
            log_hub,
            http: reqwest::Client::new(),
            shutdown,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestEngine {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

#[derive(Clone)]
struct Backend {
    status: StatusCode,
    calls: Calls,
}

async fn record(
    State(backend): State<Backend>,
    Path(kind): Path<String>,
    Json(body): Json<Value>,
) -> StatusCode {
    backend.calls.lock().unwrap().push((kind, body));
    backend.status
}

/// Start a dispatch backend answering every call with `status`.
pub async fn spawn_backend(status: StatusCode) -> (String, Calls) {
    let calls: Calls = Arc::default();
    let app = Router::new()
        .route("/{kind}/build", post(record))
        .with_state(Backend {
            status,
            calls: calls.clone(),
        });
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (format!("http://{addr}"), calls)
}

/// Wait until `calls` holds at least `count` entries.
pub async fn wait_for_calls(calls: &Calls, count: usize) -> Vec<(String, Value)> {
    for _ in 0..200 {
        {
            let calls = calls.lock().unwrap();
            if calls.len() >= count {
                return calls.clone();
            }
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("expected {count} backend call(s)");
}
