//! HTTP surface tests against an in-memory store.

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt;

use cds_api::{AppState, build_app};
use cds_core::config::AppConfig;
use cds_database::{MemoryNotificationStore, NotificationStore};
use cds_entity::build::BuildStatus;
use cds_entity::log::{FAILURE_MARKER, LogLine};
use cds_entity::scope::Scope;
use cds_logstream::LogHub;
use cds_notification::{
    BuildNotifier, BuildTransition, Dispatcher, NotificationRegistry, StaticDirectory,
    transition_channel,
};

struct TestApp {
    router: Router,
    store: Arc<dyn NotificationStore>,
    transitions: mpsc::Receiver<BuildTransition>,
}

fn test_app() -> TestApp {
    let config = Arc::new(AppConfig::default());
    let store: Arc<dyn NotificationStore> = Arc::new(MemoryNotificationStore::new());
    let registry =
        Arc::new(NotificationRegistry::new(Vec::<String>::new(), "http://localhost:9000").unwrap());
    let dispatcher = Dispatcher::new(registry, Duration::from_secs(1)).unwrap();
    let notifier = Arc::new(BuildNotifier::new(
        Arc::clone(&store),
        dispatcher,
        Arc::new(StaticDirectory::new()),
    ));
    let (tx, rx) = transition_channel(8);
    let state = AppState::new(config, Arc::clone(&store), notifier, tx, LogHub::new(16));

    TestApp {
        router: build_app(state),
        store,
        transitions: rx,
    }
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn jabber_settings() -> Value {
    json!({
        "type": "jabber_email",
        "on_start": true,
        "on_success": "on_success",
        "on_failure": "on_failure",
        "recipients": ["1", "2"],
        "send_to_author": true,
        "send_to_groups": false,
        "template": {
            "subject": "{project}/{application} {pipeline} {status}",
            "body": "Details : {buildURL}"
        }
    })
}

const SCOPE_URI: &str = "/api/applications/10/pipelines/20/notification";

#[tokio::test]
async fn test_unconfigured_scope_returns_no_content() {
    let app = test_app();
    let response = app
        .router
        .oneshot(empty_request("GET", SCOPE_URI))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn test_replace_echoes_stored_set() {
    let app = test_app();
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            SCOPE_URI,
            json!({ "notifications": { "jabber": jabber_settings() } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["scope"]["application_id"], 10);
    assert_eq!(body["scope"]["environment_id"], 1);
    assert_eq!(body["notifications"]["jabber"]["recipients"], json!(["1", "2"]));

    let response = app
        .router
        .oneshot(empty_request("GET", SCOPE_URI))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, body);
}

#[tokio::test]
async fn test_unknown_kind_is_rejected() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "POST",
            SCOPE_URI,
            json!({ "notifications": { "irc": jabber_settings() } }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body = body_json(response).await;
    assert_eq!(body["error"], "VALIDATION_ERROR");
    assert!(app.store.load(&Scope::new(10, 20, None)).await.unwrap().is_none());
}

#[tokio::test]
async fn test_environment_delete_clears_only_that_environment() {
    let app = test_app();
    for env in [3, 4] {
        let response = app
            .router
            .clone()
            .oneshot(json_request(
                "POST",
                SCOPE_URI,
                json!({ "environment_id": env, "notifications": { "jabber": jabber_settings() } }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .router
        .oneshot(empty_request("DELETE", "/api/environments/3/notification"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["deleted"], 1);

    assert!(app.store.load(&Scope::new(10, 20, Some(3))).await.unwrap().is_none());
    assert!(app.store.load(&Scope::new(10, 20, Some(4))).await.unwrap().is_some());
}

#[tokio::test]
async fn test_list_types() {
    let app = test_app();
    let response = app
        .router
        .oneshot(empty_request("GET", "/api/notification/type"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!(["email", "jabber", "tat"]));
}

#[tokio::test]
async fn test_transition_is_accepted_and_queued() {
    let mut app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/applications/10/pipelines/20/transition",
            json!({
                "previous_status": "Waiting",
                "current_status": "Building",
                "context": {
                    "project": "PRJ",
                    "application": "APP",
                    "pipeline": "PIP",
                    "build_number": 7,
                    "status": "Waiting"
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let transition = app.transitions.recv().await.unwrap();
    assert_eq!(transition.scope, Scope::new(10, 20, None));
    assert_eq!(transition.event.current_status, BuildStatus::Building);
    assert_eq!(transition.event.context.environment, "NoEnv");
    assert_eq!(transition.event.context.status, BuildStatus::Building);
}

#[tokio::test]
async fn test_terminal_transition_closes_log_stream() {
    let app = test_app();
    let build = "/api/project/PRJ/application/APP/pipeline/PIP/build/7";

    let stream = app
        .router
        .clone()
        .oneshot(empty_request("GET", &format!("{build}/log/stream")))
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);

    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{build}/log"),
            json!({ "lines": [LogLine::new(1, "deploy", "done")] }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["delivered"], 1);

    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/applications/10/pipelines/20/transition",
            json!({
                "previous_status": "Building",
                "current_status": "Success",
                "context": {
                    "project": "PRJ",
                    "application": "APP",
                    "pipeline": "PIP",
                    "build_number": 7,
                    "status": "Building"
                }
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let bytes = tokio::time::timeout(
        Duration::from_secs(5),
        to_bytes(stream.into_body(), usize::MAX),
    )
    .await
    .expect("stream must end on a terminal status")
    .unwrap();
    let received: Vec<LogLine> = String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(received.len(), 1);
    assert_eq!(received[0].value, "done");
}

#[tokio::test]
async fn test_log_without_subscriber_is_discarded() {
    let app = test_app();
    let response = app
        .router
        .oneshot(json_request(
            "POST",
            "/api/project/PRJ/application/APP/pipeline/PIP/build/1/log",
            json!({ "lines": [LogLine::new(1, "build", "hello")] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["delivered"], 0);
    assert_eq!(body["data"]["discarded"], 1);
}

#[tokio::test]
async fn test_log_stream_delivers_ndjson_until_finish() {
    let app = test_app();
    let build = "/api/project/PRJ/application/APP/pipeline/PIP/build/2";

    let stream = app
        .router
        .clone()
        .oneshot(empty_request("GET", &format!("{build}/log/stream?env=prod")))
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);
    assert_eq!(
        stream.headers()[header::CONTENT_TYPE],
        "application/x-ndjson"
    );

    let lines = vec![
        LogLine::new(1, "compile", "cargo build"),
        LogLine::pipeline_failed("compile"),
    ];
    let response = app
        .router
        .clone()
        .oneshot(json_request(
            "POST",
            &format!("{build}/log?env=prod"),
            json!({ "lines": lines }),
        ))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["delivered"], 2);

    let response = app
        .router
        .oneshot(empty_request("POST", &format!("{build}/finish?env=prod")))
        .await
        .unwrap();
    assert_eq!(body_json(response).await["data"]["closed"], true);

    let bytes = to_bytes(stream.into_body(), usize::MAX).await.unwrap();
    let received: Vec<LogLine> = String::from_utf8(bytes.to_vec())
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(received.len(), 2);
    assert_eq!(received[0].value, "cargo build");
    assert!(received[1].value.contains(FAILURE_MARKER));
    assert!(received[1].is_failure_marker());
}

#[tokio::test]
async fn test_health() {
    let app = test_app();
    let response = app
        .router
        .oneshot(empty_request("GET", "/api/health"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["data"]["status"], "ok");
    assert_eq!(body["data"]["log_streams"], 0);
}
