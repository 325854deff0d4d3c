//! Settings written over HTTP drive notifications for reported transitions.

mod helpers;

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{Value, json};

use helpers::{TestEngine, spawn_backend, wait_for_calls};

fn transition(status: &str, build_number: i64) -> Value {
    json!({
        "previous_status": "Building",
        "current_status": status,
        "context": {
            "project": "TEST_APP_PIPELINE_NOTIF",
            "application": "TEST_APP",
            "pipeline": "TEST_PIPELINE",
            "build_number": build_number,
            "status": status,
            "triggered_by": "alice"
        }
    })
}

fn jabber_settings(on_success: &str) -> Value {
    json!({
        "type": "jabber_email",
        "on_start": true,
        "on_success": on_success,
        "on_failure": "on_failure",
        "recipients": ["1", "2"],
        "send_to_author": true,
        "send_to_groups": true,
        "template": {
            "subject": "CDS {project}/{application} {pipeline} {status}",
            "body": "\nDetails : {buildURL}"
        }
    })
}

#[tokio::test]
async fn test_start_transition_notifies_recipients() {
    let (backend, calls) = spawn_backend(StatusCode::OK).await;
    let engine = TestEngine::start(vec![format!("jabber:{backend}")]).await;

    let response = engine
        .http
        .post(engine.url("/applications/100/pipelines/200/notification"))
        .json(&json!({ "notifications": { "jabber": jabber_settings("on_success") } }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = engine
        .http
        .post(engine.url("/applications/100/pipelines/200/transition"))
        .json(&transition("Building", 1))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let calls = wait_for_calls(&calls, 1).await;
    let (kind, body) = &calls[0];
    assert_eq!(kind, "jabber");
    assert_eq!(body["title"], "CDS TEST_APP_PIPELINE_NOTIF/TEST_APP TEST_PIPELINE Building");
    assert_eq!(
        body["message"],
        "\nDetails : http://localhost:9000/#/project/TEST_APP_PIPELINE_NOTIF/application/TEST_APP/pipeline/TEST_PIPELINE/build/1?env=NoEnv&tab=detail"
    );
    assert_eq!(
        body["recipients"],
        json!(["1", "2", "alice@example.com", "ops@example.com"])
    );
}

#[tokio::test]
async fn test_never_policy_suppresses_success() {
    let (backend, calls) = spawn_backend(StatusCode::OK).await;
    let engine = TestEngine::start(vec![format!("jabber:{backend}")]).await;

    engine
        .http
        .post(engine.url("/applications/100/pipelines/201/notification"))
        .json(&json!({ "notifications": { "jabber": jabber_settings("never") } }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    for status in ["Success", "Fail"] {
        let response = engine
            .http
            .post(engine.url("/applications/100/pipelines/201/transition"))
            .json(&transition(status, 2))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    let calls = wait_for_calls(&calls, 1).await;
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].1["title"], "CDS TEST_APP_PIPELINE_NOTIF/TEST_APP TEST_PIPELINE Fail");
}

#[tokio::test]
async fn test_broken_backend_never_fails_the_transition() {
    let (backend, calls) = spawn_backend(StatusCode::INTERNAL_SERVER_ERROR).await;
    let engine = TestEngine::start(vec![format!("jabber:{backend}")]).await;

    engine
        .http
        .post(engine.url("/applications/100/pipelines/202/notification"))
        .json(&json!({ "notifications": { "jabber": jabber_settings("always") } }))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    let response = engine
        .http
        .post(engine.url("/applications/100/pipelines/202/transition"))
        .json(&transition("Success", 3))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);
    wait_for_calls(&calls, 1).await;

    let health = engine.http.get(engine.url("/health")).send().await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_application_delete_removes_every_pipeline() {
    let engine = TestEngine::start(Vec::new()).await;

    for pipeline in [300, 301] {
        engine
            .http
            .post(engine.url(&format!("/applications/100/pipelines/{pipeline}/notification")))
            .json(&json!({ "notifications": { "email": jabber_settings("always") } }))
            .send()
            .await
            .unwrap()
            .error_for_status()
            .unwrap();
    }

    let body: Value = engine
        .http
        .delete(engine.url("/applications/100/notification"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["deleted"], 2);

    let response = engine
        .http
        .get(engine.url("/applications/100/pipelines/300/notification"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}
