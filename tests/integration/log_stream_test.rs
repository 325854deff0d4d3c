//! Build logs pushed over HTTP reach the single live subscriber.

mod helpers;

use axum::http::StatusCode;
use futures::StreamExt;
use serde_json::{Value, json};

use cds_entity::log::{BuildKey, LogLine};
use cds_logstream::{StreamOutcome, classify};

use helpers::TestEngine;

const BUILD: &str = "/project/PRJ/application/APP/pipeline/PIP/build";

/// Read NDJSON lines from a streaming response until it closes.
async fn collect_lines(response: reqwest::Response) -> Vec<LogLine> {
    let mut stream = response.bytes_stream();
    let mut raw = Vec::new();
    while let Some(chunk) = stream.next().await {
        raw.extend_from_slice(&chunk.unwrap());
    }
    String::from_utf8(raw)
        .unwrap()
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

async fn push(engine: &TestEngine, path: &str, lines: Vec<LogLine>) -> Value {
    engine
        .http
        .post(engine.url(path))
        .json(&json!({ "lines": lines }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn test_failure_marker_is_delivered_in_order() {
    let engine = TestEngine::start(Vec::new()).await;

    let stream = engine
        .http
        .get(engine.url(&format!("{BUILD}/5/log/stream?env=prod")))
        .send()
        .await
        .unwrap();
    assert_eq!(stream.status(), StatusCode::OK);

    let body = push(
        &engine,
        &format!("{BUILD}/5/log?env=prod"),
        vec![
            LogLine::new(1, "compile", "cargo build"),
            LogLine::new(2, "test", "cargo test"),
            LogLine::pipeline_failed("test"),
        ],
    )
    .await;
    assert_eq!(body["data"]["delivered"], 3);

    engine
        .http
        .post(engine.url(&format!("{BUILD}/5/finish?env=prod")))
        .send()
        .await
        .unwrap()
        .error_for_status()
        .unwrap();

    let mut printed = Vec::new();
    let outcome = classify(collect_lines(stream).await, |line| printed.push(line.step));
    assert_eq!(printed, vec!["compile".to_string(), "test".to_string()]);
    match outcome {
        StreamOutcome::PipelineFailed(marker) => assert_eq!(marker.id, 0),
        StreamOutcome::Completed => panic!("marker must end the stream"),
    }
}

#[tokio::test]
async fn test_latest_build_subscriber_receives_running_build() {
    let engine = TestEngine::start(Vec::new()).await;

    let stream = engine
        .http
        .get(engine.url(&format!("{BUILD}/0/log/stream")))
        .send()
        .await
        .unwrap();
    assert!(engine.log_hub.has_subscriber(&BuildKey::new("PRJ", "APP", "PIP", None, 0)));

    let body = push(
        &engine,
        &format!("{BUILD}/12/log"),
        vec![LogLine::new(1, "deploy", "rolling out")],
    )
    .await;
    assert_eq!(body["data"]["delivered"], 1);

    let finished: Value = engine
        .http
        .post(engine.url(&format!("{BUILD}/12/finish")))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(finished["data"]["closed"], true);

    let lines = collect_lines(stream).await;
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].value, "rolling out");
    assert_eq!(classify(lines, |_| {}), StreamOutcome::Completed);
}

#[tokio::test]
async fn test_other_environment_does_not_receive_lines() {
    let engine = TestEngine::start(Vec::new()).await;

    let _stream = engine
        .http
        .get(engine.url(&format!("{BUILD}/3/log/stream?env=prod")))
        .send()
        .await
        .unwrap();

    let body = push(
        &engine,
        &format!("{BUILD}/3/log?env=staging"),
        vec![LogLine::new(1, "build", "wrong env")],
    )
    .await;
    assert_eq!(body["data"]["delivered"], 0);
    assert_eq!(body["data"]["discarded"], 1);
}
