//! Build transition and build log handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use futures::StreamExt;
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use cds_entity::build::BuildStatusEvent;
use cds_entity::log::BuildKey;
use cds_entity::scope::Scope;
use cds_notification::BuildTransition;

use crate::dto::request::{BuildQuery, IngestLogRequest, TransitionRequest};
use crate::dto::response::{ApiResponse, FinishResponse, IngestLogResponse};
use crate::state::AppState;

/// POST /api/applications/{app}/pipelines/{pip}/transition
///
/// Always accepted; notification work happens after the response.
/// A terminal status also closes the build's log stream.
pub async fn report_transition(
    State(state): State<AppState>,
    Path((application_id, pipeline_id)): Path<(i64, i64)>,
    Json(req): Json<TransitionRequest>,
) -> StatusCode {
    let event = BuildStatusEvent::new(
        req.event.previous_status,
        req.event.current_status,
        req.event.context,
    );

    if event.current_status.is_terminal() {
        let ctx = &event.context;
        state.log_hub.finish(&BuildKey::new(
            ctx.project.as_str(),
            ctx.application.as_str(),
            ctx.pipeline.as_str(),
            Some(ctx.environment.clone()),
            ctx.build_number,
        ));
    }

    let transition = BuildTransition {
        scope: Scope::new(application_id, pipeline_id, req.environment_id),
        event,
    };

    match state.transitions.try_send(transition) {
        Ok(()) => {}
        Err(TrySendError::Full(transition)) | Err(TrySendError::Closed(transition)) => {
            warn!(scope = %transition.scope, "Transition queue unavailable, notifying directly");
            state.notifier.notify(transition.scope, transition.event);
        }
    }
    StatusCode::ACCEPTED
}

type BuildPath = (String, String, String, i64);

fn build_key((project, application, pipeline, build_number): BuildPath, query: BuildQuery) -> BuildKey {
    BuildKey::new(project, application, pipeline, query.env, build_number)
}

/// POST /api/project/{key}/application/{app}/pipeline/{pip}/build/{n}/log
///
/// Waits while the subscriber's queue is full.
pub async fn ingest_log(
    State(state): State<AppState>,
    Path(path): Path<BuildPath>,
    Query(query): Query<BuildQuery>,
    Json(req): Json<IngestLogRequest>,
) -> Json<ApiResponse<IngestLogResponse>> {
    let publisher = state.log_hub.publisher(build_key(path, query));
    let total = req.lines.len();
    let mut delivered = 0;

    for line in req.lines {
        if let Err(e) = publisher.push(line).await {
            debug!(error = %e, "Dropping log lines");
            break;
        }
        delivered += 1;
    }

    Json(ApiResponse::ok(IngestLogResponse {
        delivered,
        discarded: total - delivered,
    }))
}

/// POST /api/project/{key}/application/{app}/pipeline/{pip}/build/{n}/finish
pub async fn finish_build(
    State(state): State<AppState>,
    Path(path): Path<BuildPath>,
    Query(query): Query<BuildQuery>,
) -> Json<ApiResponse<FinishResponse>> {
    let closed = state.log_hub.finish(&build_key(path, query));
    Json(ApiResponse::ok(FinishResponse { closed }))
}

/// GET /api/project/{key}/application/{app}/pipeline/{pip}/build/{n}/log/stream
///
/// Newline-delimited JSON, one line per log line, until the build finishes
/// or a newer subscriber takes over.
pub async fn stream_log(
    State(state): State<AppState>,
    Path(path): Path<BuildPath>,
    Query(query): Query<BuildQuery>,
) -> Response {
    let subscription = state.log_hub.subscribe(build_key(path, query));

    let body = subscription.into_stream().map(|line| {
        serde_json::to_vec(&line).map(|mut bytes| {
            bytes.push(b'\n');
            Bytes::from(bytes)
        })
    });

    (
        [(header::CONTENT_TYPE, "application/x-ndjson")],
        Body::from_stream(body),
    )
        .into_response()
}
