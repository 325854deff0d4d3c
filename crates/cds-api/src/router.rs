//! Route definitions for the CDS notification API.
//!
//! All routes are mounted under `/api`.

use axum::Router;
use axum::routing::{delete, get, post};

use crate::handlers;
use crate::state::AppState;

/// Build the API router and thread `AppState` through every route.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(notification_routes())
        .merge(build_routes())
        .merge(health_routes());

    Router::new().nest("/api", api_routes).with_state(state)
}

/// Notification settings per scope, plus collaborator-driven cleanup.
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/applications/{application_id}/pipelines/{pipeline_id}/notification",
            get(handlers::notification::get_notifications)
                .post(handlers::notification::replace_notifications)
                .delete(handlers::notification::delete_notifications),
        )
        .route(
            "/applications/{application_id}/notification",
            delete(handlers::notification::delete_for_application),
        )
        .route(
            "/pipelines/{pipeline_id}/notification",
            delete(handlers::notification::delete_for_pipeline),
        )
        .route(
            "/environments/{environment_id}/notification",
            delete(handlers::notification::delete_for_environment),
        )
        .route("/notification/type", get(handlers::notification::list_types))
}

/// Build transitions and build logs.
fn build_routes() -> Router<AppState> {
    const BUILD: &str = "/project/{key}/application/{app}/pipeline/{pipeline}/build/{build_number}";

    Router::new()
        .route(
            "/applications/{application_id}/pipelines/{pipeline_id}/transition",
            post(handlers::build::report_transition),
        )
        .route(&format!("{BUILD}/log"), post(handlers::build::ingest_log))
        .route(&format!("{BUILD}/finish"), post(handlers::build::finish_build))
        .route(&format!("{BUILD}/log/stream"), get(handlers::build::stream_log))
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
