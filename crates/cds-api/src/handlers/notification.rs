//! Notification settings handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use tracing::info;

use cds_entity::notification::{NotificationKind, NotificationSet};
use cds_entity::scope::Scope;

use crate::dto::request::{ReplaceNotificationsRequest, ScopeQuery};
use crate::dto::response::{ApiResponse, DeletedResponse};
use crate::error::ApiError;
use crate::state::AppState;

/// Render a loaded set, or 204 when the scope has none.
fn set_or_no_content(set: Option<NotificationSet>) -> Response {
    match set {
        Some(set) => (StatusCode::OK, Json(set)).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

/// GET /api/applications/{app}/pipelines/{pip}/notification
pub async fn get_notifications(
    State(state): State<AppState>,
    Path((application_id, pipeline_id)): Path<(i64, i64)>,
    Query(query): Query<ScopeQuery>,
) -> Result<Response, ApiError> {
    let scope = Scope::new(application_id, pipeline_id, query.environment_id);
    let set = state.store.load(&scope).await?;
    Ok(set_or_no_content(set))
}

/// POST /api/applications/{app}/pipelines/{pip}/notification
///
/// Replaces the whole set and echoes what was stored.
pub async fn replace_notifications(
    State(state): State<AppState>,
    Path((application_id, pipeline_id)): Path<(i64, i64)>,
    Json(req): Json<ReplaceNotificationsRequest>,
) -> Result<Response, ApiError> {
    let scope = Scope::new(application_id, pipeline_id, req.environment_id);
    let set = NotificationSet::from_named(scope, req.notifications)?;

    state.store.replace(&set).await?;
    info!(%scope, kinds = set.len(), "Notification settings replaced");

    let stored = state.store.load(&scope).await?;
    Ok(set_or_no_content(stored))
}

/// DELETE /api/applications/{app}/pipelines/{pip}/notification
pub async fn delete_notifications(
    State(state): State<AppState>,
    Path((application_id, pipeline_id)): Path<(i64, i64)>,
    Query(query): Query<ScopeQuery>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let scope = Scope::new(application_id, pipeline_id, query.environment_id);
    let deleted = state.store.delete_scope(&scope).await?;
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted })))
}

/// DELETE /api/applications/{app}/notification
pub async fn delete_for_application(
    State(state): State<AppState>,
    Path(application_id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let deleted = state.store.delete_for_application(application_id).await?;
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted })))
}

/// DELETE /api/pipelines/{pip}/notification
pub async fn delete_for_pipeline(
    State(state): State<AppState>,
    Path(pipeline_id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let deleted = state.store.delete_for_pipeline(pipeline_id).await?;
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted })))
}

/// DELETE /api/environments/{env}/notification
pub async fn delete_for_environment(
    State(state): State<AppState>,
    Path(environment_id): Path<i64>,
) -> Result<Json<ApiResponse<DeletedResponse>>, ApiError> {
    let deleted = state.store.delete_for_environment(environment_id).await?;
    Ok(Json(ApiResponse::ok(DeletedResponse { deleted })))
}

/// GET /api/notification/type
pub async fn list_types() -> Json<Vec<&'static str>> {
    Json(NotificationKind::names())
}
