//! Request DTOs.

use std::collections::BTreeMap;

use serde::Deserialize;

use cds_entity::build::BuildStatusEvent;
use cds_entity::log::LogLine;
use cds_entity::notification::NotificationSettings;

/// `?environment_id=` on scope-addressed routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScopeQuery {
    pub environment_id: Option<i64>,
}

/// `?env=` on build-addressed routes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BuildQuery {
    pub env: Option<String>,
}

/// Full replacement of a scope's notification set.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplaceNotificationsRequest {
    #[serde(default)]
    pub environment_id: Option<i64>,
    /// Settings keyed by kind name.
    #[serde(default)]
    pub notifications: BTreeMap<String, NotificationSettings>,
}

/// A build status transition reported by the pipeline engine.
#[derive(Debug, Clone, Deserialize)]
pub struct TransitionRequest {
    #[serde(default)]
    pub environment_id: Option<i64>,
    #[serde(flatten)]
    pub event: BuildStatusEvent,
}

/// Lines pushed by a running build.
#[derive(Debug, Clone, Deserialize)]
pub struct IngestLogRequest {
    pub lines: Vec<LogLine>,
}
