//! Storage row for one (scope, kind) notification entry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use cds_core::error::{AppError, ErrorKind};
use cds_core::result::AppResult;

use super::kind::NotificationKind;
use super::settings::{JabberEmailSettings, NotificationSettings, NotificationTemplate, TatSettings};
use crate::scope::Scope;

/// A row of `application_pipeline_notification`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct NotificationRow {
    pub application_id: i64,
    pub pipeline_id: i64,
    pub environment_id: i64,
    /// Kind name, e.g. `"jabber"`.
    pub kind: String,
    pub on_start: bool,
    pub on_success: String,
    pub on_failure: String,
    /// Kind-specific data, tagged with the settings discriminant.
    pub payload: serde_json::Value,
    pub template_subject: String,
    pub template_body: String,
    pub updated_at: DateTime<Utc>,
}

/// Opaque kind-specific payload persisted in the `payload` column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SettingsPayload {
    JabberEmail {
        recipients: Vec<String>,
        send_to_author: bool,
        send_to_groups: bool,
    },
    Tat {
        topics: Vec<String>,
    },
}

impl NotificationRow {
    /// Flatten settings into a row.
    pub fn from_settings(
        scope: Scope,
        kind: NotificationKind,
        settings: &NotificationSettings,
    ) -> AppResult<Self> {
        let payload = match settings {
            NotificationSettings::JabberEmail(s) => SettingsPayload::JabberEmail {
                recipients: s.recipients.clone(),
                send_to_author: s.send_to_author,
                send_to_groups: s.send_to_groups,
            },
            NotificationSettings::Tat(s) => SettingsPayload::Tat {
                topics: s.topics.clone(),
            },
        };
        let template = settings.template();

        Ok(Self {
            application_id: scope.application_id,
            pipeline_id: scope.pipeline_id,
            environment_id: scope.environment_id,
            kind: kind.as_str().to_string(),
            on_start: settings.on_start(),
            on_success: settings.on_success().to_string(),
            on_failure: settings.on_failure().to_string(),
            payload: serde_json::to_value(payload)?,
            template_subject: template.subject.clone(),
            template_body: template.body.clone(),
            updated_at: Utc::now(),
        })
    }

    /// Scope this row belongs to.
    pub fn scope(&self) -> Scope {
        Scope {
            application_id: self.application_id,
            pipeline_id: self.pipeline_id,
            environment_id: self.environment_id,
        }
    }

    /// Rebuild the typed settings from the row.
    pub fn into_settings(self) -> AppResult<(NotificationKind, NotificationSettings)> {
        let kind: NotificationKind = self.kind.parse().map_err(|e: AppError| {
            AppError::new(
                ErrorKind::Storage,
                format!("Stored row has invalid kind: {}", e.message),
            )
        })?;
        let payload: SettingsPayload = serde_json::from_value(self.payload).map_err(|e| {
            AppError::with_source(
                ErrorKind::Storage,
                format!("Stored payload for kind '{kind}' is unreadable"),
                e,
            )
        })?;
        let template = NotificationTemplate {
            subject: self.template_subject,
            body: self.template_body,
        };

        let settings = match payload {
            SettingsPayload::JabberEmail {
                recipients,
                send_to_author,
                send_to_groups,
            } => NotificationSettings::JabberEmail(JabberEmailSettings {
                on_start: self.on_start,
                on_success: self.on_success,
                on_failure: self.on_failure,
                recipients,
                send_to_author,
                send_to_groups,
                template,
            }),
            SettingsPayload::Tat { topics } => NotificationSettings::Tat(TatSettings {
                on_start: self.on_start,
                on_success: self.on_success,
                on_failure: self.on_failure,
                topics,
                template,
            }),
        };
        Ok((kind, settings))
    }
}
