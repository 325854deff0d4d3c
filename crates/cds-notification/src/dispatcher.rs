//! Outbound calls to dispatch backends.

use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use cds_core::error::{AppError, ErrorKind};
use cds_core::result::AppResult;
use cds_entity::notification::NotificationKind;

use crate::registry::NotificationRegistry;

/// Why a dispatch call did not succeed.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("no destination registered for kind '{0}'")]
    NoDestination(NotificationKind),
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{url} answered {status}")]
    Rejected { url: String, status: u16 },
}

impl From<DispatchError> for AppError {
    fn from(err: DispatchError) -> Self {
        AppError::with_source(ErrorKind::Dispatch, err.to_string(), err)
    }
}

/// Body posted to `{destination}/{kind}/build`.
#[derive(Debug, Clone, Serialize)]
pub struct OutboundNotification<'a> {
    pub title: &'a str,
    pub message: &'a str,
    pub recipients: &'a [String],
}

/// Sends rendered notifications to the backend registered for their kind.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    client: reqwest::Client,
    registry: Arc<NotificationRegistry>,
}

impl Dispatcher {
    /// Create a dispatcher whose calls give up after `timeout`.
    pub fn new(registry: Arc<NotificationRegistry>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Cannot build HTTP client", e)
            })?;
        Ok(Self { client, registry })
    }

    pub fn registry(&self) -> &NotificationRegistry {
        &self.registry
    }

    /// Issue a single call for `kind`. Not retried.
    pub async fn send(
        &self,
        kind: NotificationKind,
        subject: &str,
        body: &str,
        recipients: &[String],
    ) -> Result<(), DispatchError> {
        let destination = self
            .registry
            .lookup(kind)
            .map_err(|_| DispatchError::NoDestination(kind))?;
        let url = format!("{destination}/{kind}/build");

        let payload = OutboundNotification {
            title: subject,
            message: body,
            recipients,
        };

        let response = self
            .client
            .post(&url)
            .json(&payload)
            .send()
            .await
            .map_err(|source| DispatchError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(DispatchError::Rejected {
                url,
                status: status.as_u16(),
            });
        }

        debug!(%kind, %url, recipients = recipients.len(), "Notification dispatched");
        Ok(())
    }
}
