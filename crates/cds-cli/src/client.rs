//! HTTP client for the engine API.

use std::time::Duration;

use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;

use cds_core::config::CliConfig;
use cds_core::error::{AppError, ErrorKind};
use cds_core::result::AppResult;
use cds_entity::log::BuildKey;
use cds_entity::notification::NotificationSet;
use cds_entity::scope::Scope;

const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Thin wrapper over the engine's `/api` routes.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

fn transport_error(url: &str, e: reqwest::Error) -> AppError {
    AppError::with_source(ErrorKind::Internal, format!("Cannot reach {url}: {e}"), e)
}

async fn check(url: &str, response: Response) -> AppResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = serde_json::from_str::<Value>(&body)
        .ok()
        .and_then(|v| v["message"].as_str().map(str::to_string))
        .unwrap_or(body);

    let kind = if status == StatusCode::BAD_REQUEST {
        ErrorKind::Validation
    } else if status == StatusCode::NOT_FOUND {
        ErrorKind::NotFound
    } else {
        ErrorKind::Internal
    };
    Err(AppError::new(kind, format!("{url} answered {status}: {message}")))
}

impl ApiClient {
    pub fn new(config: &CliConfig) -> AppResult<Self> {
        let http = Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .map_err(|e| {
                AppError::with_source(ErrorKind::Configuration, "Failed to build HTTP client", e)
            })?;

        Ok(Self {
            http,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    fn scope_url(&self, scope: &Scope) -> String {
        format!(
            "{}/api/applications/{}/pipelines/{}/notification?environment_id={}",
            self.base_url, scope.application_id, scope.pipeline_id, scope.environment_id
        )
    }

    /// The scope's notification set, `None` when nothing is configured.
    pub async fn notification_set(&self, scope: &Scope) -> AppResult<Option<NotificationSet>> {
        let url = self.scope_url(scope);
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let response = check(&url, response).await?;

        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let set = response
            .json::<NotificationSet>()
            .await
            .map_err(|e| transport_error(&url, e))?;
        Ok(Some(set))
    }

    /// Remove the scope's settings; returns the number of kinds removed.
    pub async fn delete_notifications(&self, scope: &Scope) -> AppResult<u64> {
        let url = self.scope_url(scope);
        let response = self
            .http
            .delete(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        let body: Value = check(&url, response)
            .await?
            .json()
            .await
            .map_err(|e| transport_error(&url, e))?;
        Ok(body["data"]["deleted"].as_u64().unwrap_or(0))
    }

    /// Open a build's NDJSON log stream.
    pub async fn stream_log(&self, key: &BuildKey, environment: Option<&str>) -> AppResult<Response> {
        let invalid = || AppError::configuration(format!("Invalid API URL '{}'", self.base_url));
        let mut url = Url::parse(&self.base_url).map_err(|_| invalid())?;
        url.path_segments_mut()
            .map_err(|_| invalid())?
            .pop_if_empty()
            .extend([
                "api",
                "project",
                key.project.as_str(),
                "application",
                key.application.as_str(),
                "pipeline",
                key.pipeline.as_str(),
                "build",
                key.build_number.to_string().as_str(),
                "log",
                "stream",
            ]);
        if let Some(env) = environment {
            url.query_pairs_mut().append_pair("env", env);
        }

        let url = url.to_string();
        let response = self
            .http
            .get(&url)
            .send()
            .await
            .map_err(|e| transport_error(&url, e))?;
        check(&url, response).await
    }
}
