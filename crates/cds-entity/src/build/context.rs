//! Build context exposed to notification templates.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::{Deserialize, Serialize};

use super::status::BuildStatus;
use crate::scope::NO_ENVIRONMENT_NAME;

/// Identifies the build whose status changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildContext {
    /// Project key.
    pub project: String,
    pub application: String,
    pub pipeline: String,
    /// Environment name, `NoEnv` when the pipeline has none.
    #[serde(default = "default_environment")]
    pub environment: String,
    pub build_number: i64,
    pub status: BuildStatus,
    /// Username of whoever triggered the build, if known.
    #[serde(default)]
    pub triggered_by: Option<String>,
}

impl BuildContext {
    /// Human-facing deep link to the build page. Names are percent-encoded.
    pub fn build_url(&self, base_url: &str) -> String {
        format!(
            "{}/#/project/{}/application/{}/pipeline/{}/build/{}?env={}&tab=detail",
            base_url.trim_end_matches('/'),
            utf8_percent_encode(&self.project, COMPONENT),
            utf8_percent_encode(&self.application, COMPONENT),
            utf8_percent_encode(&self.pipeline, COMPONENT),
            self.build_number,
            utf8_percent_encode(&self.environment, COMPONENT)
        )
    }
}

/// Everything but RFC 3986 unreserved characters.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

fn default_environment() -> String {
    NO_ENVIRONMENT_NAME.to_string()
}
