//! CLI client configuration.

use serde::{Deserialize, Serialize};

/// Settings read by the `cds` command-line client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// Base URL of the engine API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
        }
    }
}

fn default_api_url() -> String {
    "http://localhost:8081".to_string()
}
