//! Build log streaming configuration.

use serde::{Deserialize, Serialize};

/// Build log streaming settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogStreamConfig {
    /// Capacity of the bounded handoff queue between a build's log
    /// producer and its subscriber.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
}

impl Default for LogStreamConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
        }
    }
}

fn default_buffer_size() -> usize {
    64
}
