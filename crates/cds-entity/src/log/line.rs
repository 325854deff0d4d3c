//! A single build log line.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Text that, on a line with id 0, signals the whole pipeline failed.
pub const FAILURE_MARKER: &str = "status: Fail";

/// One line emitted by a build step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLine {
    /// Line identifier. Id 0 is reserved for engine-generated lines.
    pub id: i64,
    pub timestamp: DateTime<Utc>,
    /// Action/step that produced the line.
    pub step: String,
    pub value: String,
}

impl LogLine {
    pub fn new(id: i64, step: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            id,
            timestamp: Utc::now(),
            step: step.into(),
            value: value.into(),
        }
    }

    /// Engine-generated line announcing the pipeline failed.
    pub fn pipeline_failed(step: impl Into<String>) -> Self {
        Self::new(0, step, FAILURE_MARKER)
    }

    /// Whether this line is the semantic pipeline failure signal.
    pub fn is_failure_marker(&self) -> bool {
        self.id == 0 && self.value.contains(FAILURE_MARKER)
    }
}
