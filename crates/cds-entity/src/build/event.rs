//! Build status transition event.

use serde::{Deserialize, Serialize};

use super::context::BuildContext;
use super::status::BuildStatus;

/// A change in a build's status raised by the pipeline engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildStatusEvent {
    /// Status before the transition, absent for a fresh build.
    #[serde(default)]
    pub previous_status: Option<BuildStatus>,
    pub current_status: BuildStatus,
    pub context: BuildContext,
}

impl BuildStatusEvent {
    /// Create an event; the context status follows `current`.
    pub fn new(previous: Option<BuildStatus>, current: BuildStatus, mut context: BuildContext) -> Self {
        context.status = current;
        Self {
            previous_status: previous,
            current_status: current,
            context,
        }
    }
}
