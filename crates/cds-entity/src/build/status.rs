//! Build status enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use cds_core::error::AppError;

/// Status of a pipeline build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildStatus {
    /// Queued, not started.
    Waiting,
    /// In progress.
    Building,
    /// Finished successfully.
    Success,
    /// Finished with an error.
    Fail,
    /// Not run because the pipeline is disabled.
    Disabled,
    /// Not run because a condition was not met.
    Skipped,
}

impl BuildStatus {
    /// Check if the build is in the in-progress state.
    pub fn is_in_progress(&self) -> bool {
        matches!(self, Self::Building)
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, Self::Fail)
    }

    /// Check if the build will not change status anymore.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            Self::Success | Self::Fail | Self::Disabled | Self::Skipped
        )
    }

    /// Return the status as it appears in messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Waiting => "Waiting",
            Self::Building => "Building",
            Self::Success => "Success",
            Self::Fail => "Fail",
            Self::Disabled => "Disabled",
            Self::Skipped => "Skipped",
        }
    }
}

impl fmt::Display for BuildStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for BuildStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Waiting" => Ok(Self::Waiting),
            "Building" => Ok(Self::Building),
            "Success" => Ok(Self::Success),
            "Fail" => Ok(Self::Fail),
            "Disabled" => Ok(Self::Disabled),
            "Skipped" => Ok(Self::Skipped),
            other => Err(AppError::validation(format!("Unknown build status '{other}'"))),
        }
    }
}
