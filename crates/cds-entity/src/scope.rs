//! Notification configuration scope.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Environment identifier used when a pipeline runs without an environment.
pub const NO_ENVIRONMENT_ID: i64 = 1;

/// Display name of the "no environment" sentinel.
pub const NO_ENVIRONMENT_NAME: &str = "NoEnv";

/// Identifies exactly one notification configuration set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Scope {
    /// Owning application.
    pub application_id: i64,
    /// Pipeline attached to the application.
    pub pipeline_id: i64,
    /// Target environment, [`NO_ENVIRONMENT_ID`] when unspecified.
    #[serde(default = "default_environment")]
    pub environment_id: i64,
}

impl Scope {
    /// Build a scope, falling back to the "no environment" sentinel.
    pub fn new(application_id: i64, pipeline_id: i64, environment_id: Option<i64>) -> Self {
        Self {
            application_id,
            pipeline_id,
            environment_id: environment_id.unwrap_or(NO_ENVIRONMENT_ID),
        }
    }

    /// Whether this scope targets the "no environment" sentinel.
    pub fn has_no_environment(&self) -> bool {
        self.environment_id == NO_ENVIRONMENT_ID
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "app={} pipeline={} env={}",
            self.application_id, self.pipeline_id, self.environment_id
        )
    }
}

fn default_environment() -> i64 {
    NO_ENVIRONMENT_ID
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_defaults_to_sentinel() {
        let scope = Scope::new(10, 20, None);
        assert_eq!(scope.environment_id, NO_ENVIRONMENT_ID);
        assert!(scope.has_no_environment());
        assert!(!Scope::new(10, 20, Some(7)).has_no_environment());
    }

    #[test]
    fn test_deserialize_without_environment() {
        let scope: Scope =
            serde_json::from_str(r#"{"application_id": 3, "pipeline_id": 4}"#).unwrap();
        assert_eq!(scope, Scope::new(3, 4, None));
    }
}
