//! Log stream key.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::scope::NO_ENVIRONMENT_NAME;

/// Build number addressing whichever build of a pipeline runs next.
pub const LATEST_BUILD: i64 = 0;

/// Identifies one build whose log can be streamed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BuildKey {
    pub project: String,
    pub application: String,
    pub pipeline: String,
    pub environment: String,
    /// Build number, 0 meaning the latest build.
    pub build_number: i64,
}

impl BuildKey {
    pub fn new(
        project: impl Into<String>,
        application: impl Into<String>,
        pipeline: impl Into<String>,
        environment: Option<String>,
        build_number: i64,
    ) -> Self {
        Self {
            project: project.into(),
            application: application.into(),
            pipeline: pipeline.into(),
            environment: environment.unwrap_or_else(|| NO_ENVIRONMENT_NAME.to_string()),
            build_number,
        }
    }

    pub fn is_latest(&self) -> bool {
        self.build_number == LATEST_BUILD
    }

    /// The same pipeline and environment, addressed as its latest build.
    pub fn latest(&self) -> Self {
        Self {
            build_number: LATEST_BUILD,
            ..self.clone()
        }
    }
}

impl fmt::Display for BuildKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}/{}/{}#{} ({})",
            self.project, self.application, self.pipeline, self.build_number, self.environment
        )
    }
}
