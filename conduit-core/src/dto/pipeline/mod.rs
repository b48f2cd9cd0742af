//! Pipeline DTOs

use serde::{Deserialize, Serialize};

use crate::domain::pipeline::{Pipeline, PipelineStatus};

/// Request to create a new pipeline
///
/// The store assigns the identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPipeline {
    pub name: String,
    pub status: PipelineStatus,
    pub branch: String,
    pub last_run: String,
    pub duration: String,
    pub commit: String,
    pub author: String,
    pub version: Option<String>,
    pub environment: Option<String>,
    pub canary_percentage: Option<u8>,
}

impl NewPipeline {
    /// A pipeline that has just been started
    pub fn running(
        name: impl Into<String>,
        branch: impl Into<String>,
        commit: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            status: PipelineStatus::Running,
            branch: branch.into(),
            last_run: "just now".to_string(),
            duration: "0m 0s".to_string(),
            commit: commit.into(),
            author: author.into(),
            version: None,
            environment: None,
            canary_percentage: None,
        }
    }

    pub fn with_status(mut self, status: PipelineStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_environment(mut self, environment: impl Into<String>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn with_canary_percentage(mut self, percentage: u8) -> Self {
        self.canary_percentage = Some(percentage);
        self
    }

    /// Attaches an identifier, producing the stored entity
    pub fn into_pipeline(self, id: u64) -> Pipeline {
        Pipeline {
            id,
            name: self.name,
            status: self.status,
            branch: self.branch,
            last_run: self.last_run,
            duration: self.duration,
            commit: self.commit,
            author: self.author,
            version: self.version,
            environment: self.environment,
            canary_percentage: self.canary_percentage,
        }
    }
}

/// Partial update merged into an existing pipeline
///
/// Fields left as `None` are not touched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PipelineUpdate {
    pub status: Option<PipelineStatus>,
    pub last_run: Option<String>,
    pub duration: Option<String>,
    pub version: Option<String>,
    pub environment: Option<String>,
    pub canary_percentage: Option<u8>,
}

impl PipelineUpdate {
    pub fn status(status: PipelineStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// The usual completion update: `success` with the given duration
    pub fn succeeded(duration: impl Into<String>) -> Self {
        Self::status(PipelineStatus::Success).with_duration(duration)
    }

    pub fn with_duration(mut self, duration: impl Into<String>) -> Self {
        self.duration = Some(duration.into());
        self
    }

    pub fn with_last_run(mut self, last_run: impl Into<String>) -> Self {
        self.last_run = Some(last_run.into());
        self
    }

    pub fn with_canary_percentage(mut self, percentage: u8) -> Self {
        self.canary_percentage = Some(percentage);
        self
    }

    pub fn apply_to(&self, pipeline: &mut Pipeline) {
        if let Some(status) = self.status {
            pipeline.status = status;
        }
        if let Some(last_run) = &self.last_run {
            pipeline.last_run = last_run.clone();
        }
        if let Some(duration) = &self.duration {
            pipeline.duration = duration.clone();
        }
        if let Some(version) = &self.version {
            pipeline.version = Some(version.clone());
        }
        if let Some(environment) = &self.environment {
            pipeline.environment = Some(environment.clone());
        }
        if let Some(percentage) = self.canary_percentage {
            pipeline.canary_percentage = Some(percentage);
        }
    }
}
