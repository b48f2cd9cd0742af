//! Pipeline domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A simulated CI/CD pipeline execution record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pipeline {
    pub id: u64,
    pub name: String,
    pub status: PipelineStatus,
    pub branch: String,
    /// Human readable, e.g. "2 minutes ago"
    pub last_run: String,
    /// Human readable, e.g. "3m 24s"
    pub duration: String,
    pub commit: String,
    pub author: String,
    pub version: Option<String>,
    pub environment: Option<String>,
    pub canary_percentage: Option<u8>,
}

impl Pipeline {
    /// Returns true if the pipeline targets the given environment
    pub fn is_in(&self, environment: &str) -> bool {
        self.environment.as_deref() == Some(environment)
    }
}

/// Pipeline execution status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    Success,
    Running,
    Failed,
    Stopped,
}

impl PipelineStatus {
    pub const ALL: [PipelineStatus; 4] = [
        PipelineStatus::Success,
        PipelineStatus::Running,
        PipelineStatus::Failed,
        PipelineStatus::Stopped,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PipelineStatus::Success => "success",
            PipelineStatus::Running => "running",
            PipelineStatus::Failed => "failed",
            PipelineStatus::Stopped => "stopped",
        }
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PipelineStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "success" => Ok(PipelineStatus::Success),
            "running" => Ok(PipelineStatus::Running),
            "failed" => Ok(PipelineStatus::Failed),
            "stopped" => Ok(PipelineStatus::Stopped),
            other => Err(format!("unknown pipeline status '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in PipelineStatus::ALL {
            assert_eq!(status.as_str().parse::<PipelineStatus>(), Ok(status));
        }
        assert_eq!("RUNNING".parse::<PipelineStatus>(), Ok(PipelineStatus::Running));
        assert!("paused".parse::<PipelineStatus>().is_err());
    }

    #[test]
    fn test_pipeline_serializes_camel_case() {
        let pipeline = Pipeline {
            id: 1,
            name: "frontend-production".to_string(),
            status: PipelineStatus::Running,
            branch: "main".to_string(),
            last_run: "just now".to_string(),
            duration: "0m 0s".to_string(),
            commit: "feat: thing".to_string(),
            author: "ai-assistant".to_string(),
            version: None,
            environment: Some("production".to_string()),
            canary_percentage: Some(10),
        };

        let json = serde_json::to_value(&pipeline).unwrap();
        assert_eq!(json["lastRun"], "just now");
        assert_eq!(json["status"], "running");
        assert_eq!(json["canaryPercentage"], 10);
        assert!(pipeline.is_in("production"));
        assert!(!pipeline.is_in("staging"));
    }
}
