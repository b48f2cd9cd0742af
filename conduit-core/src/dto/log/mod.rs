//! Log DTOs

use serde::{Deserialize, Serialize};

use crate::domain::log::LogType;

/// Request to append a log entry
///
/// The store assigns the identifier and the timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewLogEntry {
    #[serde(rename = "type")]
    pub kind: LogType,
    pub pipeline: String,
    pub message: String,
    pub details: Option<String>,
}

impl NewLogEntry {
    pub fn new(kind: LogType, pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            pipeline: pipeline.into(),
            message: message.into(),
            details: None,
        }
    }

    pub fn info(pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogType::Info, pipeline, message)
    }

    pub fn success(pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogType::Success, pipeline, message)
    }

    pub fn warning(pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogType::Warning, pipeline, message)
    }

    pub fn error(pipeline: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(LogType::Error, pipeline, message)
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }
}
