//! Log domain types

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A log entry produced by a command, a completion or a dialog flow
///
/// `pipeline` is a free-text reference; it is not checked against the
/// pipeline collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: u64,
    /// Local time, formatted `YYYY-MM-DD HH:MM:SS`
    pub timestamp: String,
    #[serde(rename = "type")]
    pub kind: LogType,
    pub pipeline: String,
    pub message: String,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogType {
    Info,
    Success,
    Error,
    Warning,
}

impl LogType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogType::Info => "info",
            LogType::Success => "success",
            LogType::Error => "error",
            LogType::Warning => "warning",
        }
    }
}

impl fmt::Display for LogType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(LogType::Info),
            "success" => Ok(LogType::Success),
            "error" => Ok(LogType::Error),
            "warning" | "warn" => Ok(LogType::Warning),
            other => Err(format!("unknown log type '{}'", other)),
        }
    }
}
