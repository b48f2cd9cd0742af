//! Command history domain types

use serde::{Deserialize, Serialize};

/// Audit record of one submitted command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRecord {
    pub id: u64,
    pub command: String,
    /// Local wall-clock time, formatted `HH:MM:SS`
    pub timestamp: String,
    pub response: String,
    pub status: CommandStatus,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommandStatus {
    Success,
    Error,
    /// The command opened a dialog that has not been confirmed yet
    Pending,
}
