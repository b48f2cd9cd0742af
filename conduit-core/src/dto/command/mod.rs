//! Command result DTOs
//!
//! The outcome of processing one free-text command. Failures are values,
//! never errors: the shell renders both cases inline.

use serde::{Deserialize, Serialize};

use crate::domain::command::CommandStatus;

/// Result of interpreting and dispatching a command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommandResult {
    pub success: bool,
    pub message: String,
    /// Set when the command continues in a multi-step dialog
    #[serde(skip_serializing_if = "Option::is_none")]
    pub requires_dialog: Option<DialogRequest>,
}

impl CommandResult {
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
            requires_dialog: None,
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            requires_dialog: None,
        }
    }

    pub fn dialog(message: impl Into<String>, request: DialogRequest) -> Self {
        Self {
            success: true,
            message: message.into(),
            requires_dialog: Some(request),
        }
    }

    /// Status recorded in the command history for this result
    pub fn history_status(&self) -> CommandStatus {
        match (self.success, &self.requires_dialog) {
            (false, _) => CommandStatus::Error,
            (true, Some(_)) => CommandStatus::Pending,
            (true, None) => CommandStatus::Success,
        }
    }
}

/// A dialog the shell must open, with the parameters extracted from the command
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "dialog", rename_all = "lowercase")]
pub enum DialogRequest {
    Canary(CanaryRequest),
    Hotfix(HotfixRequest),
    Terraform(TerraformRequest),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanaryRequest {
    pub service: String,
    pub version: String,
    pub environment: String,
    pub percentage: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HotfixRequest {
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerraformRequest {
    pub stack: String,
    pub environment: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_status() {
        assert_eq!(CommandResult::ok("done").history_status(), CommandStatus::Success);
        assert_eq!(CommandResult::failure("nope").history_status(), CommandStatus::Error);
        let dialog = CommandResult::dialog(
            "opening",
            DialogRequest::Hotfix(HotfixRequest {
                version: "2.3.0".to_string(),
            }),
        );
        assert_eq!(dialog.history_status(), CommandStatus::Pending);
    }

    #[test]
    fn test_dialog_request_is_tagged() {
        let request = DialogRequest::Terraform(TerraformRequest {
            stack: "vpc".to_string(),
            environment: "prod".to_string(),
        });
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["dialog"], "terraform");
        assert_eq!(json["stack"], "vpc");
    }
}
