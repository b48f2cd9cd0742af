//! Error types for the Conduit engine
//!
//! Command processing never fails with an error: unrecognized commands and
//! missing targets come back as unsuccessful `CommandResult`s. These errors
//! cover the direct pipeline actions, the dialog flows and log export.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    /// No pipeline with this identifier
    #[error("Pipeline not found: {0}")]
    PipelineNotFound(u64),

    /// Input rejected before touching the store
    #[error("Validation error: {0}")]
    Validation(String),

    /// Dialog action attempted in a phase that does not allow it
    #[error("Cannot {action} {dialog} dialog while in phase '{phase}'")]
    InvalidPhase {
        dialog: &'static str,
        phase: String,
        action: &'static str,
    },

    /// Canary traffic share outside the allowed range
    #[error("Invalid canary percentage {0}: must be 5-50 in steps of 5")]
    InvalidPercentage(u8),

    /// Writing an export file failed
    #[error("Failed to export logs: {0}")]
    Export(#[from] std::io::Error),
}

impl EngineError {
    pub(crate) fn invalid_phase(
        dialog: &'static str,
        phase: impl std::fmt::Display,
        action: &'static str,
    ) -> Self {
        Self::InvalidPhase {
            dialog,
            phase: phase.to_string(),
            action,
        }
    }

    /// Check if this error is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::PipelineNotFound(_))
    }
}
