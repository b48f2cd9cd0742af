//! Dialog flows
//!
//! Multi-step flows opened when a command returns a [`DialogRequest`].
//! Opening a dialog changes nothing; the store is only touched once the
//! user confirms a step. Progress and phase changes are published on a
//! `tokio::sync::watch` channel so a shell can render them while a step
//! is being awaited.
//!
//! [`DialogRequest`]: conduit_core::dto::command::DialogRequest

mod canary;
mod hotfix;
mod terraform;

pub use canary::{CanaryDialog, CanaryMetrics, CanaryPhase, CanaryState};
pub use hotfix::{HotfixDialog, HotfixForm};
pub use terraform::{PlannedChange, TerraformDialog, TerraformPhase, TerraformPlan, TerraformState};

use std::time::Duration;

/// Formats a duration the way pipelines display it, e.g. `2m 15s`
pub(crate) fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    format!("{}m {}s", secs / 60, secs % 60)
}
