//! Pipeline status summary

use conduit_core::domain::pipeline::{Pipeline, PipelineStatus};
use serde::Serialize;

/// Per-status pipeline counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub running: usize,
    pub success: usize,
    pub failed: usize,
    pub stopped: usize,
}

impl StatusSummary {
    pub fn from_pipelines(pipelines: &[Pipeline]) -> Self {
        pipelines
            .iter()
            .fold(Self::default(), |mut summary, pipeline| {
                summary.total += 1;
                match pipeline.status {
                    PipelineStatus::Running => summary.running += 1,
                    PipelineStatus::Success => summary.success += 1,
                    PipelineStatus::Failed => summary.failed += 1,
                    PipelineStatus::Stopped => summary.stopped += 1,
                }
                summary
            })
    }

    pub fn count(&self, status: PipelineStatus) -> usize {
        match status {
            PipelineStatus::Running => self.running,
            PipelineStatus::Success => self.success,
            PipelineStatus::Failed => self.failed,
            PipelineStatus::Stopped => self.stopped,
        }
    }
}

pub fn status_icon(status: PipelineStatus) -> &'static str {
    match status {
        PipelineStatus::Success => "✅",
        PipelineStatus::Running => "🔄",
        PipelineStatus::Failed => "❌",
        PipelineStatus::Stopped => "⏸️",
    }
}

/// Formatted status overview: counts line followed by one line per pipeline
pub fn render_report(pipelines: &[Pipeline]) -> String {
    let summary = StatusSummary::from_pipelines(pipelines);

    let lines: Vec<String> = pipelines
        .iter()
        .map(|p| {
            format!(
                "{} {}: {} ({})",
                status_icon(p.status),
                p.name,
                p.status.as_str().to_uppercase(),
                p.environment.as_deref().unwrap_or("unknown")
            )
        })
        .collect();

    format!(
        "📊 Pipeline Status Overview:\n\n\
         Total: {} | Running: {} | Success: {} | Failed: {} | Stopped: {}\n\n{}",
        summary.total,
        summary.running,
        summary.success,
        summary.failed,
        summary.stopped,
        lines.join("\n")
    )
}
