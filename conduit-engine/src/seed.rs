//! Demo data
//!
//! The pipelines and logs a fresh dashboard starts with, so that status,
//! rollback and stop commands have something to act on.

use conduit_core::domain::log::{LogEntry, LogType};
use conduit_core::domain::pipeline::{Pipeline, PipelineStatus};

use crate::store::Store;

/// Store pre-populated with the demo pipelines and logs
pub fn demo_store() -> Store {
    Store::with_entities(demo_pipelines(), demo_logs())
}

pub fn demo_pipelines() -> Vec<Pipeline> {
    vec![
        pipeline(
            1,
            "frontend-production",
            PipelineStatus::Success,
            ("main", "2 minutes ago", "3m 24s"),
            ("feat: Add new dashboard", "john.doe"),
            Some("v1.2.3"),
            "production",
        ),
        pipeline(
            2,
            "backend-api-deploy",
            PipelineStatus::Running,
            ("develop", "30 seconds ago", "1m 12s"),
            ("fix: Auth middleware bug", "jane.smith"),
            Some("v2.1.0"),
            "staging",
        ),
        pipeline(
            3,
            "mobile-app-build",
            PipelineStatus::Success,
            ("main", "15 minutes ago", "5m 48s"),
            ("chore: Update dependencies", "mike.wilson"),
            Some("v3.0.1"),
            "production",
        ),
        pipeline(
            4,
            "data-pipeline-etl",
            PipelineStatus::Failed,
            ("feature/analytics", "1 hour ago", "2m 05s"),
            ("feat: New analytics module", "sarah.jones"),
            None,
            "development",
        ),
        pipeline(
            5,
            "ml-model-training",
            PipelineStatus::Success,
            ("main", "3 hours ago", "12m 32s"),
            ("model: Improve accuracy", "alex.chen"),
            Some("v1.5.2"),
            "production",
        ),
        pipeline(
            6,
            "infrastructure-deploy",
            PipelineStatus::Running,
            ("staging", "5 minutes ago", "4m 01s"),
            ("infra: Scale up resources", "chris.lee"),
            None,
            "staging",
        ),
    ]
}

pub fn demo_logs() -> Vec<LogEntry> {
    vec![
        log(
            1,
            "2024-11-04 14:23:45",
            LogType::Success,
            "frontend-production",
            "Build completed successfully",
            "All tests passed. Deployed to production.",
        ),
        log(
            2,
            "2024-11-04 14:22:10",
            LogType::Info,
            "backend-api-deploy",
            "Starting deployment process",
            "Initiating deployment to staging environment",
        ),
        log(
            3,
            "2024-11-04 14:15:33",
            LogType::Error,
            "data-pipeline-etl",
            "Build failed: Test suite errors",
            "Error: Connection timeout in analytics module tests",
        ),
        log(
            4,
            "2024-11-04 14:10:22",
            LogType::Warning,
            "mobile-app-build",
            "Deprecated API usage detected",
            "Warning: Legacy authentication method will be removed in v4.0",
        ),
        log(
            5,
            "2024-11-04 13:45:18",
            LogType::Success,
            "ml-model-training",
            "Model training completed",
            "Accuracy improved by 3.2%. Model deployed successfully.",
        ),
    ]
}

fn pipeline(
    id: u64,
    name: &str,
    status: PipelineStatus,
    (branch, last_run, duration): (&str, &str, &str),
    (commit, author): (&str, &str),
    version: Option<&str>,
    environment: &str,
) -> Pipeline {
    Pipeline {
        id,
        name: name.to_string(),
        status,
        branch: branch.to_string(),
        last_run: last_run.to_string(),
        duration: duration.to_string(),
        commit: commit.to_string(),
        author: author.to_string(),
        version: version.map(str::to_string),
        environment: Some(environment.to_string()),
        canary_percentage: None,
    }
}

fn log(
    id: u64,
    timestamp: &str,
    kind: LogType,
    pipeline: &str,
    message: &str,
    details: &str,
) -> LogEntry {
    LogEntry {
        id,
        timestamp: timestamp.to_string(),
        kind,
        pipeline: pipeline.to_string(),
        message: message.to_string(),
        details: Some(details.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use conduit_core::dto::pipeline::NewPipeline;

    #[test]
    fn test_seeded_ids_continue() {
        let store = demo_store();
        let added = store.add_pipeline(NewPipeline::running("x", "main", "c", "a"));
        assert_eq!(added.id, 7);
        assert_eq!(store.list_pipelines()[0].id, 7);
        assert_eq!(store.list_pipelines_by_status(PipelineStatus::Running).len(), 3);
    }
}
