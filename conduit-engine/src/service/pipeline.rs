//! Pipeline Service
//!
//! Direct pipeline actions, as offered by the pipelines screen: create,
//! run, retry and delete. Unlike free-text commands these report failures
//! as [`EngineError`]s.

use conduit_core::domain::pipeline::{Pipeline, PipelineStatus};
use conduit_core::dto::log::NewLogEntry;
use conduit_core::dto::pipeline::{NewPipeline, PipelineUpdate};
use tracing::info;

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::notify::Notification;
use crate::scheduler::Completion;

/// Author recorded on pipelines created by hand
pub const MANUAL_AUTHOR: &str = "current.user";

/// Create a new pipeline
///
/// The branch defaults to `main`. The pipeline starts out as `success`.
pub fn create_pipeline(engine: &Engine, name: &str, branch: Option<&str>) -> Result<Pipeline> {
    if let Err(e) = validate_name(name) {
        engine.notify(Notification::error("Pipeline name is required"));
        return Err(e);
    }

    let branch = branch.filter(|b| !b.trim().is_empty()).unwrap_or("main");

    let pipeline = engine.store().add_pipeline(
        NewPipeline::running(name, branch, "Initial setup", MANUAL_AUTHOR)
            .with_status(PipelineStatus::Success),
    );

    engine.store().add_log(
        NewLogEntry::success(name, "Pipeline created")
            .with_details(format!("New pipeline {} created successfully", name)),
    );

    engine.notify(Notification::success(format!(
        "Pipeline \"{}\" created successfully",
        name
    )));

    info!("Pipeline created: {} ({})", pipeline.name, pipeline.id);

    Ok(pipeline)
}

/// Start an existing pipeline; it completes after the run delay
pub fn run_pipeline(engine: &Engine, id: u64) -> Result<Pipeline> {
    let pipeline = restart(engine, id)?;

    engine.store().add_log(
        NewLogEntry::info(&pipeline.name, "Pipeline started manually")
            .with_details(format!("{} execution started by user", pipeline.name)),
    );

    engine.notify(Notification::success(format!(
        "Pipeline \"{}\" started successfully",
        pipeline.name
    )));

    engine.scheduler().schedule(
        pipeline.id,
        engine.config().run_delay,
        Completion::new(
            PipelineUpdate::succeeded("2m 15s").with_last_run("just now"),
            NewLogEntry::success(&pipeline.name, "Pipeline completed successfully")
                .with_details(format!("{} finished execution", pipeline.name)),
        )
        .with_notification(completed(&pipeline.name)),
    );

    Ok(pipeline)
}

/// Re-run a pipeline; it completes after the run delay
pub fn retry_pipeline(engine: &Engine, id: u64) -> Result<Pipeline> {
    let pipeline = restart(engine, id)?;

    engine.store().add_log(
        NewLogEntry::info(&pipeline.name, "Pipeline retry initiated")
            .with_details(format!("Retrying {} execution", pipeline.name)),
    );

    engine.notify(Notification::info(format!(
        "Retrying pipeline \"{}\"...",
        pipeline.name
    )));

    engine.scheduler().schedule(
        pipeline.id,
        engine.config().run_delay,
        Completion::new(
            PipelineUpdate::succeeded("2m 18s").with_last_run("just now"),
            NewLogEntry::success(&pipeline.name, "Pipeline retry completed")
                .with_details(format!("{} retry finished successfully", pipeline.name)),
        )
        .with_notification(completed(&pipeline.name)),
    );

    Ok(pipeline)
}

/// Delete a pipeline and cancel its pending completions
pub fn delete_pipeline(engine: &Engine, id: u64) -> Result<Pipeline> {
    let removed = engine
        .store()
        .delete_pipeline(id)
        .ok_or(EngineError::PipelineNotFound(id))?;

    let cancelled = engine.scheduler().cancel_for_pipeline(id);

    engine.store().add_log(
        NewLogEntry::warning(&removed.name, "Pipeline deleted")
            .with_details(format!("{} was removed from the system", removed.name)),
    );

    engine.notify(Notification::success(format!(
        "Pipeline \"{}\" deleted successfully",
        removed.name
    )));

    info!(
        "Pipeline deleted: {} ({}), {} pending completion(s) cancelled",
        removed.name, removed.id, cancelled
    );

    Ok(removed)
}

fn restart(engine: &Engine, id: u64) -> Result<Pipeline> {
    engine
        .store()
        .update_pipeline(
            id,
            &PipelineUpdate::status(PipelineStatus::Running).with_last_run("just now"),
        )
        .ok_or(EngineError::PipelineNotFound(id))
}

fn completed(name: &str) -> Notification {
    Notification::success(format!("Pipeline \"{}\" completed successfully", name))
}

// =============================================================================
// Validation
// =============================================================================

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(EngineError::Validation(
            "Pipeline name cannot be empty".to_string(),
        ));
    }

    if name.len() > 255 {
        return Err(EngineError::Validation(
            "Pipeline name is too long (max 255 characters)".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::notify::{ChannelNotifier, NotificationLevel};
    use conduit_core::domain::log::LogType;
    use std::sync::Arc;
    use std::time::Duration;

    fn engine() -> (Engine, tokio::sync::mpsc::UnboundedReceiver<Notification>) {
        let (notifier, receiver) = ChannelNotifier::new();
        let engine = Engine::new(SimulationConfig::default(), Arc::new(notifier));
        (engine, receiver)
    }

    #[tokio::test]
    async fn test_create_pipeline() {
        let (engine, mut toasts) = engine();

        let created = create_pipeline(&engine, "docs-site", None).unwrap();
        assert_eq!(created.id, 7);
        assert_eq!(created.status, PipelineStatus::Success);
        assert_eq!(created.branch, "main");
        assert_eq!(created.author, MANUAL_AUTHOR);
        assert_eq!(created.commit, "Initial setup");
        assert_eq!(engine.store().list_logs()[0].message, "Pipeline created");
        assert_eq!(
            toasts.try_recv().unwrap().message,
            "Pipeline \"docs-site\" created successfully"
        );

        let on_branch = create_pipeline(&engine, "docs-preview", Some("preview")).unwrap();
        assert_eq!(on_branch.branch, "preview");
    }

    #[tokio::test]
    async fn test_create_requires_name() {
        let (engine, mut toasts) = engine();

        let err = create_pipeline(&engine, "   ", Some("main")).unwrap_err();
        assert!(matches!(err, EngineError::Validation(_)));
        assert_eq!(engine.store().list_pipelines().len(), 6);
        assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_pipeline_completes() {
        let (engine, _toasts) = engine();

        let started = run_pipeline(&engine, 4).unwrap();
        assert_eq!(started.status, PipelineStatus::Running);
        assert_eq!(started.last_run, "just now");
        assert_eq!(engine.store().list_logs()[0].kind, LogType::Info);

        tokio::time::sleep(Duration::from_millis(3001)).await;
        engine.scheduler().wait_idle().await;

        let finished = engine.store().get_pipeline(4).unwrap();
        assert_eq!(finished.status, PipelineStatus::Success);
        assert_eq!(finished.duration, "2m 15s");
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_pipeline_completes() {
        let (engine, mut toasts) = engine();

        retry_pipeline(&engine, 4).unwrap();
        assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Info);

        tokio::time::sleep(Duration::from_millis(3001)).await;
        engine.scheduler().wait_idle().await;

        assert_eq!(engine.store().get_pipeline(4).unwrap().duration, "2m 18s");
        assert_eq!(engine.store().list_logs()[0].message, "Pipeline retry completed");
    }

    #[tokio::test]
    async fn test_unknown_pipeline() {
        let (engine, _toasts) = engine();

        assert!(run_pipeline(&engine, 99).unwrap_err().is_not_found());
        assert!(retry_pipeline(&engine, 99).unwrap_err().is_not_found());
        assert!(delete_pipeline(&engine, 99).unwrap_err().is_not_found());
        assert_eq!(engine.store().log_count(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delete_cancels_pending_completion() {
        let (engine, _toasts) = engine();

        run_pipeline(&engine, 3).unwrap();
        assert_eq!(engine.scheduler().pending_count(), 1);

        let removed = delete_pipeline(&engine, 3).unwrap();
        assert_eq!(removed.name, "mobile-app-build");
        assert_eq!(engine.scheduler().pending_count(), 0);
        assert!(engine.store().get_pipeline(3).is_none());
        assert_eq!(engine.store().list_logs()[0].kind, LogType::Warning);
    }
}
