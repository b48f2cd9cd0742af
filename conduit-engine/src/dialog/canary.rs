//! Canary deployment dialog
//!
//! `Config -> Deploying -> Monitoring -> Complete`. The traffic share can
//! only be changed in `Config`; promote and rollback are only offered
//! once the canary is complete.

use conduit_core::domain::pipeline::PipelineStatus;
use conduit_core::dto::command::CanaryRequest;
use conduit_core::dto::log::NewLogEntry;
use conduit_core::dto::pipeline::{NewPipeline, PipelineUpdate};
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;
use tokio::time::{self, Instant};
use tracing::info;

use super::format_elapsed;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::notify::Notification;
use crate::scheduler::ProgressDriver;
use crate::service::dispatch::COMMAND_AUTHOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CanaryPhase {
    Config,
    Deploying,
    Monitoring,
    Complete,
}

impl fmt::Display for CanaryPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            CanaryPhase::Config => "config",
            CanaryPhase::Deploying => "deploying",
            CanaryPhase::Monitoring => "monitoring",
            CanaryPhase::Complete => "complete",
        };
        f.write_str(s)
    }
}

/// Health of the canary while it is monitored
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CanaryMetrics {
    /// Percent of failed requests
    pub error_rate: f64,
    pub latency_ms: u32,
    /// Requests per second
    pub throughput: u32,
}

impl CanaryMetrics {
    pub const INITIAL: Self = Self {
        error_rate: 0.12,
        latency_ms: 145,
        throughput: 1250,
    };

    pub const SETTLED: Self = Self {
        error_rate: 0.10,
        latency_ms: 142,
        throughput: 1280,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CanaryState {
    pub phase: CanaryPhase,
    pub percentage: u8,
    pub progress: u8,
    pub metrics: CanaryMetrics,
}

pub struct CanaryDialog {
    engine: Engine,
    request: CanaryRequest,
    state: watch::Sender<CanaryState>,
    pipeline_id: Option<u64>,
}

impl CanaryDialog {
    pub fn new(engine: Engine, request: CanaryRequest) -> Self {
        let (state, _) = watch::channel(CanaryState {
            phase: CanaryPhase::Config,
            percentage: request.percentage,
            progress: 0,
            metrics: CanaryMetrics::INITIAL,
        });

        Self {
            engine,
            request,
            state,
            pipeline_id: None,
        }
    }

    pub fn request(&self) -> &CanaryRequest {
        &self.request
    }

    pub fn state(&self) -> CanaryState {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<CanaryState> {
        self.state.subscribe()
    }

    /// Pipeline created by [`deploy`](Self::deploy), once started
    pub fn pipeline_id(&self) -> Option<u64> {
        self.pipeline_id
    }

    fn pipeline_name(&self) -> String {
        format!("{}-canary-{}", self.request.service, self.request.environment)
    }

    /// Name the canary logs are recorded under
    fn log_source(&self) -> String {
        format!("{}-canary", self.request.service)
    }

    fn ensure_phase(&self, expected: CanaryPhase, action: &'static str) -> Result<()> {
        let phase = self.state.borrow().phase;
        if phase != expected {
            return Err(EngineError::invalid_phase("canary", phase, action));
        }
        Ok(())
    }

    /// Changes the traffic share: 5 to 50 percent, in steps of 5
    pub fn set_percentage(&mut self, percentage: u8) -> Result<()> {
        self.ensure_phase(CanaryPhase::Config, "change traffic of")?;

        if !(5..=50).contains(&percentage) || percentage % 5 != 0 {
            return Err(EngineError::InvalidPercentage(percentage));
        }

        self.state.send_modify(|s| s.percentage = percentage);
        Ok(())
    }

    /// Starts the canary and runs it until it is complete
    pub async fn deploy(&mut self) -> Result<()> {
        self.ensure_phase(CanaryPhase::Config, "deploy")?;

        let started = Instant::now();
        let percentage = self.state.borrow().percentage;
        let CanaryRequest {
            service,
            version,
            environment,
            ..
        } = &self.request;

        let pipeline = self.engine.store().add_pipeline(
            NewPipeline::running(
                self.pipeline_name(),
                "main",
                format!("Canary deploy v{}", version),
                COMMAND_AUTHOR,
            )
            .with_version(format!("v{}", version))
            .with_environment(environment)
            .with_canary_percentage(percentage),
        );
        self.pipeline_id = Some(pipeline.id);

        self.engine.store().add_log(
            NewLogEntry::info(
                self.log_source(),
                format!("Canary deployment started with {}% traffic", percentage),
            )
            .with_details(format!(
                "Deploying {} v{} to {} with canary strategy",
                service, version, environment
            )),
        );

        info!(
            "Canary {} started at {}% ({})",
            pipeline.name, percentage, pipeline.id
        );

        self.state.send_modify(|s| {
            s.phase = CanaryPhase::Deploying;
            s.progress = 0;
        });

        let driver = ProgressDriver::from_config(self.engine.config());
        driver
            .run(|progress| self.state.send_modify(|s| s.progress = progress))
            .await;

        self.state.send_modify(|s| {
            s.phase = CanaryPhase::Monitoring;
            s.metrics = CanaryMetrics::INITIAL;
        });

        let config = self.engine.config();
        time::sleep(config.canary_metrics_delay).await;
        self.state.send_modify(|s| s.metrics = CanaryMetrics::SETTLED);

        time::sleep(
            config
                .canary_complete_delay
                .saturating_sub(config.canary_metrics_delay),
        )
        .await;

        // A pipeline stopped or deleted meanwhile keeps its state
        let store = self.engine.store();
        store.update_pipeline_in_status(
            pipeline.id,
            PipelineStatus::Running,
            &PipelineUpdate::succeeded(format_elapsed(started.elapsed())),
        );

        store.add_log(
            NewLogEntry::success(self.log_source(), "Canary deployment completed successfully")
                .with_details(
                    "All metrics within acceptable range. Ready to proceed with full deployment.",
                ),
        );
        self.engine
            .notify(Notification::success("Canary deployment successful!"));

        self.state.send_modify(|s| s.phase = CanaryPhase::Complete);
        Ok(())
    }

    /// Sends all traffic to the new version
    pub fn promote(&self) -> Result<()> {
        self.ensure_phase(CanaryPhase::Complete, "promote")?;

        if let Some(id) = self.pipeline_id {
            self.engine
                .store()
                .update_pipeline(id, &PipelineUpdate::default().with_canary_percentage(100));
        }

        self.engine.store().add_log(
            NewLogEntry::success(self.log_source(), "Promoting canary to 100% traffic")
                .with_details(format!(
                    "{} v{} promoted to full production deployment",
                    self.request.service, self.request.version
                )),
        );
        self.engine
            .notify(Notification::success("Promoted to full deployment!"));

        Ok(())
    }

    pub fn rollback(&self) -> Result<()> {
        self.ensure_phase(CanaryPhase::Complete, "roll back")?;

        self.engine.store().add_log(
            NewLogEntry::warning(self.log_source(), "Rolling back canary deployment").with_details(
                format!(
                    "Reverting {} canary deployment due to user request",
                    self.request.service
                ),
            ),
        );
        self.engine
            .notify(Notification::info("Canary deployment rolled back"));

        Ok(())
    }
}

impl fmt::Debug for CanaryDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CanaryDialog")
            .field("request", &self.request)
            .field("state", &*self.state.borrow())
            .field("pipeline_id", &self.pipeline_id)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::notify::{ChannelNotifier, NotificationLevel};
    use conduit_core::domain::log::LogType;
    use std::sync::Arc;
    use std::time::Duration;

    fn dialog() -> (
        CanaryDialog,
        tokio::sync::mpsc::UnboundedReceiver<Notification>,
    ) {
        let (notifier, receiver) = ChannelNotifier::new();
        let engine = Engine::new(
            SimulationConfig::default().without_seed(),
            Arc::new(notifier),
        );
        let dialog = engine.canary_dialog(CanaryRequest {
            service: "billing".to_string(),
            version: "1.4".to_string(),
            environment: "staging".to_string(),
            percentage: 20,
        });
        (dialog, receiver)
    }

    #[test]
    fn test_percentage_bounds() {
        let (mut dialog, _toasts) = dialog();

        assert!(matches!(
            dialog.set_percentage(55),
            Err(EngineError::InvalidPercentage(55))
        ));
        assert!(dialog.set_percentage(7).is_err());
        assert!(dialog.set_percentage(0).is_err());
        assert!(dialog.set_percentage(5).is_ok());
        assert!(dialog.set_percentage(50).is_ok());
        assert_eq!(dialog.state().percentage, 50);
    }

    #[test]
    fn test_opening_changes_nothing() {
        let (dialog, _toasts) = dialog();
        assert_eq!(dialog.state().phase, CanaryPhase::Config);
        assert_eq!(dialog.state().percentage, 20);
        assert!(dialog.engine.store().list_pipelines().is_empty());
        assert!(matches!(
            dialog.promote(),
            Err(EngineError::InvalidPhase { .. })
        ));
        assert!(dialog.rollback().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_full_rollout() {
        let (mut dialog, mut toasts) = dialog();
        dialog.set_percentage(25).unwrap();

        let mut watcher = dialog.subscribe();
        let observer = tokio::spawn(async move {
            let mut phases = Vec::new();
            while watcher.changed().await.is_ok() {
                let state = watcher.borrow_and_update().clone();
                if phases.last() != Some(&state.phase) {
                    phases.push(state.phase);
                }
                if state.phase == CanaryPhase::Complete {
                    assert_eq!(state.metrics, CanaryMetrics::SETTLED);
                    assert_eq!(state.progress, 100);
                    break;
                }
            }
            phases
        });

        let started = Instant::now();
        dialog.deploy().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(9000));

        let phases = observer.await.unwrap();
        assert_eq!(
            phases,
            vec![
                CanaryPhase::Deploying,
                CanaryPhase::Monitoring,
                CanaryPhase::Complete
            ]
        );

        let store = Arc::clone(dialog.engine.store());
        let pipeline = store.get_pipeline(dialog.pipeline_id().unwrap()).unwrap();
        assert_eq!(pipeline.name, "billing-canary-staging");
        assert_eq!(pipeline.status, PipelineStatus::Success);
        assert_eq!(pipeline.version.as_deref(), Some("v1.4"));
        assert_eq!(pipeline.canary_percentage, Some(25));
        assert_eq!(pipeline.duration, "0m 9s");

        let logs = store.list_logs();
        assert_eq!(logs.len(), 2);
        assert_eq!(logs[0].kind, LogType::Success);
        assert_eq!(logs[1].message, "Canary deployment started with 25% traffic");
        assert_eq!(logs[1].pipeline, "billing-canary");

        assert_eq!(
            toasts.try_recv().unwrap(),
            Notification::success("Canary deployment successful!")
        );

        assert!(dialog.set_percentage(10).is_err());
        assert!(dialog.deploy().await.is_err());

        dialog.promote().unwrap();
        assert_eq!(
            store.get_pipeline(pipeline.id).unwrap().canary_percentage,
            Some(100)
        );
        assert_eq!(toasts.try_recv().unwrap().level, NotificationLevel::Success);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_canary_is_not_marked_success() {
        let (mut dialog, _toasts) = dialog();
        let engine = dialog.engine.clone();

        let stopper = tokio::spawn(async move {
            time::sleep(Duration::from_secs(6)).await;
            engine.process_command("stop all running pipelines")
        });

        dialog.deploy().await.unwrap();
        assert!(stopper.await.unwrap().success);

        let pipeline = dialog
            .engine
            .store()
            .get_pipeline(dialog.pipeline_id().unwrap())
            .unwrap();
        assert_eq!(pipeline.status, PipelineStatus::Stopped);

        dialog.rollback().unwrap();
        assert_eq!(dialog.engine.store().list_logs()[0].kind, LogType::Warning);
    }
}
