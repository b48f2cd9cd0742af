//! Terraform dialog
//!
//! `Planning -> Review -> Applying -> Applied`. The plan is canned; the
//! apply creates a pipeline and drives it to success with a progress bar.

use conduit_core::domain::pipeline::PipelineStatus;
use conduit_core::dto::command::TerraformRequest;
use conduit_core::dto::log::NewLogEntry;
use conduit_core::dto::pipeline::{NewPipeline, PipelineUpdate};
use serde::Serialize;
use std::fmt;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::info;

use super::format_elapsed;
use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::notify::Notification;
use crate::scheduler::ProgressDriver;
use crate::service::dispatch::COMMAND_AUTHOR;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TerraformPhase {
    Planning,
    Review,
    Applying,
    Applied,
}

impl fmt::Display for TerraformPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TerraformPhase::Planning => "planning",
            TerraformPhase::Review => "review",
            TerraformPhase::Applying => "applying",
            TerraformPhase::Applied => "applied",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedChange {
    pub resource: &'static str,
    pub kind: &'static str,
    pub details: &'static str,
}

const fn change(resource: &'static str, kind: &'static str, details: &'static str) -> PlannedChange {
    PlannedChange {
        resource,
        kind,
        details,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TerraformPlan {
    pub to_add: &'static [PlannedChange],
    pub to_change: &'static [PlannedChange],
    pub to_destroy: &'static [PlannedChange],
}

impl TerraformPlan {
    pub const CANNED: Self = Self {
        to_add: &[
            change("aws_instance.web_server", "EC2 Instance", "t3.medium, us-east-1a"),
            change("aws_security_group.web_sg", "Security Group", "HTTP/HTTPS ingress"),
            change("aws_eip.web_ip", "Elastic IP", "Associated with web_server"),
        ],
        to_change: &[
            change("aws_db_instance.main", "RDS Instance", "Storage: 100GB → 200GB"),
            change("aws_iam_role.lambda_role", "IAM Role", "Add CloudWatch permissions"),
        ],
        to_destroy: &[change(
            "aws_instance.old_worker",
            "EC2 Instance",
            "t2.micro, deprecated",
        )],
    };

    /// Change counts, e.g. `+3 ~2 -1`
    pub fn summary(&self) -> String {
        format!(
            "+{} ~{} -{}",
            self.to_add.len(),
            self.to_change.len(),
            self.to_destroy.len()
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TerraformState {
    pub phase: TerraformPhase,
    pub progress: u8,
}

pub struct TerraformDialog {
    engine: Engine,
    request: TerraformRequest,
    state: watch::Sender<TerraformState>,
    pipeline_id: Option<u64>,
}

impl TerraformDialog {
    pub fn new(engine: Engine, request: TerraformRequest) -> Self {
        let (state, _) = watch::channel(TerraformState {
            phase: TerraformPhase::Planning,
            progress: 0,
        });

        Self {
            engine,
            request,
            state,
            pipeline_id: None,
        }
    }

    pub fn request(&self) -> &TerraformRequest {
        &self.request
    }

    pub fn state(&self) -> TerraformState {
        *self.state.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<TerraformState> {
        self.state.subscribe()
    }

    pub fn pipeline_id(&self) -> Option<u64> {
        self.pipeline_id
    }

    fn log_source(&self) -> String {
        format!("terraform-{}", self.request.stack)
    }

    fn ensure_phase(&self, expected: TerraformPhase, action: &'static str) -> Result<()> {
        let phase = self.state.borrow().phase;
        if phase != expected {
            return Err(EngineError::invalid_phase("terraform", phase, action));
        }
        Ok(())
    }

    /// Finishes planning and moves to review
    pub fn view_plan(&mut self) -> Result<&'static TerraformPlan> {
        self.ensure_phase(TerraformPhase::Planning, "view plan of")?;

        let plan = &TerraformPlan::CANNED;

        self.engine.store().add_log(
            NewLogEntry::info(
                self.log_source(),
                format!("Terraform plan generated for {}", self.request.stack),
            )
            .with_details(format!(
                "Environment: {}\nChanges: {}",
                self.request.environment,
                plan.summary()
            )),
        );

        self.state.send_modify(|s| s.phase = TerraformPhase::Review);
        Ok(plan)
    }

    /// Applies the reviewed plan and waits until it is applied
    pub async fn apply(&mut self) -> Result<()> {
        self.ensure_phase(TerraformPhase::Review, "apply")?;

        let started = Instant::now();
        let TerraformRequest { stack, environment } = &self.request;

        let pipeline = self.engine.store().add_pipeline(
            NewPipeline::running(
                format!("terraform-{}-{}", stack, environment),
                "main",
                format!("Apply terraform changes for {}", stack),
                COMMAND_AUTHOR,
            )
            .with_environment(environment),
        );
        self.pipeline_id = Some(pipeline.id);

        self.engine.store().add_log(
            NewLogEntry::info(self.log_source(), "Applying Terraform changes").with_details(
                format!("Executing terraform apply for {} in {}", stack, environment),
            ),
        );

        info!("Terraform apply {} started ({})", pipeline.name, pipeline.id);

        self.state.send_modify(|s| {
            s.phase = TerraformPhase::Applying;
            s.progress = 0;
        });

        let driver = ProgressDriver::from_config(self.engine.config());
        driver
            .run(|progress| self.state.send_modify(|s| s.progress = progress))
            .await;

        let store = self.engine.store();
        store.update_pipeline_in_status(
            pipeline.id,
            PipelineStatus::Running,
            &PipelineUpdate::succeeded(format_elapsed(started.elapsed())),
        );

        store.add_log(
            NewLogEntry::success(self.log_source(), "Terraform apply completed successfully")
                .with_details(format!(
                    "All infrastructure changes applied to {}",
                    environment
                )),
        );
        self.engine
            .notify(Notification::success("Infrastructure changes applied!"));

        self.state.send_modify(|s| s.phase = TerraformPhase::Applied);
        Ok(())
    }
}

impl fmt::Debug for TerraformDialog {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TerraformDialog")
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
    use crate::notify::ChannelNotifier;
    use conduit_core::domain::log::LogType;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use std::time::Duration;

    fn dialog() -> TerraformDialog {
        let (notifier, _receiver) = ChannelNotifier::new();
        let engine = Engine::new(
            SimulationConfig::default().without_seed(),
            Arc::new(notifier),
        );
        engine.terraform_dialog(TerraformRequest {
            stack: "vpc-core".to_string(),
            environment: "prod".to_string(),
        })
    }

    #[test]
    fn test_plan_summary() {
        assert_eq!(TerraformPlan::CANNED.summary(), "+3 ~2 -1");
    }

    #[test]
    fn test_view_plan_moves_to_review() {
        let mut dialog = dialog();

        let plan = dialog.view_plan().unwrap();
        assert_eq!(plan.to_add.len(), 3);
        assert_eq!(dialog.state().phase, TerraformPhase::Review);

        let log = &dialog.engine.store().list_logs()[0];
        assert_eq!(log.pipeline, "terraform-vpc-core");
        assert_eq!(
            log.details.as_deref(),
            Some("Environment: prod\nChanges: +3 ~2 -1")
        );
        assert!(dialog.engine.store().list_pipelines().is_empty());

        assert!(dialog.view_plan().is_err());
    }

    #[tokio::test]
    async fn test_apply_requires_review() {
        let mut dialog = dialog();
        let err = dialog.apply().await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Cannot apply terraform dialog while in phase 'planning'"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_apply() {
        let mut dialog = dialog();
        dialog.view_plan().unwrap();

        let started = Instant::now();
        dialog.apply().await.unwrap();
        assert_eq!(started.elapsed(), Duration::from_millis(5000));

        assert_eq!(
            dialog.state(),
            TerraformState {
                phase: TerraformPhase::Applied,
                progress: 100,
            }
        );

        let store = dialog.engine.store();
        let pipeline = store.get_pipeline(dialog.pipeline_id().unwrap()).unwrap();
        assert_eq!(pipeline.name, "terraform-vpc-core-prod");
        assert_eq!(pipeline.status, PipelineStatus::Success);
        assert_eq!(pipeline.duration, "0m 5s");

        let kinds: Vec<LogType> = store.list_logs().iter().map(|l| l.kind).collect();
        assert_eq!(kinds, vec![LogType::Success, LogType::Info, LogType::Info]);
    }
}
