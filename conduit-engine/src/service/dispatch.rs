//! Action Dispatcher
//!
//! Turns a recognized [`Intent`] into store mutations and a user-facing
//! [`CommandResult`]. Intents that simulate long-running work create a
//! `running` pipeline and schedule its completion; the canary, hotfix and
//! terraform intents only ask the caller to open a dialog.

use conduit_core::domain::pipeline::PipelineStatus;
use conduit_core::domain::release::{Release, ReleaseStatus};
use conduit_core::dto::command::{
    CanaryRequest, CommandResult, DialogRequest, HotfixRequest, TerraformRequest,
};
use conduit_core::dto::log::NewLogEntry;
use conduit_core::dto::pipeline::{NewPipeline, PipelineUpdate};
use std::time::Duration;
use tracing::info;

use crate::engine::Engine;
use crate::interpreter::Intent;
use crate::notify::Notification;
use crate::scheduler::Completion;
use crate::service::{report, status};

/// Author recorded on pipelines started from the command line
pub const COMMAND_AUTHOR: &str = "ai-assistant";

pub fn dispatch(engine: &Engine, intent: Intent) -> CommandResult {
    match intent {
        Intent::DeployWithTag { service, tag } => deploy_with_tag(engine, &service, &tag),
        Intent::CanaryDeploy {
            service,
            version,
            environment,
            percentage,
        } => canary_deploy(CanaryRequest {
            service,
            version,
            environment,
            percentage,
        }),
        Intent::Deploy {
            service,
            version,
            environment,
        } => deploy(engine, &service, &version, &environment),
        Intent::ShowStatus => show_status(engine),
        Intent::Rollback { service } => rollback(engine, &service),
        Intent::StopAllRunning => stop_all_running(engine),
        Intent::RunTests { service, branch } => run_tests(engine, &service, &branch),
        Intent::CutRelease { version, service } => cut_release(engine, &version, &service),
        Intent::CreateHotfix { version } => create_hotfix(HotfixRequest { version }),
        Intent::TerraformPlan { stack, environment } => {
            terraform_plan(TerraformRequest { stack, environment })
        }
        Intent::ObservabilityQuery { version } => observability_query(engine, &version),
        Intent::ShowCompliance => CommandResult::ok(report::COMPLIANCE_REPORT),
    }
}

/// Adds a running pipeline, logs its start and schedules its completion
fn launch(
    engine: &Engine,
    pipeline: NewPipeline,
    started: NewLogEntry,
    delay: Duration,
    completion: Completion,
) {
    let pipeline = engine.store().add_pipeline(pipeline);
    engine.store().add_log(started);
    engine.scheduler().schedule(pipeline.id, delay, completion);

    info!("Pipeline {} ({}) launched", pipeline.name, pipeline.id);
}

fn deploy_with_tag(engine: &Engine, service: &str, tag: &str) -> CommandResult {
    let name = format!("{}-deploy", service);

    launch(
        engine,
        NewPipeline::running(&name, tag, format!("Deploy with tag {}", tag), COMMAND_AUTHOR)
            .with_version(tag)
            .with_environment("production"),
        NewLogEntry::info(&name, format!("Deployment initiated with tag {}", tag)).with_details(
            format!("Starting deployment of {} to production with tag {}", service, tag),
        ),
        engine.config().tagged_deploy_delay,
        Completion::new(
            PipelineUpdate::succeeded("2m 45s").with_last_run("just now"),
            NewLogEntry::success(&name, "Deployment completed successfully")
                .with_details(format!("{} {} deployed to production successfully", service, tag)),
        )
        .with_notification(Notification::success(format!(
            "{} deployed successfully!",
            service
        ))),
    );

    CommandResult::ok(format!(
        "✅ Deployment initiated for {} with tag {} to production.\n\n\
         Pipeline created and logs are being recorded. Check the Pipelines tab for live status.",
        service, tag
    ))
}

fn canary_deploy(request: CanaryRequest) -> CommandResult {
    CommandResult::dialog(
        format!(
            "🚀 Initiating canary deployment for {} v{} to {} with {}% traffic.",
            request.service, request.version, request.environment, request.percentage
        ),
        DialogRequest::Canary(request),
    )
}

/// "latest" stays as is, concrete versions get a `v` prefix
fn display_version(version: &str) -> String {
    if version == "latest" {
        version.to_string()
    } else {
        format!("v{}", version)
    }
}

fn deploy(engine: &Engine, service: &str, version: &str, environment: &str) -> CommandResult {
    let name = format!("{}-{}-deploy", service, environment);
    let version = display_version(version);

    launch(
        engine,
        NewPipeline::running(
            &name,
            "main",
            format!("Deploy {} to {}", version, environment),
            COMMAND_AUTHOR,
        )
        .with_version(&version)
        .with_environment(environment),
        NewLogEntry::info(&name, format!("Deployment initiated to {}", environment)).with_details(
            format!(
                "Starting deployment of {} {} to {} environment",
                service, version, environment
            ),
        ),
        engine.config().deploy_delay,
        Completion::new(
            PipelineUpdate::succeeded("2m 30s"),
            NewLogEntry::success(&name, "Deployment completed").with_details(format!(
                "{} {} successfully deployed to {}",
                service, version, environment
            )),
        )
        .with_notification(Notification::success(format!(
            "{} deployed to {}!",
            service, environment
        ))),
    );

    CommandResult::ok(format!(
        "✅ Deploying {} {} to {}.\n\nPipeline created and deployment is in progress.",
        service, version, environment
    ))
}

fn show_status(engine: &Engine) -> CommandResult {
    CommandResult::ok(status::render_report(&engine.store().list_pipelines()))
}

fn rollback(engine: &Engine, service: &str) -> CommandResult {
    let needle = service.to_lowercase();
    let target = engine.store().find_pipeline(|p| {
        p.name.to_lowercase().contains(&needle) && p.is_in("production")
    });

    let Some(target) = target else {
        return CommandResult::failure(format!(
            "❌ Could not find a production pipeline for {}",
            service
        ));
    };

    info!("Rolling back {} (matched {})", service, target.name);

    let name = format!("{}-rollback", service);

    launch(
        engine,
        NewPipeline::running(
            &name,
            "main",
            "Rollback to previous stable version",
            COMMAND_AUTHOR,
        )
        .with_environment("production"),
        NewLogEntry::warning(&name, "Rollback initiated").with_details(format!(
            "Rolling back {} to previous stable version in production",
            service
        )),
        engine.config().rollback_delay,
        Completion::new(
            PipelineUpdate::succeeded("1m 20s"),
            NewLogEntry::success(&name, "Rollback completed successfully").with_details(format!(
                "{} has been rolled back to previous stable version",
                service
            )),
        )
        .with_notification(Notification::success(format!(
            "{} rolled back successfully!",
            service
        ))),
    );

    CommandResult::ok(format!(
        "⏮️ Rolling back {} to previous stable version in production.\n\n\
         Rollback pipeline created and executing...",
        service
    ))
}

fn stop_all_running(engine: &Engine) -> CommandResult {
    let stopped = engine.store().update_pipelines_with_status(
        PipelineStatus::Running,
        &PipelineUpdate::status(PipelineStatus::Stopped),
    );

    if stopped.is_empty() {
        return CommandResult::failure("⚠️ No running pipelines found.");
    }

    for pipeline in &stopped {
        // A stopped pipeline must not be flipped to success later
        engine.scheduler().cancel_for_pipeline(pipeline.id);

        engine.store().add_log(
            NewLogEntry::warning(&pipeline.name, "Pipeline stopped by user command").with_details(
                format!("{} was manually stopped via AI command", pipeline.name),
            ),
        );
    }

    engine.notify(Notification::success(format!(
        "Stopped {} running pipeline(s)",
        stopped.len()
    )));

    let names: Vec<String> = stopped.iter().map(|p| format!("• {}", p.name)).collect();

    CommandResult::ok(format!(
        "🛑 Stopped {} running pipeline(s):\n{}",
        stopped.len(),
        names.join("\n")
    ))
}

fn run_tests(engine: &Engine, service: &str, branch: &str) -> CommandResult {
    let name = format!("{}-test-{}", service, branch.replace('/', "-"));

    launch(
        engine,
        NewPipeline::running(&name, branch, "Running full test suite", COMMAND_AUTHOR)
            .with_environment("testing"),
        NewLogEntry::info(&name, "Test suite initiated").with_details(format!(
            "Running full test suite for {} on branch {}",
            service, branch
        )),
        engine.config().test_delay,
        Completion::new(
            PipelineUpdate::succeeded("4m 12s"),
            NewLogEntry::success(&name, "All tests passed")
                .with_details("Test suite completed: 156 tests passed, 0 failed, 0 skipped"),
        )
        .with_notification(Notification::success(format!(
            "Test suite completed for {}!",
            service
        ))),
    );

    CommandResult::ok(format!(
        "🧪 Running full test suite for {} on branch {}.\n\nTest pipeline created and executing...",
        service, branch
    ))
}

fn cut_release(engine: &Engine, version: &str, service: &str) -> CommandResult {
    let version = format!("v{}", version);

    engine.store().add_release(Release {
        version: version.clone(),
        service: service.to_string(),
        timestamp: chrono::Utc::now(),
        status: ReleaseStatus::Released,
    });

    engine.store().add_log(
        NewLogEntry::success(service, format!("Release {} created", version)).with_details(
            format!("Release {} for {} has been tagged and published", version, service),
        ),
    );

    engine.notify(Notification::success(format!(
        "Release {} created for {}!",
        version, service
    )));

    CommandResult::ok(format!(
        "🎉 Release {} created for {}.\n\nRelease has been tagged and is ready for deployment.",
        version, service
    ))
}

fn create_hotfix(request: HotfixRequest) -> CommandResult {
    CommandResult::dialog(
        format!("🔥 Creating hotfix pipeline from v{}...", request.version),
        DialogRequest::Hotfix(request),
    )
}

fn terraform_plan(request: TerraformRequest) -> CommandResult {
    CommandResult::dialog(
        format!(
            "📋 Generating Terraform plan for {} in {}...",
            request.stack, request.environment
        ),
        DialogRequest::Terraform(request),
    )
}

fn observability_query(engine: &Engine, version: &str) -> CommandResult {
    engine.store().add_log(
        NewLogEntry::warning("observability", format!("Error rate spike analyzed for {}", version))
            .with_details("Database connection pool exhaustion identified as root cause"),
    );

    CommandResult::ok(report::error_rate_analysis(version))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SimulationConfig;
    use crate::notify::{ChannelNotifier, NotificationLevel};
    use crate::store::Store;
    use conduit_core::domain::log::LogType;
    use conduit_core::domain::pipeline::Pipeline;
    use pretty_assertions::assert_eq;
    use std::sync::Arc;
    use tokio::sync::mpsc::UnboundedReceiver;

    fn engine_with(pipelines: Vec<Pipeline>) -> (Engine, UnboundedReceiver<Notification>) {
        let (notifier, receiver) = ChannelNotifier::new();
        let store = Arc::new(Store::with_entities(pipelines, Vec::new()));
        let engine = Engine::with_store(store, SimulationConfig::default(), Arc::new(notifier));
        (engine, receiver)
    }

    fn pipeline(id: u64, name: &str, status: PipelineStatus, environment: &str) -> Pipeline {
        NewPipeline::running(name, "main", "commit", "someone")
            .with_status(status)
            .with_environment(environment)
            .into_pipeline(id)
    }

    fn run(engine: &Engine, text: &str) -> CommandResult {
        engine.process_command(text)
    }

    #[tokio::test(start_paused = true)]
    async fn test_deploy_with_tag_completes_after_delay() {
        let (engine, mut toasts) = engine_with(Vec::new());

        let result = run(&engine, "deploy api to production with tag v2");
        assert!(result.success);
        assert!(result.message.contains("with tag v2 to production"));

        let created = engine.store().list_pipelines()[0].clone();
        assert_eq!(created.name, "api-deploy");
        assert_eq!(created.status, PipelineStatus::Running);
        assert_eq!(created.branch, "v2");
        assert_eq!(created.version.as_deref(), Some("v2"));
        assert_eq!(created.author, COMMAND_AUTHOR);
        assert_eq!(engine.store().list_logs()[0].kind, LogType::Info);

        tokio::time::sleep(Duration::from_millis(3001)).await;
        engine.scheduler().wait_idle().await;

        let done = engine.store().get_pipeline(created.id).unwrap();
        assert_eq!(done.status, PipelineStatus::Success);
        assert_eq!(done.duration, "2m 45s");
        assert_eq!(
            engine.store().list_logs()[0].message,
            "Deployment completed successfully"
        );
        let toast = toasts.try_recv().unwrap();
        assert_eq!(toast.level, NotificationLevel::Success);
        assert_eq!(toast.message, "api deployed successfully!");
    }

    #[tokio::test(start_paused = true)]
    async fn test_deploy_names_pipeline_after_environment() {
        let (engine, _toasts) = engine_with(Vec::new());

        let result = run(&engine, "deploy billing v1.4 to staging");
        assert_eq!(
            result.message,
            "✅ Deploying billing v1.4 to staging.\n\nPipeline created and deployment is in progress."
        );

        let created = &engine.store().list_pipelines()[0];
        assert_eq!(created.name, "billing-staging-deploy");
        assert_eq!(created.version.as_deref(), Some("v1.4"));
        assert_eq!(created.environment.as_deref(), Some("staging"));
        assert_eq!(created.commit, "Deploy v1.4 to staging");

        run(&engine, "deploy billing to qa");
        assert_eq!(engine.store().list_pipelines()[0].version.as_deref(), Some("latest"));
    }

    #[tokio::test]
    async fn test_dialog_intents_do_not_touch_store() {
        let (engine, _toasts) = engine_with(Vec::new());

        let canary = run(&engine, "deploy billing v1.4 to staging with canary 20%");
        assert_eq!(
            canary.requires_dialog,
            Some(DialogRequest::Canary(CanaryRequest {
                service: "billing".to_string(),
                version: "1.4".to_string(),
                environment: "staging".to_string(),
                percentage: 20,
            }))
        );

        let hotfix = run(&engine, "create hotfix from v2.3.0");
        assert!(matches!(hotfix.requires_dialog, Some(DialogRequest::Hotfix(_))));

        let terraform = run(&engine, "plan terraform for vpc-core in prod");
        assert_eq!(
            terraform.requires_dialog,
            Some(DialogRequest::Terraform(TerraformRequest {
                stack: "vpc-core".to_string(),
                environment: "prod".to_string(),
            }))
        );

        assert!(engine.store().list_pipelines().is_empty());
        assert_eq!(engine.store().log_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rollback_matches_production_substring() {
        let (engine, _toasts) = engine_with(vec![pipeline(
            1,
            "checkout-production",
            PipelineStatus::Running,
            "production",
        )]);

        let result = run(&engine, "rollback CHECKOUT to previous version");
        assert!(result.success);

        let created = &engine.store().list_pipelines()[0];
        assert_eq!(created.name, "CHECKOUT-rollback");
        assert_eq!(created.id, 2);
        assert_eq!(engine.store().list_logs()[0].kind, LogType::Warning);

        tokio::time::sleep(Duration::from_millis(2501)).await;
        engine.scheduler().wait_idle().await;
        assert_eq!(
            engine.store().get_pipeline(2).unwrap().status,
            PipelineStatus::Success
        );
    }

    #[tokio::test]
    async fn test_rollback_without_production_match_fails() {
        let (engine, _toasts) = engine_with(vec![pipeline(
            1,
            "checkout-staging",
            PipelineStatus::Success,
            "staging",
        )]);

        let result = run(&engine, "rollback checkout to previous version");
        assert!(!result.success);
        assert_eq!(
            result.message,
            "❌ Could not find a production pipeline for checkout"
        );
        assert_eq!(engine.store().list_pipelines().len(), 1);
        assert_eq!(engine.store().log_count(), 0);
    }

    #[tokio::test]
    async fn test_stop_with_nothing_running_fails() {
        let (engine, mut toasts) = engine_with(vec![pipeline(
            1,
            "web",
            PipelineStatus::Success,
            "production",
        )]);

        let result = run(&engine, "stop all running pipelines");
        assert!(!result.success);
        assert_eq!(result.message, "⚠️ No running pipelines found.");
        assert_eq!(engine.store().log_count(), 0);
        assert!(toasts.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_stop_transitions_every_running_pipeline() {
        let (engine, mut toasts) = engine_with(vec![
            pipeline(3, "c", PipelineStatus::Running, "staging"),
            pipeline(2, "b", PipelineStatus::Failed, "staging"),
            pipeline(1, "a", PipelineStatus::Running, "staging"),
        ]);

        let result = run(&engine, "stop all running pipelines");
        assert!(result.success);
        assert_eq!(result.message, "🛑 Stopped 2 running pipeline(s):\n• c\n• a");

        let statuses: Vec<PipelineStatus> = engine
            .store()
            .list_pipelines()
            .iter()
            .map(|p| p.status)
            .collect();
        assert_eq!(
            statuses,
            vec![
                PipelineStatus::Stopped,
                PipelineStatus::Failed,
                PipelineStatus::Stopped
            ]
        );

        let logs = engine.store().list_logs();
        assert_eq!(logs.len(), 2);
        assert!(logs.iter().all(|l| l.kind == LogType::Warning));
        assert_eq!(toasts.try_recv().unwrap().message, "Stopped 2 running pipeline(s)");
    }

    #[tokio::test(start_paused = true)]
    async fn test_stopped_pipeline_is_not_completed_later() {
        let (engine, _toasts) = engine_with(Vec::new());

        run(&engine, "run tests for api");
        run(&engine, "stop all running pipelines");

        tokio::time::sleep(Duration::from_secs(5)).await;
        engine.scheduler().wait_idle().await;

        assert_eq!(
            engine.store().list_pipelines()[0].status,
            PipelineStatus::Stopped
        );
        assert_eq!(engine.scheduler().pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_tests_on_branch() {
        let (engine, _toasts) = engine_with(Vec::new());

        let result = run(&engine, "run full test suite for payments@feature/upi/qr");
        assert!(result.message.contains("on branch feature/upi/qr"));

        let created = &engine.store().list_pipelines()[0];
        assert_eq!(created.name, "payments-test-feature-upi-qr");
        assert_eq!(created.branch, "feature/upi/qr");
        assert_eq!(created.environment.as_deref(), Some("testing"));

        tokio::time::sleep(Duration::from_millis(4001)).await;
        engine.scheduler().wait_idle().await;

        let log = &engine.store().list_logs()[0];
        assert_eq!(log.message, "All tests passed");
        assert_eq!(
            log.details.as_deref(),
            Some("Test suite completed: 156 tests passed, 0 failed, 0 skipped")
        );
    }

    #[tokio::test]
    async fn test_cut_release_records_release_only() {
        let (engine, mut toasts) = engine_with(Vec::new());

        let result = run(&engine, "cut release 2.4.0 for payments");
        assert!(result.success);

        let releases = engine.store().list_releases();
        assert_eq!(releases.len(), 1);
        assert_eq!(releases[0].version, "v2.4.0");
        assert_eq!(releases[0].service, "payments");
        assert_eq!(releases[0].status, ReleaseStatus::Released);
        assert!(engine.store().list_pipelines().is_empty());
        assert_eq!(engine.store().list_logs()[0].kind, LogType::Success);
        assert_eq!(
            toasts.try_recv().unwrap().message,
            "Release v2.4.0 created for payments!"
        );
    }

    #[tokio::test]
    async fn test_reports() {
        let (engine, _toasts) = engine_with(Vec::new());

        let analysis = run(&engine, "why did error rate spike after v2.3.1");
        assert!(analysis.message.starts_with("📊 Error Rate Analysis for 2.3.1:"));
        let log = &engine.store().list_logs()[0];
        assert_eq!(log.kind, LogType::Warning);
        assert_eq!(log.pipeline, "observability");

        let compliance = run(&engine, "show change ticket for last deploy");
        assert_eq!(compliance.message, report::COMPLIANCE_REPORT);
        assert_eq!(engine.store().log_count(), 1);
    }

    #[tokio::test]
    async fn test_show_status_is_stable() {
        let (engine, _toasts) = engine_with(crate::seed::demo_pipelines());

        let first = run(&engine, "show status of all pipelines");
        let second = run(&engine, "show status of all pipelines");
        assert_eq!(first.message, second.message);
        assert!(first.message.contains("Total: 6 | Running: 2"));
    }
}
