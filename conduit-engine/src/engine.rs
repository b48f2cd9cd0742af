//! Engine handle
//!
//! Bundles the store, the completion scheduler, the notifier and the
//! simulation config into one cheaply cloneable handle. Every service and
//! dialog receives it explicitly; there is no global state.

use conduit_core::dto::command::{CanaryRequest, CommandResult, HotfixRequest, TerraformRequest};
use std::sync::Arc;
use tracing::info;

use crate::config::SimulationConfig;
use crate::dialog::{CanaryDialog, HotfixDialog, TerraformDialog};
use crate::interpreter::{self, Interpretation};
use crate::notify::{Notification, Notifier};
use crate::scheduler::CompletionScheduler;
use crate::seed;
use crate::service::dispatch;
use crate::store::Store;

#[derive(Clone)]
pub struct Engine {
    store: Arc<Store>,
    scheduler: CompletionScheduler,
    notifier: Arc<dyn Notifier>,
    config: Arc<SimulationConfig>,
}

impl Engine {
    /// Creates an engine with a fresh store, seeded with the demo data
    /// when the config asks for it
    pub fn new(config: SimulationConfig, notifier: Arc<dyn Notifier>) -> Self {
        let store = if config.seed_demo_data {
            seed::demo_store()
        } else {
            Store::new()
        };
        Self::with_store(Arc::new(store), config, notifier)
    }

    /// Creates an engine over an existing store
    pub fn with_store(
        store: Arc<Store>,
        config: SimulationConfig,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let scheduler = CompletionScheduler::new(Arc::clone(&store), Arc::clone(&notifier));
        Self {
            store,
            scheduler,
            notifier,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &Arc<Store> {
        &self.store
    }

    pub fn scheduler(&self) -> &CompletionScheduler {
        &self.scheduler
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub(crate) fn notify(&self, notification: Notification) {
        self.notifier.notify(notification);
    }

    /// Interprets and dispatches one command, recording it in the history
    ///
    /// Never fails: unrecognized text and missing targets produce an
    /// unsuccessful result. Must run inside a tokio runtime because
    /// dispatched intents may schedule completions.
    pub fn process_command(&self, text: &str) -> CommandResult {
        let result = match interpreter::interpret(text) {
            Interpretation::Recognized(intent) => {
                info!("Dispatching {:?}", intent);
                dispatch::dispatch(self, intent)
            }
            Interpretation::Unrecognized(help) => {
                info!("Unrecognized command: {}", text);
                CommandResult::failure(help)
            }
        };

        self.store
            .add_command_history(text, &result.message, result.history_status());

        result
    }

    /// Processes a command after the configured answer delay
    pub async fn submit(&self, text: &str) -> CommandResult {
        tokio::time::sleep(self.config.command_delay).await;
        self.process_command(text)
    }

    pub fn canary_dialog(&self, request: CanaryRequest) -> CanaryDialog {
        CanaryDialog::new(self.clone(), request)
    }

    pub fn hotfix_dialog(&self, request: HotfixRequest) -> HotfixDialog {
        HotfixDialog::new(self.clone(), request)
    }

    pub fn terraform_dialog(&self, request: TerraformRequest) -> TerraformDialog {
        TerraformDialog::new(self.clone(), request)
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("config", &self.config)
            .field("pending_completions", &self.scheduler.pending_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::notify::TracingNotifier;
    use conduit_core::domain::command::CommandStatus;
    use std::time::Duration;

    fn engine() -> Engine {
        Engine::new(
            SimulationConfig::default().without_seed(),
            Arc::new(TracingNotifier),
        )
    }

    #[tokio::test]
    async fn test_every_command_is_recorded() {
        let engine = engine();

        engine.process_command("deploy api to staging");
        engine.process_command("gibberish");
        engine.process_command("create hotfix from v1.0.0");

        let history = engine.store().list_command_history();
        assert_eq!(history.len(), 3);
        assert_eq!(history[0].status, CommandStatus::Pending);
        assert_eq!(history[1].status, CommandStatus::Error);
        assert_eq!(history[1].response, interpreter::HELP_MESSAGE);
        assert_eq!(history[2].status, CommandStatus::Success);
        assert_eq!(history[2].command, "deploy api to staging");
    }

    #[tokio::test(start_paused = true)]
    async fn test_submit_waits_for_command_delay() {
        let engine = engine();
        let started = tokio::time::Instant::now();

        let result = engine.submit("show status").await;

        assert!(result.success);
        assert_eq!(started.elapsed(), Duration::from_millis(500));
    }

    #[test]
    fn test_seeded_engine_has_demo_pipelines() {
        let engine = Engine::new(SimulationConfig::default(), Arc::new(TracingNotifier));
        assert_eq!(engine.store().list_pipelines().len(), 6);
        assert_eq!(engine.store().log_count(), 5);
    }
}
