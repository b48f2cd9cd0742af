//! Hotfix dialog
//!
//! A single form: the hotfix is created as soon as it is submitted.

use conduit_core::domain::pipeline::Pipeline;
use conduit_core::dto::command::HotfixRequest;
use conduit_core::dto::log::NewLogEntry;
use conduit_core::dto::pipeline::NewPipeline;
use tracing::info;

use crate::engine::Engine;
use crate::error::{EngineError, Result};
use crate::notify::Notification;
use crate::service::dispatch::COMMAND_AUTHOR;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HotfixForm {
    pub name: String,
    pub description: String,
    /// Deploy to staging and wait for approval instead of going
    /// straight to production
    pub approval_required: bool,
}

impl HotfixForm {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

impl Default for HotfixForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            approval_required: true,
        }
    }
}

#[derive(Debug)]
pub struct HotfixDialog {
    engine: Engine,
    request: HotfixRequest,
}

impl HotfixDialog {
    pub fn new(engine: Engine, request: HotfixRequest) -> Self {
        Self { engine, request }
    }

    pub fn version(&self) -> &str {
        &self.request.version
    }

    /// `hotfix/{version}-{name}`, with the name lowercased and whitespace
    /// runs replaced by dashes
    pub fn branch_name(&self, name: &str) -> String {
        let slug = name
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-");
        format!("hotfix/{}-{}", self.request.version, slug)
    }

    /// Creates the hotfix pipeline
    pub fn create(&self, form: &HotfixForm) -> Result<Pipeline> {
        let name = form.name.trim();
        if name.is_empty() {
            self.engine
                .notify(Notification::error("Hotfix name is required"));
            return Err(EngineError::Validation(
                "Hotfix name cannot be empty".to_string(),
            ));
        }

        let branch = self.branch_name(name);
        let pipeline_name = format!("hotfix-{}", name);
        let commit = match form.description.trim() {
            "" => "Hotfix deployment",
            description => description,
        };
        let (environment, target) = if form.approval_required {
            ("staging", "Staging (pending approval)")
        } else {
            ("production", "Production (auto-deploy)")
        };

        let pipeline = self.engine.store().add_pipeline(
            NewPipeline::running(&pipeline_name, &branch, commit, COMMAND_AUTHOR)
                .with_version(format!("{}-hotfix", self.request.version))
                .with_environment(environment),
        );

        self.engine.store().add_log(
            NewLogEntry::warning(
                &pipeline_name,
                format!("Hotfix branch created from v{}", self.request.version),
            )
            .with_details(format!("Branch: {}\nTarget: {}", branch, target)),
        );

        if form.approval_required {
            self.engine.store().add_log(
                NewLogEntry::info(&pipeline_name, "Awaiting approval for production deployment")
                    .with_details(
                        "Hotfix deployed to staging. Requires approval before production deployment.",
                    ),
            );
        }

        self.engine.notify(Notification::success(format!(
            "Hotfix branch created: {}",
            branch
        )));

        info!("Hotfix {} created on {}", pipeline.name, branch);

        Ok(pipeline)
    }
}
