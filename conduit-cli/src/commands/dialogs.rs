//! Interactive dialog flows
//!
//! Walks the user through the canary, hotfix and terraform dialogs. The
//! questions are answered either from stdin or, for `exec --yes`, with
//! their defaults.

use anyhow::Result;
use colored::*;
use conduit_core::dto::command::DialogRequest;
use conduit_engine::Engine;
use conduit_engine::dialog::{
    CanaryDialog, CanaryPhase, HotfixDialog, HotfixForm, TerraformDialog, TerraformPhase,
};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::render;

/// Source of answers to dialog questions
pub trait Answers {
    /// Returns the trimmed answer, or `default` when it is empty
    async fn ask(&mut self, question: &str, default: &str) -> Result<String>;

    async fn confirm(&mut self, question: &str) -> Result<bool> {
        let answer = self.ask(question, "yes").await?;
        Ok(matches!(answer.to_lowercase().as_str(), "y" | "yes"))
    }
}

/// Reads answers from the shell's stdin
pub struct Prompt<'a> {
    lines: &'a mut Lines<BufReader<Stdin>>,
}

impl<'a> Prompt<'a> {
    pub fn new(lines: &'a mut Lines<BufReader<Stdin>>) -> Self {
        Self { lines }
    }
}

impl Answers for Prompt<'_> {
    async fn ask(&mut self, question: &str, default: &str) -> Result<String> {
        if default.is_empty() {
            print!("  {}: ", question.bold());
        } else {
            print!("  {} [{}]: ", question.bold(), default);
        }
        std::io::stdout().flush()?;

        // End of input accepts the default
        let line = self.lines.next_line().await?.unwrap_or_default();
        let line = line.trim();

        Ok(if line.is_empty() {
            default.to_string()
        } else {
            line.to_string()
        })
    }
}

/// Accepts every default, echoing the question
pub struct AutoAnswers;

impl Answers for AutoAnswers {
    async fn ask(&mut self, question: &str, default: &str) -> Result<String> {
        println!("  {} {}", format!("{}:", question).dimmed(), default.bold());
        Ok(default.to_string())
    }
}

/// Runs the dialog a command asked for
pub async fn run_dialog(
    engine: &Engine,
    request: DialogRequest,
    answers: &mut impl Answers,
) -> Result<()> {
    match request {
        DialogRequest::Canary(request) => run_canary(engine.canary_dialog(request), answers).await,
        DialogRequest::Hotfix(request) => run_hotfix(&engine.hotfix_dialog(request), answers).await,
        DialogRequest::Terraform(request) => {
            run_terraform(engine.terraform_dialog(request), answers).await
        }
    }
}

async fn run_canary(mut dialog: CanaryDialog, answers: &mut impl Answers) -> Result<()> {
    let request = dialog.request().clone();
    println!(
        "{}",
        format!(
            "Canary Deployment: {} v{}",
            request.service, request.version
        )
        .bold()
    );
    println!(
        "{}",
        format!(
            "Gradually roll out to {} with traffic splitting",
            request.environment
        )
        .dimmed()
    );

    let current = dialog.state().percentage.to_string();
    let answer = answers.ask("Canary traffic (5-50%)", &current).await?;
    if answer != current {
        match answer.trim_end_matches('%').parse::<u8>() {
            Ok(percentage) => {
                if let Err(e) = dialog.set_percentage(percentage) {
                    println!("{}", format!("✗ {}, keeping {}%", e, current).red());
                }
            }
            Err(_) => println!("{}", format!("✗ Not a percentage, keeping {}%", current).red()),
        }
    }

    let percentage = dialog.state().percentage;
    println!(
        "  {}% of traffic will remain on the current version",
        100u8.saturating_sub(percentage)
    );

    if !answers.confirm("Start canary deployment?").await? {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    let label = format!("Routing {}% of traffic to v{}", percentage, request.version);
    let mut watcher = dialog.subscribe();
    let mut last_progress = 0;
    {
        let deploy = dialog.deploy();
        tokio::pin!(deploy);

        let mut announced_monitoring = false;
        loop {
            tokio::select! {
                result = &mut deploy => {
                    result?;
                    break;
                }
                Ok(()) = watcher.changed() => {
                    let state = watcher.borrow_and_update().clone();
                    match state.phase {
                        CanaryPhase::Deploying => {
                            render::print_progress(&label, state.progress);
                            last_progress = state.progress;
                        }
                        CanaryPhase::Monitoring => {
                            if !announced_monitoring {
                                finish_progress(&label, &mut last_progress);
                                println!("  {}", "Monitoring canary deployment...".dimmed());
                                announced_monitoring = true;
                            }
                            render::print_canary_metrics(&state);
                        }
                        CanaryPhase::Config | CanaryPhase::Complete => {}
                    }
                }
            }
        }
    }
    finish_progress(&label, &mut last_progress);

    println!("{}", "✓ Canary deployment complete".green().bold());
    render::print_canary_metrics(&dialog.state());

    let choice = answers
        .ask("Promote to 100% or roll back? (promote/rollback)", "promote")
        .await?;
    if choice.eq_ignore_ascii_case("rollback") || choice.eq_ignore_ascii_case("roll back") {
        dialog.rollback()?;
        println!("{}", "Canary rolled back.".yellow());
    } else {
        dialog.promote()?;
        println!("{}", "Promoted to full deployment.".green());
    }

    Ok(())
}

async fn run_hotfix(dialog: &HotfixDialog, answers: &mut impl Answers) -> Result<()> {
    println!(
        "{}",
        format!("Create Hotfix from v{}", dialog.version()).bold()
    );
    println!(
        "{}",
        "Create a hotfix branch and optionally deploy to production".dimmed()
    );

    let name = answers
        .ask("Hotfix name (e.g. critical-auth-fix)", dialog.version())
        .await?;
    let description = answers.ask("Description", "").await?;
    let approval_required = answers
        .confirm("Require approval before production deployment?")
        .await?;

    println!("  Branch: {}", dialog.branch_name(&name).cyan());

    let pipeline = dialog.create(&HotfixForm {
        name,
        description,
        approval_required,
    })?;

    println!(
        "{}",
        format!(
            "✓ Hotfix pipeline {} targeting {}",
            pipeline.name,
            pipeline.environment.as_deref().unwrap_or("unknown")
        )
        .green()
    );

    Ok(())
}

async fn run_terraform(mut dialog: TerraformDialog, answers: &mut impl Answers) -> Result<()> {
    let request = dialog.request().clone();
    println!("{}", format!("Terraform Plan: {}", request.stack).bold());
    println!("{}", format!("Environment: {}", request.environment).dimmed());
    println!(
        "  {}",
        format!("Analyzing infrastructure changes for {}", request.stack).dimmed()
    );

    if !answers.confirm("View plan?").await? {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    let plan = dialog.view_plan()?;
    render::print_terraform_plan(plan);
    println!(
        "{}",
        format!(
            "These changes will be applied to your {} environment. Ensure all changes are expected.",
            request.environment
        )
        .yellow()
    );

    if !answers.confirm("Apply changes?").await? {
        println!("{}", "Cancelled.".yellow());
        return Ok(());
    }

    let label = "Updating infrastructure";
    let mut watcher = dialog.subscribe();
    let mut last_progress = 0;
    {
        let apply = dialog.apply();
        tokio::pin!(apply);

        loop {
            tokio::select! {
                result = &mut apply => {
                    result?;
                    break;
                }
                Ok(()) = watcher.changed() => {
                    let state = *watcher.borrow_and_update();
                    if state.phase == TerraformPhase::Applying {
                        render::print_progress(label, state.progress);
                        last_progress = state.progress;
                    }
                }
            }
        }
    }
    finish_progress(label, &mut last_progress);

    println!("{}", "✓ Changes applied successfully!".green().bold());
    Ok(())
}

/// Draws the final 100% frame if the watcher skipped it
fn finish_progress(label: &str, last_progress: &mut u8) {
    if *last_progress < 100 {
        render::print_progress(label, 100);
        *last_progress = 100;
    }
}
