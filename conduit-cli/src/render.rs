//! Terminal output
//!
//! Everything the shell and `exec` print goes through here.

use anyhow::Result;
use colored::*;
use conduit_core::domain::command::{CommandRecord, CommandStatus};
use conduit_core::domain::log::{LogEntry, LogType};
use conduit_core::domain::pipeline::{Pipeline, PipelineStatus};
use conduit_core::domain::release::Release;
use conduit_core::dto::command::CommandResult;
use conduit_engine::dialog::{CanaryState, TerraformPlan};
use conduit_engine::notify::{Notification, NotificationLevel};
use conduit_engine::service::status::{StatusSummary, status_icon};
use std::io::Write;

/// Print the answer to one submitted command
pub fn print_result(result: &CommandResult, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(result)?);
        return Ok(());
    }

    let message = if result.success {
        result.message.green()
    } else {
        result.message.red()
    };
    println!("{}\n", message);

    Ok(())
}

pub fn print_toast(notification: &Notification) {
    let badge = match notification.level {
        NotificationLevel::Success => "✓".green().bold(),
        NotificationLevel::Error => "✗".red().bold(),
        NotificationLevel::Info => "ℹ".blue().bold(),
    };
    println!("  {} {}", badge, notification.message.dimmed());
}

fn colored_status(status: PipelineStatus) -> ColoredString {
    let label = status.as_str().to_uppercase();
    match status {
        PipelineStatus::Success => label.green(),
        PipelineStatus::Running => label.blue(),
        PipelineStatus::Failed => label.red(),
        PipelineStatus::Stopped => label.yellow(),
    }
}

/// Print the summary counts followed by one block per pipeline
pub fn print_pipelines(pipelines: &[Pipeline], summary: &StatusSummary) {
    println!(
        "{}",
        format!(
            "Total: {} | Running: {} | Success: {} | Failed: {} | Stopped: {}",
            summary.total, summary.running, summary.success, summary.failed, summary.stopped
        )
        .bold()
    );
    println!();

    if pipelines.is_empty() {
        println!("{}", "No pipelines found.".yellow());
        return;
    }

    for pipeline in pipelines {
        println!(
            "  {} {} {}",
            status_icon(pipeline.status),
            pipeline.name.bold(),
            format!("#{}", pipeline.id).dimmed()
        );
        println!(
            "    Status:  {}   Env: {}",
            colored_status(pipeline.status),
            pipeline.environment.as_deref().unwrap_or("unknown")
        );
        println!(
            "    Branch:  {}   Commit: {}",
            pipeline.branch.cyan(),
            pipeline.commit.dimmed()
        );
        println!(
            "    Run:     {} ({})   Author: {}",
            pipeline.last_run,
            pipeline.duration,
            pipeline.author.dimmed()
        );
        if let Some(version) = &pipeline.version {
            print!("    Version: {}", version);
            if let Some(percentage) = pipeline.canary_percentage {
                print!("   Canary: {}%", percentage);
            }
            println!();
        }
        println!();
    }
}

pub fn print_logs(entries: &[LogEntry]) {
    if entries.is_empty() {
        println!("{}", "No logs found.".yellow());
        return;
    }

    for entry in entries {
        let kind = entry.kind.as_str().to_uppercase();
        let kind = match entry.kind {
            LogType::Info => kind.blue(),
            LogType::Success => kind.green(),
            LogType::Error => kind.red(),
            LogType::Warning => kind.yellow(),
        };
        println!(
            "{} [{}] {} {}",
            entry.timestamp.dimmed(),
            kind,
            entry.pipeline.cyan(),
            entry.message
        );
        if let Some(details) = &entry.details {
            for line in details.lines() {
                println!("    {}", line.dimmed());
            }
        }
    }
}

pub fn print_history(records: &[CommandRecord]) {
    if records.is_empty() {
        println!("{}", "No commands yet.".yellow());
        return;
    }

    for record in records {
        let status = match record.status {
            CommandStatus::Success => "success".green(),
            CommandStatus::Error => "error".red(),
            CommandStatus::Pending => "pending".yellow(),
        };
        println!("{} [{}] {}", record.timestamp.dimmed(), status, record.command);
    }
}

pub fn print_releases(releases: &[Release]) {
    if releases.is_empty() {
        println!("{}", "No releases yet.".yellow());
        return;
    }

    for release in releases {
        println!(
            "  {} {} {}",
            release.version.bold(),
            release.service.cyan(),
            release
                .timestamp
                .format("%Y-%m-%d %H:%M:%S")
                .to_string()
                .dimmed()
        );
    }
}

/// Single-line progress bar, redrawn in place
pub fn print_progress(label: &str, progress: u8) {
    let filled = usize::from(progress / 5);
    let bar = format!("{}{}", "█".repeat(filled), "░".repeat(20 - filled));
    print!("\r  {} {} {:>3}%", label, bar.cyan(), progress);
    if progress >= 100 {
        println!();
    }
    let _ = std::io::stdout().flush();
}

pub fn print_canary_metrics(state: &CanaryState) {
    println!(
        "  Error rate: {:.2}%   Latency: {}ms   Throughput: {} req/s",
        state.metrics.error_rate, state.metrics.latency_ms, state.metrics.throughput
    );
}

pub fn print_terraform_plan(plan: &TerraformPlan) {
    println!("{}", format!("Plan: {}", plan.summary()).bold());

    let sections = [
        ("Resources to Add", "+", plan.to_add),
        ("Resources to Change", "~", plan.to_change),
        ("Resources to Destroy", "-", plan.to_destroy),
    ];

    for (title, sign, changes) in sections {
        if changes.is_empty() {
            continue;
        }
        println!("  {}", title.bold());
        for change in changes {
            let marker = match sign {
                "+" => sign.green(),
                "~" => sign.yellow(),
                _ => sign.red(),
            };
            println!(
                "    {} {} {} {}",
                marker,
                change.resource,
                format!("({})", change.kind).dimmed(),
                change.details.dimmed()
            );
        }
    }
}
