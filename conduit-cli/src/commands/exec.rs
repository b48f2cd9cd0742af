//! One-shot command execution

use anyhow::{Result, bail};
use colored::*;
use conduit_engine::Engine;
use conduit_engine::notify::{ChannelNotifier, Notification};
use conduit_engine::service::status;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::info;

use super::dialogs::{self, AutoAnswers};
use crate::config::Config;
use crate::render;

/// Processes `commands` in order, then waits for every scheduled
/// completion before printing the final pipeline status
///
/// Fails if any command was not successful.
pub async fn run_exec(commands: &[String], yes: bool, config: &Config) -> Result<()> {
    let (notifier, mut toasts) = ChannelNotifier::new();
    let engine = Engine::new(config.simulation.clone(), Arc::new(notifier));

    info!("Executing {} command(s)", commands.len());

    let mut failed = 0;

    for command in commands {
        if !config.json {
            println!("{} {}", "›".cyan().bold(), command.bold());
        }

        let result = engine.submit(command).await;
        render::print_result(&result, config.json)?;
        if !result.success {
            failed += 1;
        }

        if let Some(request) = result.requires_dialog {
            if yes {
                dialogs::run_dialog(&engine, request, &mut AutoAnswers).await?;
            } else if !config.json {
                println!(
                    "{}",
                    "Dialog skipped; pass --yes to confirm it with default answers.".yellow()
                );
            }
        }

        drain_toasts(&mut toasts, config.json);
    }

    if engine.scheduler().pending_count() > 0 && !config.json {
        println!("{}", "Waiting for running pipelines...".dimmed());
    }
    engine.scheduler().wait_idle().await;
    drain_toasts(&mut toasts, config.json);

    if !config.json {
        println!();
        println!("{}", status::render_report(&engine.store().list_pipelines()));
    }

    if failed > 0 {
        bail!("{} of {} command(s) failed", failed, commands.len());
    }

    Ok(())
}

fn drain_toasts(toasts: &mut UnboundedReceiver<Notification>, json: bool) {
    while let Ok(notification) = toasts.try_recv() {
        if !json {
            render::print_toast(&notification);
        }
    }
}
