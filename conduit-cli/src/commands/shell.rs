//! Conversational shell
//!
//! Reads commands from stdin until `/quit` or end of input. Free text goes
//! to the engine; lines starting with `/` are shell commands.

use anyhow::{Context, Result};
use colored::*;
use conduit_engine::Engine;
use conduit_engine::interpreter::EXAMPLE_COMMANDS;
use conduit_engine::notify::ChannelNotifier;
use conduit_engine::service::log_service;
use conduit_engine::service::pipeline_service;
use conduit_engine::service::status::StatusSummary;
use serde::Serialize;
use std::io::Write;
use std::sync::Arc;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use super::dialogs::{self, Prompt};
use crate::config::Config;
use crate::render;
use crate::slash::{SLASH_HELP, SlashCommand};

/// Run the interactive shell
pub async fn run_shell(config: &Config) -> Result<()> {
    let (notifier, mut toasts) = ChannelNotifier::new();
    let engine = Engine::new(config.simulation.clone(), Arc::new(notifier));

    // Completions fire in the background; show them as they arrive
    let toast_printer = tokio::spawn(async move {
        while let Some(notification) = toasts.recv().await {
            render::print_toast(&notification);
        }
    });

    print_greeting();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print!("{} ", "conduit>".cyan().bold());
        std::io::stdout().flush()?;

        let Some(line) = lines
            .next_line()
            .await
            .context("Failed to read from stdin")?
        else {
            break;
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('/') {
            debug!("Shell command: {}", line);
            match SlashCommand::parse(line) {
                Ok(SlashCommand::Quit) => break,
                Ok(command) => {
                    if let Err(e) = run_slash(&engine, command, config.json) {
                        println!("{}", format!("✗ {:#}", e).red());
                    }
                }
                Err(usage) => println!("{}", usage.red()),
            }
            continue;
        }

        println!("{} {}", "you:".bold(), line.dimmed());
        let result = engine.submit(line).await;
        render::print_result(&result, config.json)?;

        if let Some(request) = result.requires_dialog {
            let mut prompt = Prompt::new(&mut lines);
            if let Err(e) = dialogs::run_dialog(&engine, request, &mut prompt).await {
                println!("{}", format!("✗ {:#}", e).red());
            }
        }
    }

    toast_printer.abort();
    println!("{}", "Goodbye!".dimmed());
    Ok(())
}

fn print_greeting() {
    println!("{}", "Conduit CI/CD control panel".bold());
    println!("Tell me what to do, for example:");
    for example in EXAMPLE_COMMANDS {
        println!("  {} {}", "•".cyan(), example);
    }
    println!("Type {} for shell commands.\n", "/help".cyan());
}

fn run_slash(engine: &Engine, command: SlashCommand, json: bool) -> Result<()> {
    let store = engine.store();

    match command {
        SlashCommand::Help => println!("{}", SLASH_HELP),
        SlashCommand::Pipelines(filter) => {
            let all = store.list_pipelines();
            let shown: Vec<_> = match filter {
                Some(status) => all.iter().filter(|p| p.status == status).cloned().collect(),
                None => all.clone(),
            };
            if json {
                print_json(&shown)?;
            } else {
                render::print_pipelines(&shown, &StatusSummary::from_pipelines(&all));
            }
        }
        SlashCommand::Logs(filter) => {
            let entries = log_service::filter_logs(store, &filter);
            if json {
                print_json(&entries)?;
            } else {
                render::print_logs(&entries);
            }
        }
        SlashCommand::Export { dir, filter } => {
            let path = log_service::write_export(store, &filter, &dir)?;
            println!("{}", format!("✓ Logs exported to {}", path.display()).green());
        }
        SlashCommand::ClearLogs => {
            let cleared = store.clear_logs();
            println!("{}", format!("✓ Cleared {} log entries", cleared).green());
        }
        SlashCommand::History => {
            let history = store.list_command_history();
            if json {
                print_json(&history)?;
            } else {
                render::print_history(&history);
            }
        }
        SlashCommand::Releases => {
            let releases = store.list_releases();
            if json {
                print_json(&releases)?;
            } else {
                render::print_releases(&releases);
            }
        }
        SlashCommand::New { name, branch } => {
            let pipeline = pipeline_service::create_pipeline(engine, &name, branch.as_deref())?;
            println!(
                "{}",
                format!("✓ Pipeline {} created (#{})", pipeline.name, pipeline.id).green()
            );
        }
        SlashCommand::Run(id) => {
            pipeline_service::run_pipeline(engine, id)?;
        }
        SlashCommand::Retry(id) => {
            pipeline_service::retry_pipeline(engine, id)?;
        }
        SlashCommand::Delete(id) => {
            pipeline_service::delete_pipeline(engine, id)?;
        }
        SlashCommand::Quit => {}
    }

    Ok(())
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
