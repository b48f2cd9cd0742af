//! Commands module
//!
//! Defines the CLI subcommands and their handlers.

mod dialogs;
mod exec;
mod shell;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Start the interactive shell (the default)
    Shell,
    /// Process commands in order and wait for their pipelines to finish
    Exec {
        /// Free-text commands, e.g. "deploy api to staging"
        #[arg(required = true)]
        commands: Vec<String>,

        /// Confirm every dialog with its default answers
        #[arg(short, long)]
        yes: bool,
    },
}

/// Handle a CLI command
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Shell => shell::run_shell(config).await,
        Commands::Exec { commands, yes } => exec::run_exec(&commands, yes, config).await,
    }
}
