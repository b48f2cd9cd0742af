//! Conduit CLI
//!
//! Conversational front end for the Conduit engine: an interactive shell
//! and a one-shot `exec` mode.

mod commands;
mod config;
mod render;
mod slash;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "conduit")]
#[command(about = "Conduit CI/CD control panel", long_about = None)]
struct Cli {
    /// Divide every simulated delay by this factor
    #[arg(long, env = "CONDUIT_SPEED", default_value = "1")]
    speed: u32,

    /// Start with an empty store instead of the demo pipelines
    #[arg(long, env = "CONDUIT_NO_SEED")]
    no_seed: bool,

    /// Print command results as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Diagnostics go to stderr so they stay out of the conversation
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "conduit_cli=warn,conduit_engine=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    let config = Config::load(cli.speed, cli.no_seed, cli.json)?;

    handle_command(cli.command.unwrap_or(Commands::Shell), &config).await
}
