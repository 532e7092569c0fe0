//! Devop CLI
//!
//! Command-line interface that queues TeamCity builds and deploys Octopus
//! releases in batches, waiting for every job to finish.

mod commands;
mod config;
mod output;

use std::path::PathBuf;

use anyhow::Result;
use clap::{ArgAction, Parser};
use commands::{Commands, handle_command};
use config::Config;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "devop")]
#[command(about = "Build and deploy orchestration for TeamCity and Octopus", long_about = None)]
struct Cli {
    /// Configuration file (defaults to ./.devop.yaml, then ~/.devop.yaml)
    #[arg(long, global = true, env = "DEVOP_CONFIG")]
    config: Option<PathBuf>,

    /// Log more (-v for debug, -vv for trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    let config = Config::load(cli.config.as_deref())?;
    debug!("Configuration loaded");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, no longer waiting for outstanding jobs");
            on_interrupt.cancel();
        }
    });

    handle_command(cli.command, &config, cancel).await
}

/// Logs go to stderr so stdout only carries results
fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "devop=debug,devop_runner=debug,devop_client=debug,info",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
