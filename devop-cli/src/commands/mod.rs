//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod build;
mod deploy;
mod list;
mod verify;

pub use build::BuildArgs;
pub use deploy::DeployArgs;
pub use list::ListArgs;
pub use verify::VerifyArgs;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Subcommand;
use colored::*;
use devop_core::domain::job::JobDescriptor;
use devop_core::domain::release::ReleaseItem;
use devop_runner::{BatchRunner, JobRepository};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::output;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Queue TeamCity builds and wait for them to finish
    Build(BuildArgs),
    /// Deploy releases to an Octopus environment and wait for them to finish
    Deploy(DeployArgs),
    /// List build configurations, or the items of a release epic
    List(ListArgs),
    /// Show what a release contains without deploying it
    Verify(VerifyArgs),
}

/// Handle a CLI command
///
/// Routes the command to the appropriate handler module.
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
/// * `cancel` - Fired on Ctrl-C; stops watching outstanding jobs
pub async fn handle_command(
    command: Commands,
    config: &Config,
    cancel: CancellationToken,
) -> Result<()> {
    match command {
        Commands::Build(args) => build::handle_build_command(args, config, cancel).await,
        Commands::Deploy(args) => deploy::handle_deploy_command(args, config, cancel).await,
        Commands::List(args) => list::handle_list_command(args, config).await,
        Commands::Verify(args) => verify::handle_verify_command(args, config).await,
    }
}

/// Runs one batch and renders it
///
/// Fails after rendering when any job could not be dispatched. Jobs that ran
/// and failed do not fail the command.
async fn run_batch(
    repository: Arc<dyn JobRepository>,
    descriptors: &[JobDescriptor],
    log_file: Option<&Path>,
    config: &Config,
    cancel: CancellationToken,
) -> Result<()> {
    let mut sinks = output::sinks(log_file)?;
    let runner = BatchRunner::with_cancellation(repository, config.watch.watch_config(), cancel);

    let report = runner.run(descriptors, &mut sinks).await?;
    output::print_summary(&report);

    if !report.all_dispatched() {
        bail!(
            "{} of {} job(s) could not be dispatched",
            report.dispatch_failures.len(),
            descriptors.len()
        );
    }
    Ok(())
}

/// Prints release items as `project version` lines
fn print_release_items(items: &[ReleaseItem]) {
    if items.is_empty() {
        println!("{}", "No release items found.".yellow());
        return;
    }

    println!("{}", format!("Found {} release item(s):", items.len()).bold());
    println!();
    for item in items {
        println!("  {} {} {}", "▸".cyan(), item.project, item.version.dimmed());
    }
}
