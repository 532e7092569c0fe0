//! Build command handler
//!
//! Queues one build, or every build listed in a build file, and waits for
//! all of them to finish.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Result, bail};
use clap::Args;
use devop_core::domain::job::JobDescriptor;
use devop_core::manifest::read_build_manifest;
use devop_runner::TeamCityBuildRepository;
use tokio_util::sync::CancellationToken;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Build configuration id
    #[arg(required_unless_present = "build_file", conflicts_with = "build_file")]
    pub job_id: Option<String>,

    /// Branch to build; defaults to the configuration's default branch
    #[arg(short, long, conflicts_with = "build_file")]
    pub branch: Option<String>,

    /// File listing one `<build id> [branch]` per line
    #[arg(short = 'f', long)]
    pub build_file: Option<PathBuf>,

    /// Append results as JSON lines to this file
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,
}

impl BuildArgs {
    fn descriptors(&self) -> Result<Vec<JobDescriptor>> {
        match (&self.job_id, &self.build_file) {
            (Some(job_id), None) => Ok(vec![JobDescriptor::new(
                job_id,
                self.branch.clone().unwrap_or_default(),
            )]),
            (None, Some(path)) => Ok(read_build_manifest(path)?),
            _ => bail!("Specify either a build id or --build-file"),
        }
    }
}

pub async fn handle_build_command(
    args: BuildArgs,
    config: &Config,
    cancel: CancellationToken,
) -> Result<()> {
    let descriptors = args.descriptors()?;
    let repository = Arc::new(TeamCityBuildRepository::new(config.teamcity_client()?));

    super::run_batch(
        repository,
        &descriptors,
        args.log_file.as_deref(),
        config,
        cancel,
    )
    .await
}
