//! Deploy command handler
//!
//! Deploys a release to one non-production environment. The release is a
//! single project version, the items of a Jira epic, or a deploy file.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{ArgGroup, Args};
use colored::*;
use devop_core::domain::job::JobDescriptor;
use devop_core::manifest::read_deploy_manifest;
use devop_runner::OctopusDeploymentRepository;
use devop_runner::service::{JiraDescriptionReleaseSource, ReleaseSource, validate_environment};
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::config::Config;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("release")
        .required(true)
        .args(["project", "epic", "deploy_file"])
))]
pub struct DeployArgs {
    /// Target environment (never production)
    pub environment: String,

    /// Project to deploy
    #[arg(short, long, requires = "version")]
    pub project: Option<String>,

    /// Release version of --project
    #[arg(short = 'V', long, requires = "project")]
    pub version: Option<String>,

    /// Jira epic listing the releases to deploy
    #[arg(short, long)]
    pub epic: Option<String>,

    /// File listing one `<project> <version>` per line
    #[arg(short, long)]
    pub deploy_file: Option<PathBuf>,

    /// Append results as JSON lines to this file
    #[arg(short, long)]
    pub log_file: Option<PathBuf>,
}

/// Where the items of a deploy come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReleaseRequest<'a> {
    Single { project: &'a str, version: &'a str },
    Epic(&'a str),
    File(&'a Path),
}

impl DeployArgs {
    fn release_request(&self) -> Result<ReleaseRequest<'_>> {
        match (&self.project, &self.version, &self.epic, &self.deploy_file) {
            (Some(project), Some(version), None, None) => Ok(ReleaseRequest::Single {
                project,
                version,
            }),
            (None, None, Some(epic), None) => Ok(ReleaseRequest::Epic(epic)),
            (None, None, None, Some(path)) => Ok(ReleaseRequest::File(path)),
            _ => bail!("Specify exactly one of --project/--version, --epic or --deploy-file"),
        }
    }
}

pub async fn handle_deploy_command(
    args: DeployArgs,
    config: &Config,
    cancel: CancellationToken,
) -> Result<()> {
    let request = args.release_request()?;

    // Manifest errors are reported before any remote call
    let manifest = match request {
        ReleaseRequest::File(path) => read_deploy_manifest(path)?,
        _ => Vec::new(),
    };

    let octopus = config.octopus_client()?;
    let environment = validate_environment(&octopus, &args.environment).await?;
    info!("Deploying to {} ({})", environment.name, environment.id);

    let descriptors: Vec<JobDescriptor> = match request {
        ReleaseRequest::Single { project, version } => vec![JobDescriptor::new(project, version)],
        ReleaseRequest::File(_) => manifest.into_iter().map(JobDescriptor::from).collect(),
        ReleaseRequest::Epic(epic) => {
            let source = JiraDescriptionReleaseSource::new(config.jira_client()?);
            source
                .release_items(epic)
                .await
                .with_context(|| format!("Failed to read release epic {}", epic))?
                .into_iter()
                .map(JobDescriptor::from)
                .collect()
        }
    };

    if descriptors.is_empty() {
        println!("{}", "Nothing to deploy.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!(
            "Deploying {} release(s) to {}:",
            descriptors.len(),
            environment.name
        )
        .bold()
    );

    let repository = Arc::new(OctopusDeploymentRepository::new(octopus, environment));
    super::run_batch(
        repository,
        &descriptors,
        args.log_file.as_deref(),
        config,
        cancel,
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct TestCli {
        #[command(flatten)]
        deploy: DeployArgs,
    }

    fn parse(args: &[&str]) -> Result<DeployArgs, clap::Error> {
        TestCli::try_parse_from(std::iter::once("deploy").chain(args.iter().copied()))
            .map(|cli| cli.deploy)
    }

    #[test]
    fn test_single_project() {
        let args = parse(&["staging", "-p", "payments", "-V", "2.3.1"]).unwrap();
        assert_eq!(
            args.release_request().unwrap(),
            ReleaseRequest::Single {
                project: "payments",
                version: "2.3.1"
            }
        );
    }

    #[test]
    fn test_epic() {
        let args = parse(&["qa", "--epic", "REL-7"]).unwrap();
        assert_eq!(args.release_request().unwrap(), ReleaseRequest::Epic("REL-7"));
    }

    #[test]
    fn test_project_requires_version() {
        assert!(parse(&["staging", "-p", "payments"]).is_err());
    }

    #[test]
    fn test_release_source_required() {
        assert!(parse(&["staging"]).is_err());
    }

    #[test]
    fn test_release_sources_are_exclusive() {
        assert!(parse(&["staging", "-e", "REL-7", "-d", "deploy.txt"]).is_err());
    }
}
