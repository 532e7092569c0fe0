//! Verify command handler
//!
//! Shows the items of a release, from a Jira epic or a release file, so they
//! can be checked before deploying.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{ArgGroup, Args};
use devop_core::domain::release::ReleaseItem;
use devop_core::manifest::read_deploy_manifest;
use devop_runner::service::{JiraDescriptionReleaseSource, ReleaseSource};

use crate::config::Config;

#[derive(Args, Debug)]
#[command(group(
    ArgGroup::new("release")
        .required(true)
        .args(["epic_id", "release_file"])
))]
pub struct VerifyArgs {
    /// Jira epic listing the release
    #[arg(short, long)]
    pub epic_id: Option<String>,

    /// File listing one `<project> <version>` per line
    #[arg(short = 'f', long)]
    pub release_file: Option<PathBuf>,
}

pub async fn handle_verify_command(args: VerifyArgs, config: &Config) -> Result<()> {
    let items = release_items(&args, config).await?;
    super::print_release_items(&items);
    Ok(())
}

async fn release_items(args: &VerifyArgs, config: &Config) -> Result<Vec<ReleaseItem>> {
    match (&args.epic_id, &args.release_file) {
        (Some(epic), None) => {
            JiraDescriptionReleaseSource::new(config.jira_client()?)
                .release_items(epic)
                .await
        }
        (None, Some(path)) => Ok(read_deploy_manifest(path)?),
        _ => bail!("Specify either --epic-id or --release-file"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_release_file_items() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.txt");
        fs::write(&path, "# sprint 42\npayments 2.3.1\nledger 1.4.0\n").unwrap();

        let args = VerifyArgs {
            epic_id: None,
            release_file: Some(path),
        };
        let items = release_items(&args, &Config::default()).await.unwrap();

        assert_eq!(
            items,
            vec![
                ReleaseItem::new("payments", "2.3.1"),
                ReleaseItem::new("ledger", "1.4.0"),
            ]
        );
    }

    #[tokio::test]
    async fn test_epic_requires_jira_section() {
        let args = VerifyArgs {
            epic_id: Some("REL-7".to_string()),
            release_file: None,
        };
        let err = release_items(&args, &Config::default()).await.unwrap_err();
        assert_eq!(err.to_string(), "No `jira` section configured");
    }

    #[tokio::test]
    async fn test_malformed_release_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("release.txt");
        fs::write(&path, "payments\n").unwrap();

        let args = VerifyArgs {
            epic_id: None,
            release_file: Some(path),
        };
        let err = release_items(&args, &Config::default()).await.unwrap_err();
        assert!(err.to_string().contains("you must specify project and version"));
    }
}
