//! List command handler

use anyhow::{Context, Result};
use clap::Args;
use colored::*;
use devop_runner::service::{JiraDescriptionReleaseSource, ReleaseSource};

use crate::config::Config;

#[derive(Args, Debug)]
pub struct ListArgs {
    /// List the release items of this Jira epic instead of build configurations
    #[arg(short, long)]
    pub epic_id: Option<String>,
}

pub async fn handle_list_command(args: ListArgs, config: &Config) -> Result<()> {
    match args.epic_id {
        Some(epic) => {
            let source = JiraDescriptionReleaseSource::new(config.jira_client()?);
            let items = source.release_items(&epic).await?;
            super::print_release_items(&items);
        }
        None => list_build_types(config).await?,
    }
    Ok(())
}

async fn list_build_types(config: &Config) -> Result<()> {
    let build_types = config
        .teamcity_client()?
        .list_build_types()
        .await
        .context("Failed to list build configurations")?;

    if build_types.is_empty() {
        println!("{}", "No build configurations found.".yellow());
        return Ok(());
    }

    println!(
        "{}",
        format!("Found {} build configuration(s):", build_types.len()).bold()
    );
    println!();
    for build_type in build_types {
        let name = match (&build_type.project_name, &build_type.name) {
            (Some(project), Some(name)) => format!("{} / {}", project, name),
            (None, Some(name)) => name.clone(),
            _ => String::new(),
        };
        println!("  {} {} {}", "▸".cyan(), build_type.id, name.dimmed());
    }
    Ok(())
}
