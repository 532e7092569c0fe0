//! Release service
//!
//! Enumerates the project versions that make up a release. Releases are
//! tracked as Jira epics whose description links to each Octopus release.

use anyhow::{Context, Result};
use async_trait::async_trait;
use devop_client::JiraClient;
use devop_core::domain::release::ReleaseItem;
use tracing::{debug, warn};

/// Marker of an Octopus release link inside an epic description
pub const RELEASE_LINK_MARKER: &str = "/app#/projects";

/// Service trait for enumerating the items of a release
#[async_trait]
pub trait ReleaseSource: Send + Sync {
    /// Returns the project versions tracked by `epic`
    async fn release_items(&self, epic: &str) -> Result<Vec<ReleaseItem>>;
}

/// Reads release items from the release links in a Jira epic's description
///
/// Each link looks like
/// `https://octopus.example.com/app#/projects/<project>/releases/<version>`.
/// This depends on how the epic happens to be written; a structured source
/// can replace it behind `ReleaseSource`.
#[derive(Debug, Clone)]
pub struct JiraDescriptionReleaseSource {
    client: JiraClient,
}

impl JiraDescriptionReleaseSource {
    pub fn new(client: JiraClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ReleaseSource for JiraDescriptionReleaseSource {
    async fn release_items(&self, epic: &str) -> Result<Vec<ReleaseItem>> {
        let issue = self
            .client
            .get_issue(epic)
            .await
            .with_context(|| format!("Failed to fetch epic {}", epic))?;

        let Some(description) = issue.description_text() else {
            warn!("Epic {} has no text description", epic);
            return Ok(Vec::new());
        };

        let items = scrape_release_items(description);
        debug!("Epic {} lists {} release item(s)", epic, items.len());
        Ok(items)
    }
}

/// Extracts one item per release link line, lowercased
///
/// The project is the 6th and the version the 8th `/`-separated segment of
/// the line. Lines that do not have both are skipped.
pub fn scrape_release_items(description: &str) -> Vec<ReleaseItem> {
    description
        .lines()
        .map(str::to_lowercase)
        .filter(|line| line.contains(RELEASE_LINK_MARKER))
        .filter_map(|line| {
            let parts: Vec<&str> = line.split('/').collect();
            let project = parts.get(5).map(|p| clean_segment(p));
            let version = parts.get(7).map(|v| clean_segment(v));

            match (project, version) {
                (Some(project), Some(version)) if !project.is_empty() && !version.is_empty() => {
                    Some(ReleaseItem::new(project, version))
                }
                _ => {
                    warn!("Skipping malformed release link: {}", line.trim());
                    None
                }
            }
        })
        .collect()
}

fn clean_segment(segment: &str) -> &str {
    segment.trim().trim_end_matches(']').trim()
}
