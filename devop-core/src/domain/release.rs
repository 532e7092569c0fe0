//! Release domain types

use serde::{Deserialize, Serialize};

use crate::domain::job::JobDescriptor;

/// Name of the environment that may never be deployed to
pub const PRODUCTION: &str = "production";

/// A project version that belongs to a release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseItem {
    pub project: String,
    pub version: String,
}

impl ReleaseItem {
    pub fn new(project: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            project: project.into(),
            version: version.into(),
        }
    }
}

impl From<ReleaseItem> for JobDescriptor {
    fn from(item: ReleaseItem) -> Self {
        JobDescriptor::new(item.project, item.version)
    }
}

/// Deployment target defined on the release manager
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    pub id: String,
    pub name: String,
}

impl Environment {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }

    pub fn is_production(&self) -> bool {
        is_production_name(&self.name)
    }

    /// Case-insensitive comparison against an environment name
    pub fn matches(&self, name: &str) -> bool {
        self.name.to_lowercase() == name.to_lowercase()
    }
}

pub fn is_production_name(name: &str) -> bool {
    name.to_lowercase() == PRODUCTION
}
