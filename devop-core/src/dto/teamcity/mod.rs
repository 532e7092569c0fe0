//! TeamCity REST DTOs

use serde::{Deserialize, Serialize};

use crate::domain::job::JobOutcome;

/// State TeamCity reports once a build can no longer change
pub const FINISHED_STATE: &str = "finished";

/// Status of a successful build
pub const SUCCESS_STATUS: &str = "SUCCESS";

/// Build as returned by `buildQueue` and `builds/id:{id}`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Build {
    pub id: i64,
    #[serde(default)]
    pub build_type_id: String,
    /// `queued`, `running` or `finished`
    #[serde(default)]
    pub state: String,
    /// `SUCCESS`, `FAILURE` or `UNKNOWN`; absent while queued
    pub status: Option<String>,
    pub status_text: Option<String>,
    pub branch_name: Option<String>,
    pub href: Option<String>,
    pub web_url: Option<String>,
}

impl Build {
    pub fn is_finished(&self) -> bool {
        self.state == FINISHED_STATE
    }

    pub fn is_successful(&self) -> bool {
        self.status.as_deref() == Some(SUCCESS_STATUS)
    }

    /// Outcome fields of a finished build
    pub fn outcome(&self) -> JobOutcome {
        let status = self.status.clone().unwrap_or_default();
        let description = self
            .status_text
            .clone()
            .unwrap_or_else(|| format!("{} {}", self.build_type_id, self.state));
        let succeeded = self.is_successful();

        JobOutcome {
            succeeded,
            error_message: if succeeded {
                None
            } else {
                self.status_text.clone()
            },
            status,
            description,
            duration: None,
            web_url: self.web_url.clone(),
        }
    }
}

/// Reference to a build configuration by id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTypeRef {
    pub id: String,
}

/// Body of `POST /app/rest/buildQueue`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueBuild {
    pub build_type: BuildTypeRef,
    /// Omitted to build the configuration's default branch
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch_name: Option<String>,
}

impl QueueBuild {
    pub fn new(build_type_id: impl Into<String>, branch: Option<&str>) -> Self {
        Self {
            build_type: BuildTypeRef {
                id: build_type_id.into(),
            },
            branch_name: branch.map(str::to_string),
        }
    }
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildType {
    pub id: String,
    pub name: Option<String>,
    pub project_name: Option<String>,
    pub web_url: Option<String>,
}

/// Response of `GET /app/rest/buildTypes`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildTypeList {
    #[serde(default)]
    pub count: usize,
    #[serde(rename = "buildType", default)]
    pub build_types: Vec<BuildType>,
}
