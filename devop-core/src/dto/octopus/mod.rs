//! Octopus Deploy REST DTOs
//!
//! Octopus resources use PascalCase property names.

use serde::{Deserialize, Serialize};

use crate::domain::job::JobOutcome;
use crate::domain::release::Environment;

/// Paged collection wrapper
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceCollection<T> {
    pub items: Vec<T>,
    #[serde(default)]
    pub total_results: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct EnvironmentResource {
    pub id: String,
    pub name: String,
}

impl From<EnvironmentResource> for Environment {
    fn from(resource: EnvironmentResource) -> Self {
        Environment::new(resource.id, resource.name)
    }
}

/// Any resource where only the id is of interest (projects, releases)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ResourceId {
    pub id: String,
}

/// Body of `POST /deployments`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CreateDeployment {
    pub release_id: String,
    pub environment_id: String,
}

/// Deployment created by `POST /deployments`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DeploymentResource {
    pub id: String,
    pub task_id: String,
}

/// Server task backing a deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TaskResource {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub state: String,
    pub duration: Option<String>,
    #[serde(default)]
    pub is_completed: bool,
    #[serde(default)]
    pub finished_successfully: bool,
    pub error_message: Option<String>,
}

impl TaskResource {
    /// Outcome fields of a completed task
    pub fn outcome(&self) -> JobOutcome {
        JobOutcome {
            succeeded: self.finished_successfully,
            status: self.state.clone(),
            description: self.description.clone(),
            duration: self.duration.clone(),
            error_message: if self.finished_successfully {
                None
            } else {
                self.error_message.clone()
            },
            web_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_collection() {
        let page: ResourceCollection<EnvironmentResource> = serde_json::from_str(
            r#"{"ItemType": "Environment", "TotalResults": 2, "ItemsPerPage": 30,
                "Items": [{"Id": "Environments-1", "Name": "Staging"},
                          {"Id": "Environments-2", "Name": "QA"}]}"#,
        )
        .unwrap();

        let envs: Vec<Environment> = page.items.into_iter().map(Environment::from).collect();
        assert_eq!(envs[0], Environment::new("Environments-1", "Staging"));
        assert_eq!(envs.len(), 2);
    }

    #[test]
    fn test_failed_task_outcome() {
        let task: TaskResource = serde_json::from_str(
            r#"{"Id": "ServerTasks-77", "Name": "Deploy",
                "Description": "Deploy payments release 2.3.1 to Staging",
                "State": "Failed", "Duration": "1 minute", "IsCompleted": true,
                "FinishedSuccessfully": false, "ErrorMessage": "Step 2 failed"}"#,
        )
        .unwrap();

        let outcome = task.outcome();
        assert!(task.is_completed);
        assert!(!outcome.succeeded);
        assert_eq!(outcome.status, "Failed");
        assert_eq!(outcome.duration.as_deref(), Some("1 minute"));
        assert_eq!(outcome.error_message.as_deref(), Some("Step 2 failed"));
    }

    #[test]
    fn test_deployment_request_uses_pascal_case() {
        let body = serde_json::to_value(CreateDeployment {
            release_id: "Releases-5".to_string(),
            environment_id: "Environments-1".to_string(),
        })
        .unwrap();

        assert_eq!(
            body,
            serde_json::json!({"ReleaseId": "Releases-5", "EnvironmentId": "Environments-1"})
        );
    }
}
