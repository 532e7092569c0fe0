//! Deployments repository
//!
//! Deploys project releases to one Octopus environment and reads the state
//! of the server task behind each deployment.

use anyhow::{Context, Result};
use async_trait::async_trait;
use devop_client::OctopusClient;
use devop_core::domain::job::{JobDescriptor, JobHandle};
use devop_core::domain::release::Environment;
use tracing::debug;

use super::{JobRepository, PollStatus};

/// Octopus implementation of JobRepository
///
/// Descriptors name a project and carry the release version as parameter.
#[derive(Debug, Clone)]
pub struct OctopusDeploymentRepository {
    client: OctopusClient,
    environment: Environment,
}

impl OctopusDeploymentRepository {
    /// Creates a repository deploying to an already validated environment
    pub fn new(client: OctopusClient, environment: Environment) -> Self {
        Self {
            client,
            environment,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.environment
    }
}

#[async_trait]
impl JobRepository for OctopusDeploymentRepository {
    fn kind(&self) -> &'static str {
        "deployment"
    }

    async fn dispatch(&self, descriptor: &JobDescriptor) -> Result<JobHandle> {
        let project = &descriptor.identifier;
        let version = descriptor
            .parameter()
            .with_context(|| format!("No version given for project {}", project))?;

        let project_id = self
            .client
            .get_project_id(project)
            .await
            .with_context(|| format!("Failed to look up project {}", project))?;

        let release_id = self
            .client
            .get_release_id(&project_id, version)
            .await
            .with_context(|| format!("Failed to look up release {} of {}", version, project))?;

        debug!(
            "Resolved {} {} to {} ({})",
            project, version, release_id, project_id
        );

        let deployment = self
            .client
            .create_deployment(&release_id, &self.environment.id)
            .await
            .with_context(|| {
                format!(
                    "Failed to deploy {} {} to {}",
                    project, version, self.environment.name
                )
            })?;

        Ok(JobHandle::new(project, deployment.task_id))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<PollStatus> {
        let task = self
            .client
            .get_task(&handle.id)
            .await
            .with_context(|| format!("Failed to get status of task {}", handle.id))?;

        if task.is_completed {
            Ok(PollStatus::Finished(task.outcome()))
        } else {
            Ok(PollStatus::Pending { state: task.state })
        }
    }
}
