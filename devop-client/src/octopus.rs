//! Octopus Deploy REST client

use devop_core::domain::release::Environment;
use devop_core::dto::octopus::{
    CreateDeployment, DeploymentResource, EnvironmentResource, ResourceCollection, ResourceId,
    TaskResource,
};
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;

use crate::error::Result;
use crate::{endpoint, handle_response, trim_base_url};

const API_KEY_HEADER: &str = "X-Octopus-ApiKey";

/// HTTP client for the Octopus Deploy REST API
///
/// The base URL is the API root (e.g. "https://octopus.example.com/api").
#[derive(Debug, Clone)]
pub struct OctopusClient {
    base_url: String,
    api_key: String,
    client: Client,
}

impl OctopusClient {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self::with_client(base_url, api_key, Client::new())
    }

    /// Create a client with a custom HTTP client (timeouts, proxies, TLS)
    pub fn with_client(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        client: Client,
    ) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            api_key: api_key.into(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Lookups
    // =============================================================================

    /// List the deployment environments
    pub async fn list_environments(&self) -> Result<Vec<Environment>> {
        let response = self.request(Method::GET, &["environments"])?.send().await?;

        let page: ResourceCollection<EnvironmentResource> = handle_response(response).await?;
        Ok(page.items.into_iter().map(Environment::from).collect())
    }

    /// Resolve a project name or slug to its id (e.g. "Projects-21")
    pub async fn get_project_id(&self, project: &str) -> Result<String> {
        let response = self
            .request(Method::GET, &["projects", project])?
            .send()
            .await?;

        let resource: ResourceId = handle_response(response)
            .await
            .map_err(|e| e.or_not_found(|| format!("Octopus project '{}'", project)))?;
        Ok(resource.id)
    }

    /// Resolve a project's release by version to its id (e.g. "Releases-301")
    pub async fn get_release_id(&self, project_id: &str, version: &str) -> Result<String> {
        let response = self
            .request(Method::GET, &["projects", project_id, "releases", version])?
            .send()
            .await?;

        let resource: ResourceId = handle_response(response).await.map_err(|e| {
            e.or_not_found(|| format!("release {} of Octopus project {}", version, project_id))
        })?;
        Ok(resource.id)
    }

    // =============================================================================
    // Deployments
    // =============================================================================

    /// Deploy a release to an environment
    ///
    /// # Returns
    /// The created deployment; its `task_id` tracks progress
    pub async fn create_deployment(
        &self,
        release_id: &str,
        environment_id: &str,
    ) -> Result<DeploymentResource> {
        debug!("Deploying {} to {}", release_id, environment_id);

        let response = self
            .request(Method::POST, &["deployments"])?
            .json(&CreateDeployment {
                release_id: release_id.to_string(),
                environment_id: environment_id.to_string(),
            })
            .send()
            .await?;

        handle_response(response).await
    }

    /// Get the current state of a server task
    pub async fn get_task(&self, task_id: &str) -> Result<TaskResource> {
        let response = self
            .request(Method::GET, &["tasks", task_id])?
            .send()
            .await?;

        handle_response(response).await
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = endpoint(&self.base_url, segments)?;
        Ok(self
            .client
            .request(method, url)
            .header(API_KEY_HEADER, &self.api_key))
    }
}
