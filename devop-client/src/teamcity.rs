//! TeamCity REST client

use devop_core::dto::teamcity::{Build, BuildType, BuildTypeList, QueueBuild};
use reqwest::header::ACCEPT;
use reqwest::{Client, Method, RequestBuilder};
use tracing::debug;

use crate::error::Result;
use crate::{BasicAuth, endpoint, handle_response, trim_base_url};

/// HTTP client for the TeamCity REST API
///
/// Authenticates every request with HTTP basic auth and asks for JSON.
#[derive(Debug, Clone)]
pub struct TeamCityClient {
    /// Server root (e.g. "https://teamcity.example.com")
    base_url: String,
    auth: BasicAuth,
    client: Client,
}

impl TeamCityClient {
    pub fn new(
        base_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self::with_client(base_url, BasicAuth::new(username, password), Client::new())
    }

    /// Create a client with a custom HTTP client (timeouts, proxies, TLS)
    pub fn with_client(base_url: impl Into<String>, auth: BasicAuth, client: Client) -> Self {
        Self {
            base_url: trim_base_url(base_url),
            auth,
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    // =============================================================================
    // Builds
    // =============================================================================

    /// Add a build of `build_type_id` to the queue
    ///
    /// # Arguments
    /// * `build_type_id` - Build configuration id (e.g. "Payments_Build")
    /// * `branch` - Branch to build; `None` builds the default branch
    ///
    /// # Returns
    /// The queued build, whose `id` identifies it from then on
    pub async fn queue_build(&self, build_type_id: &str, branch: Option<&str>) -> Result<Build> {
        debug!("Queueing TeamCity build {} (branch {:?})", build_type_id, branch);

        let response = self
            .request(Method::POST, &["app", "rest", "buildQueue"])?
            .json(&QueueBuild::new(build_type_id, branch))
            .send()
            .await?;

        handle_response(response).await
    }

    /// Get the current state of a build
    pub async fn get_build(&self, build_id: &str) -> Result<Build> {
        let locator = format!("id:{}", build_id);
        let response = self
            .request(Method::GET, &["app", "rest", "builds", locator.as_str()])?
            .send()
            .await?;

        handle_response(response)
            .await
            .map_err(|e| e.or_not_found(|| format!("TeamCity build {}", build_id)))
    }

    // =============================================================================
    // Build Configurations
    // =============================================================================

    /// List every build configuration visible to the configured user
    pub async fn list_build_types(&self) -> Result<Vec<BuildType>> {
        let response = self
            .request(Method::GET, &["app", "rest", "buildTypes"])?
            .send()
            .await?;

        let list: BuildTypeList = handle_response(response).await?;
        Ok(list.build_types)
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = endpoint(&self.base_url, segments)?;
        Ok(self
            .client
            .request(method, url)
            .basic_auth(&self.auth.username, Some(&self.auth.password))
            .header(ACCEPT, "application/json"))
    }
}
