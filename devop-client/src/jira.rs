//! Jira REST client

use devop_core::dto::jira::{ErrorCollection, Issue};
use reqwest::{Client, Method, RequestBuilder};

use crate::error::{ClientError, Result};
use crate::{BasicAuth, endpoint, trim_base_url};

/// HTTP client for the Jira REST API
///
/// The base URL is the REST root (e.g. "https://jira.example.com/rest/api/2").
#[derive(Debug, Clone)]
pub struct JiraClient {
    base_url: String,
    auth: BasicAuth,
    client: Client,
}

impl JiraClient {
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

    /// Get an issue by key (e.g. "REL-12")
    pub async fn get_issue(&self, key: &str) -> Result<Issue> {
        let response = self
            .request(Method::GET, &["issue", key])?
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(api_error(status.as_u16(), &body));
        }

        response
            .json()
            .await
            .map_err(|e| ClientError::ParseError(format!("Failed to parse Jira issue {}: {}", key, e)))
    }

    fn request(&self, method: Method, segments: &[&str]) -> Result<RequestBuilder> {
        let url = endpoint(&self.base_url, segments)?;
        Ok(self
            .client
            .request(method, url)
            .basic_auth(&self.auth.username, Some(&self.auth.password)))
    }
}

/// Build an API error, preferring the messages of a Jira error collection
fn api_error(status: u16, body: &str) -> ClientError {
    let message = serde_json::from_str::<ErrorCollection>(body)
        .map(|errors| errors.message())
        .ok()
        .filter(|message| !message.is_empty())
        .unwrap_or_else(|| body.to_string());

    ClientError::api_error(status, message)
}
