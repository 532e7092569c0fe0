//! Devop HTTP Clients
//!
//! Small, type-safe clients for the three services devop glues together:
//! - [`TeamCityClient`]: queue builds, read build status, list build configurations
//! - [`OctopusClient`]: look up environments, projects and releases, create
//!   deployments, read deployment task status
//! - [`JiraClient`]: read issues
//!
//! Clients hold no mutable state and are cheap to clone, so a single instance
//! can be shared by every watcher of a batch.
//!
//! # Example
//!
//! ```no_run
//! use devop_client::TeamCityClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = TeamCityClient::new("https://teamcity.example.com", "builder", "secret");
//!
//!     let build = client.queue_build("Payments_Build", Some("main")).await?;
//!     println!("Queued build {}", build.id);
//!     Ok(())
//! }
//! ```

pub mod error;
mod jira;
mod octopus;
mod teamcity;

// Re-export commonly used types
pub use error::{ClientError, Result};
pub use jira::JiraClient;
pub use octopus::OctopusClient;
pub use teamcity::TeamCityClient;

use reqwest::Url;
use serde::de::DeserializeOwned;

/// Username and password sent as HTTP basic auth
#[derive(Debug, Clone)]
pub struct BasicAuth {
    pub username: String,
    pub password: String,
}

impl BasicAuth {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

// =============================================================================
// URL Helpers
// =============================================================================

/// Normalise a configured base URL
fn trim_base_url(base_url: impl Into<String>) -> String {
    base_url.into().trim_end_matches('/').to_string()
}

/// Append path segments to a base URL, percent-encoding each segment
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| ClientError::InvalidRequest(format!("Invalid base URL {}: {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| ClientError::InvalidRequest(format!("Base URL {} cannot have a path", base_url)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

// =============================================================================
// Response Handlers
// =============================================================================

/// Handle an API response and deserialize JSON
///
/// Checks the status code and returns an `ApiError` carrying the body text if
/// the request failed, or deserializes the response body if successful.
async fn handle_response<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();

    if !status.is_success() {
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(ClientError::api_error(status.as_u16(), error_text));
    }

    response
        .json()
        .await
        .map_err(|e| ClientError::ParseError(format!("Failed to parse JSON response: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_base_url() {
        assert_eq!(trim_base_url("http://localhost:8111/"), "http://localhost:8111");
        assert_eq!(trim_base_url("http://localhost:8111"), "http://localhost:8111");
    }

    #[test]
    fn test_endpoint_keeps_base_path() {
        let url = endpoint("https://octopus.example.com/api", &["projects", "payments"]).unwrap();
        assert_eq!(url.as_str(), "https://octopus.example.com/api/projects/payments");
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let url = endpoint("http://localhost", &["projects", "Payments API"]).unwrap();
        assert_eq!(url.path(), "/projects/Payments%20API");
    }

    #[test]
    fn test_endpoint_rejects_invalid_base() {
        let err = endpoint("not a url", &["tasks"]).unwrap_err();
        assert!(matches!(err, ClientError::InvalidRequest(_)));
    }
}
