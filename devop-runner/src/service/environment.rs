//! Environment service
//!
//! Resolves the environment a deploy batch targets. Production is refused
//! before any remote call is made; other names must match an environment
//! defined on the release manager, ignoring case.

use async_trait::async_trait;
use devop_client::{ClientError, OctopusClient};
use devop_core::domain::release::{Environment, is_production_name};
use thiserror::Error;
use tracing::debug;

/// Source of the deployment environments defined on the release manager
#[async_trait]
pub trait EnvironmentSource: Send + Sync {
    async fn list_environments(&self) -> Result<Vec<Environment>, ClientError>;
}

#[async_trait]
impl EnvironmentSource for OctopusClient {
    async fn list_environments(&self) -> Result<Vec<Environment>, ClientError> {
        OctopusClient::list_environments(self).await
    }
}

/// Errors returned when a deploy target is not acceptable
#[derive(Debug, Error)]
pub enum EnvironmentError {
    #[error("Deploying to production is not allowed")]
    ProductionNotAllowed,

    #[error("Unknown environment {requested}. Valid values are:\n\t{}", .valid.join("\n\t"))]
    Unknown {
        requested: String,
        /// Non-production environment names
        valid: Vec<String>,
    },

    #[error("Failed to list environments: {0}")]
    Lookup(#[from] ClientError),
}

/// Validates `name` and returns the environment it refers to
pub async fn validate_environment(
    source: &dyn EnvironmentSource,
    name: &str,
) -> Result<Environment, EnvironmentError> {
    if is_production_name(name) {
        return Err(EnvironmentError::ProductionNotAllowed);
    }

    let environments = source.list_environments().await?;
    debug!("Release manager defines {} environment(s)", environments.len());

    if let Some(environment) = environments.iter().find(|e| e.matches(name)) {
        return Ok(environment.clone());
    }

    Err(EnvironmentError::Unknown {
        requested: name.to_string(),
        valid: environments
            .into_iter()
            .filter(|e| !e.is_production())
            .map(|e| e.name)
            .collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeEnvironments {
        calls: AtomicUsize,
        unavailable: bool,
    }

    #[async_trait]
    impl EnvironmentSource for FakeEnvironments {
        async fn list_environments(&self) -> Result<Vec<Environment>, ClientError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.unavailable {
                return Err(ClientError::api_error(503, "Service Unavailable"));
            }
            Ok(vec![
                Environment::new("Environments-1", "Staging"),
                Environment::new("Environments-2", "QA"),
                Environment::new("Environments-3", "Production"),
            ])
        }
    }

    #[tokio::test]
    async fn test_match_ignores_case() {
        let source = FakeEnvironments::default();
        let environment = validate_environment(&source, "staging").await.unwrap();
        assert_eq!(environment, Environment::new("Environments-1", "Staging"));
    }

    #[tokio::test]
    async fn test_production_rejected_without_lookup() {
        let source = FakeEnvironments::default();

        for name in ["production", "PRODUCTION", "Production"] {
            let err = validate_environment(&source, name).await.unwrap_err();
            assert!(matches!(err, EnvironmentError::ProductionNotAllowed));
        }
        assert_eq!(source.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_unknown_lists_non_production_names() {
        let source = FakeEnvironments::default();
        let err = validate_environment(&source, "uat").await.unwrap_err();

        match &err {
            EnvironmentError::Unknown { requested, valid } => {
                assert_eq!(requested, "uat");
                assert_eq!(valid, &vec!["Staging".to_string(), "QA".to_string()]);
            }
            other => panic!("expected unknown environment, got {:?}", other),
        }
        assert_eq!(
            err.to_string(),
            "Unknown environment uat. Valid values are:\n\tStaging\n\tQA"
        );
    }

    #[tokio::test]
    async fn test_lookup_failure() {
        let source = FakeEnvironments {
            unavailable: true,
            ..Default::default()
        };
        let err = validate_environment(&source, "qa").await.unwrap_err();
        assert!(matches!(err, EnvironmentError::Lookup(_)));
    }
}
