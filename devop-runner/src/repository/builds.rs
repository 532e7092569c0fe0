//! Builds repository
//!
//! Queues TeamCity builds and reads their state. A build is terminal once
//! TeamCity reports it as `finished`, whatever its status.

use anyhow::{Context, Result};
use async_trait::async_trait;
use devop_client::TeamCityClient;
use devop_core::domain::job::{JobDescriptor, JobHandle};

use super::{JobRepository, PollStatus};

/// TeamCity implementation of JobRepository
#[derive(Debug, Clone)]
pub struct TeamCityBuildRepository {
    client: TeamCityClient,
}

impl TeamCityBuildRepository {
    pub fn new(client: TeamCityClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl JobRepository for TeamCityBuildRepository {
    fn kind(&self) -> &'static str {
        "build"
    }

    async fn dispatch(&self, descriptor: &JobDescriptor) -> Result<JobHandle> {
        let build = self
            .client
            .queue_build(&descriptor.identifier, descriptor.parameter())
            .await
            .with_context(|| format!("Failed to queue build of {}", descriptor.identifier))?;

        Ok(JobHandle::new(&descriptor.identifier, build.id.to_string()).with_web_url(build.web_url))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<PollStatus> {
        let build = self
            .client
            .get_build(&handle.id)
            .await
            .with_context(|| format!("Failed to get status of build {}", handle.id))?;

        if build.is_finished() {
            Ok(PollStatus::Finished(build.outcome()))
        } else {
            Ok(PollStatus::Pending { state: build.state })
        }
    }
}
