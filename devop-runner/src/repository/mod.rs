//! Repository layer
//!
//! Repositories adapt one external service to the two calls the scheduler
//! needs: trigger a job, and check on it once. They hold a service client and
//! no other state, so one instance is shared by every watcher of a batch.
//!
//! All repositories are trait-based to enable testing and mocking.

mod builds;
mod deployments;
#[cfg(test)]
pub(crate) mod scripted;

use anyhow::Result;
use async_trait::async_trait;
use devop_core::domain::job::{JobDescriptor, JobHandle, JobOutcome};

pub use builds::TeamCityBuildRepository;
pub use deployments::OctopusDeploymentRepository;

/// Status observed by a single poll
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollStatus {
    /// The job has not finished yet
    Pending {
        /// Service-specific state (e.g. "queued", "Executing")
        state: String,
    },
    /// The job reached its terminal state
    Finished(JobOutcome),
}

/// Repository trait for dispatching and polling jobs on one service
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// Noun used in log lines ("build", "deployment")
    fn kind(&self) -> &'static str;

    /// Triggers the job described by `descriptor`
    ///
    /// # Returns
    /// The handle the service assigned to the new job
    async fn dispatch(&self, descriptor: &JobDescriptor) -> Result<JobHandle>;

    /// Issues one status request for a dispatched job
    async fn poll(&self, handle: &JobHandle) -> Result<PollStatus>;
}
