//! Job dispatcher
//!
//! Triggers each job of a batch in input order. A failed dispatch does not
//! stop the remaining ones.

use std::sync::Arc;

use devop_core::domain::job::{JobDescriptor, JobHandle};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::repository::JobRepository;

/// A job the service refused or could not be reached for
#[derive(Debug)]
pub struct DispatchFailure {
    pub identifier: String,
    pub error: anyhow::Error,
}

/// Outcome of dispatching a batch
#[derive(Debug, Default)]
pub struct DispatchReport {
    /// Handles of the dispatched jobs, in input order
    pub handles: Vec<JobHandle>,
    pub failures: Vec<DispatchFailure>,
}

impl DispatchReport {
    pub fn has_failures(&self) -> bool {
        !self.failures.is_empty()
    }
}

pub struct JobDispatcher {
    repository: Arc<dyn JobRepository>,
}

impl JobDispatcher {
    pub fn new(repository: Arc<dyn JobRepository>) -> Self {
        Self { repository }
    }

    /// Issues one triggering request per descriptor
    ///
    /// Once `cancel` fires, the descriptors not yet dispatched are reported as
    /// failures without contacting the service.
    pub async fn dispatch_all(
        &self,
        descriptors: &[JobDescriptor],
        cancel: &CancellationToken,
    ) -> DispatchReport {
        let kind = self.repository.kind();
        let mut report = DispatchReport::default();

        for descriptor in descriptors {
            if cancel.is_cancelled() {
                report.failures.push(DispatchFailure {
                    identifier: descriptor.identifier.clone(),
                    error: anyhow::anyhow!("{} not dispatched: cancelled", kind),
                });
                continue;
            }

            match self.repository.dispatch(descriptor).await {
                Ok(handle) => {
                    info!(
                        "Dispatched {} {} as {}",
                        kind, descriptor.identifier, handle.id
                    );
                    report.handles.push(handle);
                }
                Err(e) => {
                    warn!("Failed to dispatch {} {}: {:#}", kind, descriptor.identifier, e);
                    report.failures.push(DispatchFailure {
                        identifier: descriptor.identifier.clone(),
                        error: e,
                    });
                }
            }
        }

        report
    }
}
