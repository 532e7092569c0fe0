//! Batch runner
//!
//! Runs a batch end to end: dispatch every job, spawn one watcher task per
//! dispatched job, then collect one result per watcher. Watchers report
//! through a bounded channel sized to the batch.

use std::sync::Arc;

use anyhow::Result;
use devop_core::domain::job::{JobDescriptor, JobResult};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::collector::{ResultCollector, ResultSink};
use super::dispatcher::{DispatchFailure, JobDispatcher};
use super::watcher::CompletionWatcher;
use crate::config::WatchConfig;
use crate::repository::JobRepository;

/// Results of a batch
#[derive(Debug, Default)]
pub struct BatchReport {
    /// One result per dispatched job, in completion order
    pub results: Vec<JobResult>,
    pub dispatch_failures: Vec<DispatchFailure>,
}

impl BatchReport {
    /// True when every job was dispatched, whatever the jobs' own outcomes
    pub fn all_dispatched(&self) -> bool {
        self.dispatch_failures.is_empty()
    }

    pub fn succeeded(&self) -> usize {
        self.results.iter().filter(|r| r.is_success()).count()
    }
}

pub struct BatchRunner {
    repository: Arc<dyn JobRepository>,
    config: WatchConfig,
    cancel: CancellationToken,
}

impl BatchRunner {
    pub fn new(repository: Arc<dyn JobRepository>, config: WatchConfig) -> Self {
        Self::with_cancellation(repository, config, CancellationToken::new())
    }

    /// Creates a runner whose watchers stop when `cancel` fires
    pub fn with_cancellation(
        repository: Arc<dyn JobRepository>,
        config: WatchConfig,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            repository,
            config,
            cancel,
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs `descriptors` as one batch, reporting progress to `sink`
    pub async fn run(
        &self,
        descriptors: &[JobDescriptor],
        sink: &mut dyn ResultSink,
    ) -> Result<BatchReport> {
        self.config.validate()?;

        let kind = self.repository.kind();
        info!("Starting batch of {} {}(s)", descriptors.len(), kind);

        let dispatch = JobDispatcher::new(Arc::clone(&self.repository))
            .dispatch_all(descriptors, &self.cancel)
            .await;

        for handle in &dispatch.handles {
            sink.on_dispatched(handle);
        }
        for failure in &dispatch.failures {
            sink.on_dispatch_failed(failure);
        }

        let expected = dispatch.handles.len();
        let (tx, rx) = mpsc::channel(expected.max(1));

        for handle in dispatch.handles {
            let watcher = CompletionWatcher::new(
                Arc::clone(&self.repository),
                self.config.clone(),
                self.cancel.child_token(),
            );
            let tx = tx.clone();

            tokio::spawn(async move {
                let identifier = handle.identifier.clone();
                let result = watcher.watch(handle).await;
                if tx.send(result).await.is_err() {
                    warn!("Result of {} dropped: collector is gone", identifier);
                }
            });
        }
        // Only the watchers hold senders now, so a dead watcher closes the channel
        drop(tx);

        debug!("Watching {} {}(s)", expected, kind);
        let results = ResultCollector::new(rx, expected).collect(sink).await?;

        let report = BatchReport {
            results,
            dispatch_failures: dispatch.failures,
        };
        info!(
            "Batch finished: {}/{} succeeded, {} not dispatched",
            report.succeeded(),
            report.results.len(),
            report.dispatch_failures.len()
        );

        Ok(report)
    }
}
