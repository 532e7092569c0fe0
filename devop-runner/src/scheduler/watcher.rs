//! Completion watcher
//!
//! Polls one dispatched job until it reaches a terminal state and turns what
//! it observed into exactly one JobResult. Watching ends early when the batch
//! is cancelled or the job outlives the configured maximum duration.

use std::sync::Arc;

use devop_core::domain::job::{JobHandle, JobResult};
use tokio::time::{self, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::WatchConfig;
use crate::repository::{JobRepository, PollStatus};

pub struct CompletionWatcher {
    repository: Arc<dyn JobRepository>,
    config: WatchConfig,
    cancel: CancellationToken,
}

impl CompletionWatcher {
    pub fn new(
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

    /// Watches `handle` to completion
    ///
    /// Never fails: poll errors, cancellation and timeouts all become results.
    pub async fn watch(&self, handle: JobHandle) -> JobResult {
        let started = Instant::now();

        let deadline = async {
            match self.config.max_duration {
                Some(max_duration) => time::sleep(max_duration).await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                info!("Stopped watching {} {}: cancelled", self.repository.kind(), handle.identifier);
                JobResult::cancelled(&handle, started.elapsed())
            }
            _ = deadline => {
                warn!(
                    "{} {} did not finish within {:?}",
                    self.repository.kind(),
                    handle.identifier,
                    started.elapsed()
                );
                JobResult::timed_out(&handle, started.elapsed())
            }
            result = self.poll_until_terminal(&handle, started) => result,
        }
    }

    async fn poll_until_terminal(&self, handle: &JobHandle, started: Instant) -> JobResult {
        let kind = self.repository.kind();
        let mut consecutive_failures = 0u32;

        loop {
            time::sleep(self.config.poll_interval).await;

            match self.repository.poll(handle).await {
                Ok(PollStatus::Finished(outcome)) => {
                    let result = JobResult::from_outcome(handle, outcome, started.elapsed());
                    info!("{} {} {}", kind, handle.identifier, result.state);
                    return result;
                }
                Ok(PollStatus::Pending { state }) => {
                    consecutive_failures = 0;
                    debug!("{} {} ({}) is {}", kind, handle.identifier, handle.id, state);
                }
                Err(e) => {
                    consecutive_failures += 1;
                    warn!(
                        "Status request for {} {} failed ({}/{}): {:#}",
                        kind,
                        handle.identifier,
                        consecutive_failures,
                        self.config.max_poll_failures,
                        e
                    );

                    if consecutive_failures >= self.config.max_poll_failures {
                        return JobResult::errored(
                            handle,
                            format!(
                                "gave up after {} failed status requests: {:#}",
                                consecutive_failures, e
                            ),
                            started.elapsed(),
                        );
                    }
                }
            }
        }
    }
}
