//! Result collector
//!
//! Receives the results of a batch from the completion channel in the order
//! the jobs finish and hands each one to a sink as it arrives.

use anyhow::{Result, bail};
use devop_core::domain::job::{JobHandle, JobResult};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::dispatcher::DispatchFailure;

/// Destination for batch progress and results
///
/// Only `record` is required; the dispatch hooks default to doing nothing.
pub trait ResultSink: Send {
    fn on_dispatched(&mut self, _handle: &JobHandle) {}

    fn on_dispatch_failed(&mut self, _failure: &DispatchFailure) {}

    fn record(&mut self, result: &JobResult) -> Result<()>;
}

/// Fans every event out to each sink in turn
impl ResultSink for Vec<Box<dyn ResultSink>> {
    fn on_dispatched(&mut self, handle: &JobHandle) {
        for sink in self.iter_mut() {
            sink.on_dispatched(handle);
        }
    }

    fn on_dispatch_failed(&mut self, failure: &DispatchFailure) {
        for sink in self.iter_mut() {
            sink.on_dispatch_failed(failure);
        }
    }

    fn record(&mut self, result: &JobResult) -> Result<()> {
        let mut first_error = None;
        for sink in self.iter_mut() {
            if let Err(e) = sink.record(result) {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}

/// Collects exactly `expected` results from a completion channel
pub struct ResultCollector {
    receiver: mpsc::Receiver<JobResult>,
    expected: usize,
}

impl ResultCollector {
    pub fn new(receiver: mpsc::Receiver<JobResult>, expected: usize) -> Self {
        Self { receiver, expected }
    }

    /// Receives every result, forwarding each one to `sink`
    ///
    /// A sink error is logged and does not stop collection. Fails if the
    /// channel closes before all results arrived.
    pub async fn collect(mut self, sink: &mut dyn ResultSink) -> Result<Vec<JobResult>> {
        let mut results = Vec::with_capacity(self.expected);

        while results.len() < self.expected {
            let Some(result) = self.receiver.recv().await else {
                bail!(
                    "Completion channel closed with {} of {} results missing",
                    self.expected - results.len(),
                    self.expected
                );
            };

            debug!(
                "Collected {} ({}/{})",
                result.identifier,
                results.len() + 1,
                self.expected
            );

            if let Err(e) = sink.record(&result) {
                warn!("Failed to record result of {}: {:#}", result.identifier, e);
            }
            results.push(result);
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use devop_core::domain::job::JobOutcome;
    use std::time::Duration;

    #[derive(Default)]
    struct Recorder {
        recorded: Vec<String>,
        fail: bool,
    }

    impl ResultSink for Recorder {
        fn record(&mut self, result: &JobResult) -> Result<()> {
            self.recorded.push(result.identifier.clone());
            if self.fail {
                bail!("disk full");
            }
            Ok(())
        }
    }

    fn result(identifier: &str) -> JobResult {
        JobResult::from_outcome(
            &JobHandle::new(identifier, "1"),
            JobOutcome {
                succeeded: true,
                ..Default::default()
            },
            Duration::from_secs(1),
        )
    }

    #[tokio::test]
    async fn test_collects_in_arrival_order() {
        let (tx, rx) = mpsc::channel(3);
        for id in ["C", "A", "B"] {
            tx.send(result(id)).await.unwrap();
        }

        let mut sink = Recorder::default();
        let results = ResultCollector::new(rx, 3).collect(&mut sink).await.unwrap();

        let order: Vec<_> = results.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(order, vec!["C", "A", "B"]);
        assert_eq!(sink.recorded, vec!["C", "A", "B"]);
    }

    #[tokio::test]
    async fn test_closed_channel_reports_missing_results() {
        let (tx, rx) = mpsc::channel(3);
        tx.send(result("A")).await.unwrap();
        drop(tx);

        let mut sink = Recorder::default();
        let err = ResultCollector::new(rx, 3)
            .collect(&mut sink)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("2 of 3 results missing"));
    }

    #[tokio::test]
    async fn test_sink_errors_do_not_stop_collection() {
        let (tx, rx) = mpsc::channel(2);
        tx.send(result("A")).await.unwrap();
        tx.send(result("B")).await.unwrap();

        let mut sink = Recorder {
            fail: true,
            ..Default::default()
        };
        let results = ResultCollector::new(rx, 2).collect(&mut sink).await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(sink.recorded.len(), 2);
    }

    #[test]
    fn test_sink_list_records_to_every_sink() {
        let mut sinks: Vec<Box<dyn ResultSink>> = vec![
            Box::new(Recorder {
                fail: true,
                ..Default::default()
            }),
            Box::new(Recorder::default()),
        ];

        let err = sinks.record(&result("A")).unwrap_err();
        assert_eq!(err.to_string(), "disk full");
    }
}
