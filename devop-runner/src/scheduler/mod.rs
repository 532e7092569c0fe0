//! Scheduler layer for the runner
//!
//! This layer drives a batch of jobs through its lifecycle: the dispatcher
//! triggers every job, one watcher task per dispatched job polls it to a
//! terminal state, and the collector gathers one result per watcher.

mod batch;
mod collector;
mod dispatcher;
mod watcher;

pub use batch::{BatchReport, BatchRunner};
pub use collector::{ResultCollector, ResultSink};
pub use dispatcher::{DispatchFailure, DispatchReport, JobDispatcher};
pub use watcher::CompletionWatcher;
