//! Devop Runner
//!
//! Runs batches of remote jobs (TeamCity builds, Octopus deployments) to
//! completion.
//!
//! Architecture:
//! - Configuration: Watcher tunables
//! - Repositories: Dispatch and poll jobs on one service
//! - Services: Environment validation and release enumeration for deploys
//! - Scheduler: Dispatch a batch, watch every job, collect the results
//!
//! A batch dispatches its jobs in order, then spawns one watcher task per
//! dispatched job. Each watcher polls its job until it reaches a terminal
//! state and sends exactly one result back over a shared channel, where the
//! collector hands results to a sink in the order the jobs finish.

pub mod config;
pub mod repository;
pub mod scheduler;
pub mod service;

pub use config::WatchConfig;
pub use repository::{
    JobRepository, OctopusDeploymentRepository, PollStatus, TeamCityBuildRepository,
};
pub use scheduler::{BatchReport, BatchRunner, DispatchFailure, ResultSink};
