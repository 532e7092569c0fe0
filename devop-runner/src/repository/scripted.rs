//! Scripted repository used by scheduler and batch tests

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use anyhow::{Result, anyhow, bail};
use async_trait::async_trait;
use devop_core::domain::job::{JobDescriptor, JobHandle, JobOutcome};

use super::{JobRepository, PollStatus};

/// One scripted poll response
#[derive(Debug, Clone)]
pub enum Step {
    Pending,
    Error,
    Finish { succeeded: bool },
}

/// Repository whose poll responses are scripted per identifier
///
/// Once a script is exhausted, further polls report `Pending`.
#[derive(Default)]
pub struct ScriptedRepository {
    scripts: Mutex<HashMap<String, VecDeque<Step>>>,
    rejected: HashSet<String>,
    polls: Mutex<HashMap<String, usize>>,
    dispatches: AtomicUsize,
}

impl ScriptedRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(self, identifier: &str, steps: impl IntoIterator<Item = Step>) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(identifier.to_string(), steps.into_iter().collect());
        self
    }

    /// Make dispatch of `identifier` fail
    pub fn reject(mut self, identifier: &str) -> Self {
        self.rejected.insert(identifier.to_string());
        self
    }

    pub fn polls(&self, identifier: &str) -> usize {
        self.polls
            .lock()
            .unwrap()
            .get(identifier)
            .copied()
            .unwrap_or(0)
    }

    pub fn dispatches(&self) -> usize {
        self.dispatches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl JobRepository for ScriptedRepository {
    fn kind(&self) -> &'static str {
        "job"
    }

    async fn dispatch(&self, descriptor: &JobDescriptor) -> Result<JobHandle> {
        self.dispatches.fetch_add(1, Ordering::SeqCst);
        if self.rejected.contains(&descriptor.identifier) {
            bail!("{} rejected by service", descriptor.identifier);
        }
        Ok(JobHandle::new(
            &descriptor.identifier,
            format!("{}-handle", descriptor.identifier),
        ))
    }

    async fn poll(&self, handle: &JobHandle) -> Result<PollStatus> {
        *self
            .polls
            .lock()
            .unwrap()
            .entry(handle.identifier.clone())
            .or_default() += 1;

        let step = self
            .scripts
            .lock()
            .unwrap()
            .get_mut(&handle.identifier)
            .and_then(|steps| steps.pop_front())
            .unwrap_or(Step::Pending);

        match step {
            Step::Pending => Ok(PollStatus::Pending {
                state: "running".to_string(),
            }),
            Step::Error => Err(anyhow!("connection reset")),
            Step::Finish { succeeded } => Ok(PollStatus::Finished(JobOutcome {
                succeeded,
                status: if succeeded { "SUCCESS" } else { "FAILURE" }.to_string(),
                description: format!("{} finished", handle.identifier),
                ..Default::default()
            })),
        }
    }
}
