//! Job domain types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// A unit of work to dispatch
///
/// Parsed from one manifest line or built from command-line arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Build configuration id or project name
    pub identifier: String,
    /// Branch or version; empty means the service default
    #[serde(default)]
    pub parameter: String,
}

impl JobDescriptor {
    pub fn new(identifier: impl Into<String>, parameter: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            parameter: parameter.into(),
        }
    }

    /// Returns the parameter, or `None` when the service default applies
    pub fn parameter(&self) -> Option<&str> {
        if self.parameter.is_empty() {
            None
        } else {
            Some(&self.parameter)
        }
    }
}

/// Tracking handle assigned by a service once a job has been dispatched
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobHandle {
    /// Identifier of the descriptor this job was dispatched from
    pub identifier: String,
    /// Service-assigned id (build id, task id)
    pub id: String,
    /// Link to the job in the service's web UI, if reported
    pub web_url: Option<String>,
}

impl JobHandle {
    pub fn new(identifier: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            id: id.into(),
            web_url: None,
        }
    }

    pub fn with_web_url(mut self, web_url: Option<String>) -> Self {
        self.web_url = web_url;
        self
    }
}

/// Final state of a watched job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobState {
    /// The remote job finished successfully
    Succeeded,
    /// The remote job finished unsuccessfully
    Failed,
    /// The job's status could not be observed
    Errored,
    /// The job did not finish within the configured maximum duration
    TimedOut,
    /// Watching was cancelled before the job finished
    Cancelled,
}

impl JobState {
    pub fn is_success(self) -> bool {
        matches!(self, JobState::Succeeded)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            JobState::Succeeded => "succeeded",
            JobState::Failed => "failed",
            JobState::Errored => "errored",
            JobState::TimedOut => "timed out",
            JobState::Cancelled => "cancelled",
        };
        f.write_str(label)
    }
}

/// Outcome fields reported by a service once a job reaches its terminal state
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct JobOutcome {
    pub succeeded: bool,
    /// Raw status string from the service (e.g. "SUCCESS", "Failed")
    pub status: String,
    pub description: String,
    /// Duration as reported by the service
    pub duration: Option<String>,
    pub error_message: Option<String>,
    pub web_url: Option<String>,
}

/// Terminal result of one watched job
///
/// `error_message` is set exactly when `state` is not `Succeeded`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    pub identifier: String,
    pub handle: String,
    pub state: JobState,
    pub description: String,
    pub duration: String,
    pub error_message: Option<String>,
    pub web_url: Option<String>,
    pub finished_at: DateTime<Utc>,
}

impl JobResult {
    /// Build a result from the outcome a service reported
    pub fn from_outcome(handle: &JobHandle, outcome: JobOutcome, elapsed: Duration) -> Self {
        let (state, error_message) = if outcome.succeeded {
            (JobState::Succeeded, None)
        } else {
            let message = outcome
                .error_message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("finished with status {}", outcome.status));
            (JobState::Failed, Some(message))
        };

        Self {
            identifier: handle.identifier.clone(),
            handle: handle.id.clone(),
            state,
            description: outcome.description,
            duration: outcome
                .duration
                .filter(|d| !d.trim().is_empty())
                .unwrap_or_else(|| format_elapsed(elapsed)),
            error_message,
            web_url: outcome.web_url.or_else(|| handle.web_url.clone()),
            finished_at: Utc::now(),
        }
    }

    /// The job's status could not be observed
    pub fn errored(handle: &JobHandle, message: impl Into<String>, elapsed: Duration) -> Self {
        Self::local(handle, JobState::Errored, message.into(), elapsed)
    }

    pub fn timed_out(handle: &JobHandle, elapsed: Duration) -> Self {
        let message = format!("no terminal state after {}", format_elapsed(elapsed));
        Self::local(handle, JobState::TimedOut, message, elapsed)
    }

    pub fn cancelled(handle: &JobHandle, elapsed: Duration) -> Self {
        Self::local(
            handle,
            JobState::Cancelled,
            "watch cancelled before the job finished".to_string(),
            elapsed,
        )
    }

    fn local(handle: &JobHandle, state: JobState, message: String, elapsed: Duration) -> Self {
        Self {
            identifier: handle.identifier.clone(),
            handle: handle.id.clone(),
            state,
            description: String::new(),
            duration: format_elapsed(elapsed),
            error_message: Some(message),
            web_url: handle.web_url.clone(),
            finished_at: Utc::now(),
        }
    }

    pub fn is_success(&self) -> bool {
        self.state.is_success()
    }
}

/// Format an elapsed time as `42s`, `3m 05s` or `1h 02m 09s`
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    match (secs / 3600, (secs % 3600) / 60, secs % 60) {
        (0, 0, s) => format!("{}s", s),
        (0, m, s) => format!("{}m {:02}s", m, s),
        (h, m, s) => format!("{}h {:02}m {:02}s", h, m, s),
    }
}
