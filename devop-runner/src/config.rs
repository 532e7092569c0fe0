//! Watch configuration
//!
//! Defines the tunables of the completion watchers: how often a job is
//! polled, how many consecutive poll failures are tolerated, and an optional
//! deadline after which a job is reported as timed out.

use std::time::Duration;

/// Watcher configuration
#[derive(Debug, Clone)]
pub struct WatchConfig {
    /// Delay before each status request
    pub poll_interval: Duration,

    /// Consecutive failed status requests before a job is reported as errored
    pub max_poll_failures: u32,

    /// Maximum time to watch a single job; `None` watches until cancelled
    pub max_duration: Option<Duration>,
}

impl WatchConfig {
    /// Creates a new configuration with defaults
    pub fn new() -> Self {
        Self {
            poll_interval: Duration::from_secs(2),
            max_poll_failures: 3,
            max_duration: None,
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_poll_failures(mut self, max_poll_failures: u32) -> Self {
        self.max_poll_failures = max_poll_failures;
        self
    }

    pub fn with_max_duration(mut self, max_duration: Option<Duration>) -> Self {
        self.max_duration = max_duration;
        self
    }

    /// Validates the configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.poll_interval.is_zero() {
            anyhow::bail!("poll_interval must be greater than 0");
        }

        if self.max_poll_failures == 0 {
            anyhow::bail!("max_poll_failures must be greater than 0");
        }

        if self.max_duration.is_some_and(|d| d.is_zero()) {
            anyhow::bail!("max_duration must be greater than 0 when set");
        }

        Ok(())
    }
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = WatchConfig::default();
        assert_eq!(config.poll_interval, Duration::from_secs(2));
        assert_eq!(config.max_poll_failures, 3);
        assert!(config.max_duration.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = WatchConfig::default();

        config.poll_interval = Duration::ZERO;
        assert!(config.validate().is_err());

        config.poll_interval = Duration::from_millis(500);
        config.max_poll_failures = 0;
        assert!(config.validate().is_err());

        config.max_poll_failures = 1;
        config.max_duration = Some(Duration::ZERO);
        assert!(config.validate().is_err());

        config.max_duration = Some(Duration::from_secs(600));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = WatchConfig::new()
            .with_poll_interval(Duration::from_millis(10))
            .with_max_poll_failures(5)
            .with_max_duration(Some(Duration::from_secs(60)));

        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.max_poll_failures, 5);
        assert_eq!(config.max_duration, Some(Duration::from_secs(60)));
    }
}
