//! Configuration module
//!
//! Loads service credentials and watcher settings. Values are merged from
//! built-in defaults, a YAML file, then `DEVOP_`-prefixed environment
//! variables (`DEVOP_TEAMCITY__URL=...`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use devop_client::{BasicAuth, JiraClient, OctopusClient, TeamCityClient};
use devop_runner::WatchConfig;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Yaml};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// File name looked up in the working directory, then the home directory
pub const CONFIG_FILE_NAME: &str = ".devop.yaml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file {0} does not exist")]
    FileNotFound(PathBuf),

    #[error("No `{0}` section configured")]
    MissingSection(&'static str),

    #[error("Invalid {section} url {url}: must be an absolute http(s) url")]
    InvalidUrl { section: &'static str, url: String },

    #[error("Invalid watch.poll_interval_secs: must be greater than 0")]
    InvalidPollInterval,

    #[error("Invalid watch.max_poll_failures: must be greater than 0")]
    InvalidMaxPollFailures,

    #[error("Invalid watch.max_duration_secs: must be greater than 0 when set")]
    InvalidMaxDuration,

    #[error("Invalid watch.request_timeout_secs: must be greater than 0")]
    InvalidRequestTimeout,
}

/// Url and basic auth credentials of TeamCity or Jira
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub url: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
}

impl Credentials {
    fn basic_auth(&self) -> BasicAuth {
        BasicAuth::new(&self.username, &self.password)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OctopusConfig {
    /// API root, e.g. `https://octopus.example.com/api`
    pub url: String,
    #[serde(rename = "webapikey")]
    pub api_key: String,
}

/// Watcher tunables as written in the configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchSettings {
    pub poll_interval_secs: u64,
    pub max_poll_failures: u32,
    pub max_duration_secs: Option<u64>,
    /// Timeout of every HTTP request to the services
    pub request_timeout_secs: u64,
}

impl Default for WatchSettings {
    fn default() -> Self {
        Self {
            poll_interval_secs: 2,
            max_poll_failures: 3,
            max_duration_secs: None,
            request_timeout_secs: 30,
        }
    }
}

impl WatchSettings {
    pub fn watch_config(&self) -> WatchConfig {
        WatchConfig::new()
            .with_poll_interval(Duration::from_secs(self.poll_interval_secs))
            .with_max_poll_failures(self.max_poll_failures)
            .with_max_duration(self.max_duration_secs.map(Duration::from_secs))
    }
}

/// CLI configuration
///
/// Service sections are optional; commands fail when the one they need is
/// missing.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub teamcity: Option<Credentials>,
    pub octopus: Option<OctopusConfig>,
    pub jira: Option<Credentials>,
    #[serde(default)]
    pub watch: WatchSettings,
}

impl Config {
    /// Loads the configuration from `explicit`, or from the first
    /// `.devop.yaml` found in the working directory then the home directory
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to read the working directory")?;
        let home = std::env::var_os("HOME").map(PathBuf::from);
        let path = resolve_config_path(explicit, &cwd, home.as_deref())?;
        Self::load_from(path.as_deref())
    }

    /// Loads the configuration from `path` (if any) and the environment
    pub fn load_from(path: Option<&Path>) -> Result<Self> {
        let mut figment = Figment::new().merge(Serialized::defaults(Config::default()));
        if let Some(path) = path {
            figment = figment.merge(Yaml::file(path));
        }

        let config: Config = figment
            .merge(Env::prefixed("DEVOP_").split("__"))
            .extract()
            .with_context(|| match path {
                Some(path) => format!("Failed to load configuration from {}", path.display()),
                None => "Failed to load configuration from the environment".to_string(),
            })?;

        config.validate()?;
        Ok(config)
    }

    /// Validates every configured section
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(teamcity) = &self.teamcity {
            validate_url("teamcity", &teamcity.url)?;
        }
        if let Some(octopus) = &self.octopus {
            validate_url("octopus", &octopus.url)?;
        }
        if let Some(jira) = &self.jira {
            validate_url("jira", &jira.url)?;
        }

        let watch = &self.watch;
        if watch.poll_interval_secs == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }
        if watch.max_poll_failures == 0 {
            return Err(ConfigError::InvalidMaxPollFailures);
        }
        if watch.max_duration_secs == Some(0) {
            return Err(ConfigError::InvalidMaxDuration);
        }
        if watch.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidRequestTimeout);
        }

        Ok(())
    }

    pub fn teamcity_client(&self) -> Result<TeamCityClient> {
        let teamcity = self
            .teamcity
            .as_ref()
            .ok_or(ConfigError::MissingSection("teamcity"))?;
        Ok(TeamCityClient::with_client(
            &teamcity.url,
            teamcity.basic_auth(),
            self.http_client()?,
        ))
    }

    pub fn octopus_client(&self) -> Result<OctopusClient> {
        let octopus = self
            .octopus
            .as_ref()
            .ok_or(ConfigError::MissingSection("octopus"))?;
        Ok(OctopusClient::with_client(
            &octopus.url,
            &octopus.api_key,
            self.http_client()?,
        ))
    }

    pub fn jira_client(&self) -> Result<JiraClient> {
        let jira = self
            .jira
            .as_ref()
            .ok_or(ConfigError::MissingSection("jira"))?;
        Ok(JiraClient::with_client(
            &jira.url,
            jira.basic_auth(),
            self.http_client()?,
        ))
    }

    fn http_client(&self) -> Result<reqwest::Client> {
        reqwest::Client::builder()
            .timeout(Duration::from_secs(self.watch.request_timeout_secs))
            .build()
            .context("Failed to build HTTP client")
    }
}

/// Picks the configuration file to read
///
/// An explicit path must exist. Otherwise the first existing candidate wins,
/// and `None` means only defaults and the environment apply.
pub fn resolve_config_path(
    explicit: Option<&Path>,
    cwd: &Path,
    home: Option<&Path>,
) -> Result<Option<PathBuf>, ConfigError> {
    if let Some(path) = explicit {
        if !path.is_file() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }
        return Ok(Some(path.to_path_buf()));
    }

    let candidates = std::iter::once(cwd.join(CONFIG_FILE_NAME))
        .chain(home.map(|home| home.join(CONFIG_FILE_NAME)));

    Ok(candidates.into_iter().find(|path| path.is_file()))
}

fn validate_url(section: &'static str, url: &str) -> Result<(), ConfigError> {
    match Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        _ => Err(ConfigError::InvalidUrl {
            section,
            url: url.to_string(),
        }),
    }
}
