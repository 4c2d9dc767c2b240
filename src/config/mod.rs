mod schema;
pub mod validation;

pub use schema::FileConfig;
pub use validation::validate_settings;

use anyhow::{Context, Result};
use reqwest::Url;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::credentials::{token_from, ENV_TOKEN_VAR};
use crate::devops::RepositoryLocator;
use crate::error::PulseError;
use crate::notify::Topics;
use crate::pulse::{PulseMap, TeamRoster, DEFAULT_NEW_PR_THRESHOLD_MINUTES};
use crate::stale::DEFAULT_STALE_THRESHOLD_HOURS;

pub const ENV_ORG_URL: &str = "PR_PULSE_ORG_URL";
pub const ENV_PROJECT: &str = "PR_PULSE_PROJECT";
pub const ENV_REPOSITORY_ID: &str = "PR_PULSE_REPOSITORY_ID";
pub const ENV_NEW_PR_THRESHOLD: &str = "PR_PULSE_NEW_PR_THRESHOLD";
pub const ENV_STALE_THRESHOLD: &str = "PR_PULSE_STALE_THRESHOLD";
pub const ENV_FETCH_TIMEOUT: &str = "PR_PULSE_FETCH_TIMEOUT";
pub const ENV_PULSE_MAP: &str = "PR_PULSE_PULSE_MAP";
pub const ENV_SINK_ENDPOINT: &str = "PR_PULSE_SINK_ENDPOINT";
pub const ENV_SINK_TOKEN: &str = "PR_PULSE_SINK_TOKEN";
pub const ENV_PATTERN_TOPIC: &str = "PR_PULSE_PATTERN_TOPIC";
pub const ENV_SWITCH_TOPIC: &str = "PR_PULSE_SWITCH_TOPIC";
pub const ENV_CONFIG_PATH: &str = "PR_PULSE_CONFIG";

const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 30;

/// Where pulses are published
#[derive(Debug, Clone, PartialEq)]
pub struct SinkSettings {
    pub endpoint: Url,
    pub token: Option<String>,
}

/// Everything a run needs, read once at startup
#[derive(Debug, Clone)]
pub struct Settings {
    pub token: Option<String>,
    pub org_url: Option<Url>,
    pub project: Option<String>,
    pub repository_id: Option<String>,
    pub new_pr_threshold: chrono::Duration,
    pub stale_threshold: chrono::Duration,
    pub fetch_timeout: Duration,
    pub roster: TeamRoster,
    pub pulse_map: PulseMap,
    pub sink: Option<SinkSettings>,
    pub topics: Topics,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            token: None,
            org_url: None,
            project: None,
            repository_id: None,
            new_pr_threshold: chrono::Duration::minutes(DEFAULT_NEW_PR_THRESHOLD_MINUTES),
            stale_threshold: chrono::Duration::hours(DEFAULT_STALE_THRESHOLD_HOURS),
            fetch_timeout: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            roster: TeamRoster::default(),
            pulse_map: PulseMap::default(),
            sink: None,
            topics: Topics::default(),
        }
    }
}

impl Settings {
    /// Repository coordinates; all three variables must be set
    pub fn locator(&self) -> Result<RepositoryLocator, PulseError> {
        let missing = |name: &str| PulseError::Configuration {
            message: format!("{} is not set", name),
        };
        Ok(RepositoryLocator {
            org_url: self.org_url.clone().ok_or_else(|| missing(ENV_ORG_URL))?,
            project: self.project.clone().ok_or_else(|| missing(ENV_PROJECT))?,
            repository_id: self
                .repository_id
                .clone()
                .ok_or_else(|| missing(ENV_REPOSITORY_ID))?,
        })
    }
}

/// Get the config directory path (~/.config/pr-pulse/)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".config").join("pr-pulse"))
}

/// Get the default config file path (~/.config/pr-pulse/config.yaml)
pub fn get_config_path() -> Option<PathBuf> {
    get_config_dir().map(|dir| dir.join("config.yaml"))
}

/// Load the YAML file with roster and pulse map
///
/// # Errors
///
/// Returns an error if the file cannot be read or the YAML cannot be parsed
pub fn load_file_config(path: &Path) -> Result<FileConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;

    let config: FileConfig = serde_saphyr::from_str(&content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", path.display()))?;

    Ok(config)
}

/// Load settings from the process environment.
///
/// `config_path` (from the command line) takes precedence over
/// `PR_PULSE_CONFIG`; with neither, the default path is used if it exists.
pub fn load_settings(config_path: Option<PathBuf>) -> Result<Settings> {
    let lookup = |name: &str| std::env::var(name).ok();

    let explicit = config_path.or_else(|| lookup(ENV_CONFIG_PATH).map(PathBuf::from));
    let file = match explicit {
        Some(path) => {
            if !path.exists() {
                anyhow::bail!("Config file not found at {}", path.display());
            }
            Some(load_file_config(&path)?)
        }
        None => match get_config_path() {
            Some(path) if path.exists() => Some(load_file_config(&path)?),
            _ => None,
        },
    };

    settings_from_lookup(lookup, file.unwrap_or_default())
}

/// Build settings from a variable lookup and the (possibly empty) file config.
/// Environment values win over the file; unset values fall back to defaults.
pub fn settings_from_lookup<F>(lookup: F, file: FileConfig) -> Result<Settings>
where
    F: Fn(&str) -> Option<String>,
{
    let get = |name: &str| {
        lookup(name)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };
    let defaults = Settings::default();

    let org_url = get(ENV_ORG_URL)
        .map(|raw| {
            Url::parse(&raw).with_context(|| format!("{}: invalid URL '{}'", ENV_ORG_URL, raw))
        })
        .transpose()?;

    let pulse_map = match get(ENV_PULSE_MAP) {
        Some(raw) => serde_json::from_str(&raw)
            .with_context(|| format!("{}: invalid pulse map JSON", ENV_PULSE_MAP))?,
        None => file.pulse_map.unwrap_or(defaults.pulse_map),
    };

    let sink = get(ENV_SINK_ENDPOINT)
        .map(|raw| {
            Url::parse(&raw)
                .with_context(|| format!("{}: invalid URL '{}'", ENV_SINK_ENDPOINT, raw))
                .map(|endpoint| SinkSettings {
                    endpoint,
                    token: get(ENV_SINK_TOKEN),
                })
        })
        .transpose()?;

    Ok(Settings {
        token: token_from(lookup(ENV_TOKEN_VAR)),
        org_url,
        project: get(ENV_PROJECT),
        repository_id: get(ENV_REPOSITORY_ID),
        new_pr_threshold: parse_span(ENV_NEW_PR_THRESHOLD, get(ENV_NEW_PR_THRESHOLD))?
            .unwrap_or(defaults.new_pr_threshold),
        stale_threshold: parse_span(ENV_STALE_THRESHOLD, get(ENV_STALE_THRESHOLD))?
            .unwrap_or(defaults.stale_threshold),
        fetch_timeout: get(ENV_FETCH_TIMEOUT)
            .map(|raw| {
                humantime::parse_duration(&raw)
                    .with_context(|| format!("{}: invalid duration '{}'", ENV_FETCH_TIMEOUT, raw))
            })
            .transpose()?
            .unwrap_or(defaults.fetch_timeout),
        roster: file.roster.unwrap_or(defaults.roster),
        pulse_map,
        sink,
        topics: Topics {
            pattern: get(ENV_PATTERN_TOPIC).unwrap_or(defaults.topics.pattern),
            switch: get(ENV_SWITCH_TOPIC).unwrap_or(defaults.topics.switch),
        },
    })
}

/// Parse a humantime duration ("10m", "16h") into a chrono span
fn parse_span(name: &str, raw: Option<String>) -> Result<Option<chrono::Duration>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let std_duration = humantime::parse_duration(&raw)
        .with_context(|| format!("{}: invalid duration '{}'", name, raw))?;
    let span = chrono::Duration::from_std(std_duration)
        .with_context(|| format!("{}: duration out of range '{}'", name, raw))?;
    Ok(Some(span))
}
