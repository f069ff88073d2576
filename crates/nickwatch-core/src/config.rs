use crate::clock::monitor_offset;
use crate::retry::RetryPolicy;
use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Input format for scheduled start times, read in UTC+3.
pub const START_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// When the monitor makes its first attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    /// Start polling right away.
    #[default]
    Continuous,
    /// Wait for `start_time`, then poll.
    Scheduled,
}

/// Cool-down overrides (optional `[cooldowns]` section in config.toml).
/// Overrides may only lengthen the built-in waits, never shorten them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CooldownConfig {
    /// Wait after HTTP 429, in seconds.
    pub rate_limited_secs: u64,
    /// Wait after a transport failure, in seconds.
    pub network_error_secs: u64,
    /// Wait after HTTP 5xx, in seconds.
    pub server_error_secs: u64,
}

/// Monitor configuration stored in `~/.config/nickwatch/config.toml`.
#[derive(Clone, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Bearer token for the platform API.
    pub api_token: String,
    /// Account to rename.
    pub user_id: u64,
    /// Name to claim.
    pub target_username: String,
    /// Seconds between attempts after a rejection (>= 1).
    pub check_interval_secs: u64,
    #[serde(default)]
    pub mode: Mode,
    /// First attempt time; required in scheduled mode, absent otherwise.
    #[serde(default)]
    pub start_time: Option<DateTime<FixedOffset>>,
    /// API root; the production host when unset.
    #[serde(default)]
    pub api_base: Option<String>,
    #[serde(default)]
    pub cooldowns: Option<CooldownConfig>,
}

impl std::fmt::Debug for MonitorConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MonitorConfig")
            .field("api_token", &"<redacted>")
            .field("user_id", &self.user_id)
            .field("target_username", &self.target_username)
            .field("check_interval_secs", &self.check_interval_secs)
            .field("mode", &self.mode)
            .field("start_time", &self.start_time)
            .field("api_base", &self.api_base)
            .field("cooldowns", &self.cooldowns)
            .finish()
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("API token must not be empty")]
    EmptyToken,
    #[error("target username must not be empty")]
    EmptyUsername,
    #[error("check interval must be at least 1 second")]
    IntervalTooShort,
    #[error("scheduled mode needs a start time")]
    MissingStartTime,
    #[error("start time is only allowed in scheduled mode")]
    UnexpectedStartTime,
    #[error("invalid start time {0:?}, expected YYYY-MM-DD HH:MM")]
    BadStartTime(String),
    #[error("cooldown {name} = {secs}s is below the {min}s minimum")]
    CooldownTooShort {
        name: &'static str,
        secs: u64,
        min: u64,
    },
}

impl CooldownConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let floor = RetryPolicy::default();
        for (name, secs, min) in [
            ("rate_limited_secs", self.rate_limited_secs, floor.rate_limited),
            ("network_error_secs", self.network_error_secs, floor.network_error),
            ("server_error_secs", self.server_error_secs, floor.server_error),
        ] {
            if secs < min.as_secs() {
                return Err(ConfigError::CooldownTooShort {
                    name,
                    secs,
                    min: min.as_secs(),
                });
            }
        }
        Ok(())
    }
}

impl MonitorConfig {
    /// Continuous-mode config with default API base and cool-downs.
    pub fn continuous(token: &str, user_id: u64, username: &str, interval_secs: u64) -> Self {
        Self {
            api_token: token.trim().to_string(),
            user_id,
            target_username: username.trim().to_string(),
            check_interval_secs: interval_secs,
            mode: Mode::Continuous,
            start_time: None,
            api_base: None,
            cooldowns: None,
        }
    }

    /// Switch to scheduled mode starting at `start`.
    pub fn scheduled_at(mut self, start: DateTime<FixedOffset>) -> Self {
        self.mode = Mode::Scheduled;
        self.start_time = Some(start);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_token.trim().is_empty() {
            return Err(ConfigError::EmptyToken);
        }
        if self.target_username.trim().is_empty() {
            return Err(ConfigError::EmptyUsername);
        }
        if self.check_interval_secs < 1 {
            return Err(ConfigError::IntervalTooShort);
        }
        match (self.mode, self.start_time) {
            (Mode::Scheduled, None) => return Err(ConfigError::MissingStartTime),
            (Mode::Continuous, Some(_)) => return Err(ConfigError::UnexpectedStartTime),
            _ => {}
        }
        match &self.cooldowns {
            Some(c) => c.validate(),
            None => Ok(()),
        }
    }

    pub fn api_base(&self) -> &str {
        self.api_base
            .as_deref()
            .unwrap_or(crate::client::DEFAULT_API_BASE)
    }

    /// Cool-downs from `[cooldowns]`, never shorter than the defaults.
    pub fn retry_policy(&self) -> RetryPolicy {
        let floor = RetryPolicy::default();
        match &self.cooldowns {
            Some(c) => RetryPolicy {
                rate_limited: Duration::from_secs(c.rate_limited_secs).max(floor.rate_limited),
                network_error: Duration::from_secs(c.network_error_secs).max(floor.network_error),
                server_error: Duration::from_secs(c.server_error_secs).max(floor.server_error),
            },
            None => floor,
        }
    }
}

/// Parse an operator-entered `YYYY-MM-DD HH:MM` as UTC+3.
pub fn parse_start_time(input: &str) -> Result<DateTime<FixedOffset>, ConfigError> {
    let bad = || ConfigError::BadStartTime(input.to_string());
    let naive = NaiveDateTime::parse_from_str(input.trim(), START_TIME_FORMAT).map_err(|_| bad())?;
    monitor_offset()
        .from_local_datetime(&naive)
        .single()
        .ok_or_else(bad)
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("nickwatch")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

/// Load the config from its XDG location; `None` on first run.
pub fn load() -> Result<Option<MonitorConfig>> {
    load_from(&config_path()?)
}

/// Load and validate a config file; `None` if it does not exist.
pub fn load_from(path: &Path) -> Result<Option<MonitorConfig>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let cfg: MonitorConfig =
        toml::from_str(&data).with_context(|| format!("parsing {}", path.display()))?;
    cfg.validate()
        .with_context(|| format!("invalid config {}", path.display()))?;
    Ok(Some(cfg))
}

/// Validate and write the config to its XDG location.
pub fn save(cfg: &MonitorConfig) -> Result<PathBuf> {
    let path = config_path()?;
    save_to(cfg, &path)?;
    Ok(path)
}

pub fn save_to(cfg: &MonitorConfig, path: &Path) -> Result<()> {
    cfg.validate()?;
    let toml = toml::to_string_pretty(cfg)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml)?;
    tracing::info!("saved config to {}", path.display());
    Ok(())
}
