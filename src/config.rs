//! Top-level application configuration.
//!
//! Configuration is stored as YAML in the platform config directory
//! (`~/.config/ticketdesk/config.yaml` on Linux) and includes:
//! - Backend base URL
//! - HTTP timeouts and retry count for reads
//! - Default sort for `ls`
//!
//! `TICKETDESK_CONFIG` points at an alternative file and `TICKETDESK_URL`
//! overrides the configured backend URL.

use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{DeskError, Result};
use crate::query::{SortKey, SortOrder, SortSpec};

pub const CONFIG_ENV: &str = "TICKETDESK_CONFIG";
pub const URL_ENV: &str = "TICKETDESK_URL";
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000";

/// Keys accepted by `config get` and `config set`.
pub const CONFIG_KEYS: &[&str] = &[
    "base_url",
    "timeout",
    "connect_timeout",
    "retries",
    "default_sort",
    "default_order",
];

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Total request timeout in seconds (default: 30)
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Connect timeout in seconds (default: 10)
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout: u64,

    /// Retries for idempotent reads on transient failures (default: 2)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Sort key used by `ls` when none is given
    #[serde(default = "default_sort")]
    pub default_sort: String,

    /// Sort order used by `ls` when none is given
    #[serde(default = "default_order")]
    pub default_order: String,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

fn default_retries() -> u32 {
    2
}

fn default_sort() -> String {
    SortKey::default().to_string()
}

fn default_order() -> String {
    SortOrder::default().to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            connect_timeout: default_connect_timeout(),
            retries: default_retries(),
            default_sort: default_sort(),
            default_order: default_order(),
        }
    }
}

/// Parse and check a backend URL. Only http and https are accepted.
pub fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| DeskError::Config(format!("invalid backend URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DeskError::Config(format!(
            "invalid backend URL '{raw}': unsupported scheme '{other}'"
        ))),
    }
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> Result<PathBuf> {
        if let Ok(path) = env::var(CONFIG_ENV)
            && !path.is_empty()
        {
            return Ok(PathBuf::from(path));
        }

        ProjectDirs::from("", "", "ticketdesk")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
            .ok_or_else(|| {
                DeskError::Config(format!(
                    "could not determine a config directory; set {CONFIG_ENV}"
                ))
            })
    }

    /// Load and validate configuration, or return default if not found
    pub fn load() -> Result<Self> {
        let config = Self::load_unchecked()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration without checking its values.
    ///
    /// The `config` commands use this so a bad value can still be
    /// inspected and replaced.
    pub fn load_unchecked() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&path)?;
        Ok(serde_yaml_ng::from_str(&content)?)
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = serde_yaml_ng::to_string(self)?;
        fs::write(&path, content)?;
        Ok(())
    }

    /// Apply the same checks `set` applies to each key.
    pub fn validate(&self) -> Result<()> {
        parse_base_url(&self.base_url)?;
        check_seconds("timeout", self.timeout)?;
        check_seconds("connect_timeout", self.connect_timeout)?;
        self.default_sort_spec()?;
        Ok(())
    }

    /// Resolve the backend URL: explicit override, then `TICKETDESK_URL`, then the file.
    pub fn resolve_base_url(&self, cli_override: Option<&str>) -> Result<Url> {
        if let Some(url) = cli_override {
            return parse_base_url(url);
        }
        if let Ok(url) = env::var(URL_ENV)
            && !url.is_empty()
        {
            return parse_base_url(&url);
        }
        parse_base_url(&self.base_url)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.timeout)
    }

    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout)
    }

    pub fn default_sort_spec(&self) -> Result<SortSpec> {
        Ok(SortSpec::new(
            self.default_sort.parse()?,
            self.default_order.parse()?,
        ))
    }

    /// Read one key as text.
    pub fn get(&self, key: &str) -> Result<String> {
        let value = match key {
            "base_url" => self.base_url.clone(),
            "timeout" => self.timeout.to_string(),
            "connect_timeout" => self.connect_timeout.to_string(),
            "retries" => self.retries.to_string(),
            "default_sort" => self.default_sort.clone(),
            "default_order" => self.default_order.clone(),
            _ => return Err(unknown_key(key)),
        };
        Ok(value)
    }

    /// Set one key from text, validating the value for that key.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        match key {
            "base_url" => {
                parse_base_url(value)?;
                self.base_url = value.trim().to_string();
            }
            "timeout" => self.timeout = parse_seconds(key, value)?,
            "connect_timeout" => self.connect_timeout = parse_seconds(key, value)?,
            "retries" => {
                self.retries = value.trim().parse().map_err(|_| {
                    DeskError::Config(format!(
                        "invalid value '{value}' for retries. Expected a non-negative integer"
                    ))
                })?;
            }
            "default_sort" => {
                let key: SortKey = value.parse()?;
                self.default_sort = key.to_string();
            }
            "default_order" => {
                let order: SortOrder = value.parse()?;
                self.default_order = order.to_string();
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn parse_seconds(key: &str, value: &str) -> Result<u64> {
    value
        .trim()
        .parse::<u64>()
        .map_err(|_| seconds_error(key, value))
        .and_then(|secs| check_seconds(key, secs))
}

fn check_seconds(key: &str, secs: u64) -> Result<u64> {
    if secs == 0 {
        return Err(seconds_error(key, &secs.to_string()));
    }
    Ok(secs)
}

fn seconds_error(key: &str, value: &str) -> DeskError {
    DeskError::Config(format!(
        "invalid value '{value}' for {key}. Expected a positive number of seconds"
    ))
}

fn unknown_key(key: &str) -> DeskError {
    DeskError::Config(format!(
        "unknown config key '{key}'. Valid keys: {}",
        CONFIG_KEYS.join(", ")
    ))
}
