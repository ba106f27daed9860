//! Runtime configuration.
//!
//! Defaults, then an optional TOML file, then `ERESIDENCY_*` environment
//! variables, later sources winning.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "eresidency.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Directory holding the storage file and the log file
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Simulated latency of both login operations
    #[serde(default = "default_login_delay_ms")]
    pub login_delay_ms: u64,

    /// Simulated latency of application and business submission
    #[serde(default = "default_submit_delay_ms")]
    pub submit_delay_ms: u64,

    /// Log level used when `RUST_LOG` is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("eresidency"))
        .unwrap_or_else(|| PathBuf::from(".eresidency"))
}

fn default_login_delay_ms() -> u64 {
    800
}

fn default_submit_delay_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            login_delay_ms: default_login_delay_ms(),
            submit_delay_ms: default_submit_delay_ms(),
            log_level: default_log_level(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from the first config file found and the process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match Self::find_config_file() {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok());
        Ok(config)
    }

    /// Reads a TOML config file. Missing fields take their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Applies `ERESIDENCY_*` overrides from `lookup`.
    ///
    /// Unparseable numbers leave the current value in place.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = lookup("ERESIDENCY_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(delay) = lookup("ERESIDENCY_LOGIN_DELAY_MS") {
            self.login_delay_ms = delay.parse().unwrap_or(self.login_delay_ms);
        }
        if let Some(delay) = lookup("ERESIDENCY_SUBMIT_DELAY_MS") {
            self.submit_delay_ms = delay.parse().unwrap_or(self.submit_delay_ms);
        }
        if let Some(level) = lookup("ERESIDENCY_LOG_LEVEL") {
            self.log_level = level;
        }
    }

    pub fn login_delay(&self) -> Duration {
        Duration::from_millis(self.login_delay_ms)
    }

    pub fn submit_delay(&self) -> Duration {
        Duration::from_millis(self.submit_delay_ms)
    }

    /// Path of the log file inside the data directory.
    pub fn log_file(&self) -> PathBuf {
        self.data_dir.join("eresidency.log")
    }

    fn find_config_file() -> Option<PathBuf> {
        let mut locations = vec![PathBuf::from(LOCAL_CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            locations.push(dir.join("eresidency").join("config.toml"));
        }
        locations.into_iter().find(|path| path.exists())
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
