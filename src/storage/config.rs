use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::focus::DEFAULT_TERMINAL_APPS;

/// Environment variables that override the config file
pub const ENV_SAVE_DIR: &str = "CLIPBOARD_SAVE_DIR";
pub const ENV_RETENTION_DAYS: &str = "CLIPBOARD_RETENTION_DAYS";
pub const ENV_TERMINAL_APPS: &str = "CLIPBOARD_TERMINAL_APPS";
pub const ENV_LOG_LEVEL: &str = "WAYCLIP_LOG";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
}

/// General configuration settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    /// Where captured images are written (`~` is expanded)
    #[serde(default = "default_save_dir")]
    pub save_dir: PathBuf,

    /// Days since last access before a saved image is deleted (<= 0 disables)
    #[serde(default = "default_retention_days")]
    pub retention_days: i64,

    /// Window class/title fragments that receive a path instead of the image
    #[serde(default = "default_terminal_apps")]
    pub terminal_apps: Vec<String>,

    /// Delay between polls of the clipboard and focused window
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// How often the retention sweep runs
    #[serde(default = "default_cleanup_interval_secs")]
    pub cleanup_interval_secs: u64,

    /// Pause after a failed loop iteration
    #[serde(default = "default_error_backoff_ms")]
    pub error_backoff_ms: u64,

    /// Upper bound for a single wl-paste / wl-copy / hyprctl call
    #[serde(default = "default_command_timeout_ms")]
    pub command_timeout_ms: u64,

    /// error, warn, info, debug or trace
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Optional log file (rotated daily) in addition to stdout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        GeneralConfig {
            save_dir: default_save_dir(),
            retention_days: default_retention_days(),
            terminal_apps: default_terminal_apps(),
            poll_interval_ms: default_poll_interval_ms(),
            cleanup_interval_secs: default_cleanup_interval_secs(),
            error_backoff_ms: default_error_backoff_ms(),
            command_timeout_ms: default_command_timeout_ms(),
            log_level: default_log_level(),
            log_file: None,
        }
    }
}

impl GeneralConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    pub fn error_backoff(&self) -> Duration {
        Duration::from_millis(self.error_backoff_ms)
    }

    pub fn command_timeout(&self) -> Duration {
        Duration::from_millis(self.command_timeout_ms)
    }
}

// Default value functions for serde
fn default_save_dir() -> PathBuf {
    PathBuf::from("~/Desktop/clipboard-images")
}

fn default_retention_days() -> i64 {
    7
}

fn default_terminal_apps() -> Vec<String> {
    DEFAULT_TERMINAL_APPS.iter().map(|s| s.to_string()).collect()
}

fn default_poll_interval_ms() -> u64 {
    300
}

fn default_cleanup_interval_secs() -> u64 {
    3600
}

fn default_error_backoff_ms() -> u64 {
    1000
}

fn default_command_timeout_ms() -> u64 {
    2000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Apply environment overrides, then expand `~` in paths.
    /// `lookup` is `std::env::var` in production. Returns warnings for
    /// ignored values (the logger isn't up yet when this runs).
    pub fn apply_overrides<F>(&mut self, home: Option<&Path>, lookup: F) -> Vec<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let general = &mut self.general;
        let mut warnings = Vec::new();

        if let Some(dir) = lookup(ENV_SAVE_DIR).filter(|v| !v.trim().is_empty()) {
            general.save_dir = PathBuf::from(dir.trim());
        }

        if let Some(days) = lookup(ENV_RETENTION_DAYS) {
            match days.trim().parse::<i64>() {
                Ok(days) => general.retention_days = days,
                Err(_) => warnings.push(format!(
                    "Ignoring {}={:?}: not an integer, keeping {} days",
                    ENV_RETENTION_DAYS, days, general.retention_days
                )),
            }
        }

        if let Some(apps) = lookup(ENV_TERMINAL_APPS) {
            let apps: Vec<String> = apps
                .split(['|', ','])
                .map(str::trim)
                .filter(|a| !a.is_empty())
                .map(str::to_string)
                .collect();
            if !apps.is_empty() {
                general.terminal_apps = apps;
            }
        }

        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|v| !v.trim().is_empty()) {
            general.log_level = level.trim().to_string();
        }

        if let Some(home) = home {
            general.save_dir = expand_home(&general.save_dir, home);
            general.log_file = general.log_file.as_deref().map(|p| expand_home(p, home));
        }

        warnings
    }
}

/// Replace a leading `~` with the home directory
pub fn expand_home(path: &Path, home: &Path) -> PathBuf {
    match path.strip_prefix("~") {
        Ok(rest) => home.join(rest),
        Err(_) => path.to_path_buf(),
    }
}

/// Trait for configuration storage
pub trait ConfigStorage: Send + Sync {
    /// Load configuration from file
    fn load(&self) -> Result<Config>;

    /// Get the config file path
    fn path(&self) -> &PathBuf;

    /// Create default configuration file if it doesn't exist
    fn create_default(&self) -> Result<()>;
}

/// TOML-based implementation of ConfigStorage
pub struct TomlConfigStorage {
    path: PathBuf,
}

impl TomlConfigStorage {
    /// Create a new TomlConfigStorage with the given path
    pub fn new(path: PathBuf) -> Self {
        TomlConfigStorage { path }
    }
}

impl ConfigStorage for TomlConfigStorage {
    fn load(&self) -> Result<Config> {
        // If file doesn't exist, create default and return it
        if !self.path.exists() {
            log::debug!(
                "Config file not found at {:?}, creating default configuration",
                self.path
            );
            self.create_default()?;
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config from {:?}", self.path))?;

        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {:?}", self.path))?;

        log::debug!("Loaded configuration from {:?}", self.path);
        Ok(config)
    }

    fn path(&self) -> &PathBuf {
        &self.path
    }

    fn create_default(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory {:?}", parent))?;
        }

        // Use the example config compiled into the binary
        let example_config = include_str!("../../wayclip.toml.example");

        fs::write(&self.path, example_config)
            .with_context(|| format!("Failed to create default config at {:?}", self.path))?;

        log::debug!("Created default configuration at {:?}", self.path);
        Ok(())
    }
}
