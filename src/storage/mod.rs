pub mod config;
pub mod images;
pub mod retention;

use anyhow::{Context, Result};
use std::env;
use std::fs;
use std::path::PathBuf;

pub use config::{Config, ConfigStorage, GeneralConfig, TomlConfigStorage};
pub use images::ImageStore;
pub use retention::{RetentionSweeper, SweepReport, SweepSchedule};

/// The user's home directory
pub fn home_dir() -> Result<PathBuf> {
    let home = env::var("HOME").context("HOME environment variable not set")?;
    Ok(PathBuf::from(home))
}

/// Ensure XDG data and config directories exist
/// Returns (data_dir, config_dir)
///
/// XDG Base Directory Specification:
/// - Data: $XDG_DATA_HOME/wayclip (default: ~/.local/share/wayclip)
/// - Config: $XDG_CONFIG_HOME/wayclip (default: ~/.config/wayclip)
pub fn ensure_directories() -> Result<(PathBuf, PathBuf)> {
    let home_path = home_dir()?;

    let data_dir = if let Ok(xdg_data) = env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join("wayclip")
    } else {
        home_path.join(".local/share/wayclip")
    };

    let config_dir = if let Ok(xdg_config) = env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join("wayclip")
    } else {
        home_path.join(".config/wayclip")
    };

    fs::create_dir_all(&data_dir)
        .with_context(|| format!("Failed to create data directory {:?}", data_dir))?;

    fs::create_dir_all(&config_dir)
        .with_context(|| format!("Failed to create config directory {:?}", config_dir))?;

    log::debug!("Data directory: {:?}", data_dir);
    log::debug!("Config directory: {:?}", config_dir);

    Ok((data_dir, config_dir))
}

/// Create the image save directory
pub fn ensure_save_dir(config: &GeneralConfig) -> Result<ImageStore> {
    fs::create_dir_all(&config.save_dir)
        .with_context(|| format!("Failed to create save directory {:?}", config.save_dir))?;
    Ok(ImageStore::new(config.save_dir.clone()))
}
