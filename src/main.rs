use anyhow::{Context, Result};
use clap::Parser;
use std::env;
use std::sync::atomic::Ordering;

use wayclip::clipboard;
use wayclip::command::CommandRunner;
use wayclip::daemon::{Daemon, DaemonTiming};
use wayclip::focus::{self, FocusSource, NoFocus, WindowClassifier};
use wayclip::logging;
use wayclip::storage::{
    self, ConfigStorage, RetentionSweeper, TomlConfigStorage, ensure_directories, home_dir,
};
use wayclip::sync::SyncEngine;

#[derive(Parser)]
#[command(name = "wayclip", version)]
#[command(about = "Gives terminals a file path and other apps the image when an image is copied")]
#[command(
    long_about = "Runs until interrupted. Configured through ~/.config/wayclip/wayclip.toml and \
the CLIPBOARD_SAVE_DIR, CLIPBOARD_RETENTION_DAYS, CLIPBOARD_TERMINAL_APPS and WAYCLIP_LOG \
environment variables."
)]
struct Cli {}

fn main() -> Result<()> {
    let _cli = Cli::parse();

    let (data_dir, config_dir) = ensure_directories()?;
    let config_storage = TomlConfigStorage::new(config_dir.join("wayclip.toml"));
    let mut config = config_storage.load()?;
    let warnings = config.apply_overrides(Some(&home_dir()?), |key| env::var(key).ok());
    let general = config.general;

    // Relative log files live in the data directory
    let log_file = general.log_file.as_ref().map(|p| data_dir.join(p));
    logging::init_logger(&general.log_level, log_file.as_deref())?;
    for warning in warnings {
        log::warn!("{}", warning);
    }

    let runner = CommandRunner::new(general.command_timeout());
    let store = storage::ensure_save_dir(&general)?;
    let clipboard = clipboard::create_backend(runner)?;
    log::debug!("Using {} clipboard backend", clipboard.name());

    let detected = focus::detect(runner);
    let focus_enabled = detected.is_some();
    if !focus_enabled {
        log::warn!("Hyprland not detected - auto-switching disabled");
    }
    let focus = detected.unwrap_or_else(|| Box::new(NoFocus) as Box<dyn FocusSource>);

    let engine = SyncEngine::new(
        clipboard,
        focus,
        WindowClassifier::new(&general.terminal_apps),
        store,
    );
    let sweeper = RetentionSweeper::new(general.save_dir.clone(), general.retention_days);

    log::info!("Started - saving to {}", general.save_dir.display());
    if focus_enabled {
        log::info!("Terminal apps get paths, others get images");
    }
    if sweeper.is_enabled() {
        log::info!("Auto-cleanup: {} days retention", sweeper.max_age_days());
    }

    let mut daemon = Daemon::new(engine, sweeper, DaemonTiming::from(&general));

    let shutdown = daemon.shutdown_handle();
    ctrlc::set_handler(move || shutdown.store(true, Ordering::SeqCst))
        .context("Failed to set Ctrl+C handler")?;

    daemon.run();
    Ok(())
}
