use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant, SystemTime};

use super::images::is_saved_image_name;
use crate::error::SyncError;

const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Result of one retention pass
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub removed: usize,
    pub failed: usize,
}

/// Deletes saved images whose last access is older than the retention period
#[derive(Debug, Clone)]
pub struct RetentionSweeper {
    dir: PathBuf,
    max_age_days: i64,
}

impl RetentionSweeper {
    pub fn new(dir: PathBuf, max_age_days: i64) -> Self {
        RetentionSweeper { dir, max_age_days }
    }

    /// Zero or negative retention turns the sweep off
    pub fn is_enabled(&self) -> bool {
        self.max_age_days > 0
    }

    pub fn max_age_days(&self) -> i64 {
        self.max_age_days
    }

    /// Sweep relative to the current time
    pub fn sweep(&self) -> Result<SweepReport, SyncError> {
        self.sweep_at(SystemTime::now())
    }

    /// Remove every matching file last accessed before `now - max_age_days`.
    /// A failure on one file is logged and does not stop the pass.
    pub fn sweep_at(&self, now: SystemTime) -> Result<SweepReport, SyncError> {
        let mut report = SweepReport::default();
        if !self.is_enabled() {
            return Ok(report);
        }

        let max_age =
            Duration::from_secs((self.max_age_days as u64).saturating_mul(SECS_PER_DAY));
        let Some(cutoff) = now.checked_sub(max_age) else {
            return Ok(report);
        };

        let entries = fs::read_dir(&self.dir).map_err(|source| SyncError::SweepDirectory {
            path: self.dir.clone(),
            source,
        })?;

        for entry in entries.flatten() {
            let path = entry.path();
            let is_candidate = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(is_saved_image_name);
            if !is_candidate {
                continue;
            }

            match remove_if_stale(&path, cutoff) {
                Ok(true) => report.removed += 1,
                Ok(false) => {}
                Err(e) => {
                    log::warn!("Error cleaning {}", e);
                    report.failed += 1;
                }
            }
        }

        if report.removed > 0 {
            log::info!(
                "Cleaned {} old images (>{} days)",
                report.removed,
                self.max_age_days
            );
        }

        Ok(report)
    }
}

fn remove_if_stale(path: &Path, cutoff: SystemTime) -> Result<bool, SyncError> {
    let cleanup_err = |source| SyncError::CleanupFile {
        path: path.to_path_buf(),
        source,
    };

    let metadata = fs::metadata(path).map_err(cleanup_err)?;
    if !metadata.is_file() {
        return Ok(false);
    }

    // Filesystems without atime support report an error here
    let last_used = metadata
        .accessed()
        .or_else(|_| metadata.modified())
        .map_err(cleanup_err)?;

    if last_used < cutoff {
        fs::remove_file(path).map_err(cleanup_err)?;
        log::debug!("Removed stale image {:?}", path);
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Tracks when the next periodic sweep is due
#[derive(Debug, Clone, Copy)]
pub struct SweepSchedule {
    interval: Duration,
    last_run: Instant,
}

impl SweepSchedule {
    /// Schedule starting now (the startup sweep counts as the first run)
    pub fn new(interval: Duration) -> Self {
        SweepSchedule::starting_at(interval, Instant::now())
    }

    pub fn starting_at(interval: Duration, last_run: Instant) -> Self {
        SweepSchedule { interval, last_run }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.last_run) > self.interval
    }

    pub fn mark_run(&mut self, now: Instant) {
        self.last_run = now;
    }
}
