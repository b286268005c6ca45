use anyhow::{Context, Result};

use super::backend::ClipboardBackend;
use crate::command::CommandRunner;
use crate::error::CommandError;

/// Wayland clipboard backend using wl-clipboard tools
/// Requires wl-paste and wl-copy to be installed
pub struct WaylandBackend {
    runner: CommandRunner,
}

impl WaylandBackend {
    /// Create a new Wayland clipboard backend
    pub fn new(runner: CommandRunner) -> Result<Self> {
        // Verify wl-copy is available
        runner
            .run("wl-copy", &["--version"], None)
            .context("wl-copy not found. Install wl-clipboard package")?;

        log::debug!("WaylandBackend initialized successfully");
        Ok(WaylandBackend { runner })
    }
}

impl ClipboardBackend for WaylandBackend {
    fn list_mime_types(&self) -> Result<Vec<String>, CommandError> {
        let out = self.runner.output("wl-paste", &["--list-types"])?;
        Ok(parse_mime_list(&out))
    }

    fn read(&self, mime_type: &str) -> Result<Vec<u8>, CommandError> {
        self.runner
            .output("wl-paste", &["--no-newline", "--type", mime_type])
    }

    fn read_text(&self) -> Result<String, CommandError> {
        let out = self
            .runner
            .output("wl-paste", &["--no-newline", "--type", "text/plain"])?;
        Ok(String::from_utf8_lossy(&out).trim().to_string())
    }

    fn write_text(&self, text: &str) -> Result<(), CommandError> {
        self.runner
            .run("wl-copy", &["--type", "text/plain", "--", text], None)?;

        log::debug!("Wrote {} bytes text to clipboard", text.len());
        Ok(())
    }

    fn write_binary(&self, mime_type: &str, data: &[u8]) -> Result<(), CommandError> {
        self.runner
            .run("wl-copy", &["--type", mime_type], Some(data))?;

        log::debug!("Wrote {} bytes {} to clipboard", data.len(), mime_type);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Wayland"
    }
}

/// Split `wl-paste --list-types` output into mime types
fn parse_mime_list(out: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(out)
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
