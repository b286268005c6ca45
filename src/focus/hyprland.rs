use serde::Deserialize;

use super::{FocusReading, FocusSource};
use crate::command::CommandRunner;
use crate::error::SyncError;

/// Subset of `hyprctl activewindow -j`
#[derive(Debug, Default, Deserialize)]
struct ActiveWindow {
    #[serde(default)]
    class: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Focus source backed by Hyprland's `hyprctl`
pub struct HyprlandFocus {
    runner: CommandRunner,
}

impl HyprlandFocus {
    pub fn new(runner: CommandRunner) -> Self {
        HyprlandFocus { runner }
    }

    /// True when hyprctl is installed and can reach a running compositor
    pub fn is_available(runner: &CommandRunner) -> bool {
        runner.probe("hyprctl", &["version"])
    }

    fn query(&self) -> Result<String, SyncError> {
        let out = self
            .runner
            .output("hyprctl", &["activewindow", "-j"])
            .map_err(|e| SyncError::FocusQuery {
                reason: e.to_string(),
            })?;
        parse_active_window(&out)
    }
}

impl FocusSource for HyprlandFocus {
    fn focused_window(&self) -> FocusReading {
        match self.query() {
            Ok(window) => FocusReading::Focused(window),
            Err(e) => {
                log::debug!("{}", e);
                FocusReading::Unavailable
            }
        }
    }
}

/// Turn hyprctl JSON into the lowercased "class title" descriptor
pub fn parse_active_window(json: &[u8]) -> Result<String, SyncError> {
    let window: ActiveWindow =
        serde_json::from_slice(json).map_err(|e| SyncError::FocusQuery {
            reason: format!("unparseable hyprctl output: {}", e),
        })?;

    Ok(format!(
        "{} {}",
        window.class.unwrap_or_default(),
        window.title.unwrap_or_default()
    )
    .to_lowercase())
}
