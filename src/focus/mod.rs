pub mod classifier;
pub mod hyprland;

use crate::command::CommandRunner;

pub use classifier::{DEFAULT_TERMINAL_APPS, WindowClassifier};
pub use hyprland::HyprlandFocus;

/// Outcome of asking which window has input focus
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusReading {
    /// Lowercased "class title" of the focused window
    Focused(String),
    /// Focus detection is unavailable or the query failed
    Unavailable,
}

/// Trait for focused-window queries
pub trait FocusSource: Send + Sync {
    fn focused_window(&self) -> FocusReading;
}

/// Focus source used when no supported compositor is running
pub struct NoFocus;

impl FocusSource for NoFocus {
    fn focused_window(&self) -> FocusReading {
        FocusReading::Unavailable
    }
}

/// Probe for a supported compositor once at startup
pub fn detect(runner: CommandRunner) -> Option<Box<dyn FocusSource>> {
    if HyprlandFocus::is_available(&runner) {
        log::debug!("Hyprland focus detection available");
        Some(Box::new(HyprlandFocus::new(runner)))
    } else {
        None
    }
}
