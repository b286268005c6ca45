pub mod backend;
pub mod memory;
pub mod wayland;

use anyhow::{Result, anyhow};
use std::env;

use crate::command::CommandRunner;

pub use backend::ClipboardBackend;
pub use memory::{ClipboardWrite, MemoryBackend};
pub use wayland::WaylandBackend;

/// Create a clipboard backend based on the current display server
/// Detects Wayland via WAYLAND_DISPLAY environment variable
/// Returns error if no supported display server is detected
pub fn create_backend(runner: CommandRunner) -> Result<Box<dyn ClipboardBackend>> {
    if env::var("WAYLAND_DISPLAY").is_ok() {
        log::info!("Detected Wayland display server");
        let backend = WaylandBackend::new(runner)?;
        return Ok(Box::new(backend));
    }

    if env::var("DISPLAY").is_ok() {
        return Err(anyhow!(
            "X11 detected but not supported. Wayland support only (set WAYLAND_DISPLAY)"
        ));
    }

    Err(anyhow!(
        "No supported display server detected. Set WAYLAND_DISPLAY for Wayland"
    ))
}

/// First offered mime type that is an image
pub fn find_image_mime(mime_types: &[String]) -> Option<&str> {
    mime_types
        .iter()
        .map(String::as_str)
        .find(|m| m.starts_with("image/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_image_mime() {
        let types: Vec<String> = ["text/html", "image/jpeg", "image/png"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        assert_eq!(find_image_mime(&types), Some("image/jpeg"));

        let text_only = vec!["text/plain".to_string(), "UTF8_STRING".to_string()];
        assert_eq!(find_image_mime(&text_only), None);
        assert_eq!(find_image_mime(&[]), None);
    }
}
