use std::os::unix::process::ExitStatusExt;
use std::process::ExitStatus;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use super::backend::ClipboardBackend;
use crate::error::CommandError;

/// A write issued through a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClipboardWrite {
    Text(String),
    Binary { mime_type: String, data: Vec<u8> },
}

#[derive(Debug, Default)]
struct MemoryState {
    offers: Vec<(String, Vec<u8>)>,
    writes: Vec<ClipboardWrite>,
    fail_writes: bool,
    fail_reads: bool,
}

/// In-process clipboard
/// Cloned handles share the same contents, so a test can keep one handle
/// while the engine owns another
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        MemoryBackend::default()
    }

    /// Simulate another application copying an image
    pub fn copy_image(&self, mime_type: &str, data: &[u8]) {
        let mut state = self.lock();
        state.offers = vec![(mime_type.to_string(), data.to_vec())];
    }

    /// Simulate another application copying text
    pub fn copy_text(&self, text: &str) {
        let mut state = self.lock();
        state.offers = vec![
            ("text/plain;charset=utf-8".to_string(), text.as_bytes().to_vec()),
            ("text/plain".to_string(), text.as_bytes().to_vec()),
        ];
    }

    /// Simulate another application offering a single non-image type
    pub fn copy_offer(&self, mime_type: &str, data: &[u8]) {
        self.lock().offers = vec![(mime_type.to_string(), data.to_vec())];
    }

    /// Simulate the clipboard owner going away
    pub fn clear(&self) {
        self.lock().offers.clear();
    }

    /// Make subsequent writes fail as if wl-copy exited non-zero
    pub fn set_fail_writes(&self, fail: bool) {
        self.lock().fail_writes = fail;
    }

    /// Make subsequent offering reads time out as if wl-paste hung
    pub fn set_fail_reads(&self, fail: bool) {
        self.lock().fail_reads = fail;
    }

    /// All writes issued so far, oldest first
    pub fn writes(&self) -> Vec<ClipboardWrite> {
        self.lock().writes.clone()
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned lock only means a test panicked mid-write; the data is still usable
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn write_failure() -> CommandError {
        CommandError::Io {
            program: "memory".to_string(),
            source: std::io::Error::other("simulated write failure"),
        }
    }

    fn read_timeout() -> CommandError {
        CommandError::TimedOut {
            program: "memory".to_string(),
            timeout: Duration::from_secs(2),
        }
    }

    /// wl-paste exits with status 1 when the requested type isn't offered
    fn missing() -> CommandError {
        CommandError::Failed {
            program: "memory".to_string(),
            status: ExitStatus::from_raw(1 << 8),
        }
    }
}

impl ClipboardBackend for MemoryBackend {
    fn list_mime_types(&self) -> Result<Vec<String>, CommandError> {
        Ok(self.lock().offers.iter().map(|(m, _)| m.clone()).collect())
    }

    fn read(&self, mime_type: &str) -> Result<Vec<u8>, CommandError> {
        let state = self.lock();
        if state.fail_reads {
            return Err(Self::read_timeout());
        }
        state
            .offers
            .iter()
            .find(|(m, _)| m == mime_type)
            .map(|(_, data)| data.clone())
            .ok_or_else(Self::missing)
    }

    fn read_text(&self) -> Result<String, CommandError> {
        let data = self.read("text/plain")?;
        Ok(String::from_utf8_lossy(&data).trim().to_string())
    }

    fn write_text(&self, text: &str) -> Result<(), CommandError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(Self::write_failure());
        }
        state.offers = vec![("text/plain".to_string(), text.as_bytes().to_vec())];
        state.writes.push(ClipboardWrite::Text(text.to_string()));
        Ok(())
    }

    fn write_binary(&self, mime_type: &str, data: &[u8]) -> Result<(), CommandError> {
        let mut state = self.lock();
        if state.fail_writes {
            return Err(Self::write_failure());
        }
        state.offers = vec![(mime_type.to_string(), data.to_vec())];
        state.writes.push(ClipboardWrite::Binary {
            mime_type: mime_type.to_string(),
            data: data.to_vec(),
        });
        Ok(())
    }

    fn name(&self) -> &'static str {
        "Memory"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_writes_replace_offers() {
        let clipboard = MemoryBackend::new();
        clipboard.copy_image("image/png", b"png");
        assert_eq!(clipboard.list_mime_types().unwrap(), vec!["image/png"]);

        clipboard.write_text("/tmp/a.png").unwrap();
        assert_eq!(clipboard.list_mime_types().unwrap(), vec!["text/plain"]);
        assert_eq!(clipboard.read_text().unwrap(), "/tmp/a.png");
        assert_eq!(
            clipboard.writes(),
            vec![ClipboardWrite::Text("/tmp/a.png".to_string())]
        );
    }

    #[test]
    fn test_clones_share_state() {
        let clipboard = MemoryBackend::new();
        let handle = clipboard.clone();
        clipboard.copy_text("  hello \n");
        assert_eq!(handle.read_text().unwrap(), "hello");
    }

    #[test]
    fn test_failed_write_leaves_contents() {
        let clipboard = MemoryBackend::new();
        clipboard.copy_text("hello");
        clipboard.set_fail_writes(true);

        assert!(clipboard.write_binary("image/png", b"png").is_err());
        assert_eq!(clipboard.read_text().unwrap(), "hello");
        assert!(clipboard.writes().is_empty());
    }

    #[test]
    fn test_missing_text_is_failed_exit() {
        let clipboard = MemoryBackend::new();
        clipboard.copy_offer("text/uri-list", b"file:///tmp/a.txt");
        let err = clipboard.read_text().unwrap_err();
        assert!(matches!(err, CommandError::Failed { .. }));

        clipboard.set_fail_reads(true);
        clipboard.copy_text("hello");
        let err = clipboard.read_text().unwrap_err();
        assert!(matches!(err, CommandError::TimedOut { .. }));
    }
}
