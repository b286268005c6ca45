use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::path::PathBuf;

/// Classification of the focused window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Terminals and editors: they want a file path
    TerminalLike,
    /// Everything else gets the raw image
    Other,
}

/// Which form of the tracked image was last written to the clipboard
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum Representation {
    /// Raw image bytes under the original mime type
    Image,
    /// The saved file path as plain text
    Path,
    /// Nothing written yet for the current image (or no image tracked)
    #[default]
    Unset,
}

impl Representation {
    /// Representation a window of the given kind should receive
    pub fn for_window(kind: WindowKind) -> Self {
        match kind {
            WindowKind::TerminalLike => Representation::Path,
            WindowKind::Other => Representation::Image,
        }
    }
}

impl fmt::Display for Representation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Representation::Image => "image",
            Representation::Path => "path",
            Representation::Unset => "unset",
        };
        f.write_str(name)
    }
}

/// The most recently captured clipboard image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedImage {
    /// Where the bytes were persisted
    pub saved_path: PathBuf,
    /// Mime type offered by the source application, e.g. `image/png`
    pub mime_type: String,
    /// Hash of the raw bytes, used to ignore repeated polls of the same image
    pub fingerprint: u64,
}

impl TrackedImage {
    pub fn new(saved_path: PathBuf, mime_type: String, fingerprint: u64) -> Self {
        TrackedImage {
            saved_path,
            mime_type,
            fingerprint,
        }
    }

    /// True when `text` is the path this image was saved to,
    /// i.e. the clipboard holds our own path write
    pub fn is_own_path(&self, text: &str) -> bool {
        self.saved_path.as_os_str() == text
    }
}

/// Content hash for deduplication of clipboard polls
pub fn fingerprint(data: &[u8]) -> u64 {
    let mut hasher = DefaultHasher::new();
    data.hash(&mut hasher);
    hasher.finish()
}
