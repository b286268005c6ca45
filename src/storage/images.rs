use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::SyncError;

/// Prefix shared by every saved image, also used by the retention sweep
pub const FILE_PREFIX: &str = "clipboard-";

/// Extensions the store produces (plus `jpeg` for files saved by hand)
pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg"];

/// Persists captured clipboard images as timestamped files
#[derive(Debug, Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub fn new(dir: PathBuf) -> Self {
        ImageStore { dir }
    }

    /// Write `data` verbatim to a new file and return its path
    pub fn save(&self, data: &[u8], mime_type: &str) -> Result<PathBuf, SyncError> {
        self.save_at(data, mime_type, Local::now())
    }

    /// Same as `save` with an explicit capture time.
    /// Two captures within the same second map to the same file and the
    /// later one overwrites the earlier.
    pub fn save_at(
        &self,
        data: &[u8],
        mime_type: &str,
        captured_at: DateTime<Local>,
    ) -> Result<PathBuf, SyncError> {
        let path = self.path_for(mime_type, captured_at);
        fs::write(&path, data).map_err(|source| SyncError::CaptureIo {
            path: path.clone(),
            source,
        })?;

        log::debug!("Saved {} bytes to {:?}", data.len(), path);
        Ok(path)
    }

    /// Read a saved image back
    pub fn load(&self, path: &Path) -> Result<Vec<u8>, SyncError> {
        fs::read(path).map_err(|source| SyncError::ImageRead {
            path: path.to_path_buf(),
            source,
        })
    }

    /// `<dir>/clipboard-YYYYMMDD-HHMMSS<ext>`
    pub fn path_for(&self, mime_type: &str, captured_at: DateTime<Local>) -> PathBuf {
        self.dir.join(format!(
            "{}{}{}",
            FILE_PREFIX,
            captured_at.format("%Y%m%d-%H%M%S"),
            extension_for_mime(mime_type)
        ))
    }
}

/// On-disk extension for a clipboard mime type; unknown types are saved as png
pub fn extension_for_mime(mime_type: &str) -> &'static str {
    let mime = mime_type.to_lowercase();
    if mime.contains("png") {
        ".png"
    } else if mime.contains("jpeg") || mime.contains("jpg") {
        ".jpg"
    } else {
        ".png"
    }
}

/// True for file names the store could have produced
pub fn is_saved_image_name(name: &str) -> bool {
    let Some(rest) = name.strip_prefix(FILE_PREFIX) else {
        return false;
    };
    match rest.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
        }
        None => false,
    }
}
