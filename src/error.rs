use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

use crate::models::Representation;

/// Failure of a single external command invocation
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("i/o error talking to {program}: {source}")]
    Io {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{program} exited with {status}")]
    Failed { program: String, status: ExitStatus },

    #[error("{program} did not finish within {timeout:?}")]
    TimedOut { program: String, timeout: Duration },
}

/// Errors raised while handling a clipboard or focus event, or during a sweep.
/// All of them are recovered at the event (or file) boundary and logged.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error("failed to save image to {path:?}: {source}")]
    CaptureIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to read saved image {path:?}: {source}")]
    ImageRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {representation} to clipboard: {source}")]
    ClipboardWrite {
        representation: Representation,
        #[source]
        source: CommandError,
    },

    #[error("failed to read clipboard: {source}")]
    ClipboardRead {
        #[source]
        source: CommandError,
    },

    #[error("focus query failed: {reason}")]
    FocusQuery { reason: String },

    #[error("failed to remove {path:?}: {source}")]
    CleanupFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to scan {path:?}: {source}")]
    SweepDirectory {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
