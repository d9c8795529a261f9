//! Error types for pomo-core operations.

use std::path::PathBuf;

/// All errors that can occur in pomo-core operations.
///
/// Absence is never an error here: a missing handle file reads as `None`
/// and an empty store lists as an empty sequence.
#[derive(Debug, thiserror::Error)]
pub enum PomoError {
    // ─────────────────────────────────────────────────────────────────────
    // Configuration Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Home directory not found")]
    HomeDirNotFound,

    // ─────────────────────────────────────────────────────────────────────
    // Record Store Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to open record store at {path}: {source}")]
    StoreOpen {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Record store query failed: {context}: {source}")]
    StoreQuery {
        context: String,
        #[source]
        source: rusqlite::Error,
    },

    #[error("Stored record is malformed: {0}")]
    StoreCorrupt(String),

    // ─────────────────────────────────────────────────────────────────────
    // Process Handle Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Process handle I/O failed: {context}: {source}")]
    HandleIo {
        context: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid PID in handle file {path}: {content:?}")]
    CorruptHandle { path: PathBuf, content: String },

    // ─────────────────────────────────────────────────────────────────────
    // Process Errors
    // ─────────────────────────────────────────────────────────────────────
    #[error("Failed to signal process {pid}: {source}")]
    Signal {
        pid: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to install signal listener: {0}")]
    SignalSetup(#[source] std::io::Error),

    #[error("Failed to start background process: {0}")]
    Spawn(#[source] std::io::Error),

    #[error("I/O error: {context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience type alias for Results using PomoError.
pub type Result<T> = std::result::Result<T, PomoError>;

impl PomoError {
    pub(crate) fn query(context: impl Into<String>, source: rusqlite::Error) -> Self {
        PomoError::StoreQuery {
            context: context.into(),
            source,
        }
    }

    pub(crate) fn handle_io(context: impl Into<String>, source: std::io::Error) -> Self {
        PomoError::HandleIo {
            context: context.into(),
            source,
        }
    }
}
