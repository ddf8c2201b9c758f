//! Domain-level error taxonomy for uifix.

use std::path::PathBuf;

/// uifix domain errors.
///
/// Only conditions that are fatal to the invoking workflow surface here.
/// Per-item generation and write failures are recovered locally and show
/// up in the workflow summary instead.
#[derive(Debug, thiserror::Error)]
pub enum UifixError {
    #[error("no workspace folder is open")]
    NoWorkspace,

    #[error("no 'ui-test' or 'test' npm script found in {root}/package.json")]
    NoTestScript { root: PathBuf },

    #[error("failed to read manifest {path}: {reason}")]
    ManifestRead { path: PathBuf, reason: String },

    #[error("test command not found: {command} (ensure Node.js and npm are installed and on PATH)")]
    CommandNotFound { command: String },

    #[error("test command failed to run: {0}")]
    CommandFailed(String),

    #[error("test discovery failed: {0}")]
    Discovery(String),

    #[error("invalid glob pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("'{value}' is not a single file or directory name")]
    UnsafeName { value: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for uifix domain operations.
pub type Result<T> = std::result::Result<T, UifixError>;
