//! Error types for mirroring operations.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that abort a sync pass.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Permission denied for a path.
    #[error("Permission denied: {path}")]
    PermissionDenied { path: PathBuf },

    /// Path not found.
    #[error("Path not found: {path}")]
    NotFound { path: PathBuf },

    /// Generic I/O error.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source root is not a directory.
    #[error("Source root is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    /// The destination directory could not be created.
    #[error("Failed to create destination directory {path}: {source}")]
    DestinationCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Two distinct relative paths flattened to the same destination name.
    #[error("Flat name collision on \"{flat_name}\": {first} and {second}")]
    FlatNameCollision {
        flat_name: String,
        first: PathBuf,
        second: PathBuf,
    },

    /// The manifest could not be serialized.
    #[error("Failed to encode manifest: {source}")]
    ManifestEncode {
        #[source]
        source: serde_json::Error,
    },

    /// The manifest could not be written.
    #[error("Failed to write manifest {path}: {source}")]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid configuration.
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },
}

impl SyncError {
    /// Create an I/O error with path context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            std::io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            std::io::ErrorKind::NotFound => Self::NotFound { path },
            _ => Self::Io { path, source },
        }
    }
}

/// Kind of sync warning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    /// A source or destination file could not be read.
    ReadError,
    /// A tracked file could not be copied to the destination.
    CopyError,
    /// A stale destination entry could not be removed.
    RemoveError,
    /// Error surfaced by the directory walker.
    WalkError,
}

/// Non-fatal problem encountered during a pass.
///
/// Warnings are collected and carried in the pass report; the pass itself
/// continues.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncWarning {
    /// Path where the warning occurred.
    pub path: PathBuf,
    /// Human-readable message.
    pub message: String,
    /// Kind of warning.
    pub kind: WarningKind,
}

impl SyncWarning {
    /// Create a new sync warning.
    pub fn new(path: impl Into<PathBuf>, message: impl Into<String>, kind: WarningKind) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
            kind,
        }
    }

    /// Create a read error warning.
    pub fn read_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("Read error: {error}"), WarningKind::ReadError)
    }

    /// Create a copy error warning.
    pub fn copy_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(path, format!("Copy error: {error}"), WarningKind::CopyError)
    }

    /// Create a remove error warning.
    pub fn remove_error(path: impl Into<PathBuf>, error: &std::io::Error) -> Self {
        Self::new(
            path,
            format!("Remove error: {error}"),
            WarningKind::RemoveError,
        )
    }
}
