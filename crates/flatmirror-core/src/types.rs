//! Content hashes and tracked-file records.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// BLAKE3 content hash used for change detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

/// A source file matched by the path classifier and mirrored into the
/// destination directory.
///
/// The relative path is unique within one pass; the flat name must be unique
/// across the whole tracked set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackedFile {
    /// Path relative to the source root.
    pub relative_path: PathBuf,
    /// Flattened destination filename.
    pub flat_name: String,
}

impl TrackedFile {
    /// Create a new tracked-file record.
    pub fn new(relative_path: impl Into<PathBuf>, flat_name: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            flat_name: flat_name.into(),
        }
    }
}
