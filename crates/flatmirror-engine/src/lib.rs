//! Incremental mirroring engine for flatmirror.
//!
//! This crate owns the whole of one sync pass: deciding which directories
//! to descend into and which files to track, flattening relative paths into
//! destination filenames, fingerprinting content to detect real changes,
//! copying and pruning, and writing the destination manifest.
//!
//! # Example
//!
//! ```rust,no_run
//! use flatmirror_engine::{SyncConfig, SyncEngine};
//!
//! let config = SyncConfig::new("/path/to/project");
//! let engine = SyncEngine::new(config);
//! let report = engine.sync_once().unwrap();
//!
//! println!("{}", report.stats);
//! ```

mod classify;
mod digest;
mod flatten;
mod manifest;
mod sync;

pub use classify::Classifier;
pub use digest::{fingerprint, needs_sync};
pub use flatten::flatten;
pub use manifest::{Manifest, ManifestSummary, MockDataEntry, ProjectEntry, write_manifest};
pub use sync::SyncEngine;

// Re-export core types for convenience
pub use flatmirror_core::{
    ContentHash, SyncConfig, SyncError, SyncReport, SyncStats, SyncWarning, TrackedFile,
    WarningKind,
};
