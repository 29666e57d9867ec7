//! Sync configuration types.

use std::path::PathBuf;
use std::time::Duration;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

/// Directory base names that are never descended into.
///
/// Entries may use a single leading or trailing `*` as a wildcard
/// (e.g. `*.egg-info`).
pub const DEFAULT_EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    "dist",
    ".git",
    "__pycache__",
    ".pytest_cache",
    ".venv",
    "venv",
    "env",
    ".tox",
    ".eggs",
    "*.egg-info",
    ".next",
    "build",
    "coverage",
];

/// Filenames tracked regardless of their extension.
pub const DEFAULT_NOTABLE_FILES: &[&str] = &[
    ".env",
    ".gitignore",
    "package.json",
    "tsconfig.json",
    "vite.config.ts",
    "vite.config.js",
    "tailwind.config.js",
    "postcss.config.js",
    "eslint.config.js",
    ".eslintrc.js",
    ".eslintrc.json",
    "index.html",
    "main.tsx",
    "main.jsx",
    "main.ts",
    "main.js",
    "App.tsx",
    "App.jsx",
    "App.ts",
    "App.js",
];

/// File extensions tracked anywhere in the tree.
pub const DEFAULT_TRACKED_EXTENSIONS: &[&str] = &[
    ".ts", ".tsx", ".js", ".jsx", ".css", ".scss", ".env", ".py", ".cs",
];

/// Filenames that are never tracked, even when another rule would admit them.
pub const DEFAULT_EXCLUDED_FILES: &[&str] = &["package-lock.json"];

fn default_dest_name() -> String {
    "flat_mirror".to_string()
}

fn default_manifest_name() -> String {
    "mirror_manifest.json".to_string()
}

fn default_excluded_dirs() -> Vec<String> {
    DEFAULT_EXCLUDED_DIRS.iter().map(|s| s.to_string()).collect()
}

fn default_notable_files() -> Vec<String> {
    DEFAULT_NOTABLE_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_tracked_extensions() -> Vec<String> {
    DEFAULT_TRACKED_EXTENSIONS.iter().map(|s| s.to_string()).collect()
}

fn default_excluded_files() -> Vec<String> {
    DEFAULT_EXCLUDED_FILES.iter().map(|s| s.to_string()).collect()
}

fn default_mock_data_marker() -> String {
    "mock_data".to_string()
}

fn default_debounce_ms() -> u64 {
    2000
}

/// Configuration for mirroring operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct SyncConfig {
    /// Root of the source tree to mirror.
    pub source_root: PathBuf,

    /// Name of the destination directory, created directly under the source
    /// root. The name also joins the directory exclusion list so the mirror
    /// never mirrors itself.
    #[builder(default = "default_dest_name()")]
    #[serde(default = "default_dest_name")]
    pub dest_name: String,

    /// Filename of the manifest written into the destination directory.
    #[builder(default = "default_manifest_name()")]
    #[serde(default = "default_manifest_name")]
    pub manifest_name: String,

    /// Directory base names to prune during traversal.
    #[builder(default = "default_excluded_dirs()")]
    #[serde(default = "default_excluded_dirs")]
    pub excluded_dirs: Vec<String>,

    /// Filenames tracked regardless of extension.
    #[builder(default = "default_notable_files()")]
    #[serde(default = "default_notable_files")]
    pub notable_files: Vec<String>,

    /// Extensions (with leading dot) tracked anywhere in the tree.
    #[builder(default = "default_tracked_extensions()")]
    #[serde(default = "default_tracked_extensions")]
    pub tracked_extensions: Vec<String>,

    /// Filenames that are never tracked.
    #[builder(default = "default_excluded_files()")]
    #[serde(default = "default_excluded_files")]
    pub excluded_files: Vec<String>,

    /// Path segment that re-admits `.json` files under it.
    #[builder(default = "default_mock_data_marker()")]
    #[serde(default = "default_mock_data_marker")]
    pub mock_data_marker: String,

    /// Minimum quiet period between two event-triggered passes.
    #[builder(default = "default_debounce_ms()")]
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl SyncConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.source_root {
            if root.as_os_str().is_empty() {
                return Err("Source root cannot be empty".to_string());
            }
        } else {
            return Err("Source root is required".to_string());
        }
        if let Some(ref dest) = self.dest_name {
            if dest.is_empty() {
                return Err("Destination name cannot be empty".to_string());
            }
            if dest.contains('/') || dest.contains('\\') {
                return Err("Destination name must be a single path component".to_string());
            }
        }
        Ok(())
    }
}

impl SyncConfig {
    /// Create a new sync config builder.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder::default()
    }

    /// Create a simple config for mirroring a source tree.
    pub fn new(source_root: impl Into<PathBuf>) -> Self {
        Self {
            source_root: source_root.into(),
            dest_name: default_dest_name(),
            manifest_name: default_manifest_name(),
            excluded_dirs: default_excluded_dirs(),
            notable_files: default_notable_files(),
            tracked_extensions: default_tracked_extensions(),
            excluded_files: default_excluded_files(),
            mock_data_marker: default_mock_data_marker(),
            debounce_ms: default_debounce_ms(),
        }
    }

    /// Full path of the destination directory.
    pub fn dest_path(&self) -> PathBuf {
        self.source_root.join(&self.dest_name)
    }

    /// Full path of the manifest file inside the destination directory.
    pub fn manifest_path(&self) -> PathBuf {
        self.dest_path().join(&self.manifest_name)
    }

    /// Debounce window as a [`Duration`].
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}
