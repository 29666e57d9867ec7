//! Destination manifest writer.

use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use flatmirror_core::{SyncError, TrackedFile};

use crate::classify::Classifier;

/// Aggregate counts over the tracked set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestSummary {
    pub total_files: usize,
    pub mock_files_count: usize,
    pub other_files_count: usize,
}

/// Manifest entry for a mock-data file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MockDataEntry {
    pub original_path: String,
    pub flat_name: String,
}

/// Manifest entry for any other tracked file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectEntry {
    pub original_path: String,
    pub flat_name: String,
    /// Extension with leading dot, empty when the file has none.
    pub extension: String,
}

/// Report of the mirrored set, rewritten whole on every pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    /// Human-readable timestamp of the pass that produced this manifest.
    pub last_sync: String,
    pub summary: ManifestSummary,
    pub mock_data_files: Vec<MockDataEntry>,
    pub project_files: Vec<ProjectEntry>,
}

impl Manifest {
    /// Build a manifest from a pass's tracked set, partitioned into
    /// mock-data entries and project entries, each sorted by original path.
    pub fn build(tracked: &[TrackedFile], classifier: &Classifier) -> Self {
        let mut tracked: Vec<&TrackedFile> = tracked.iter().collect();
        tracked.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        let mut mock_data_files = Vec::new();
        let mut project_files = Vec::new();

        for file in tracked {
            let original_path = file.relative_path.display().to_string();
            if classifier.in_mock_data(&file.relative_path) {
                mock_data_files.push(MockDataEntry {
                    original_path,
                    flat_name: file.flat_name.clone(),
                });
            } else {
                project_files.push(ProjectEntry {
                    original_path,
                    flat_name: file.flat_name.clone(),
                    extension: extension_of(&file.relative_path),
                });
            }
        }

        Self {
            last_sync: Local::now().format("%Y-%m-%d %H:%M:%S").to_string(),
            summary: ManifestSummary {
                total_files: mock_data_files.len() + project_files.len(),
                mock_files_count: mock_data_files.len(),
                other_files_count: project_files.len(),
            },
            mock_data_files,
            project_files,
        }
    }
}

/// Write a manifest as pretty JSON, overwriting any prior manifest.
pub fn write_manifest(manifest: &Manifest, path: &Path) -> Result<(), SyncError> {
    let json = serde_json::to_string_pretty(manifest)
        .map_err(|source| SyncError::ManifestEncode { source })?;
    std::fs::write(path, json).map_err(|source| SyncError::ManifestWrite {
        path: path.to_path_buf(),
        source,
    })
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()))
        .unwrap_or_default()
}
