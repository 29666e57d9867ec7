//! The incremental sync engine: one pass from traversal to manifest.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use jwalk::{Parallelism, WalkDir};
use rayon::prelude::*;
use tracing::{debug, info};

use flatmirror_core::{
    SyncConfig, SyncError, SyncReport, SyncStats, SyncWarning, TrackedFile, WarningKind,
};

use crate::classify::Classifier;
use crate::digest::{fingerprint, needs_sync};
use crate::flatten::flatten;

/// One tracked file scheduled for mirroring.
#[derive(Debug)]
struct SyncItem {
    tracked: TrackedFile,
    source_path: PathBuf,
    dest_path: PathBuf,
}

/// Per-file result of the mirroring phase.
enum ItemOutcome {
    Copied,
    Updated,
    Unchanged,
    Failed(SyncWarning),
}

/// Drives complete sync passes over one source tree.
///
/// A pass is a set-convergence operation: after [`SyncEngine::sync_once`]
/// returns `Ok`, the destination directory contains exactly the flattened
/// names of the currently tracked source files, plus the manifest.
pub struct SyncEngine {
    config: SyncConfig,
    classifier: Arc<Classifier>,
}

impl SyncEngine {
    /// Create an engine for the given configuration.
    pub fn new(config: SyncConfig) -> Self {
        let classifier = Arc::new(Classifier::new(&config));
        Self { config, classifier }
    }

    /// The engine's configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Shared handle to the engine's path classifier.
    pub fn classifier(&self) -> Arc<Classifier> {
        Arc::clone(&self.classifier)
    }

    /// Run one complete pass: traverse, mirror, prune, write the manifest.
    ///
    /// Individual unreadable or uncopyable files become warnings in the
    /// report; only destination-creation failures, flat-name collisions,
    /// and manifest failures abort the pass.
    pub fn sync_once(&self) -> Result<SyncReport, SyncError> {
        let start = Instant::now();

        let source_root = self
            .config
            .source_root
            .canonicalize()
            .map_err(|e| SyncError::io(&self.config.source_root, e))?;
        if !source_root.is_dir() {
            return Err(SyncError::NotADirectory { path: source_root });
        }

        let dest_root = source_root.join(&self.config.dest_name);
        fs::create_dir_all(&dest_root).map_err(|source| SyncError::DestinationCreate {
            path: dest_root.clone(),
            source,
        })?;

        let mut warnings = Vec::new();
        let items = self.collect_tracked(&source_root, &dest_root, &mut warnings)?;

        let mut stats = SyncStats::new();
        stats.total = items.len() as u64;

        // Fingerprint and copy in parallel; every item owns a distinct
        // destination file.
        let outcomes: Vec<ItemOutcome> =
            items.par_iter().map(|item| mirror_item(item)).collect();
        for outcome in outcomes {
            match outcome {
                ItemOutcome::Copied => stats.record_copied(),
                ItemOutcome::Updated => stats.record_updated(),
                ItemOutcome::Unchanged => stats.record_unchanged(),
                ItemOutcome::Failed(warning) => warnings.push(warning),
            }
        }

        self.prune_dest(&dest_root, &items, &mut stats, &mut warnings)?;

        let tracked: Vec<TrackedFile> = items.into_iter().map(|item| item.tracked).collect();
        let manifest = crate::manifest::Manifest::build(&tracked, &self.classifier);
        crate::manifest::write_manifest(&manifest, &dest_root.join(&self.config.manifest_name))?;

        let report = SyncReport {
            stats,
            warnings,
            duration: start.elapsed(),
        };
        info!(stats = %report.stats, warnings = report.warnings.len(), "pass complete");
        Ok(report)
    }

    /// Walk the source tree and collect every tracked file, pruning
    /// excluded directories before descending into them.
    fn collect_tracked(
        &self,
        source_root: &Path,
        dest_root: &Path,
        warnings: &mut Vec<SyncWarning>,
    ) -> Result<Vec<SyncItem>, SyncError> {
        let classifier = self.classifier();
        let walker = WalkDir::new(source_root)
            .parallelism(Parallelism::Serial)
            .skip_hidden(false)
            .follow_links(false)
            .process_read_dir(move |_depth, _dir_path, _state, children| {
                children.retain(|child| match child {
                    Ok(entry) => {
                        if !entry.file_type.is_dir() {
                            return true;
                        }
                        let name = entry.file_name.to_string_lossy();
                        !classifier.is_excluded_dir(&name, &entry.path())
                    }
                    // keep errors so the walk surfaces them below
                    Err(_) => true,
                });
            });

        let mut items = Vec::new();
        let mut flat_names: HashMap<String, PathBuf> = HashMap::new();

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    let path = error.path().map(Path::to_path_buf).unwrap_or_default();
                    warnings.push(SyncWarning::new(
                        path,
                        error.to_string(),
                        WarningKind::WalkError,
                    ));
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let source_path = entry.path();
            let Ok(relative) = source_path.strip_prefix(source_root) else {
                continue;
            };
            let relative = relative.to_path_buf();
            let name = entry.file_name().to_string_lossy();
            let rel_dir = relative.parent().unwrap_or_else(|| Path::new(""));
            if !self.classifier.is_tracked_file(&name, rel_dir) {
                continue;
            }

            let flat_name = flatten(&relative);
            if let Some(first) = flat_names.insert(flat_name.clone(), relative.clone()) {
                return Err(SyncError::FlatNameCollision {
                    flat_name,
                    first,
                    second: relative,
                });
            }

            let dest_path = dest_root.join(&flat_name);
            items.push(SyncItem {
                tracked: TrackedFile::new(relative, flat_name),
                source_path,
                dest_path,
            });
        }

        Ok(items)
    }

    /// Delete every destination entry that is neither a current flat name
    /// nor the manifest itself.
    fn prune_dest(
        &self,
        dest_root: &Path,
        items: &[SyncItem],
        stats: &mut SyncStats,
        warnings: &mut Vec<SyncWarning>,
    ) -> Result<(), SyncError> {
        let mut keep: HashSet<&str> = items
            .iter()
            .map(|item| item.tracked.flat_name.as_str())
            .collect();
        keep.insert(self.config.manifest_name.as_str());

        let entries = fs::read_dir(dest_root).map_err(|e| SyncError::io(dest_root, e))?;
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    warnings.push(SyncWarning::new(
                        dest_root,
                        error.to_string(),
                        WarningKind::WalkError,
                    ));
                    continue;
                }
            };
            let name = entry.file_name();
            if keep.contains(name.to_string_lossy().as_ref()) {
                continue;
            }

            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            match result {
                Ok(()) => {
                    debug!(path = %path.display(), "pruned stale entry");
                    stats.record_removed();
                }
                Err(error) => warnings.push(SyncWarning::remove_error(&path, &error)),
            }
        }

        Ok(())
    }
}

/// Mirror one tracked file, deciding copy/update/skip by content digest.
fn mirror_item(item: &SyncItem) -> ItemOutcome {
    let Some(src_digest) = fingerprint(&item.source_path) else {
        // vanished or unreadable between listing and read
        return ItemOutcome::Failed(SyncWarning::new(
            item.source_path.clone(),
            "source unreadable, left out of this pass",
            WarningKind::ReadError,
        ));
    };

    let dst_digest = if item.dest_path.exists() {
        fingerprint(&item.dest_path)
    } else {
        None
    };

    if !needs_sync(&src_digest, dst_digest.as_ref()) {
        return ItemOutcome::Unchanged;
    }

    match copy_preserving_mtime(&item.source_path, &item.dest_path) {
        Ok(()) => {
            if dst_digest.is_none() {
                ItemOutcome::Copied
            } else {
                ItemOutcome::Updated
            }
        }
        Err(error) => ItemOutcome::Failed(SyncWarning::copy_error(&item.source_path, &error)),
    }
}

/// Copy a file and carry the source's modification time over to the copy.
fn copy_preserving_mtime(source: &Path, dest: &Path) -> std::io::Result<()> {
    fs::copy(source, dest)?;
    let modified = fs::metadata(source)?.modified()?;
    let dest_file = fs::OpenOptions::new().write(true).open(dest)?;
    dest_file.set_modified(modified)?;
    Ok(())
}
