//! Path classification: which directories to prune, which files to mirror.

use std::collections::HashSet;
use std::path::{Component, Path};

use flatmirror_core::SyncConfig;

/// Decides which directories are descended into and which files are tracked.
///
/// Built once from a [`SyncConfig`]; the destination directory's own name is
/// folded into the exclusion list so the mirror never mirrors itself.
#[derive(Debug)]
pub struct Classifier {
    excluded_dirs: Vec<String>,
    notable_files: HashSet<String>,
    tracked_extensions: Vec<String>,
    excluded_files: HashSet<String>,
    mock_data_marker: String,
}

impl Classifier {
    /// Build a classifier from the sync configuration.
    pub fn new(config: &SyncConfig) -> Self {
        let mut excluded_dirs = config.excluded_dirs.clone();
        excluded_dirs.push(config.dest_name.clone());

        Self {
            excluded_dirs,
            notable_files: config.notable_files.iter().cloned().collect(),
            tracked_extensions: config.tracked_extensions.clone(),
            excluded_files: config.excluded_files.iter().cloned().collect(),
            mock_data_marker: config.mock_data_marker.clone(),
        }
    }

    /// Check whether a directory must not be descended into.
    ///
    /// `name` is the directory's base name, `dir_path` its on-disk location
    /// (used for the virtual-environment check).
    pub fn is_excluded_dir(&self, name: &str, dir_path: &Path) -> bool {
        self.name_is_excluded(name) || is_venv_root(dir_path)
    }

    /// Check whether any component of a relative path is an excluded
    /// directory name. Used to filter live event paths, where the walker's
    /// per-directory pruning never ran.
    pub fn is_path_excluded(&self, rel_path: &Path) -> bool {
        rel_path.components().any(|component| match component {
            Component::Normal(name) => name
                .to_str()
                .is_some_and(|name| self.name_is_excluded(name)),
            _ => false,
        })
    }

    /// Check whether a file is tracked, given its name and the relative
    /// path of its containing directory.
    ///
    /// Precedence: the hard exclusion list wins over everything; the
    /// mock-data rule then re-admits `.json` files that the generic
    /// extension rule would reject.
    pub fn is_tracked_file(&self, filename: &str, rel_dir: &Path) -> bool {
        if self.excluded_files.contains(filename) {
            return false;
        }
        if self.in_mock_data(rel_dir) && filename.ends_with(".json") {
            return true;
        }
        if self.notable_files.contains(filename) {
            return true;
        }
        self.tracked_extensions
            .iter()
            .any(|ext| filename.ends_with(ext.as_str()))
    }

    /// Check whether a relative path has the mock-data marker segment.
    pub fn in_mock_data(&self, rel_path: &Path) -> bool {
        rel_path.components().any(|component| {
            matches!(component, Component::Normal(name)
                if name.to_str() == Some(self.mock_data_marker.as_str()))
        })
    }

    /// Exact-or-wildcard match against the directory exclusion list.
    fn name_is_excluded(&self, name: &str) -> bool {
        for pattern in &self.excluded_dirs {
            if name == pattern {
                return true;
            }
            if let Some(prefix) = pattern.strip_suffix('*') {
                if !prefix.is_empty() && name.starts_with(prefix) {
                    return true;
                }
            }
            if let Some(suffix) = pattern.strip_prefix('*') {
                if !suffix.is_empty() && name.ends_with(suffix) {
                    return true;
                }
            }
        }
        false
    }
}

/// Detect a self-contained Python virtual environment: the `pyvenv.cfg`
/// marker next to a `bin` or `Scripts` subdirectory.
///
/// Listing errors (permission denied, directory vanished mid-walk) are
/// fail-open: the directory is reported as not excluded and any follow-up
/// failure surfaces from the walker instead.
pub fn is_venv_root(dir_path: &Path) -> bool {
    let entries = match std::fs::read_dir(dir_path) {
        Ok(entries) => entries,
        // fail-open
        Err(_) => return false,
    };

    let mut has_marker = false;
    let mut has_scripts = false;
    for entry in entries.flatten() {
        let name = entry.file_name();
        if name == "pyvenv.cfg" {
            has_marker = true;
        } else if name == "bin" || name == "Scripts" {
            has_scripts = true;
        }
        if has_marker && has_scripts {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn classifier() -> Classifier {
        Classifier::new(&SyncConfig::new("/project"))
    }

    #[test]
    fn test_excluded_dir_names() {
        let c = classifier();
        let nowhere = Path::new("/nonexistent");

        assert!(c.is_excluded_dir("node_modules", nowhere));
        assert!(c.is_excluded_dir(".git", nowhere));
        assert!(c.is_excluded_dir("__pycache__", nowhere));
        assert!(c.is_excluded_dir("mypkg.egg-info", nowhere));
        // the destination directory never mirrors itself
        assert!(c.is_excluded_dir("flat_mirror", nowhere));
        assert!(!c.is_excluded_dir("src", nowhere));
        assert!(!c.is_excluded_dir("components", nowhere));
    }

    #[test]
    fn test_venv_detection() {
        let temp = TempDir::new().unwrap();
        let venv = temp.path().join("venv-like");
        fs::create_dir(&venv).unwrap();
        fs::write(venv.join("pyvenv.cfg"), "home = /usr/bin").unwrap();

        // marker alone is not enough
        assert!(!is_venv_root(&venv));

        fs::create_dir(venv.join("bin")).unwrap();
        assert!(is_venv_root(&venv));

        // missing directory is fail-open
        assert!(!is_venv_root(&temp.path().join("gone")));
    }

    #[test]
    fn test_venv_detection_windows_layout() {
        let temp = TempDir::new().unwrap();
        let venv = temp.path().join("win-env");
        fs::create_dir(&venv).unwrap();
        fs::write(venv.join("pyvenv.cfg"), "").unwrap();
        fs::create_dir(venv.join("Scripts")).unwrap();

        assert!(is_venv_root(&venv));
    }

    #[test]
    fn test_tracked_by_extension() {
        let c = classifier();
        let src = Path::new("src");

        assert!(c.is_tracked_file("App.test.tsx", src));
        assert!(c.is_tracked_file("util.py", src));
        assert!(c.is_tracked_file("styles.scss", src));
        assert!(!c.is_tracked_file("README.md", src));
        assert!(!c.is_tracked_file("photo.png", src));
        // json is not generically tracked
        assert!(!c.is_tracked_file("data.json", src));
    }

    #[test]
    fn test_tracked_by_notable_name() {
        let c = classifier();
        let root = Path::new("");

        assert!(c.is_tracked_file("package.json", root));
        assert!(c.is_tracked_file(".gitignore", root));
        assert!(c.is_tracked_file(".env", root));
        assert!(c.is_tracked_file("index.html", root));
    }

    #[test]
    fn test_mock_data_readmits_json() {
        let c = classifier();

        assert!(c.is_tracked_file("users.json", Path::new("src/mock_data")));
        assert!(c.is_tracked_file("deep.json", Path::new("src/mock_data/fixtures")));
        // segment match, not substring match
        assert!(!c.is_tracked_file("users.json", Path::new("src/mock_database")));
    }

    #[test]
    fn test_lockfile_always_excluded() {
        let c = classifier();

        assert!(!c.is_tracked_file("package-lock.json", Path::new("")));
        // even the mock-data rule cannot re-admit it
        assert!(!c.is_tracked_file("package-lock.json", Path::new("src/mock_data")));
    }

    #[test]
    fn test_path_exclusion_for_event_filtering() {
        let c = classifier();

        assert!(c.is_path_excluded(Path::new("node_modules/left_pad/index.js")));
        assert!(c.is_path_excluded(Path::new("src/dist/bundle.js")));
        assert!(c.is_path_excluded(&PathBuf::from("flat_mirror/src_App.tsx")));
        assert!(!c.is_path_excluded(Path::new("src/components/App.tsx")));
    }
}
