use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

use flatmirror_core::{SyncConfig, SyncError};
use flatmirror_engine::SyncEngine;
use tempfile::TempDir;

fn engine_for(root: &Path) -> SyncEngine {
    SyncEngine::new(SyncConfig::new(root))
}

/// Destination file names, manifest excluded.
fn mirrored_names(dest: &Path) -> BTreeSet<String> {
    fs::read_dir(dest)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .filter(|name| name != "mirror_manifest.json")
        .collect()
}

fn create_sample_project() -> TempDir {
    let temp = TempDir::new().unwrap();
    let root = temp.path();

    fs::create_dir_all(root.join("src/mock_data")).unwrap();
    fs::create_dir_all(root.join("node_modules/left_pad")).unwrap();

    fs::write(root.join("src/App.tsx"), "export const App = () => null;").unwrap();
    fs::write(root.join("src/mock_data/users.json"), "[{\"id\": 1}]").unwrap();
    fs::write(root.join("node_modules/left_pad/index.js"), "module.exports = {};").unwrap();

    temp
}

#[test]
fn test_first_pass_mirrors_tracked_set() {
    let temp = create_sample_project();
    let engine = engine_for(temp.path());

    let report = engine.sync_once().unwrap();

    assert_eq!(report.stats.total, 2);
    assert_eq!(report.stats.copied, 2);
    assert_eq!(report.stats.updated, 0);
    assert_eq!(report.stats.removed, 0);
    assert!(report.warnings.is_empty());

    let dest = temp.path().join("flat_mirror");
    let names = mirrored_names(&dest);
    let expected: BTreeSet<String> = ["src_App.tsx", "src_mock_data_users.json"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, expected);
    assert!(dest.join("mirror_manifest.json").is_file());
}

#[test]
fn test_second_pass_is_idempotent() {
    let temp = create_sample_project();
    let engine = engine_for(temp.path());

    engine.sync_once().unwrap();
    let dest = temp.path().join("flat_mirror");
    let before = fs::read(dest.join("src_App.tsx")).unwrap();

    let second = engine.sync_once().unwrap();

    assert_eq!(second.stats.copied, 0);
    assert_eq!(second.stats.updated, 0);
    assert_eq!(second.stats.removed, 0);
    assert_eq!(second.stats.unchanged, 2);
    assert_eq!(fs::read(dest.join("src_App.tsx")).unwrap(), before);
}

#[test]
fn test_modified_source_is_updated() {
    let temp = create_sample_project();
    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    fs::write(
        temp.path().join("src/App.tsx"),
        "export const App = () => 42;",
    )
    .unwrap();
    let report = engine.sync_once().unwrap();

    assert_eq!(report.stats.updated, 1);
    assert_eq!(report.stats.unchanged, 1);
    assert_eq!(
        fs::read(temp.path().join("flat_mirror/src_App.tsx")).unwrap(),
        b"export const App = () => 42;"
    );
}

#[test]
fn test_deleted_source_is_pruned() {
    let temp = create_sample_project();
    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    fs::remove_file(temp.path().join("src/mock_data/users.json")).unwrap();
    let report = engine.sync_once().unwrap();

    assert_eq!(report.stats.removed, 1);
    let names = mirrored_names(&temp.path().join("flat_mirror"));
    assert!(!names.contains("src_mock_data_users.json"));
    assert!(names.contains("src_App.tsx"));
}

#[test]
fn test_stray_destination_entries_are_pruned() {
    let temp = create_sample_project();
    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    let dest = temp.path().join("flat_mirror");
    fs::write(dest.join("orphan.txt"), "left behind").unwrap();
    fs::create_dir(dest.join("stray_dir")).unwrap();

    let report = engine.sync_once().unwrap();

    assert_eq!(report.stats.removed, 2);
    assert!(!dest.join("orphan.txt").exists());
    assert!(!dest.join("stray_dir").exists());
}

#[test]
fn test_convergence_after_mixed_changes() {
    let temp = create_sample_project();
    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    // add, modify, and delete between passes
    fs::write(temp.path().join("src/util.py"), "x = 1").unwrap();
    fs::write(temp.path().join("src/App.tsx"), "changed").unwrap();
    fs::remove_file(temp.path().join("src/mock_data/users.json")).unwrap();

    engine.sync_once().unwrap();

    let names = mirrored_names(&temp.path().join("flat_mirror"));
    let expected: BTreeSet<String> = ["src_App.tsx", "src_util.py"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    assert_eq!(names, expected);
}

#[test]
fn test_excluded_directories_are_not_entered() {
    let temp = create_sample_project();
    fs::create_dir_all(temp.path().join("dist")).unwrap();
    fs::write(temp.path().join("dist/bundle.js"), "bundled").unwrap();

    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    let names = mirrored_names(&temp.path().join("flat_mirror"));
    assert!(!names.contains("node_modules_left_pad_index.js"));
    assert!(!names.contains("dist_bundle.js"));
}

#[test]
fn test_venv_directory_is_not_entered() {
    let temp = create_sample_project();
    let venv = temp.path().join("runtime");
    fs::create_dir_all(venv.join("bin")).unwrap();
    fs::write(venv.join("pyvenv.cfg"), "home = /usr").unwrap();
    fs::write(venv.join("lib.py"), "inside = True").unwrap();

    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    let names = mirrored_names(&temp.path().join("flat_mirror"));
    assert!(!names.iter().any(|n| n.starts_with("runtime_")));
}

#[test]
fn test_lockfile_never_tracked_even_under_mock_data() {
    let temp = create_sample_project();
    fs::write(
        temp.path().join("src/mock_data/package-lock.json"),
        "{\"lockfileVersion\": 3}",
    )
    .unwrap();

    let engine = engine_for(temp.path());
    let report = engine.sync_once().unwrap();

    assert_eq!(report.stats.total, 2);
    let names = mirrored_names(&temp.path().join("flat_mirror"));
    assert!(!names.contains("src_mock_data_package-lock.json"));
}

#[test]
fn test_dotfiles_flatten_to_visible_names() {
    let temp = create_sample_project();
    fs::write(temp.path().join(".env"), "KEY=value").unwrap();
    fs::write(temp.path().join(".gitignore"), "target/").unwrap();

    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    let names = mirrored_names(&temp.path().join("flat_mirror"));
    assert!(names.contains("dot_env"));
    assert!(names.contains("dot_gitignore"));
}

#[test]
fn test_flat_name_collision_is_fatal() {
    let temp = TempDir::new().unwrap();
    let root = temp.path();
    fs::create_dir_all(root.join("src/a")).unwrap();
    fs::write(root.join("src/a/b.ts"), "one").unwrap();
    fs::write(root.join("src/a_b.ts"), "two").unwrap();

    let engine = engine_for(root);
    let result = engine.sync_once();

    match result {
        Err(SyncError::FlatNameCollision { flat_name, .. }) => {
            assert_eq!(flat_name, "src_a_b.ts");
        }
        other => panic!("expected collision error, got {other:?}"),
    }
}

#[test]
fn test_manifest_contents_reflect_tracked_set() {
    let temp = create_sample_project();
    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    let raw = fs::read_to_string(temp.path().join("flat_mirror/mirror_manifest.json")).unwrap();
    let manifest: serde_json::Value = serde_json::from_str(&raw).unwrap();

    assert_eq!(manifest["summary"]["total_files"], 2);
    assert_eq!(manifest["summary"]["mock_files_count"], 1);
    assert_eq!(manifest["summary"]["other_files_count"], 1);
    assert_eq!(
        manifest["mock_data_files"][0]["flat_name"],
        "src_mock_data_users.json"
    );
    assert_eq!(manifest["project_files"][0]["extension"], ".tsx");
    assert!(manifest["last_sync"].is_string());
}

#[test]
fn test_missing_destination_copy_is_restored() {
    let temp = create_sample_project();
    let engine = engine_for(temp.path());
    engine.sync_once().unwrap();

    // someone deletes a mirrored file by hand; the next pass restores it
    let dest_copy = temp.path().join("flat_mirror/src_App.tsx");
    fs::remove_file(&dest_copy).unwrap();

    let report = engine.sync_once().unwrap();
    assert_eq!(report.stats.copied, 1);
    assert!(dest_copy.is_file());
}
