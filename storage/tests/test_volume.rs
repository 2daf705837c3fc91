mod common;

use common::{candidates, create_in_order, create_mount_root};
use std::fs;
use storage::volume::{pick, VolumePolicy};
use storage::{guess_remote_base, list_volumes};
use tempfile::TempDir;

#[test]
fn best_match_returns_volume_with_most_subdirs() {
    let mount_root = create_mount_root();

    let picked = guess_remote_base(mount_root.path(), &candidates());
    assert_eq!(picked, Some(mount_root.path().join("C")));
}

#[test]
fn scores_count_only_directories() {
    let mount_root = create_mount_root();

    let volumes = list_volumes(mount_root.path(), &candidates());
    let scores: Vec<(&str, usize)> = volumes.iter().map(|v| (v.name.as_str(), v.score)).collect();
    assert_eq!(scores, vec![("A", 0), ("B", 2), ("C", 3)]);
}

#[test]
fn most_recent_returns_last_changed_volume() {
    let temp_dir = TempDir::new().unwrap();
    create_in_order(temp_dir.path(), &["first", "second", "third"]);

    let picked = guess_remote_base(temp_dir.path(), &[]);
    assert_eq!(picked, Some(temp_dir.path().join("third")));
}

#[test]
fn equal_scores_break_ties_by_name() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path();
    for volume in ["USB-B", "USB-A", "USB-C"] {
        fs::create_dir_all(root.join(volume).join("Documents")).unwrap();
    }

    let picked = guess_remote_base(root, &candidates());
    assert_eq!(picked, Some(root.join("USB-A")));
}

#[test]
fn missing_mount_root_resolves_nothing() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("no-such-root");

    assert!(list_volumes(&missing, &candidates()).is_empty());
    assert_eq!(guess_remote_base(&missing, &candidates()), None);
    assert_eq!(guess_remote_base(&missing, &[]), None);
}

#[test]
fn empty_mount_root_resolves_nothing() {
    let temp_dir = TempDir::new().unwrap();

    assert_eq!(guess_remote_base(temp_dir.path(), &[]), None);
}

#[test]
fn no_matching_volume_resolves_nothing() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("Backup/Unrelated")).unwrap();

    let volumes = list_volumes(temp_dir.path(), &candidates());
    assert_eq!(volumes.len(), 1);
    assert!(pick(&volumes, VolumePolicy::BestMatch).is_none());
    assert_eq!(guess_remote_base(temp_dir.path(), &candidates()), None);
}
