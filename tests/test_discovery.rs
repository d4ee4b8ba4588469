//! Integration tests for repository discovery functionality

mod common;

use common::{create_multiple_repos, is_git_available, setup_git_repo};
use repos_update::core::{find_repos, find_repos_from_path, DiscoveryOptions};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn names(repos: &[repos_update::core::RepositoryRef]) -> Vec<String> {
    repos.iter().map(|repo| repo.display.clone()).collect()
}

fn root_name(path: &Path) -> String {
    path.canonicalize()
        .unwrap()
        .file_name()
        .unwrap()
        .to_string_lossy()
        .into_owned()
}

#[test]
fn test_find_multiple_repos() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    create_multiple_repos(temp_dir.path(), 5).expect("Failed to create repos");

    let found = find_repos_from_path(temp_dir.path());
    assert_eq!(found.len(), 5, "Should find all 5 repositories");

    let root = root_name(temp_dir.path());
    let expected: Vec<String> = (1..=5).map(|i| format!("{root}/test-repo-{i}")).collect();
    assert_eq!(names(&found), expected);
}

#[test]
fn test_root_itself_is_a_repo() {
    if !is_git_available() {
        eprintln!("Git not available, skipping test");
        return;
    }

    let temp_dir = TempDir::new().unwrap();
    setup_git_repo(temp_dir.path()).unwrap();
    fs::create_dir_all(temp_dir.path().join("nested/.git")).unwrap();

    // A repository root is never descended into, so the nested one is hidden
    let found = find_repos_from_path(temp_dir.path());
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].path, temp_dir.path().canonicalize().unwrap());
}

#[test]
fn test_order_is_depth_first_by_name() {
    let temp_dir = TempDir::new().unwrap();
    for dir in ["b/x", "a", "b/c", "c", "b/a/deep"] {
        fs::create_dir_all(temp_dir.path().join(dir).join(".git")).unwrap();
    }

    let root = root_name(temp_dir.path());
    let found = find_repos_from_path(temp_dir.path());
    assert_eq!(
        names(&found),
        vec![
            format!("{root}/a"),
            format!("{root}/b/a/deep"),
            format!("{root}/b/c"),
            format!("{root}/b/x"),
            format!("{root}/c"),
        ]
    );
}

#[test]
fn test_skip_and_hidden_directories_are_ignored() {
    let temp_dir = TempDir::new().unwrap();
    for dir in [
        "node_modules/pkg",
        "target/gen",
        ".cache/tool",
        "src/app",
        "archive/old",
    ] {
        fs::create_dir_all(temp_dir.path().join(dir).join(".git")).unwrap();
    }

    let root = root_name(temp_dir.path());
    let found = find_repos_from_path(temp_dir.path());
    assert_eq!(
        names(&found),
        vec![format!("{root}/archive/old"), format!("{root}/src/app")]
    );

    let options = DiscoveryOptions {
        skip_directories: vec!["archive".to_string()],
        ..DiscoveryOptions::default()
    };
    let discovery = find_repos(&[temp_dir.path().to_path_buf()], &options);
    assert_eq!(names(&discovery.repos), vec![format!("{root}/src/app")]);
}

#[test]
fn test_full_path_display() {
    let temp_dir = TempDir::new().unwrap();
    let repo = temp_dir.path().join("project");
    fs::create_dir_all(repo.join(".git")).unwrap();

    let options = DiscoveryOptions {
        full_path: true,
        ..DiscoveryOptions::default()
    };
    let discovery = find_repos(&[temp_dir.path().to_path_buf()], &options);
    let canonical = repo.canonicalize().unwrap();
    assert_eq!(discovery.repos[0].display, canonical.display().to_string());
}

#[test]
fn test_multiple_roots_keep_root_order() {
    let first = TempDir::new().unwrap();
    let second = TempDir::new().unwrap();
    fs::create_dir_all(first.path().join("z/.git")).unwrap();
    fs::create_dir_all(second.path().join("a/.git")).unwrap();

    let roots: Vec<PathBuf> = vec![first.path().to_path_buf(), second.path().to_path_buf()];
    let discovery = find_repos(&roots, &DiscoveryOptions::default());
    assert_eq!(discovery.roots_scanned, 2);
    assert_eq!(discovery.repos.len(), 2);
    assert!(discovery.repos[0].display.ends_with("/z"));
    assert!(discovery.repos[1].display.ends_with("/a"));
}

#[test]
fn test_missing_root_is_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("ok/.git")).unwrap();

    let roots = vec![temp_dir.path().join("absent"), temp_dir.path().to_path_buf()];
    let discovery = find_repos(&roots, &DiscoveryOptions::default());
    assert_eq!(discovery.roots_scanned, 1);
    assert_eq!(discovery.repos.len(), 1);
    assert_eq!(discovery.warnings.len(), 1);
}

#[test]
fn test_empty_directory_finds_nothing() {
    let temp_dir = TempDir::new().unwrap();
    fs::create_dir_all(temp_dir.path().join("plain/dir")).unwrap();
    assert!(find_repos_from_path(temp_dir.path()).is_empty());
}

#[cfg(unix)]
#[test]
fn test_symlinked_repo_is_reported_once() {
    let temp_dir = TempDir::new().unwrap();
    let real = temp_dir.path().join("real");
    fs::create_dir_all(real.join(".git")).unwrap();
    std::os::unix::fs::symlink(&real, temp_dir.path().join("zlink")).unwrap();

    let found = find_repos_from_path(temp_dir.path());
    assert_eq!(found.len(), 1);
    assert!(found[0].display.ends_with("/real"));
}

#[cfg(unix)]
#[test]
fn test_symlink_cycle_is_a_warning() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("r/.git")).unwrap();
    std::os::unix::fs::symlink(&root, root.join("a/loop")).unwrap();

    let discovery = find_repos(&[root.clone()], &DiscoveryOptions::default());
    assert_eq!(discovery.roots_scanned, 1);
    assert_eq!(discovery.repos.len(), 1);
    assert_eq!(discovery.repos[0].path, root.join("r"));
    assert_eq!(discovery.warnings.len(), 1);
    assert_eq!(discovery.warnings[0].path, root.join("a/loop"));
}

#[cfg(unix)]
#[test]
fn test_unreadable_directory_is_a_warning() {
    use std::os::unix::fs::PermissionsExt;

    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().canonicalize().unwrap();
    let locked = root.join("locked");
    fs::create_dir_all(locked.join("hidden-repo/.git")).unwrap();
    fs::create_dir_all(root.join("ok/.git")).unwrap();
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();

    // Permission bits do not apply to root
    if fs::read_dir(&locked).is_ok() {
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        eprintln!("Running with elevated permissions, skipping test");
        return;
    }

    let discovery = find_repos(&[root.clone()], &DiscoveryOptions::default());
    fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

    assert_eq!(discovery.repos.len(), 1);
    assert_eq!(discovery.repos[0].path, root.join("ok"));
    assert!(!discovery.warnings.is_empty());
    assert!(discovery
        .warnings
        .iter()
        .any(|warning| warning.path.starts_with(&locked)));
}
