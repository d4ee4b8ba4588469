//! Repository discovery

use ignore::WalkBuilder;
use rayon::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

use super::config::{ESTIMATED_REPO_COUNT, GIT_MARKER, SKIP_DIRECTORIES};
use crate::utils::display_path;

/// One discovered repository root
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RepositoryRef {
    /// Absolute path of the working tree
    pub path: PathBuf,
    /// Path as shown in reports
    pub display: String,
}

impl RepositoryRef {
    pub fn new(path: impl Into<PathBuf>, display: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            display: display.into(),
        }
    }
}

/// Non-fatal problem met while scanning
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryWarning {
    pub path: PathBuf,
    pub reason: String,
}

/// Options that shape discovery
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Render absolute paths instead of root-relative ones
    pub full_path: bool,
    /// Directory names never descended into, on top of the built-in list
    pub skip_directories: Vec<String>,
}

/// Everything a scan produced, in discovery order
#[derive(Debug, Default)]
pub struct Discovery {
    pub repos: Vec<RepositoryRef>,
    pub warnings: Vec<DiscoveryWarning>,
    /// Number of roots that existed and were directories
    pub roots_scanned: usize,
}

/// Check if a .git file (for submodules/worktrees) contains gitdir reference
/// Only reads the first 5 lines for efficiency
fn is_git_file(path: &Path) -> bool {
    match fs::File::open(path) {
        Ok(file) => {
            let reader = BufReader::new(file);
            reader
                .lines()
                .take(5)
                .map_while(Result::ok)
                .any(|line| line.trim_start().starts_with("gitdir:"))
        }
        Err(_) => false,
    }
}

/// True when `dir` holds git metadata (a `.git` directory or gitdir file)
pub fn is_repo_root(dir: &Path) -> bool {
    let marker = dir.join(GIT_MARKER);
    match fs::metadata(&marker) {
        Ok(meta) if meta.is_dir() => true,
        Ok(meta) if meta.is_file() => is_git_file(&marker),
        _ => false,
    }
}

fn error_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            error_path(err)
        }
        ignore::Error::Loop { child, .. } => Some(child),
        _ => None,
    }
}

struct RootScan {
    repos: Vec<RepositoryRef>,
    warnings: Vec<DiscoveryWarning>,
    scanned: bool,
}

impl RootScan {
    fn skipped(path: &Path, reason: impl Into<String>) -> Self {
        let warning = DiscoveryWarning {
            path: path.to_path_buf(),
            reason: reason.into(),
        };
        warn!(path = %warning.path.display(), "{}", warning.reason);
        Self {
            repos: Vec::new(),
            warnings: vec![warning],
            scanned: false,
        }
    }
}

/// Walks one root depth-first in file-name order, stopping at repository roots
fn scan_root(root: &Path, options: &DiscoveryOptions, skip: &Arc<HashSet<String>>) -> RootScan {
    let root = match root.canonicalize() {
        Ok(path) => path,
        Err(e) => return RootScan::skipped(root, format!("root not accessible: {e}")),
    };
    if !root.is_dir() {
        return RootScan::skipped(&root, "root is not a directory");
    }

    let skip = Arc::clone(skip);
    let walker = WalkBuilder::new(&root)
        .standard_filters(false)
        .follow_links(true)
        .sort_by_file_name(|a, b| a.cmp(b))
        .filter_entry(move |entry| {
            // The root itself is always scanned
            if entry.depth() == 0 {
                return true;
            }
            if !entry.file_type().is_some_and(|ft| ft.is_dir()) {
                return false;
            }
            let name = entry.file_name().to_str().unwrap_or("");
            if name.starts_with('.') || skip.contains(name) {
                return false;
            }
            // Never descend below a repository root
            entry.path().parent().is_none_or(|parent| !is_repo_root(parent))
        })
        .build();

    let mut repos = Vec::new();
    let mut warnings = Vec::new();
    for result in walker {
        match result {
            Ok(entry) => {
                if entry.file_type().is_some_and(|ft| ft.is_dir()) && is_repo_root(entry.path()) {
                    let path = entry.into_path();
                    let display = display_path(&path, &root, options.full_path);
                    debug!(repo = %path.display(), "found repository");
                    repos.push(RepositoryRef { path, display });
                }
            }
            Err(err) => {
                let path = error_path(&err).unwrap_or(&root).to_path_buf();
                warn!(path = %path.display(), "skipping during discovery: {err}");
                warnings.push(DiscoveryWarning {
                    path,
                    reason: err.to_string(),
                });
            }
        }
    }

    RootScan {
        repos,
        warnings,
        scanned: true,
    }
}

/// Finds every repository below `roots`, in a stable order.
///
/// Roots are scanned in parallel but results keep root order, and each root is
/// walked depth-first with siblings sorted by name. A repository reachable
/// twice (overlapping roots, symlinks) is reported once, at its first position.
pub fn find_repos(roots: &[PathBuf], options: &DiscoveryOptions) -> Discovery {
    let skip: Arc<HashSet<String>> = Arc::new(
        SKIP_DIRECTORIES
            .iter()
            .map(|s| (*s).to_string())
            .chain(options.skip_directories.iter().cloned())
            .collect(),
    );

    let scans: Vec<RootScan> = roots
        .par_iter()
        .map(|root| scan_root(root, options, &skip))
        .collect();

    let mut discovery = Discovery {
        repos: Vec::with_capacity(ESTIMATED_REPO_COUNT),
        ..Discovery::default()
    };
    let mut seen = HashSet::with_capacity(ESTIMATED_REPO_COUNT);
    for scan in scans {
        if scan.scanned {
            discovery.roots_scanned += 1;
        }
        discovery.warnings.extend(scan.warnings);
        for repo in scan.repos {
            let key = repo.path.canonicalize().unwrap_or_else(|_| repo.path.clone());
            if seen.insert(key) {
                discovery.repos.push(repo);
            }
        }
    }
    discovery
}

/// Convenience wrapper scanning a single path with default options
pub fn find_repos_from_path(search_path: impl AsRef<Path>) -> Vec<RepositoryRef> {
    find_repos(
        &[search_path.as_ref().to_path_buf()],
        &DiscoveryOptions::default(),
    )
    .repos
}
