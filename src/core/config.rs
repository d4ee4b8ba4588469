//! Configuration constants and settings

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

// Concurrency Configuration
//
// One repository at a time unless asked otherwise, so interleaved output never
// surprises a first-time user.
pub const DEFAULT_JOBS: usize = 1;

// Timeout for a single git command; network operations can hang on an
// unreachable remote
pub const DEFAULT_TIMEOUT_SECS: u64 = 180;

// Config file location
pub const CONFIG_ENV_VAR: &str = "REPOS_UPDATE_CONFIG";
pub const CONFIG_DIR_NAME: &str = "repos-update";
pub const CONFIG_FILE_NAME: &str = "config.toml";

// UI Constants
pub const NO_REPOS_MESSAGE: &str = "No git repositories found.";
pub const SCANNING_MESSAGE: &str = "Scanning for git repositories...";
pub const PROGRESS_TEMPLATE: &str = "{spinner} {pos}/{len} {wide_msg}";
pub const DRY_RUN_PREFIX: &str = "[DRY-RUN] ";

// Display formatting constants
pub const ERROR_MESSAGE_MAX_LENGTH: usize = 72;
pub const SUMMARY_RULE_WIDTH: usize = 50;

// Repository marker
pub const GIT_MARKER: &str = ".git";

// Directories to skip during repository search
pub const SKIP_DIRECTORIES: &[&str] = &[
    "node_modules",
    "vendor",
    "target",
    "build",
    ".next",
    "dist",
    "__pycache__",
    ".venv",
    "venv",
];

// Pre-allocation hint for collections
pub const ESTIMATED_REPO_COUNT: usize = 50;

/// Optional settings read from `config.toml`
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
    pub git: Option<String>,
    pub skip_directories: Vec<String>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration file")
    }

    /// Reads a config file; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(text) => {
                debug!(path = %path.display(), "loading configuration");
                Self::parse(&text).with_context(|| format!("in {}", path.display()))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
        }
    }

    /// Loads from `$REPOS_UPDATE_CONFIG` or the user config directory
    pub fn load() -> Result<Self> {
        match config_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }
}

/// Location of the config file, if one can be determined
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV_VAR) {
        return Some(PathBuf::from(path));
    }
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Effective settings for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub jobs: usize,
    pub timeout: Duration,
    pub git_program: String,
    pub skip_directories: Vec<String>,
}

/// Merges CLI values over the config file over the defaults
///
/// Priority order:
/// 1. --jobs / --timeout flags
/// 2. config file
/// 3. built-in defaults (1 job, 180s)
pub fn resolve_settings(
    jobs: Option<usize>,
    timeout_secs: Option<u64>,
    file: FileConfig,
) -> Result<Settings> {
    let jobs = jobs.or(file.jobs).unwrap_or(DEFAULT_JOBS);
    if jobs == 0 {
        bail!("jobs must be at least 1");
    }

    let timeout_secs = timeout_secs
        .or(file.timeout_secs)
        .unwrap_or(DEFAULT_TIMEOUT_SECS);
    if timeout_secs == 0 {
        bail!("timeout must be at least 1 second");
    }

    Ok(Settings {
        jobs,
        timeout: Duration::from_secs(timeout_secs),
        git_program: file
            .git
            .unwrap_or_else(|| crate::git::DEFAULT_GIT_PROGRAM.to_string()),
        skip_directories: file.skip_directories,
    })
}
