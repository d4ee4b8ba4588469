//! Public API for the core module.
//!
//! This module provides the stable public API for core functionality including:
//! - Repository discovery
//! - The bounded worker pool
//! - Report aggregation
//! - Configuration and settings
//!
//! Internal implementation details are not exposed through this API.

// Discovery
pub use super::discovery::{
    find_repos, find_repos_from_path, is_repo_root, Discovery, DiscoveryOptions,
    DiscoveryWarning, RepositoryRef,
};

// Execution and reporting
pub use super::pool::{Completed, WorkerPool};
pub use super::report::{clean_error_message, OutcomeCounts, Report};

// Configuration
pub use super::config::{
    config_path, resolve_settings, FileConfig, Settings, CONFIG_ENV_VAR, DEFAULT_JOBS,
    DEFAULT_TIMEOUT_SECS,
};

// User-facing messages
pub use super::config::{NO_REPOS_MESSAGE, SCANNING_MESSAGE};

// Internal helpers for command modules
pub(crate) use super::progress::create_progress_bar;
