//! Common test utilities and helpers
#![allow(dead_code, unused_imports)]

pub mod fake;
pub mod git;

pub use self::fake::{FakeGit, Reply};
pub use self::git::{
    add_git_remote, clone_repo, create_multiple_repos, create_test_commit, is_git_available,
    setup_git_repo,
};

use repos_update::core::{resolve_settings, FileConfig, Settings};

/// Settings for tests: `jobs` workers, default timeout, no config file
pub fn test_settings(jobs: usize) -> Settings {
    resolve_settings(Some(jobs), None, FileConfig::default()).unwrap()
}
