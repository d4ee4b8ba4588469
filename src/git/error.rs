//! Git command error types

use std::time::Duration;
use thiserror::Error;

/// Errors raised while running a git command against a single repository.
///
/// None of these abort a run: the worker pool turns each one into an
/// `Error`-classified result for the repository that produced it.
#[derive(Debug, Error)]
pub enum GitError {
    #[error("failed to run {program}: {source}")]
    Execution {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("exited with code {code}: {message}")]
    NonZeroExit { code: i32, message: String },

    #[error("interrupted")]
    Interrupted,
}

impl GitError {
    /// Short reason suitable for a single report line
    pub fn reason(&self) -> String {
        match self {
            GitError::NonZeroExit { code, message } if message.is_empty() => {
                format!("exited with code {code}")
            }
            GitError::NonZeroExit { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}
