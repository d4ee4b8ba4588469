pub mod error;
pub mod operations;
pub mod parse;
pub mod runner;
pub mod status;

// Re-export commonly used items
pub use error::GitError;
pub use operations::{Operation, Payload, RepositoryResult};
pub use parse::{ChangeSummary, RemoteInfo, RepositoryStatus, DETACHED_BRANCH};
pub use runner::{CommandOutcome, GitRunner, SystemGit, DEFAULT_GIT_PROGRAM};
pub use status::Outcome;
