//! Per-repository operations and their classification

use std::path::Path;
use tracing::{debug, warn};

use super::error::GitError;
use super::parse::{
    parse_change_summary, parse_commit_count, parse_remotes, parse_status, ChangeSummary,
    RemoteInfo, RepositoryStatus,
};
use super::runner::GitRunner;
use super::status::Outcome;
use crate::core::RepositoryRef;

// Git command arguments
const GIT_REMOTE_ARGS: &[&str] = &["remote"];
const GIT_REMOTE_VERBOSE_ARGS: &[&str] = &["remote", "-v"];
const GIT_REV_PARSE_HEAD_ARGS: &[&str] = &["rev-parse", "HEAD"];
const GIT_PULL_ALL_ARGS: &[&str] = &["pull", "--all"];
const GIT_FETCH_ALL_ARGS: &[&str] = &["fetch", "--all", "--quiet"];
const GIT_STATUS_BRANCH_ARGS: &[&str] =
    &["--no-optional-locks", "status", "--porcelain", "--branch"];
const GIT_UPSTREAM_COUNT_ARGS: &[&str] = &["rev-list", "--count", "HEAD..@{upstream}"];
const GIT_UPSTREAM_SHORTSTAT_ARGS: &[&str] = &["diff", "--shortstat", "HEAD...@{upstream}"];

// Status messages
const STATUS_NO_REMOTE: &str = "no remote";
const STATUS_UP_TO_DATE: &str = "already up to date";
const STATUS_NO_UPSTREAM: &str = "no upstream";
const UP_TO_DATE_MARKERS: &[&str] = &["already up to date", "already up-to-date"];

/// Which command the run performs on every repository
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Fetch and merge all remotes, then prune stale tracking refs
    Update { dry_run: bool },
    /// Report repositories with uncommitted changes
    Dirty,
    /// Report branch, ahead/behind and dirtiness
    Status,
    /// List remotes and their URLs
    Remote,
    /// List repositories without any remote
    NoRemote,
}

impl Operation {
    pub fn is_dry_run(&self) -> bool {
        matches!(self, Operation::Update { dry_run: true })
    }

    /// Runs this operation on one repository.
    ///
    /// Never fails: every error is folded into an `Error` result so sibling
    /// repositories are unaffected.
    pub async fn run(&self, git: &dyn GitRunner, repo: &RepositoryRef) -> RepositoryResult {
        let result = match self {
            Operation::Update { dry_run: false } => update(git, &repo.path).await,
            Operation::Update { dry_run: true } => check_updates(git, &repo.path).await,
            Operation::Dirty | Operation::Status => status(git, &repo.path).await,
            Operation::Remote | Operation::NoRemote => remotes(git, &repo.path).await,
        };

        match result {
            Ok(report) => RepositoryResult {
                repo: repo.clone(),
                outcome: report.outcome,
                payload: report.payload,
                detail: report.detail,
                error: None,
            },
            Err(err) => {
                debug!(repo = %repo.display, error = %err, "operation failed");
                RepositoryResult::error(repo.clone(), &err)
            }
        }
    }
}

/// Structured data a successful operation produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    None,
    Changes(ChangeSummary),
    Status(RepositoryStatus),
    Remotes(RemoteInfo),
}

/// Final, immutable result for one repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryResult {
    pub repo: RepositoryRef,
    pub outcome: Outcome,
    pub payload: Payload,
    /// Short note such as "no remote"
    pub detail: Option<String>,
    pub error: Option<String>,
}

impl RepositoryResult {
    pub fn error(repo: RepositoryRef, err: &GitError) -> Self {
        Self {
            repo,
            outcome: Outcome::Error,
            payload: Payload::None,
            detail: None,
            error: Some(err.reason()),
        }
    }

    pub fn skipped(repo: RepositoryRef) -> Self {
        Self {
            repo,
            outcome: Outcome::Skipped,
            payload: Payload::None,
            detail: None,
            error: None,
        }
    }

    pub fn changes(&self) -> Option<&ChangeSummary> {
        match &self.payload {
            Payload::Changes(summary) => Some(summary),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<&RepositoryStatus> {
        match &self.payload {
            Payload::Status(status) => Some(status),
            _ => None,
        }
    }

    pub fn remotes(&self) -> Option<&RemoteInfo> {
        match &self.payload {
            Payload::Remotes(remotes) => Some(remotes),
            _ => None,
        }
    }
}

struct OperationReport {
    outcome: Outcome,
    payload: Payload,
    detail: Option<String>,
}

impl OperationReport {
    fn unchanged(detail: &str) -> Self {
        Self {
            outcome: Outcome::Unchanged,
            payload: Payload::Changes(ChangeSummary::default()),
            detail: Some(detail.to_string()),
        }
    }

    fn changes(summary: ChangeSummary) -> Self {
        if summary.is_empty() {
            return Self::unchanged(STATUS_UP_TO_DATE);
        }
        Self {
            outcome: Outcome::Updated,
            payload: Payload::Changes(summary),
            detail: None,
        }
    }
}

/// Runs a command and turns a non-zero exit into an error
async fn run_checked(git: &dyn GitRunner, path: &Path, args: &[&str]) -> Result<String, GitError> {
    Ok(git.run(path, args).await?.check()?.stdout)
}

async fn remote_names(git: &dyn GitRunner, path: &Path) -> Result<Vec<String>, GitError> {
    let output = run_checked(git, path, GIT_REMOTE_ARGS).await?;
    Ok(output
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect())
}

/// `HEAD` commit, or `None` for a repository without commits
async fn head_commit(git: &dyn GitRunner, path: &Path) -> Result<Option<String>, GitError> {
    let outcome = git.run(path, GIT_REV_PARSE_HEAD_ARGS).await?;
    let head = outcome.stdout.trim();
    if outcome.success() && !head.is_empty() {
        Ok(Some(head.to_string()))
    } else {
        Ok(None)
    }
}

async fn update(git: &dyn GitRunner, path: &Path) -> Result<OperationReport, GitError> {
    let remotes = remote_names(git, path).await?;
    if remotes.is_empty() {
        return Ok(OperationReport::unchanged(STATUS_NO_REMOTE));
    }

    let old_head = head_commit(git, path).await?;
    let pull = git.run(path, GIT_PULL_ALL_ARGS).await?;

    // Prune even after a failed pull, as a fetch may have partly succeeded
    for remote in &remotes {
        match git.run(path, &["remote", "prune", remote.as_str()]).await {
            Ok(outcome) if outcome.success() => {}
            Ok(outcome) => warn!(
                repo = %path.display(),
                remote = %remote,
                "prune failed: {}",
                outcome.stderr.trim()
            ),
            Err(e) => warn!(repo = %path.display(), remote = %remote, "prune failed: {e}"),
        }
    }

    let pull = pull.check()?;
    let pull_text = pull.stdout.to_lowercase();
    if UP_TO_DATE_MARKERS.iter().any(|marker| pull_text.contains(marker)) {
        return Ok(OperationReport::unchanged(STATUS_UP_TO_DATE));
    }

    let Some(new_head) = head_commit(git, path).await? else {
        return Ok(OperationReport::unchanged(STATUS_UP_TO_DATE));
    };
    let Some(old_head) = old_head else {
        // The branch was unborn before the pull: everything is new
        let count = git.run(path, &["rev-list", "--count", new_head.as_str()]).await?;
        return Ok(OperationReport::changes(parse_change_summary(&count.stdout, "")));
    };
    if old_head == new_head {
        return Ok(OperationReport::unchanged(STATUS_UP_TO_DATE));
    }

    let range = format!("{old_head}..{new_head}");
    let count = git.run(path, &["rev-list", "--count", range.as_str()]).await?;
    let shortstat = git
        .run(path, &["diff", "--shortstat", old_head.as_str(), new_head.as_str()])
        .await?;
    Ok(OperationReport::changes(parse_change_summary(
        &count.stdout,
        &shortstat.stdout,
    )))
}

/// Dry run: fetch, then measure what a merge of the upstream would bring in
async fn check_updates(git: &dyn GitRunner, path: &Path) -> Result<OperationReport, GitError> {
    if remote_names(git, path).await?.is_empty() {
        return Ok(OperationReport::unchanged(STATUS_NO_REMOTE));
    }

    run_checked(git, path, GIT_FETCH_ALL_ARGS).await?;

    let count = git.run(path, GIT_UPSTREAM_COUNT_ARGS).await?;
    if !count.success() {
        // No upstream configured for the current branch
        return Ok(OperationReport::unchanged(STATUS_NO_UPSTREAM));
    }
    if parse_commit_count(&count.stdout) == 0 {
        return Ok(OperationReport::unchanged(STATUS_UP_TO_DATE));
    }

    let shortstat = git.run(path, GIT_UPSTREAM_SHORTSTAT_ARGS).await?;
    Ok(OperationReport::changes(parse_change_summary(
        &count.stdout,
        &shortstat.stdout,
    )))
}

/// Read-only: one `status --porcelain --branch` call
async fn status(git: &dyn GitRunner, path: &Path) -> Result<OperationReport, GitError> {
    let output = run_checked(git, path, GIT_STATUS_BRANCH_ARGS).await?;
    let status = parse_status(&output);
    let outcome = if status.dirty {
        Outcome::Dirty
    } else {
        Outcome::Unchanged
    };
    let detail = (!status.has_upstream()).then(|| STATUS_NO_UPSTREAM.to_string());
    Ok(OperationReport {
        outcome,
        payload: Payload::Status(status),
        detail,
    })
}

/// Read-only: one `remote -v` call
async fn remotes(git: &dyn GitRunner, path: &Path) -> Result<OperationReport, GitError> {
    let output = run_checked(git, path, GIT_REMOTE_VERBOSE_ARGS).await?;
    let remotes = parse_remotes(&output);
    let detail = remotes.is_empty().then(|| STATUS_NO_REMOTE.to_string());
    Ok(OperationReport {
        outcome: Outcome::Unchanged,
        payload: Payload::Remotes(remotes),
        detail,
    })
}
