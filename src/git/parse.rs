//! Parsers for git's textual output.
//!
//! Every parser here is pure and best-effort: git's wording changes with its
//! version, configuration and locale, so unexpected text yields zero values
//! instead of an error.

use std::collections::BTreeMap;
use tracing::debug;

/// Branch name reported for a detached `HEAD`
pub const DETACHED_BRANCH: &str = "detached";

const STATUS_HEADER_PREFIX: &str = "## ";
const NO_COMMITS_PREFIXES: &[&str] = &["No commits yet on ", "Initial commit on "];

/// What an update brought in
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChangeSummary {
    pub commits: u64,
    pub files_changed: u64,
    pub insertions: u64,
    pub deletions: u64,
}

impl ChangeSummary {
    pub fn is_empty(&self) -> bool {
        self.commits == 0
    }

    /// Human readable hint, e.g. `2 commits, 4 files ▲50 ▼10`
    pub fn describe(&self) -> String {
        let mut parts = vec![plural(self.commits, "commit")];
        if self.files_changed > 0 {
            parts.push(plural(self.files_changed, "file"));
        }
        let mut text = parts.join(", ");
        if self.insertions > 0 || self.deletions > 0 {
            text.push_str(&format!(" ▲{} ▼{}", self.insertions, self.deletions));
        }
        text
    }
}

fn plural(count: u64, noun: &str) -> String {
    if count == 1 {
        format!("{count} {noun}")
    } else {
        format!("{count} {noun}s")
    }
}

/// Branch and tracking state of a working tree
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryStatus {
    pub branch: String,
    /// `None` when the branch has no upstream configured
    pub upstream: Option<String>,
    pub ahead: u64,
    pub behind: u64,
    pub dirty: bool,
}

impl RepositoryStatus {
    pub fn is_detached(&self) -> bool {
        self.branch == DETACHED_BRANCH
    }

    pub fn has_upstream(&self) -> bool {
        self.upstream.is_some()
    }
}

/// Configured remotes and every URL seen for each
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteInfo {
    pub remotes: BTreeMap<String, Vec<String>>,
}

impl RemoteInfo {
    pub fn is_empty(&self) -> bool {
        self.remotes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.remotes.keys().map(String::as_str)
    }
}

/// Reads the first integer of the output, as printed by `git rev-list --count`
pub fn parse_commit_count(text: &str) -> u64 {
    let count = text
        .split_whitespace()
        .next()
        .and_then(|token| token.parse::<u64>().ok());
    if count.is_none() && !text.trim().is_empty() {
        debug!(text, "unrecognised commit count output");
    }
    count.unwrap_or(0)
}

/// Parses a `--shortstat` line into (files, insertions, deletions)
///
/// Example: ` 3 files changed, 10 insertions(+), 3 deletions(-)`
pub fn parse_shortstat(text: &str) -> (u64, u64, u64) {
    let (mut files, mut insertions, mut deletions) = (0, 0, 0);
    let Some(line) = text.lines().find(|line| line.contains("changed")) else {
        return (0, 0, 0);
    };

    for segment in line.split(',') {
        let mut words = segment.split_whitespace();
        let (Some(number), Some(label)) = (words.next(), words.next()) else {
            continue;
        };
        let Ok(value) = number.parse::<u64>() else {
            debug!(segment, "unrecognised shortstat segment");
            continue;
        };
        if label.starts_with("file") {
            files = value;
        } else if label.starts_with("insertion") {
            insertions = value;
        } else if label.starts_with("deletion") {
            deletions = value;
        }
    }
    (files, insertions, deletions)
}

/// Combines the commit-count and shortstat fragments of an update
pub fn parse_change_summary(commit_count: &str, shortstat: &str) -> ChangeSummary {
    let commits = parse_commit_count(commit_count);
    if commits == 0 {
        // Diff noise without new commits is not a change
        return ChangeSummary::default();
    }
    let (files_changed, insertions, deletions) = parse_shortstat(shortstat);
    ChangeSummary {
        commits,
        files_changed,
        insertions,
        deletions,
    }
}

/// A repository is dirty iff the porcelain listing has any entry.
/// Untracked files count, ignored files never appear.
pub fn parse_dirty(listing: &str) -> bool {
    listing
        .lines()
        .any(|line| !line.trim().is_empty() && !line.starts_with(STATUS_HEADER_PREFIX))
}

/// Parses the `## ...` header of `git status --porcelain --branch`
///
/// Recognised shapes:
/// - `## main...origin/main [ahead 1, behind 2]`
/// - `## main` (no upstream)
/// - `## HEAD (no branch)` (detached)
/// - `## No commits yet on main`
pub fn parse_branch_header(line: &str) -> RepositoryStatus {
    let Some(header) = line.trim_end().strip_prefix(STATUS_HEADER_PREFIX) else {
        debug!(line, "missing status header");
        return RepositoryStatus {
            branch: DETACHED_BRANCH.to_string(),
            ..RepositoryStatus::default()
        };
    };

    for prefix in NO_COMMITS_PREFIXES {
        if let Some(branch) = header.strip_prefix(prefix) {
            return RepositoryStatus {
                branch: branch.trim().to_string(),
                ..RepositoryStatus::default()
            };
        }
    }

    if header.starts_with("HEAD (no branch)") {
        return RepositoryStatus {
            branch: DETACHED_BRANCH.to_string(),
            ..RepositoryStatus::default()
        };
    }

    let (refs, tracking) = match header.find(" [") {
        Some(idx) => (&header[..idx], header[idx + 2..].trim_end_matches(']')),
        None => (header, ""),
    };

    let (branch, upstream) = match refs.split_once("...") {
        Some((branch, upstream)) => (branch, Some(upstream.to_string())),
        None => (refs, None),
    };

    let mut status = RepositoryStatus {
        branch: branch.to_string(),
        upstream,
        ..RepositoryStatus::default()
    };

    for part in tracking.split(',') {
        let mut words = part.split_whitespace();
        match (words.next(), words.next().map(str::parse::<u64>)) {
            (Some("ahead"), Some(Ok(n))) => status.ahead = n,
            (Some("behind"), Some(Ok(n))) => status.behind = n,
            // "[gone]": upstream was deleted, nothing to count
            _ => {}
        }
    }
    status
}

/// Parses the full `git status --porcelain --branch` output
pub fn parse_status(output: &str) -> RepositoryStatus {
    let mut lines = output.lines();
    let mut status = match lines.next() {
        Some(first) if first.starts_with(STATUS_HEADER_PREFIX) => parse_branch_header(first),
        Some(_) | None => {
            debug!("status output without branch header");
            parse_branch_header("")
        }
    };
    status.dirty = parse_dirty(output);
    status
}

/// Groups `git remote -v` lines by remote name, keeping each distinct URL once
///
/// Example line: `origin\thttps://github.com/org/repo.git (fetch)`
pub fn parse_remotes(output: &str) -> RemoteInfo {
    let mut remotes: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for line in output.lines() {
        let mut fields = line.split_whitespace();
        let (Some(name), Some(url)) = (fields.next(), fields.next()) else {
            if !line.trim().is_empty() {
                debug!(line, "unrecognised remote line");
            }
            continue;
        };
        let urls = remotes.entry(name.to_string()).or_default();
        if !urls.iter().any(|seen| seen == url) {
            urls.push(url.to_string());
        }
    }
    RemoteInfo { remotes }
}
