//! Result collection and report rendering
//!
//! Results arrive in completion order but are stored by discovery index, so the
//! rendered report is identical for any interleaving of workers.

use tracing::warn;

use super::config::{DRY_RUN_PREFIX, ERROR_MESSAGE_MAX_LENGTH, SUMMARY_RULE_WIDTH};
use super::discovery::RepositoryRef;
use crate::git::{Operation, Outcome, RemoteInfo, RepositoryResult, RepositoryStatus};

/// Count of results per classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OutcomeCounts {
    pub updated: usize,
    pub unchanged: usize,
    pub dirty: usize,
    pub errors: usize,
    pub skipped: usize,
}

impl OutcomeCounts {
    pub fn total(&self) -> usize {
        self.updated + self.unchanged + self.dirty + self.errors + self.skipped
    }

    fn add(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Updated => self.updated += 1,
            Outcome::Unchanged => self.unchanged += 1,
            Outcome::Dirty => self.dirty += 1,
            Outcome::Error => self.errors += 1,
            Outcome::Skipped => self.skipped += 1,
        }
    }
}

/// Per-invocation result collection, owned by the top-level run
#[derive(Debug)]
pub struct Report {
    operation: Operation,
    repos: Vec<RepositoryRef>,
    slots: Vec<Option<RepositoryResult>>,
}

impl Report {
    pub fn new(operation: Operation, repos: &[RepositoryRef]) -> Self {
        Self {
            operation,
            repos: repos.to_vec(),
            slots: vec![None; repos.len()],
        }
    }

    pub fn operation(&self) -> Operation {
        self.operation
    }

    /// Stores the result for the repository at discovery position `index`
    pub fn record(&mut self, index: usize, result: RepositoryResult) {
        match self.slots.get_mut(index) {
            Some(slot) if slot.is_none() => *slot = Some(result),
            Some(_) => warn!(index, "duplicate result ignored"),
            None => warn!(index, "result for unknown repository ignored"),
        }
    }

    /// Closes the collection: any repository without a result is reported as skipped
    pub fn finalize(&mut self) {
        for (slot, repo) in self.slots.iter_mut().zip(&self.repos) {
            if slot.is_none() {
                *slot = Some(RepositoryResult::skipped(repo.clone()));
            }
        }
    }

    /// Results in discovery order
    pub fn results(&self) -> impl Iterator<Item = &RepositoryResult> {
        self.slots.iter().flatten()
    }

    pub fn counts(&self) -> OutcomeCounts {
        let mut counts = OutcomeCounts::default();
        for result in self.results() {
            counts.add(result.outcome);
        }
        counts
    }

    pub fn has_errors(&self) -> bool {
        self.results().any(|result| result.outcome.is_error())
    }

    /// Process exit code: non-zero iff any repository errored
    pub fn exit_code(&self) -> u8 {
        u8::from(self.has_errors())
    }

    fn prefix(&self) -> &'static str {
        if self.operation.is_dry_run() {
            DRY_RUN_PREFIX
        } else {
            ""
        }
    }

    /// Count-by-classification line, e.g. `1 updated, 2 unchanged, 0 errors`
    pub fn summary_line(&self) -> String {
        let counts = self.counts();
        let mut line = format!(
            "{}{} updated, {} unchanged, {} errors",
            self.prefix(),
            counts.updated,
            counts.unchanged,
            counts.errors
        );
        if counts.dirty > 0 {
            line.push_str(&format!(", {} dirty", counts.dirty));
        }
        if counts.skipped > 0 {
            line.push_str(&format!(", {} skipped", counts.skipped));
        }
        line
    }

    /// One display line (or more, for remotes) per repository, in discovery order
    pub fn repository_lines(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for result in self.results() {
            match result.outcome {
                Outcome::Error => lines.push(format!(
                    "{} {}{}: {}",
                    result.outcome.symbol(),
                    self.prefix(),
                    result.repo.display,
                    clean_error_message(result.error.as_deref().unwrap_or("unknown error"))
                )),
                Outcome::Skipped => lines.push(format!(
                    "{} {}{} (skipped)",
                    result.outcome.symbol(),
                    self.prefix(),
                    result.repo.display
                )),
                _ => self.push_success_lines(result, &mut lines),
            }
        }
        lines
    }

    fn push_success_lines(&self, result: &RepositoryResult, lines: &mut Vec<String>) {
        let display = &result.repo.display;
        match self.operation {
            Operation::Update { .. } => {
                let hint = match (result.changes(), &result.detail) {
                    (Some(changes), _) if !changes.is_empty() => format!(" ({})", changes.describe()),
                    (_, Some(detail)) => format!(" ({detail})"),
                    _ => String::new(),
                };
                lines.push(format!(
                    "{} {}{display}{hint}",
                    result.outcome.symbol(),
                    self.prefix()
                ));
            }
            Operation::Dirty => {
                if result.outcome == Outcome::Dirty {
                    let branch = result.status().map_or("", |s| s.branch.as_str());
                    lines.push(format!("{} {display} ({branch}) dirty", result.outcome.symbol()));
                }
            }
            Operation::Status => {
                if let Some(status) = result.status() {
                    lines.push(format!(
                        "{} {display} ({}) {}",
                        result.outcome.symbol(),
                        status.branch,
                        status_indicators(status)
                    ));
                }
            }
            Operation::Remote => match result.remotes() {
                Some(info) if !info.is_empty() => {
                    lines.push(format!("● {display}"));
                    let remotes: Vec<String> = info
                        .remotes
                        .iter()
                        .map(|(name, urls)| format!("{name}: {}", urls.join(", ")))
                        .collect();
                    lines.push(format!("  {}", remotes.join("; ")));
                }
                _ => lines.push(format!("○ {display} (no remote)")),
            },
            Operation::NoRemote => {
                if result.remotes().is_some_and(RemoteInfo::is_empty) {
                    lines.push(format!("○ {display}"));
                }
            }
        }
    }

    /// Closing remark for list-style operations
    fn closing_note(&self) -> Option<String> {
        match self.operation {
            Operation::Dirty => {
                let dirty = self.counts().dirty;
                Some(if dirty == 0 {
                    "All repositories are clean.".to_string()
                } else {
                    format!("{dirty} dirty repositories found.")
                })
            }
            Operation::NoRemote => {
                let missing = self
                    .results()
                    .filter(|r| r.remotes().is_some_and(RemoteInfo::is_empty))
                    .count();
                Some(if missing == 0 {
                    "All repositories have remotes configured.".to_string()
                } else {
                    format!("{missing} repositories without remote.")
                })
            }
            _ => None,
        }
    }

    /// Full report: repository lines unless `quiet`, then the summary.
    /// Quiet mode yields only the summary line.
    pub fn render(&self, quiet: bool) -> Vec<String> {
        if quiet {
            return vec![self.summary_line()];
        }

        let mut lines = self.repository_lines();
        if let Some(note) = self.closing_note() {
            lines.push(String::new());
            lines.push(note);
        }
        lines.push(String::new());
        lines.push("═".repeat(SUMMARY_RULE_WIDTH));
        lines.push(self.summary_line());
        lines.push(format!("Total: {} repositories", self.counts().total()));
        lines
    }
}

fn status_indicators(status: &RepositoryStatus) -> String {
    let mut indicators = Vec::new();
    if !status.has_upstream() {
        indicators.push("no upstream".to_string());
    }
    if status.ahead > 0 {
        indicators.push(format!("↑{}", status.ahead));
    }
    if status.behind > 0 {
        indicators.push(format!("↓{}", status.behind));
    }
    if status.dirty {
        indicators.push("✗ dirty".to_string());
    }
    if indicators.is_empty() {
        indicators.push("✓".to_string());
    }
    indicators.join(" ")
}

/// Cleans and truncates an error message to fit on one report line
pub fn clean_error_message(error: &str) -> String {
    let cleaned = error.split_whitespace().collect::<Vec<_>>().join(" ");
    if cleaned.chars().count() > ERROR_MESSAGE_MAX_LENGTH {
        let truncated: String = cleaned.chars().take(ERROR_MESSAGE_MAX_LENGTH - 3).collect();
        format!("{truncated}...")
    } else {
        cleaned
    }
}
