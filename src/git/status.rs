//! Outcome classification for a single repository

/// How one repository came out of an operation
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    /// New commits were merged (or would be, in a dry run)
    Updated,
    /// Nothing changed or nothing to report
    Unchanged,
    /// Uncommitted tracked changes or untracked files are present
    Dirty,
    /// A command failed, timed out or could not be started
    Error,
    /// Never started because the run was interrupted
    Skipped,
}

impl Outcome {
    /// Returns the symbol shown at the start of a report line
    pub fn symbol(&self) -> &str {
        match self {
            Outcome::Updated => "✓",
            Outcome::Unchanged => "·",
            Outcome::Dirty => "!",
            Outcome::Error => "✗",
            Outcome::Skipped => "○",
        }
    }

    /// Returns the text representation of this outcome
    pub fn text(&self) -> &str {
        match self {
            Outcome::Updated => "updated",
            Outcome::Unchanged => "unchanged",
            Outcome::Dirty => "dirty",
            Outcome::Error => "error",
            Outcome::Skipped => "skipped",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Outcome::Error)
    }
}
