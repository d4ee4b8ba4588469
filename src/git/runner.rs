//! Git command execution with per-command timeout and interrupt handling

use async_trait::async_trait;
use std::path::Path;
use std::process::Stdio;
use std::time::{Duration, Instant};
use tokio::process::Command;
use tokio::sync::watch;
use tracing::{debug, trace};

use super::error::GitError;

/// Default executable name
pub const DEFAULT_GIT_PROGRAM: &str = "git";

/// Captured result of one finished command
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub exit_code: i32,
    pub stdout: String,
    pub stderr: String,
    pub duration: Duration,
}

impl CommandOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Converts a non-zero exit into `GitError::NonZeroExit`, keeping the
    /// most informative stream as the message
    pub fn check(self) -> Result<CommandOutcome, GitError> {
        if self.success() {
            return Ok(self);
        }
        let message = if self.stderr.trim().is_empty() {
            self.stdout.trim().to_string()
        } else {
            self.stderr.trim().to_string()
        };
        Err(GitError::NonZeroExit {
            code: self.exit_code,
            message,
        })
    }
}

/// Runs one git subcommand with the repository as working directory.
///
/// A non-zero exit is reported through `CommandOutcome::exit_code`, not as an
/// error; only spawn failures, timeouts and interrupts are errors.
#[async_trait]
pub trait GitRunner: Send + Sync {
    async fn run(&self, repo: &Path, args: &[&str]) -> Result<CommandOutcome, GitError>;
}

/// Runs the real git executable as a subprocess
#[derive(Debug, Clone)]
pub struct SystemGit {
    program: String,
    timeout: Duration,
    interrupt: Option<watch::Receiver<bool>>,
}

impl SystemGit {
    pub fn new(timeout: Duration) -> Self {
        Self {
            program: DEFAULT_GIT_PROGRAM.to_string(),
            timeout,
            interrupt: None,
        }
    }

    /// Use a different executable (config `git = ...`)
    #[must_use]
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    /// Terminate in-flight commands once the receiver observes `true`
    #[must_use]
    pub fn with_interrupt(mut self, interrupt: watch::Receiver<bool>) -> Self {
        self.interrupt = Some(interrupt);
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

async fn wait_for_interrupt(interrupt: Option<watch::Receiver<bool>>) {
    let Some(mut rx) = interrupt else {
        return std::future::pending().await;
    };
    let stopped = rx.wait_for(|stop| *stop).await.is_ok();
    // A dropped sender means nobody can interrupt anymore
    if !stopped {
        std::future::pending::<()>().await;
    }
}

#[async_trait]
impl GitRunner for SystemGit {
    async fn run(&self, repo: &Path, args: &[&str]) -> Result<CommandOutcome, GitError> {
        debug!(repo = %repo.display(), "{} {}", self.program, args.join(" "));
        let started = Instant::now();

        // kill_on_drop: leaving the select below drops the child, which
        // terminates it on timeout or interrupt
        let output = Command::new(&self.program)
            .args(args)
            .current_dir(repo)
            .env("GIT_TERMINAL_PROMPT", "0")
            // Read paths must never refresh and rewrite the index
            .env("GIT_OPTIONAL_LOCKS", "0")
            .stdin(Stdio::null())
            .kill_on_drop(true)
            .output();

        let result = tokio::select! {
            result = tokio::time::timeout(self.timeout, output) => result,
            () = wait_for_interrupt(self.interrupt.clone()) => return Err(GitError::Interrupted),
        };

        match result {
            Ok(Ok(output)) => {
                let outcome = CommandOutcome {
                    // Killed by a signal: no code, reported as a generic failure
                    exit_code: output.status.code().unwrap_or(-1),
                    stdout: String::from_utf8_lossy(&output.stdout).to_string(),
                    stderr: String::from_utf8_lossy(&output.stderr).to_string(),
                    duration: started.elapsed(),
                };
                trace!(exit_code = outcome.exit_code, stdout = %outcome.stdout, "command finished");
                Ok(outcome)
            }
            Ok(Err(source)) => Err(GitError::Execution {
                program: self.program.clone(),
                source,
            }),
            Err(_) => Err(GitError::Timeout(self.timeout)),
        }
    }
}
