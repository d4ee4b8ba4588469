//! Scripted git runner for tests that must not touch the network

use async_trait::async_trait;
use repos_update::git::{CommandOutcome, GitError, GitRunner};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

/// How the fake answers one command
#[derive(Debug, Clone)]
pub enum Reply {
    /// Exit 0 with this stdout
    Ok(&'static str),
    /// Non-zero exit with this stderr
    Fail(i32, &'static str),
    /// Behave like a command that ran past its timeout
    TimedOut(Duration),
}

/// Answers by repository directory name and joined arguments.
///
/// Lookup order: repository-specific reply, then a reply for any
/// repository, then a silent success.
#[derive(Default)]
pub struct FakeGit {
    per_repo: HashMap<(String, String), Reply>,
    any_repo: HashMap<String, Reply>,
    delay: Duration,
    calls: Mutex<Vec<(PathBuf, String)>>,
    active: AtomicUsize,
    peak: AtomicUsize,
}

impl FakeGit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on(mut self, args: &str, reply: Reply) -> Self {
        self.any_repo.insert(args.to_string(), reply);
        self
    }

    pub fn on_repo(mut self, repo: &str, args: &str, reply: Reply) -> Self {
        self.per_repo
            .insert((repo.to_string(), args.to_string()), reply);
        self
    }

    /// Every command takes at least this long
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn calls(&self) -> Vec<(PathBuf, String)> {
        self.calls.lock().unwrap().clone()
    }

    /// Highest number of commands that were running at the same time
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn reply_for(&self, repo: &Path, args: &str) -> Option<Reply> {
        let name = repo
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.per_repo
            .get(&(name, args.to_string()))
            .or_else(|| self.any_repo.get(args))
            .cloned()
    }
}

#[async_trait]
impl GitRunner for FakeGit {
    async fn run(&self, repo: &Path, args: &[&str]) -> Result<CommandOutcome, GitError> {
        let joined = args.join(" ");
        self.calls
            .lock()
            .unwrap()
            .push((repo.to_path_buf(), joined.clone()));

        let now = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(now, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        let (exit_code, stdout, stderr) = match self.reply_for(repo, &joined) {
            None => (0, "", ""),
            Some(Reply::Ok(stdout)) => (0, stdout, ""),
            Some(Reply::Fail(code, stderr)) => (code, "", stderr),
            Some(Reply::TimedOut(limit)) => return Err(GitError::Timeout(limit)),
        };
        Ok(CommandOutcome {
            exit_code,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
            duration: self.delay,
        })
    }
}
