//! Repository maintenance command implementation
//!
//! This module ties the pieces together for one invocation: resolve settings,
//! discover repositories, run the selected operation on the worker pool and
//! print the report.

use anyhow::{bail, Result};
use std::future::Future;
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::core::{
    create_progress_bar, find_repos, resolve_settings, DiscoveryOptions, FileConfig, Report,
    Settings, WorkerPool, NO_REPOS_MESSAGE, SCANNING_MESSAGE,
};
use crate::git::{GitRunner, Operation, SystemGit};

/// Exit code used when a second interrupt forces the process down
const FORCED_EXIT_CODE: i32 = 130;

/// Everything the command line decided for this run
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub roots: Vec<PathBuf>,
    pub operation: Operation,
    pub quiet: bool,
    pub full_path: bool,
    pub jobs: Option<usize>,
    pub timeout_secs: Option<u64>,
}

/// Handles one invocation end to end and returns the process exit code.
///
/// Errors returned here are fatal (bad configuration, no usable root); per
/// repository failures only show up in the report and the exit code.
pub async fn handle_command(options: RunOptions) -> Result<u8> {
    let file = FileConfig::load()?;
    let settings = resolve_settings(options.jobs, options.timeout_secs, file)?;
    info!(jobs = settings.jobs, timeout = ?settings.timeout, "settings resolved");

    let (interrupt_tx, interrupt_rx) = watch::channel(false);
    tokio::spawn(async move {
        if relay_interrupts(tokio::signal::ctrl_c, interrupt_tx).await {
            warn!("second interrupt received, exiting");
            std::process::exit(FORCED_EXIT_CODE);
        }
    });

    let git = SystemGit::new(settings.timeout)
        .with_program(settings.git_program.clone())
        .with_interrupt(interrupt_rx.clone());

    let mut stdout = std::io::stdout();
    let report = execute(&options, &settings, Arc::new(git), interrupt_rx, &mut stdout).await?;
    Ok(report.exit_code())
}

/// Flags the run as interrupted on the first signal.
///
/// Returns `true` once a second signal arrives, `false` if signals can no
/// longer be received.
async fn relay_interrupts<F, Fut>(mut next_signal: F, interrupt: watch::Sender<bool>) -> bool
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::io::Result<()>>,
{
    if next_signal().await.is_err() {
        return false;
    }
    warn!("interrupt received, finishing in-flight repositories");
    let _ = interrupt.send(true);

    next_signal().await.is_ok()
}

/// Discovers, processes and reports, writing the report to `out`.
///
/// Split from `handle_command` so the full pipeline can run against any
/// `GitRunner` and any writer.
pub async fn execute<W: Write>(
    options: &RunOptions,
    settings: &Settings,
    git: Arc<dyn GitRunner>,
    interrupt: watch::Receiver<bool>,
    out: &mut W,
) -> Result<Report> {
    if !options.quiet {
        eprintln!("{SCANNING_MESSAGE}");
    }

    let discovery = find_repos(
        &options.roots,
        &DiscoveryOptions {
            full_path: options.full_path,
            skip_directories: settings.skip_directories.clone(),
        },
    );
    if discovery.roots_scanned == 0 {
        bail!("no valid root directories to scan");
    }

    let repos = discovery.repos;
    if repos.is_empty() {
        if !options.quiet {
            writeln!(out, "{NO_REPOS_MESSAGE}")?;
        }
        let mut report = Report::new(options.operation, &repos);
        report.finalize();
        return Ok(report);
    }

    let total = repos.len();
    if !options.quiet {
        let repo_word = if total == 1 { "repository" } else { "repositories" };
        eprintln!("Found {total} {repo_word}.");
    }

    let progress = create_progress_bar(total, options.quiet);
    let pool = WorkerPool::new(settings.jobs, interrupt);
    let report = pool
        .collect(repos, options.operation, git, |result| {
            progress.set_message(result.repo.display.clone());
            progress.inc(1);
        })
        .await;
    progress.finish_and_clear();

    for line in report.render(options.quiet) {
        writeln!(out, "{line}")?;
    }
    out.flush()?;

    Ok(report)
}
