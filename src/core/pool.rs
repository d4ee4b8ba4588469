//! Bounded-concurrency worker pool over discovered repositories

use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;
use tokio::sync::{mpsc, watch, Semaphore};
use tracing::{debug, info};

use super::discovery::RepositoryRef;
use super::report::Report;
use crate::git::{GitRunner, Operation, RepositoryResult};

/// A finished repository tagged with its discovery position
pub type Completed = (usize, RepositoryResult);

/// Runs one operation over many repositories with at most `limit` in flight
#[derive(Debug, Clone)]
pub struct WorkerPool {
    limit: usize,
    interrupt: watch::Receiver<bool>,
}

impl WorkerPool {
    /// `interrupt` flips to `true` to stop dispatching new repositories
    pub fn new(limit: usize, interrupt: watch::Receiver<bool>) -> Self {
        Self {
            limit: limit.max(1),
            interrupt,
        }
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Sends exactly one result per repository to `results`.
    ///
    /// Repositories are dispatched in discovery order. After an interrupt,
    /// repositories that have not started are reported as skipped.
    pub async fn run(
        &self,
        repos: Vec<RepositoryRef>,
        operation: Operation,
        git: Arc<dyn GitRunner>,
        results: mpsc::UnboundedSender<Completed>,
    ) {
        info!(repos = repos.len(), jobs = self.limit, ?operation, "dispatching");
        let semaphore = Arc::new(Semaphore::new(self.limit));
        let mut futures = FuturesUnordered::new();

        for (index, repo) in repos.into_iter().enumerate() {
            let semaphore = Arc::clone(&semaphore);
            let git = Arc::clone(&git);
            let interrupt = self.interrupt.clone();
            let results = results.clone();

            futures.push(async move {
                let permit = semaphore.acquire().await;
                let interrupted = *interrupt.borrow();

                let result = if permit.is_err() || interrupted {
                    debug!(repo = %repo.display, "skipped");
                    RepositoryResult::skipped(repo)
                } else {
                    operation.run(git.as_ref(), &repo).await
                };
                drop(permit);

                // The collector may already be gone; nothing left to notify
                let _ = results.send((index, result));
            });
        }

        // Wait for all repository operations to complete
        while futures.next().await.is_some() {}
    }

    /// Runs the pool and collects every result into a finalized `Report`.
    ///
    /// `on_result` sees each result as it completes, in completion order.
    pub async fn collect<F>(
        &self,
        repos: Vec<RepositoryRef>,
        operation: Operation,
        git: Arc<dyn GitRunner>,
        mut on_result: F,
    ) -> Report
    where
        F: FnMut(&RepositoryResult),
    {
        let mut report = Report::new(operation, &repos);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let work = self.run(repos, operation, git, tx);
        let gather = async {
            while let Some((index, result)) = rx.recv().await {
                on_result(&result);
                report.record(index, result);
            }
        };
        tokio::join!(work, gather);

        report.finalize();
        report
    }
}
