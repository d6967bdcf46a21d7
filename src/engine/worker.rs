// src/engine/worker.rs

//! The single sync worker.
//!
//! States: Idle (waiting on the queue) -> Draining (job taken) ->
//! Dispatching (one rsync per destination, in order) -> Idle.
//!
//! Exactly one worker drains the queue, so syncs for all repositories are
//! totally ordered and never run concurrently.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RepoConfig;
use crate::exec::{FilterFile, ProcessRunner, SyncCommand};
use crate::notifier::{failure_message, notify_best_effort, success_message, Notifier};

use super::queue::{DedupQueue, QueueItem};

/// Result of syncing one job to one destination.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationOutcome {
    pub destination: String,
    pub exit_code: i32,
    pub stderr: String,
}

impl DestinationOutcome {
    pub fn success(&self) -> bool {
        self.exit_code == 0
    }
}

/// Per-destination outcomes of one job, in destination order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobReport {
    pub repo: String,
    pub outcomes: Vec<DestinationOutcome>,
}

impl JobReport {
    pub fn all_succeeded(&self) -> bool {
        self.outcomes.iter().all(DestinationOutcome::success)
    }
}

pub struct SyncWorker<R: ProcessRunner> {
    queue: Arc<DedupQueue>,
    runner: R,
    notifier: Arc<dyn Notifier>,
    rsync_binary: PathBuf,
}

impl<R: ProcessRunner> std::fmt::Debug for SyncWorker<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncWorker")
            .field("rsync_binary", &self.rsync_binary)
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl<R: ProcessRunner> SyncWorker<R> {
    pub fn new(
        queue: Arc<DedupQueue>,
        runner: R,
        notifier: Arc<dyn Notifier>,
        rsync_binary: impl Into<PathBuf>,
    ) -> Self {
        Self {
            queue,
            runner,
            notifier,
            rsync_binary: rsync_binary.into(),
        }
    }

    /// Drain the queue until `shutdown` flips to `true` (or its sender is
    /// dropped).
    ///
    /// A job that has already been taken always runs to completion; shutdown
    /// is only observed between jobs. Jobs still pending at that point are
    /// discarded.
    pub async fn run(self, mut shutdown: watch::Receiver<bool>) {
        info!("sync worker started");

        loop {
            if *shutdown.borrow() {
                break;
            }
            tokio::select! {
                item = self.queue.get() => {
                    self.process_job(item).await;
                }
                changed = shutdown.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
            }
        }

        let discarded = self.queue.clear();
        if discarded > 0 {
            info!(discarded, "sync worker stopping; pending jobs discarded");
        }
        info!("sync worker finished");
    }

    /// Spawn [`run`](Self::run) on the Tokio runtime.
    pub fn spawn(self, shutdown: watch::Receiver<bool>) -> JoinHandle<()>
    where
        R: 'static,
    {
        tokio::spawn(self.run(shutdown))
    }

    /// Sync one job to every destination of its repository, in order.
    ///
    /// A failing destination never stops the remaining ones.
    pub async fn process_job(&self, item: QueueItem) -> JobReport {
        let repo = &item.repo;
        info!(
            repo = %repo.name,
            path = ?item.event.path,
            kind = %item.event.kind,
            "synchronizing"
        );

        let mut outcomes = Vec::with_capacity(repo.destinations.len());

        let filter_file = match FilterFile::create(&repo.filters) {
            Ok(f) => f,
            Err(err) => {
                error!(repo = %repo.name, error = %err, "could not write rsync filter rules");
                for destination in &repo.destinations {
                    let outcome = DestinationOutcome {
                        destination: destination.clone(),
                        exit_code: -1,
                        stderr: format!("could not write filter rules: {err}"),
                    };
                    self.report(repo, &outcome);
                    outcomes.push(outcome);
                }
                return JobReport {
                    repo: repo.name.clone(),
                    outcomes,
                };
            }
        };

        for destination in &repo.destinations {
            let outcome = self.dispatch(repo, filter_file.path(), destination).await;
            self.report(repo, &outcome);
            outcomes.push(outcome);
        }

        drop(filter_file);

        JobReport {
            repo: repo.name.clone(),
            outcomes,
        }
    }

    async fn dispatch(
        &self,
        repo: &RepoConfig,
        filter_path: &Path,
        destination: &str,
    ) -> DestinationOutcome {
        let command = SyncCommand::build(&self.rsync_binary, repo, filter_path, destination);
        debug!(repo = %repo.name, cmd = %command, "executing sync command");

        match self.runner.execute(&command).await {
            Ok(output) => DestinationOutcome {
                destination: destination.to_string(),
                exit_code: output.exit_code,
                stderr: output.stderr,
            },
            Err(err) => DestinationOutcome {
                destination: destination.to_string(),
                exit_code: -1,
                stderr: err.to_string(),
            },
        }
    }

    fn report(&self, repo: &RepoConfig, outcome: &DestinationOutcome) {
        if outcome.success() {
            info!(
                repo = %repo.name,
                destination = %outcome.destination,
                "synchronization succeeded"
            );
        } else {
            warn!(
                repo = %repo.name,
                destination = %outcome.destination,
                exit_code = outcome.exit_code,
                stderr = %outcome.stderr,
                "synchronization failed"
            );
        }

        if repo.notify {
            let message = if outcome.success() {
                success_message(&repo.name, &outcome.destination)
            } else {
                failure_message(&repo.name, &outcome.destination, &outcome.stderr)
            };
            notify_best_effort(self.notifier.as_ref(), &message);
        }
    }
}
