// src/watch/watcher.rs

use std::sync::Arc;

use notify::{Config, Event, RecommendedWatcher, RecursiveMode, Watcher};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::RepoConfig;
use crate::engine::DedupQueue;
use crate::errors::{Result, SyncwatchError};
use crate::fs::FileSystem;
use crate::watch::filter::EventFilter;
use crate::watch::rename::{RenamePairer, RENAME_PAIR_WINDOW};

/// One installed watch: the `notify` watcher plus the task forwarding its
/// events through the repository's filter.
struct WatchEntry {
    repo: String,
    watcher: RecommendedWatcher,
    forwarder: JoinHandle<()>,
}

/// All active repository watches.
///
/// Dropping the set stops watching, but [`WatchSet::stop`] should be
/// preferred so the forwarding tasks are joined.
pub struct WatchSet {
    entries: Vec<WatchEntry>,
}

impl std::fmt::Debug for WatchSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatchSet")
            .field("repos", &self.repos())
            .finish()
    }
}

impl WatchSet {
    /// Install one recursive watch per repository.
    ///
    /// A repository whose watch cannot be installed (missing source, backend
    /// error) is logged and skipped; the others still start.
    pub fn start(
        repos: &[Arc<RepoConfig>],
        queue: Arc<DedupQueue>,
        fs: Arc<dyn FileSystem>,
    ) -> Self {
        let mut entries = Vec::with_capacity(repos.len());

        for repo in repos {
            match watch_repo(Arc::clone(repo), Arc::clone(&queue), Arc::clone(&fs)) {
                Ok(entry) => entries.push(entry),
                Err(err) => error!(
                    repo = %repo.name,
                    source = ?repo.source,
                    error = %err,
                    "could not watch repository; skipping it"
                ),
            }
        }

        info!(watched = entries.len(), configured = repos.len(), "observers all initialized");
        Self { entries }
    }

    /// Names of the repositories actually being watched.
    pub fn repos(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.repo.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Stop every watch and wait for the forwarding tasks to finish.
    pub async fn stop(self) {
        for entry in self.entries {
            // Dropping the watcher drops the only sender, ending the forwarder.
            drop(entry.watcher);
            if let Err(err) = entry.forwarder.await {
                warn!(repo = %entry.repo, error = %err, "watch forwarder ended abnormally");
            }
            debug!(repo = %entry.repo, "watch stopped");
        }
        info!("observers all stopped");
    }
}

fn watch_repo(
    repo: Arc<RepoConfig>,
    queue: Arc<DedupQueue>,
    fs: Arc<dyn FileSystem>,
) -> Result<WatchEntry> {
    if !fs.is_dir(&repo.source) {
        return Err(SyncwatchError::SourceUnavailable(format!(
            "{} is not an existing directory",
            repo.source.display()
        )));
    }

    let filter = EventFilter::new(Arc::clone(&repo), queue, Arc::clone(&fs))?;

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<notify::Result<Event>>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| {
            // The receiver only goes away during shutdown.
            let _ = event_tx.send(res);
        },
        Config::default(),
    )?;
    watcher.watch(&repo.source, RecursiveMode::Recursive)?;

    info!(
        repo = %repo.name,
        source = ?repo.source,
        destinations = ?repo.destinations,
        "watching repository"
    );

    let name = repo.name.clone();
    let forwarder = tokio::spawn(async move {
        let mut renames = RenamePairer::new();
        loop {
            let next = if renames.is_pending() {
                match tokio::time::timeout(RENAME_PAIR_WINDOW, event_rx.recv()).await {
                    Ok(next) => next,
                    Err(_) => {
                        // No partner arrived: a move out of the tree.
                        for fs_event in renames.flush(fs.as_ref()) {
                            filter.handle(fs_event);
                        }
                        continue;
                    }
                }
            } else {
                event_rx.recv().await
            };
            let Some(res) = next else { break };

            match res {
                Ok(event) => {
                    debug!(repo = %name, ?event, "received notify event");
                    for fs_event in renames.push(event, fs.as_ref()) {
                        filter.handle(fs_event);
                    }
                }
                Err(err) => warn!(repo = %name, error = %err, "file watch error"),
            }
        }
        for fs_event in renames.flush(fs.as_ref()) {
            filter.handle(fs_event);
        }
        debug!(repo = %name, "watch event loop finished");
    });

    Ok(WatchEntry {
        repo: repo.name.clone(),
        watcher,
        forwarder,
    })
}
