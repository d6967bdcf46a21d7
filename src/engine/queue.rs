// src/engine/queue.rs

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::trace;

use crate::config::RepoConfig;
use crate::types::FsEvent;

/// One pending synchronisation job: a repository plus the event that
/// triggered it.
///
/// Two items are equal when they name the same repository and carry the same
/// event signature (path, rename target, kind). The repository is compared by
/// name, which is unique within a configuration.
#[derive(Debug, Clone)]
pub struct QueueItem {
    pub repo: Arc<RepoConfig>,
    pub event: FsEvent,
}

impl QueueItem {
    pub fn new(repo: Arc<RepoConfig>, event: FsEvent) -> Self {
        Self { repo, event }
    }
}

impl PartialEq for QueueItem {
    fn eq(&self, other: &Self) -> bool {
        self.repo.name == other.repo.name && self.event == other.event
    }
}

impl Eq for QueueItem {}

/// Unbounded FIFO shared by every watcher and the single sync worker.
///
/// `put` drops an item that equals the current tail, so a burst of identical
/// events leaves at most one pending job. Only the tail is compared: once an
/// item has been taken by the worker, an equal item is queued again.
#[derive(Debug, Default)]
pub struct DedupQueue {
    items: Mutex<VecDeque<QueueItem>>,
    available: Notify,
}

impl DedupQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, VecDeque<QueueItem>> {
        // The deque is never left half-updated, so a poisoned lock is still usable.
        self.items.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append `item` unless it equals the current tail.
    ///
    /// Returns `false` when the item was collapsed into the tail.
    pub fn put(&self, item: QueueItem) -> bool {
        {
            let mut items = self.lock();
            if items.back() == Some(&item) {
                trace!(repo = %item.repo.name, path = ?item.event.path, "collapsed duplicate queue item");
                return false;
            }
            items.push_back(item);
        }
        self.available.notify_one();
        true
    }

    /// Remove and return the head, if any.
    pub fn try_get(&self) -> Option<QueueItem> {
        self.lock().pop_front()
    }

    /// Remove and return the head, waiting until one is available.
    pub async fn get(&self) -> QueueItem {
        loop {
            if let Some(item) = self.try_get() {
                return item;
            }
            self.available.notified().await;
        }
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Drop every pending item, returning how many were discarded.
    pub fn clear(&self) -> usize {
        let mut items = self.lock();
        let n = items.len();
        items.clear();
        n
    }
}
