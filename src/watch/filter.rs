// src/watch/filter.rs

use std::fmt;
use std::sync::Arc;

use regex::RegexSet;
use tracing::{debug, trace};

use crate::config::RepoConfig;
use crate::engine::{DedupQueue, QueueItem};
use crate::errors::{Result, SyncwatchError};
use crate::fs::FileSystem;
use crate::types::FsEvent;
use crate::watch::path_utils::relative_str;

/// Compile include/exclude patterns into a set.
///
/// Each pattern is anchored at the start of the path, so `\.git/` only
/// matches a top-level `.git` directory while `.*\.txt$` still matches any
/// `.txt` file.
pub fn compile_patterns(patterns: &[String]) -> std::result::Result<RegexSet, regex::Error> {
    RegexSet::new(patterns.iter().map(|p| format!("^(?:{p})")))
}

/// Per-repository event predicate feeding the shared queue.
///
/// Paths are matched relative to the repository source, with forward
/// slashes (`src/main.go`, `.git/HEAD`). A path is relevant when it matches
/// at least one include and no exclude. Directory events never are.
pub struct EventFilter {
    repo: Arc<RepoConfig>,
    includes: RegexSet,
    excludes: RegexSet,
    queue: Arc<DedupQueue>,
    fs: Arc<dyn FileSystem>,
}

impl fmt::Debug for EventFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventFilter")
            .field("repo", &self.repo.name)
            .finish_non_exhaustive()
    }
}

impl EventFilter {
    pub fn new(
        repo: Arc<RepoConfig>,
        queue: Arc<DedupQueue>,
        fs: Arc<dyn FileSystem>,
    ) -> Result<Self> {
        let includes = compile_patterns(&repo.includes).map_err(|e| {
            SyncwatchError::ConfigError(format!("repository '{}': {e}", repo.name))
        })?;
        let excludes = compile_patterns(&repo.excludes).map_err(|e| {
            SyncwatchError::ConfigError(format!("repository '{}': {e}", repo.name))
        })?;

        Ok(Self {
            repo,
            includes,
            excludes,
            queue,
            fs,
        })
    }

    /// Include/exclude decision for one path relative to the source.
    pub fn path_matches(&self, rel_path: &str) -> bool {
        self.includes.is_match(rel_path) && !self.excludes.is_match(rel_path)
    }

    /// Whether `event` should trigger a sync of this repository.
    ///
    /// For a rename, either end matching is enough.
    pub fn matches(&self, event: &FsEvent) -> bool {
        if event.is_directory {
            return false;
        }

        event.paths().any(|path| {
            let rel = relative_str(self.fs.as_ref(), &self.repo.source, path)
                .unwrap_or_else(|| path.to_string_lossy().replace('\\', "/"));
            self.path_matches(&rel)
        })
    }

    /// Enqueue a job for `event` if it is relevant. Returns the relevance.
    pub fn handle(&self, event: FsEvent) -> bool {
        if !self.matches(&event) {
            trace!(repo = %self.repo.name, path = ?event.path, "event ignored by filter");
            return false;
        }

        debug!(
            repo = %self.repo.name,
            path = ?event.path,
            kind = %event.kind,
            "event matched; queueing sync"
        );
        self.queue.put(QueueItem::new(Arc::clone(&self.repo), event));
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;
    use crate::types::EventKind;
    use std::path::PathBuf;

    fn filter(includes: &[&str], excludes: &[&str]) -> (EventFilter, Arc<DedupQueue>) {
        let repo = Arc::new(RepoConfig {
            name: "r".to_string(),
            source: PathBuf::from("/repo"),
            destinations: vec!["/dst".to_string()],
            includes: includes.iter().map(|s| s.to_string()).collect(),
            excludes: excludes.iter().map(|s| s.to_string()).collect(),
            filters: vec![],
            options: vec![],
            notify: false,
        });
        let queue = Arc::new(DedupQueue::new());
        let fs = Arc::new(MockFileSystem::new());
        (EventFilter::new(repo, Arc::clone(&queue), fs).unwrap(), queue)
    }

    #[test]
    fn directories_are_ignored() {
        let (f, q) = filter(&[".*"], &[]);
        assert!(!f.handle(FsEvent::new("/repo/src", EventKind::Created).directory()));
        assert!(q.is_empty());
    }

    #[test]
    fn rename_matches_on_either_end() {
        let (f, _q) = filter(&[r".*\.txt$"], &[]);
        let ev = FsEvent::new("/repo/draft.tmp", EventKind::Moved).moved_to("/repo/draft.txt");
        assert!(f.matches(&ev));
    }

    #[test]
    fn patterns_are_anchored_at_path_start() {
        let (f, _q) = filter(&[".*"], &[r"\.git/"]);
        assert!(!f.path_matches(".git/HEAD"));
        assert!(f.path_matches("vendor/.git/HEAD"));
    }
}
