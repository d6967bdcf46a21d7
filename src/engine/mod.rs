// src/engine/mod.rs

//! Job pipeline between the watchers and rsync.
//!
//! - [`queue`]: the shared [`DedupQueue`] every watcher feeds.
//! - [`worker`]: the single [`SyncWorker`] draining it.

pub mod queue;
pub mod worker;

pub use queue::{DedupQueue, QueueItem};
pub use worker::{DestinationOutcome, JobReport, SyncWorker};
