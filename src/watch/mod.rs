// src/watch/mod.rs

//! File watching and event filtering.
//!
//! This module is responsible for:
//! - Compiling each repository's `includes` / `excludes` regexes.
//! - Installing one recursive `notify` watch per repository.
//! - Pairing the rename halves a backend reports for a single move.
//! - Turning relevant filesystem events into queued sync jobs.
//!
//! It does **not** run rsync; the [`crate::engine`] worker does.

pub mod filter;
pub mod path_utils;
pub mod rename;
pub mod watcher;

pub use filter::{compile_patterns, EventFilter};
pub use rename::RenamePairer;
pub use watcher::WatchSet;
