// src/watch/rename.rs

//! Pairing of rename halves.
//!
//! The inotify backend reports a rename inside the watched tree three times:
//! `Name(From)`, `Name(To)` and `Name(Both)`, all carrying the same tracker.
//! A move out of the tree only produces a tracked `From`, a move into it only
//! a tracked `To`. The pairer holds a tracked `From` until it knows which case
//! it is, so one rename yields exactly one `Moved` event.

use std::time::Duration;

use notify::event::{ModifyKind, RenameMode};
use notify::{Event, EventKind};

use crate::fs::FileSystem;
use crate::types::FsEvent;

/// How long a tracked `From` waits for its partner before it is treated as a
/// move out of the watched tree.
pub const RENAME_PAIR_WINDOW: Duration = Duration::from_millis(100);

#[derive(Debug, Default)]
pub struct RenamePairer {
    pending: Option<Event>,
}

impl RenamePairer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether a `From` half is waiting for its partner.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Feed one raw event; returns the events that are now settled.
    pub fn push(&mut self, event: Event, fs: &dyn FileSystem) -> Vec<FsEvent> {
        let tracker = event.attrs.tracker();
        let pending_tracker = self.pending.as_ref().and_then(|e| e.attrs.tracker());
        let pairs_with_pending = tracker.is_some() && tracker == pending_tracker;

        let kind = event.kind;
        match kind {
            EventKind::Modify(ModifyKind::Name(RenameMode::From)) if tracker.is_some() => {
                let out = self.flush(fs);
                self.pending = Some(event);
                out
            }
            // `Both` follows right after.
            EventKind::Modify(ModifyKind::Name(RenameMode::To)) if pairs_with_pending => Vec::new(),
            EventKind::Modify(ModifyKind::Name(RenameMode::Both)) if pairs_with_pending => {
                self.pending = None;
                FsEvent::from_notify(&event, fs)
            }
            _ => {
                let mut out = self.flush(fs);
                out.extend(FsEvent::from_notify(&event, fs));
                out
            }
        }
    }

    /// Release a held `From` as a lone move.
    pub fn flush(&mut self, fs: &dyn FileSystem) -> Vec<FsEvent> {
        self.pending
            .take()
            .map(|event| FsEvent::from_notify(&event, fs))
            .unwrap_or_default()
    }
}
