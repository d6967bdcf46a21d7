use std::fmt;
use std::path::{Path, PathBuf};

use notify::event::{CreateKind, ModifyKind, RemoveKind, RenameMode};

use crate::fs::FileSystem;

/// Kind of filesystem change, as seen by the event filter and the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Created,
    Modified,
    Deleted,
    Moved,
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventKind::Created => "created",
            EventKind::Modified => "modified",
            EventKind::Deleted => "deleted",
            EventKind::Moved => "moved",
        };
        f.write_str(s)
    }
}

/// A single filesystem change, already normalised away from `notify`'s
/// platform-specific event shapes.
///
/// Equality is structural and doubles as the event signature used when
/// collapsing adjacent queue items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FsEvent {
    pub path: PathBuf,
    /// Target of a rename when the backend reported both ends.
    pub dest_path: Option<PathBuf>,
    pub kind: EventKind,
    pub is_directory: bool,
}

impl FsEvent {
    pub fn new(path: impl Into<PathBuf>, kind: EventKind) -> Self {
        Self {
            path: path.into(),
            dest_path: None,
            kind,
            is_directory: false,
        }
    }

    pub fn directory(mut self) -> Self {
        self.is_directory = true;
        self
    }

    pub fn moved_to(mut self, dest: impl Into<PathBuf>) -> Self {
        self.dest_path = Some(dest.into());
        self
    }

    /// Convert a raw `notify` event into zero or more `FsEvent`s.
    ///
    /// Access and unclassified events are dropped. A rename carrying both
    /// ends collapses into a single `Moved` event; a lone half becomes a
    /// `Moved` event for its own path. Pairing the halves the backend also
    /// reports is left to [`crate::watch::RenamePairer`].
    pub fn from_notify(event: &notify::Event, fs: &dyn FileSystem) -> Vec<FsEvent> {
        use notify::EventKind as N;

        let (kind, dir_hint) = match event.kind {
            N::Create(CreateKind::Folder) => (EventKind::Created, Some(true)),
            N::Create(_) => (EventKind::Created, None),
            N::Remove(RemoveKind::Folder) => (EventKind::Deleted, Some(true)),
            N::Remove(RemoveKind::File) => (EventKind::Deleted, Some(false)),
            N::Remove(_) => (EventKind::Deleted, None),
            N::Modify(ModifyKind::Name(RenameMode::Both)) if event.paths.len() == 2 => {
                let from = &event.paths[0];
                let to = &event.paths[1];
                let is_directory = fs.is_dir(to);
                return vec![FsEvent {
                    path: from.clone(),
                    dest_path: Some(to.clone()),
                    kind: EventKind::Moved,
                    is_directory,
                }];
            }
            N::Modify(ModifyKind::Name(_)) => (EventKind::Moved, None),
            N::Modify(_) => (EventKind::Modified, None),
            N::Access(_) | N::Any | N::Other => return Vec::new(),
        };

        event
            .paths
            .iter()
            .map(|path| FsEvent {
                path: path.clone(),
                dest_path: None,
                kind,
                is_directory: dir_hint.unwrap_or_else(|| fs.is_dir(path)),
            })
            .collect()
    }

    /// All paths this event touches (source, then rename target if any).
    pub fn paths(&self) -> impl Iterator<Item = &Path> {
        std::iter::once(self.path.as_path()).chain(self.dest_path.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    #[test]
    fn access_events_are_dropped() {
        let fs = MockFileSystem::new();
        let ev = notify::Event::new(notify::EventKind::Access(notify::event::AccessKind::Any))
            .add_path(PathBuf::from("/repo/a.txt"));
        assert!(FsEvent::from_notify(&ev, &fs).is_empty());
    }

    #[test]
    fn rename_with_both_ends_becomes_single_move() {
        let fs = MockFileSystem::new();
        let ev = notify::Event::new(notify::EventKind::Modify(ModifyKind::Name(
            RenameMode::Both,
        )))
        .add_path(PathBuf::from("/repo/a.txt"))
        .add_path(PathBuf::from("/repo/b.txt"));

        let events = FsEvent::from_notify(&ev, &fs);
        assert_eq!(
            events,
            vec![FsEvent::new("/repo/a.txt", EventKind::Moved).moved_to("/repo/b.txt")]
        );
    }

    #[test]
    fn lone_rename_half_becomes_move() {
        let fs = MockFileSystem::new();
        let ev = notify::Event::new(notify::EventKind::Modify(ModifyKind::Name(
            RenameMode::To,
        )))
        .add_path(PathBuf::from("/repo/arrived.txt"));

        assert_eq!(
            FsEvent::from_notify(&ev, &fs),
            vec![FsEvent::new("/repo/arrived.txt", EventKind::Moved)]
        );
    }

    #[test]
    fn directory_checked_on_disk_without_hint() {
        let fs = MockFileSystem::new();
        fs.add_dir("/repo/sub");
        let ev = notify::Event::new(notify::EventKind::Modify(ModifyKind::Any))
            .add_path(PathBuf::from("/repo/sub"));

        let events = FsEvent::from_notify(&ev, &fs);
        assert_eq!(events.len(), 1);
        assert!(events[0].is_directory);
        assert_eq!(events[0].kind, EventKind::Modified);
    }
}
