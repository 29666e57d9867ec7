//! Change-event model delivered by the notification backend.

use std::path::PathBuf;

use notify::event::{EventKind, ModifyKind};

/// Kind of filesystem change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    Modified,
    Created,
    Deleted,
    Moved,
}

/// A single filesystem change.
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Absolute path the event refers to.
    pub path: PathBuf,
    pub is_dir: bool,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(kind: ChangeKind, path: impl Into<PathBuf>, is_dir: bool) -> Self {
        Self {
            kind,
            path: path.into(),
            is_dir,
        }
    }
}

/// Convert a raw notify event into change events, one per affected path.
///
/// Access events carry no content change and are dropped; renames surface
/// as [`ChangeKind::Moved`] for both their old and new paths.
pub(crate) fn convert_event(event: &notify::Event) -> Vec<ChangeEvent> {
    let kind = match &event.kind {
        EventKind::Create(_) => ChangeKind::Created,
        EventKind::Modify(ModifyKind::Name(_)) => ChangeKind::Moved,
        EventKind::Modify(_) => ChangeKind::Modified,
        EventKind::Remove(_) => ChangeKind::Deleted,
        EventKind::Access(_) => return Vec::new(),
        EventKind::Any | EventKind::Other => {
            // some backends report renames as a bare two-path event
            if event.paths.len() == 2 {
                ChangeKind::Moved
            } else {
                ChangeKind::Modified
            }
        }
    };

    event
        .paths
        .iter()
        .map(|path| ChangeEvent::new(kind, path.clone(), path.is_dir()))
        .collect()
}
