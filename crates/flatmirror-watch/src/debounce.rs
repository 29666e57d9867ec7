//! Debouncer state machine.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use flatmirror_engine::Classifier;

use crate::event::{ChangeEvent, ChangeKind};

/// What the caller should do with a stimulus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Execute a sync pass now.
    Sync,
    /// Window not yet elapsed; the pass stays queued for a later tick.
    Defer,
    /// Nothing to do.
    Ignore,
}

/// Mutable debounce state, owned by one debouncer instance so independent
/// watchers can coexist under test.
#[derive(Debug, Default)]
struct WatchState {
    last_trigger: Option<Instant>,
    pending: bool,
}

/// Coalesces bursts of filesystem events into at most one sync pass per
/// quiet window.
///
/// The machine is fed explicit timestamps instead of reading the clock, so
/// its timing behavior is fully deterministic under test.
pub struct Debouncer {
    source_root: PathBuf,
    classifier: Arc<Classifier>,
    window: Duration,
    state: WatchState,
}

impl Debouncer {
    /// Create a debouncer for one source root.
    pub fn new(
        source_root: impl Into<PathBuf>,
        classifier: Arc<Classifier>,
        window: Duration,
    ) -> Self {
        Self {
            source_root: source_root.into(),
            classifier,
            window,
            state: WatchState::default(),
        }
    }

    /// True when a deferred pass is waiting for its tick.
    pub fn pending(&self) -> bool {
        self.state.pending
    }

    /// Feed one filesystem event.
    ///
    /// Move events always trigger immediately: a move can invalidate both
    /// its old and its new path, so waiting out the window risks mirroring
    /// neither.
    pub fn on_event(&mut self, event: &ChangeEvent, now: Instant) -> Decision {
        if event.kind == ChangeKind::Moved {
            self.trigger(now);
            return Decision::Sync;
        }
        if !self.qualifies(event) {
            return Decision::Ignore;
        }
        if self.window_elapsed(now) {
            self.trigger(now);
            Decision::Sync
        } else {
            self.state.pending = true;
            Decision::Defer
        }
    }

    /// Feed one periodic tick.
    pub fn on_tick(&mut self, now: Instant) -> Decision {
        if self.state.pending && self.window_elapsed(now) {
            self.trigger(now);
            Decision::Sync
        } else {
            Decision::Ignore
        }
    }

    /// A qualifying event is a file event on a tracked path outside every
    /// excluded directory.
    fn qualifies(&self, event: &ChangeEvent) -> bool {
        if event.is_dir {
            return false;
        }
        let Ok(relative) = event.path.strip_prefix(&self.source_root) else {
            return false;
        };
        if self.classifier.is_path_excluded(relative) {
            return false;
        }
        let Some(name) = relative.file_name() else {
            return false;
        };
        let rel_dir = relative.parent().unwrap_or_else(|| Path::new(""));
        self.classifier
            .is_tracked_file(&name.to_string_lossy(), rel_dir)
    }

    fn window_elapsed(&self, now: Instant) -> bool {
        match self.state.last_trigger {
            Some(last) => now.saturating_duration_since(last) >= self.window,
            None => true,
        }
    }

    fn trigger(&mut self, now: Instant) {
        self.state.last_trigger = Some(now);
        self.state.pending = false;
    }
}
