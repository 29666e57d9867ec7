//! Debounced live re-sync for flatmirror.
//!
//! Subscribes to filesystem events on the engine's source root, filters
//! them through the path classifier, and coalesces bursts into at most one
//! sync pass per quiet window. The debouncer itself is a synchronous state
//! machine fed with explicit timestamps, so it can be driven directly under
//! test; [`watch`] wires it to a real `notify` subscription and a tokio
//! tick loop.

mod debounce;
mod event;
mod watcher;

pub use debounce::{Debouncer, Decision};
pub use event::{ChangeEvent, ChangeKind};
pub use watcher::{WatchError, watch};
