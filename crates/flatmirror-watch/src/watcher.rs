//! Live watch loop: event subscription, tick loop, shutdown.

use std::sync::Arc;
use std::time::{Duration, Instant};

use notify::{RecursiveMode, Watcher as _};
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use flatmirror_engine::SyncEngine;

use crate::debounce::{Debouncer, Decision};
use crate::event::convert_event;

/// Interval between debounce ticks.
const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Buffer for raw notification events; bursts beyond this block the
/// notification thread briefly instead of dropping events.
const EVENT_CHANNEL_SIZE: usize = 1024;

/// Errors surfaced by the watch loop.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The event subscription could not be established.
    #[error("Failed to subscribe to filesystem events: {0}")]
    Subscribe(#[from] notify::Error),
}

/// Watch the engine's source root and re-sync on qualifying changes.
///
/// Runs until `shutdown` is cancelled. Passes execute one at a time on the
/// blocking pool and are awaited inline, so at most one pass is ever in
/// flight; events arriving mid-pass queue on the channel and come out as
/// deferrals. A failing pass is logged and the loop keeps watching. On
/// cancellation the subscription stops and the call returns after any
/// in-flight pass; no catch-up pass is forced.
pub async fn watch(
    engine: Arc<SyncEngine>,
    shutdown: CancellationToken,
) -> Result<(), WatchError> {
    // notify reports resolved paths; match them against the resolved root
    let source_root = engine
        .config()
        .source_root
        .canonicalize()
        .unwrap_or_else(|_| engine.config().source_root.clone());
    let (event_tx, mut event_rx) = mpsc::channel(EVENT_CHANNEL_SIZE);

    let mut watcher =
        notify::recommended_watcher(move |result: notify::Result<notify::Event>| {
            let _ = event_tx.blocking_send(result);
        })?;
    watcher.watch(&source_root, RecursiveMode::Recursive)?;
    info!(path = %source_root.display(), "watching for changes");

    let mut debouncer = Debouncer::new(
        &source_root,
        engine.classifier(),
        engine.config().debounce(),
    );
    let mut ticks = tokio::time::interval(TICK_INTERVAL);
    ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.cancelled() => break,
            Some(result) = event_rx.recv() => match result {
                Ok(raw) => {
                    for event in convert_event(&raw) {
                        if debouncer.on_event(&event, Instant::now()) == Decision::Sync {
                            debug!(path = %event.path.display(), kind = ?event.kind, "change detected");
                            run_pass(&engine).await;
                        }
                    }
                }
                Err(error) => warn!(%error, "event backend error"),
            },
            _ = ticks.tick() => {
                if debouncer.on_tick(Instant::now()) == Decision::Sync {
                    run_pass(&engine).await;
                }
            }
        }
    }

    drop(watcher);
    info!("watch loop stopped");
    Ok(())
}

/// Execute one pass on the blocking pool.
///
/// Errors are contained here: a failed pass must not take the watch loop
/// down, the next qualifying event retries.
async fn run_pass(engine: &Arc<SyncEngine>) {
    let engine = Arc::clone(engine);
    match tokio::task::spawn_blocking(move || engine.sync_once()).await {
        Ok(Ok(report)) => {
            info!(stats = %report.stats, warnings = report.warnings.len(), "re-synced");
        }
        Ok(Err(error)) => error!(%error, "sync pass failed"),
        Err(error) => error!(%error, "sync task panicked"),
    }
}
