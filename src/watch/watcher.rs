// src/watch/watcher.rs

use anyhow::Result;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, info, warn};

use crate::watch::event_handler::{process_file_change, WatchContext};

/// Handle for the filesystem watcher.
///
/// Keeps the underlying `RecommendedWatcher` alive; dropping it stops
/// watching.
pub struct WatcherHandle {
    _inner: RecommendedWatcher,
}

impl std::fmt::Debug for WatcherHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WatcherHandle").finish()
    }
}

/// Watch the project root recursively and forward changes to
/// [`process_file_change`].
///
/// Hashes (if enabled) are seeded before the first event is processed.
/// Must be called from within a Tokio runtime.
pub fn spawn_watcher(mut ctx: WatchContext) -> Result<WatcherHandle> {
    let root = ctx.root.clone();
    if let Ok(canonical) = root.canonicalize() {
        if canonical != root {
            ctx.root_aliases.push(canonical);
        }
    }

    // Channel from the blocking notify callback into the async world.
    let (event_tx, mut event_rx) = tokio::sync::mpsc::unbounded_channel::<Event>();

    let mut watcher = RecommendedWatcher::new(
        move |res: notify::Result<Event>| match res {
            Ok(event) => {
                // The receiver only goes away on shutdown.
                let _ = event_tx.send(event);
            }
            Err(err) => warn!("file watch error: {err}"),
        },
        Config::default(),
    )?;

    watcher.watch(&root, RecursiveMode::Recursive)?;
    info!("file watcher started on {:?}", root);

    tokio::spawn(async move {
        let seed_ctx = ctx.clone();
        if let Err(err) = tokio::task::spawn_blocking(move || seed_ctx.seed_hashes()).await {
            warn!("seeding content hashes failed: {err}");
        }

        while let Some(event) = event_rx.recv().await {
            if matches!(event.kind, EventKind::Access(_)) {
                continue;
            }
            debug!(?event, "received notify event");
            for path in &event.paths {
                process_file_change(&ctx, path).await;
            }
        }
        debug!("watcher event loop finished");
    });

    Ok(WatcherHandle { _inner: watcher })
}
