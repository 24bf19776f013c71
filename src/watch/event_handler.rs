// src/watch/event_handler.rs

//! Turning one changed path into task triggers.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::engine::{RuntimeEvent, TriggerReason};
use crate::fs::FileSystem;
use crate::resolve::{relative_str, resolve};
use crate::types::TaskId;
use crate::watch::binding::WatchTable;
use crate::watch::hash::HashFilter;

/// Everything the event handler needs, shared by the watcher task.
#[derive(Debug, Clone)]
pub struct WatchContext {
    /// Project root the patterns are relative to.
    pub root: PathBuf,
    /// Other spellings of the root that event paths may use (canonical form).
    pub root_aliases: Vec<PathBuf>,
    pub table: Arc<WatchTable>,
    pub fs: Arc<dyn FileSystem>,
    /// Present when `[watch] use_hash` is enabled.
    pub hash_filter: Option<Arc<Mutex<HashFilter>>>,
    pub runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl WatchContext {
    /// `path` relative to the project root, `/`-separated.
    pub fn relativize(&self, path: &Path) -> Option<String> {
        std::iter::once(&self.root)
            .chain(self.root_aliases.iter())
            .find_map(|root| relative_str(root, path))
    }

    /// Seed the hash filter with the current content of every binding.
    pub fn seed_hashes(&self) {
        let Some(filter) = &self.hash_filter else {
            return;
        };
        let mut filter = match filter.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        for binding in self.table.bindings() {
            let seeded = resolve(self.fs.as_ref(), &self.root, binding.sources())
                .and_then(|files| filter.seed(binding.task(), &files));
            if let Err(err) = seeded {
                warn!(task = %binding.task(), error = %err, "failed to seed content hash");
            }
        }
    }
}

/// Process a single file change event and trigger the owning task(s).
///
/// 1. Relativize the path against the project root.
/// 2. Look the path up in the watch table.
/// 3. Apply the content-hash filter if enabled.
/// 4. Send a trigger per remaining task.
pub async fn process_file_change(ctx: &WatchContext, path: &Path) {
    let Some(rel) = ctx.relativize(path) else {
        debug!(?path, root = ?ctx.root, "change outside the project root; ignoring");
        return;
    };

    let tasks = ctx.table.dispatch(&rel);
    if tasks.is_empty() {
        return;
    }
    debug!(rel = %rel, ?tasks, "watch match");

    for task in tasks {
        if !should_trigger_task(ctx, task, &rel).await {
            continue;
        }

        if let Err(err) = ctx
            .runtime_tx
            .send(RuntimeEvent::TaskTriggered {
                task,
                reason: TriggerReason::FileWatch,
            })
            .await
        {
            warn!("failed to send RuntimeEvent::TaskTriggered: {err}");
            return;
        }
    }
}

/// Returns false only when hashing is enabled and the task's content is
/// provably unchanged. Any hashing problem triggers anyway.
///
/// `rel` is re-joined onto the configured root so the cache key matches the
/// resolved paths even when the event used a root alias.
async fn should_trigger_task(ctx: &WatchContext, task: TaskId, rel: &str) -> bool {
    let Some(filter) = ctx.hash_filter.clone() else {
        return true;
    };
    let Some(binding) = ctx.table.binding(task) else {
        return true;
    };

    let fs = Arc::clone(&ctx.fs);
    let root = ctx.root.clone();
    let sources = binding.sources().clone();
    let changed = ctx.root.join(rel);

    tokio::task::spawn_blocking(move || {
        let files = match resolve(fs.as_ref(), &root, &sources) {
            Ok(files) => files,
            Err(err) => {
                warn!(task = %task, error = %err, "failed to resolve sources; triggering anyway");
                return true;
            }
        };

        let mut filter = match filter.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        match filter.content_changed(task, &changed, &files) {
            Ok(changed) => changed,
            Err(err) => {
                warn!(task = %task, error = %err, "failed to hash sources; triggering anyway");
                true
            }
        }
    })
    .await
    .unwrap_or(true)
}
