// src/watch/hash.rs

//! Content hashing for the watch-mode change filter.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use blake3::Hasher;
use tracing::{debug, info};

use crate::fs::FileSystem;
use crate::resolve::ResolvedFileSet;
use crate::types::TaskId;
use crate::watch::cache::FileCache;

/// Compute the hash of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String> {
    let bytes = fs
        .read(path)
        .with_context(|| format!("reading file for hashing: {:?}", path))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

/// Aggregate hash over `(path, file hash)` pairs.
///
/// Pairs must come in a stable order (resolved sets are sorted). Paths are
/// part of the hash so adding, removing or renaming a file counts as a
/// change even when contents are identical.
pub fn compute_aggregate_hash<'a>(entries: impl IntoIterator<Item = (&'a Path, &'a str)>) -> String {
    let mut hasher = Hasher::new();
    for (path, hash) in entries {
        hasher.update(path.to_string_lossy().as_bytes());
        hasher.update(&[0]);
        hasher.update(hash.as_bytes());
    }
    hasher.finalize().to_hex().to_string()
}

/// Remembers the last aggregate hash of every task's file set and decides
/// whether a change event altered it.
#[derive(Debug)]
pub struct HashFilter {
    cache: FileCache,
    last: HashMap<TaskId, String>,
}

impl HashFilter {
    pub fn new(fs: Arc<dyn FileSystem>) -> Self {
        Self {
            cache: FileCache::new(fs),
            last: HashMap::new(),
        }
    }

    /// Record the current state of `files` as the baseline for `task`.
    pub fn seed(&mut self, task: TaskId, files: &ResolvedFileSet) -> Result<()> {
        let hash = self.aggregate(files)?;
        debug!(task = %task, hash = %hash, "seeded task hash");
        self.last.insert(task, hash);
        Ok(())
    }

    /// Whether `task`'s content differs from the last recorded state after
    /// `changed` was modified. Records the new state when it does.
    pub fn content_changed(
        &mut self,
        task: TaskId,
        changed: &Path,
        files: &ResolvedFileSet,
    ) -> Result<bool> {
        self.cache.invalidate(changed);
        let hash = self.aggregate(files)?;

        if self.last.get(&task) == Some(&hash) {
            info!(task = %task, path = ?changed, "content unchanged; skipping");
            return Ok(false);
        }

        self.last.insert(task, hash);
        Ok(true)
    }

    pub fn last_hash(&self, task: TaskId) -> Option<&str> {
        self.last.get(&task).map(String::as_str)
    }

    fn aggregate(&mut self, files: &ResolvedFileSet) -> Result<String> {
        let mut entries = Vec::with_capacity(files.len());
        for path in files.iter() {
            let hash = self.cache.get_or_compute(path)?;
            entries.push((path, hash));
        }
        Ok(compute_aggregate_hash(
            entries.iter().map(|(p, h)| (*p, h.as_str())),
        ))
    }
}
