// src/watch/binding.rs

//! Watch bindings: which task a changed path belongs to.

use tracing::trace;

use crate::config::BuildConfig;
use crate::errors::Result;
use crate::resolve::{relative_str, SourcePatternSet};
use crate::types::TaskId;

/// One trigger rule: a pattern set owned by exactly one task.
#[derive(Debug, Clone)]
pub struct WatchBinding {
    sources: SourcePatternSet,
}

impl WatchBinding {
    pub fn new(sources: SourcePatternSet) -> Self {
        Self { sources }
    }

    pub fn task(&self) -> TaskId {
        self.sources.task()
    }

    pub fn sources(&self) -> &SourcePatternSet {
        &self.sources
    }

    pub fn matches(&self, rel_path: &str) -> bool {
        self.sources.matches(rel_path)
    }
}

/// All bindings of a project, built once when watch mode starts.
#[derive(Debug, Clone)]
pub struct WatchTable {
    bindings: Vec<WatchBinding>,
    /// Root-relative output directory; changes below it never trigger.
    target_prefix: Option<String>,
}

impl WatchTable {
    /// One binding per task, using the same pattern sets the tasks resolve.
    pub fn from_config(cfg: &BuildConfig) -> Result<Self> {
        let bindings = TaskId::ALL
            .into_iter()
            .map(|task| SourcePatternSet::for_task(cfg, task).map(WatchBinding::new))
            .collect::<anyhow::Result<Vec<_>>>()?;

        let target_prefix = relative_str(cfg.root(), &cfg.target_dir())
            .filter(|p| !p.is_empty())
            .map(|p| format!("{}/", p.trim_end_matches('/')));

        Ok(Self {
            bindings,
            target_prefix,
        })
    }

    pub fn bindings(&self) -> &[WatchBinding] {
        &self.bindings
    }

    pub fn binding(&self, task: TaskId) -> Option<&WatchBinding> {
        self.bindings.iter().find(|b| b.task() == task)
    }

    /// Tasks bound to the root-relative path `rel_path`.
    ///
    /// With the default patterns this is at most one task; overlapping user
    /// patterns yield every owner, in task order.
    pub fn dispatch(&self, rel_path: &str) -> Vec<TaskId> {
        if let Some(prefix) = &self.target_prefix {
            if rel_path.starts_with(prefix.as_str()) {
                trace!(path = rel_path, "change inside the target directory; ignoring");
                return Vec::new();
            }
        }

        let mut tasks: Vec<TaskId> = self
            .bindings
            .iter()
            .filter(|b| b.matches(rel_path))
            .map(WatchBinding::task)
            .collect();
        tasks.sort();
        tasks.dedup();
        tasks
    }
}
