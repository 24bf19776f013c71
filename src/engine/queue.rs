// src/engine/queue.rs

use std::collections::BTreeMap;

use tracing::debug;

use crate::types::TaskId;

/// Follow-up runs for tasks that were triggered while already executing.
///
/// Each task keeps a count of pending re-runs, capped at `max_runs`.
/// Triggers beyond the cap are dropped: the follow-up run reads the
/// filesystem when it starts, so it already observes every change that
/// arrived before it.
#[derive(Debug)]
pub struct TriggerQueue {
    max_runs: usize,
    pending: BTreeMap<TaskId, usize>,
}

impl TriggerQueue {
    /// `max_runs` is clamped to at least 1.
    pub fn new(max_runs: usize) -> Self {
        Self {
            max_runs: max_runs.max(1),
            pending: BTreeMap::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn pending_for(&self, task: TaskId) -> usize {
        self.pending.get(&task).copied().unwrap_or(0)
    }

    /// Remember one more run of `task`. Returns `false` if the trigger was
    /// coalesced into the runs already queued.
    pub fn record_trigger(&mut self, task: TaskId) -> bool {
        let count = self.pending.entry(task).or_insert(0);
        if *count >= self.max_runs {
            debug!(task = %task, queued = *count, "trigger coalesced into queued run");
            return false;
        }
        *count += 1;
        debug!(task = %task, queued = *count, "queued follow-up run");
        true
    }

    /// Take one queued run of `task`, if any.
    pub fn take(&mut self, task: TaskId) -> bool {
        match self.pending.get_mut(&task) {
            Some(count) if *count > 1 => {
                *count -= 1;
                true
            }
            Some(_) => {
                self.pending.remove(&task);
                true
            }
            None => false,
        }
    }
}
