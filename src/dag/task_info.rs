// src/dag/task_info.rs

use crate::types::TaskId;

/// State of a task within the current full-build run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskRunState {
    /// Waiting for its dependencies to run.
    Pending,
    /// Handed to the executor.
    Running,
    Succeeded,
    Failed,
}

impl TaskRunState {
    /// Whether the task has run (either way) in this run.
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskRunState::Succeeded | TaskRunState::Failed)
    }
}

/// A task the executor should run now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduledTask {
    pub task: TaskId,
    /// Full-build runs and watch re-runs share one increasing counter.
    pub run_id: u64,
}
