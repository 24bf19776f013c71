// src/dag/scheduler.rs

use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::dag::graph::DagGraph;
use crate::dag::task_info::{ScheduledTask, TaskRunState};
use crate::types::TaskId;

/// Per-run state for one full build over a [`DagGraph`].
///
/// A task becomes ready once every dependency has *run*, successfully or
/// not: the HTML task only needs the artifact paths, which are static. A
/// failure therefore never blocks other tasks; it is only recorded.
#[derive(Debug)]
pub struct Scheduler {
    graph: DagGraph,
    states: BTreeMap<TaskId, TaskRunState>,
    run_id: Option<u64>,
}

impl Scheduler {
    pub fn new(graph: DagGraph) -> Self {
        Self {
            graph,
            states: BTreeMap::new(),
            run_id: None,
        }
    }

    pub fn graph(&self) -> &DagGraph {
        &self.graph
    }

    /// Returns `true` if there is currently no active run.
    pub fn is_idle(&self) -> bool {
        self.run_id.is_none()
    }

    pub fn current_run_id(&self) -> Option<u64> {
        self.run_id
    }

    /// State of `task` in the active (or last) run.
    pub fn run_state_of(&self, task: TaskId) -> Option<TaskRunState> {
        self.states.get(&task).copied()
    }

    /// Start a run over every task and return the ones ready immediately.
    pub fn start_run(&mut self, run_id: u64) -> Vec<ScheduledTask> {
        if let Some(active) = self.run_id {
            warn!(active, run_id, "starting a run while one is active; resetting");
        }
        self.run_id = Some(run_id);
        self.states = self
            .graph
            .tasks()
            .map(|t| (t, TaskRunState::Pending))
            .collect();
        debug!(run_id, tasks = self.states.len(), "scheduler: starting run");
        self.collect_ready(run_id)
    }

    /// Record the outcome of `task` and return tasks that became ready.
    pub fn handle_completion(&mut self, task: TaskId, success: bool) -> Vec<ScheduledTask> {
        let Some(run_id) = self.run_id else {
            warn!(task = %task, "completion with no active run; ignoring");
            return Vec::new();
        };

        match self.states.get(&task).copied() {
            Some(TaskRunState::Running) => {
                let state = if success {
                    TaskRunState::Succeeded
                } else {
                    TaskRunState::Failed
                };
                self.states.insert(task, state);
            }
            Some(other) => {
                warn!(task = %task, state = ?other, "completion for a task that is not running; ignoring");
                return Vec::new();
            }
            None => {
                warn!(task = %task, "completion for unknown task; ignoring");
                return Vec::new();
            }
        }

        let ready = self.collect_ready(run_id);

        if self.states.values().all(|s| s.is_terminal()) {
            info!(run_id, "scheduler: all tasks have run; run finished");
            self.run_id = None;
        }
        ready
    }

    /// Tasks whose run failed in the active (or last) run.
    pub fn failed_tasks(&self) -> Vec<TaskId> {
        self.states
            .iter()
            .filter(|(_, s)| **s == TaskRunState::Failed)
            .map(|(t, _)| *t)
            .collect()
    }

    fn collect_ready(&mut self, run_id: u64) -> Vec<ScheduledTask> {
        let ready: Vec<TaskId> = self
            .states
            .iter()
            .filter(|(_, s)| **s == TaskRunState::Pending)
            .map(|(t, _)| *t)
            .filter(|t| {
                self.graph
                    .dependencies_of(*t)
                    .iter()
                    .all(|d| self.states.get(d).is_some_and(|s| s.is_terminal()))
            })
            .collect();

        ready
            .into_iter()
            .map(|task| {
                self.states.insert(task, TaskRunState::Running);
                ScheduledTask { task, run_id }
            })
            .collect()
    }
}
