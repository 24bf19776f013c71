// src/engine/core.rs

//! Pure core runtime state machine.
//!
//! This module contains a synchronous, deterministic "core runtime" that
//! consumes [`RuntimeEvent`]s and produces:
//! - an updated core state
//! - a list of commands describing what the IO shell should do next
//!
//! The async shell (`engine::runtime::Runtime`) is responsible for reading
//! events from channels, sending `ScheduledTask`s to the executor, starting
//! the watcher and handling Ctrl+C.
//!
//! The core is unit tested without any Tokio, channels, filesystem, or
//! processes.

use std::collections::{BTreeMap, BTreeSet};

use crate::dag::{DagGraph, Scheduler};
use crate::engine::event_handlers::{
    handle_build_request, handle_task_completion, handle_task_trigger, CoreState, CoreStep,
};
use crate::engine::queue::TriggerQueue;
use crate::engine::{BuildStatus, Phase, RuntimeEvent, RuntimeOptions};
use crate::types::TaskId;

#[derive(Debug)]
pub struct CoreRuntime {
    state: CoreState,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler, queue_length: usize, options: RuntimeOptions) -> Self {
        Self {
            state: CoreState {
                scheduler,
                queue: TriggerQueue::new(queue_length),
                options,
                phase: Phase::Idle,
                next_run_id: 0,
                running: BTreeSet::new(),
                deferred: BTreeSet::new(),
                failures: BTreeMap::new(),
                interrupted: false,
            },
        }
    }

    /// Core over the standard task graph.
    pub fn standard(queue_length: usize, options: RuntimeOptions) -> Self {
        Self::new(Scheduler::new(DagGraph::standard()), queue_length, options)
    }

    pub fn phase(&self) -> Phase {
        self.state.phase
    }

    /// Whether `task` is executing as a watch-mode re-run.
    pub fn is_running(&self, task: TaskId) -> bool {
        self.state.running.contains(&task)
    }

    /// Queued follow-up runs of `task` (for tests).
    pub fn queued_runs(&self, task: TaskId) -> usize {
        self.state.queue.pending_for(task)
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.state.scheduler
    }

    /// Handle a single runtime event, updating core state and returning the
    /// resulting commands for the IO shell.
    pub fn step(&mut self, event: RuntimeEvent) -> CoreStep {
        match event {
            RuntimeEvent::BuildRequested => handle_build_request(&mut self.state),
            RuntimeEvent::TaskTriggered { task, reason } => {
                handle_task_trigger(&mut self.state, task, reason)
            }
            RuntimeEvent::TaskCompleted { task, outcome } => {
                handle_task_completion(&mut self.state, task, outcome)
            }
            RuntimeEvent::ShutdownRequested => {
                self.state.interrupted = true;
                CoreStep {
                    commands: Vec::new(),
                    keep_running: false,
                }
            }
        }
    }

    /// Final status as seen so far.
    pub fn status(&self) -> BuildStatus {
        if self.state.interrupted {
            return BuildStatus::Interrupted;
        }
        match self.state.phase {
            Phase::Done => BuildStatus::Succeeded,
            Phase::Failed => BuildStatus::Failed(
                self.state
                    .failures
                    .iter()
                    .map(|(t, m)| (*t, m.clone()))
                    .collect(),
            ),
            Phase::Idle | Phase::FullBuild | Phase::Watching => BuildStatus::Interrupted,
        }
    }
}
