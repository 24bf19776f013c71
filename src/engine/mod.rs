// src/engine/mod.rs

//! Build orchestration engine.
//!
//! This module ties together:
//! - the full-build scheduler
//! - the per-task trigger queue used while watching
//! - the runtime event loop that reacts to:
//!   - build requests
//!   - file-watch triggers
//!   - task completion events
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use crate::types::TaskId;

/// Outcome of one task execution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome {
    Success,
    /// The task's error, rendered for the operator.
    Failed(String),
}

impl TaskOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TaskOutcome::Success)
    }
}

/// Why a task was triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerReason {
    /// Requested directly (e.g. tests, tooling).
    Manual,
    /// A watched source changed.
    FileWatch,
}

/// Orchestrator phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    FullBuild,
    /// Full build succeeded.
    Done,
    /// Full build finished with at least one failed task.
    Failed,
    /// Re-running single tasks on change; left only on interrupt.
    Watching,
}

/// Runtime options used by both the core and the async shell.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuntimeOptions {
    /// Enter watch mode after a successful full build instead of exiting.
    pub watch: bool,
}

/// Final result of a runtime session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildStatus {
    Succeeded,
    /// Every failed task with its message, in task order.
    Failed(Vec<(TaskId, String)>),
    /// Stopped by a shutdown request.
    Interrupted,
}

/// Events flowing into the runtime from the CLI, watcher and executor.
#[derive(Debug, Clone)]
pub enum RuntimeEvent {
    /// Start the full build.
    BuildRequested,
    /// A single task should run again.
    TaskTriggered { task: TaskId, reason: TriggerReason },
    /// A task execution finished.
    TaskCompleted { task: TaskId, outcome: TaskOutcome },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod event_handlers;
pub mod queue;
pub mod runtime;

pub use core::CoreRuntime;
pub use event_handlers::{CoreCommand, CoreStep};
pub use queue::TriggerQueue;
pub use runtime::{Runtime, WatchStarter};
