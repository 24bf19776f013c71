// src/exec/backend.rs

//! Pluggable executor backend abstraction.
//!
//! The runtime talks to an `ExecutorBackend` instead of running tasks
//! itself. Production uses [`PipelineExecutor`]; tests provide a backend
//! that records what was scheduled and reports completions directly.

use std::future::Future;
use std::pin::Pin;

use crate::dag::ScheduledTask;
use crate::errors::Result;

/// Trait abstracting how scheduled tasks are executed.
pub trait ExecutorBackend: Send {
    /// Dispatch the given tasks for execution.
    ///
    /// Must not wait for the tasks to finish: completion is reported later
    /// as a `RuntimeEvent::TaskCompleted`.
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}
