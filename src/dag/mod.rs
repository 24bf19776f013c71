// src/dag/mod.rs

//! Task graph and full-build scheduling.
//!
//! - [`graph`] holds the five-node task graph (HTML after the four artifact
//!   tasks).
//! - [`scheduler`] contains the per-run state machine that decides which
//!   tasks are ready to run.
//! - [`task_info`] provides the run-state and scheduled-task types.

pub mod graph;
pub mod scheduler;
pub mod task_info;

pub use graph::DagGraph;
pub use scheduler::Scheduler;
pub use task_info::{ScheduledTask, TaskRunState};
