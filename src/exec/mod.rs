// src/exec/mod.rs

//! Task execution layer.
//!
//! - [`backend`] provides the `ExecutorBackend` trait the runtime talks to.
//! - [`pipeline_executor`] is the production backend: it runs each task on
//!   the blocking pool and reports completions as `RuntimeEvent`s.

pub mod backend;
pub mod pipeline_executor;

pub use backend::ExecutorBackend;
pub use pipeline_executor::{execute_once, PipelineExecutor};
