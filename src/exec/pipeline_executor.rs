// src/exec/pipeline_executor.rs

//! Runs build tasks on the blocking pool.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::ScheduledTask;
use crate::engine::{RuntimeEvent, TaskOutcome};
use crate::errors::Result;
use crate::task::Pipeline;
use crate::types::TaskId;

use super::backend::ExecutorBackend;

/// Production executor: each scheduled task becomes one
/// `Pipeline::execute` call on Tokio's blocking pool, and its outcome is
/// sent back to the runtime.
///
/// Independent tasks run concurrently; the core never dispatches the same
/// task twice before its completion arrives.
#[derive(Debug, Clone)]
pub struct PipelineExecutor {
    pipeline: Arc<Pipeline>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
}

impl PipelineExecutor {
    pub fn new(pipeline: Arc<Pipeline>, runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            pipeline,
            runtime_tx,
        }
    }
}

impl ExecutorBackend for PipelineExecutor {
    fn spawn_ready_tasks(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let pipeline = Arc::clone(&self.pipeline);
        let tx = self.runtime_tx.clone();

        Box::pin(async move {
            for scheduled in tasks {
                let pipeline = Arc::clone(&pipeline);
                let tx = tx.clone();
                tokio::spawn(run_one(pipeline, scheduled, tx));
            }
            Ok(())
        })
    }
}

async fn run_one(
    pipeline: Arc<Pipeline>,
    scheduled: ScheduledTask,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) {
    let ScheduledTask { task, run_id } = scheduled;
    info!(task = %task, run_id, "starting task");

    let result = tokio::task::spawn_blocking(move || pipeline.execute(task)).await;

    let outcome = match result {
        Ok(Ok(path)) => {
            debug!(task = %task, run_id, artifact = ?path, "task succeeded");
            TaskOutcome::Success
        }
        Ok(Err(err)) => {
            error!(task = %task, run_id, "{err}");
            TaskOutcome::Failed(err.to_string())
        }
        Err(join_err) => {
            error!(task = %task, run_id, error = %join_err, "task panicked");
            TaskOutcome::Failed(format!("task panicked: {join_err}"))
        }
    };

    if runtime_tx
        .send(RuntimeEvent::TaskCompleted { task, outcome })
        .await
        .is_err()
    {
        debug!(task = %task, "runtime gone before completion could be reported");
    }
}

/// Run one task on the blocking pool and return its result (single-task
/// commands, which need no runtime).
pub async fn execute_once(pipeline: Arc<Pipeline>, task: TaskId) -> Result<PathBuf> {
    tokio::task::spawn_blocking(move || pipeline.execute(task))
        .await
        .map_err(|e| anyhow::anyhow!("task {task} panicked: {e}"))?
}
