// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::dag::ScheduledTask;
use crate::errors::Result;
use crate::exec::ExecutorBackend;
use crate::watch::WatcherHandle;

use super::core::CoreRuntime;
use super::{BuildStatus, CoreCommand, RuntimeEvent};

/// Starts the filesystem watcher once watch mode is entered.
pub type WatchStarter = Box<dyn FnOnce() -> anyhow::Result<WatcherHandle> + Send>;

/// Drives the [`CoreRuntime`] in response to `RuntimeEvent`s and delegates
/// task execution to an `ExecutorBackend`.
///
/// All orchestration semantics live in the core; this shell only moves
/// events and commands between channels, the executor and the watcher.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
    watch_starter: Option<WatchStarter>,
    watcher: Option<WatcherHandle>,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("watching", &self.watcher.is_some())
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(core: CoreRuntime, event_rx: mpsc::Receiver<RuntimeEvent>, executor: E) -> Self {
        Self {
            core,
            event_rx,
            executor,
            watch_starter: None,
            watcher: None,
        }
    }

    /// Called when the core enters watch mode. Without one, watch mode
    /// only reacts to triggers sent on the event channel.
    pub fn with_watch_starter(mut self, starter: WatchStarter) -> Self {
        self.watch_starter = Some(starter);
        self
    }

    /// Main event loop. Returns when the core asks to stop or the event
    /// channel closes.
    pub async fn run(mut self) -> Result<BuildStatus> {
        info!("sitepipe runtime started");

        loop {
            let event = match self.event_rx.recv().await {
                Some(e) => e,
                None => {
                    info!("runtime event channel closed; exiting");
                    break;
                }
            };

            debug!(?event, "runtime received event");

            let step = self.core.step(event);
            for command in step.commands {
                self.execute_command(command).await?;
            }

            if !step.keep_running {
                debug!("core requested exit; stopping runtime");
                break;
            }
        }

        let status = self.core.status();
        info!(?status, "runtime exiting");
        Ok(status)
    }

    async fn execute_command(&mut self, command: CoreCommand) -> Result<()> {
        match command {
            CoreCommand::DispatchTasks(tasks) => self.spawn_ready(tasks).await?,
            CoreCommand::StartWatching => {
                if let Some(start) = self.watch_starter.take() {
                    self.watcher = Some(start()?);
                } else if self.watcher.is_none() {
                    warn!("watch mode entered without a file watcher");
                }
            }
            CoreCommand::RequestExit => {
                debug!("core issued RequestExit command");
            }
        }
        Ok(())
    }

    async fn spawn_ready(&mut self, tasks: Vec<ScheduledTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let names: Vec<String> = tasks.iter().map(|t| t.task.to_string()).collect();
        let run_ids: Vec<u64> = tasks.iter().map(|t| t.run_id).collect();
        debug!(?names, ?run_ids, "spawning ready tasks");

        self.executor.spawn_ready_tasks(tasks).await
    }
}
