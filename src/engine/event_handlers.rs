// src/engine/event_handlers.rs

//! Event handling logic for the core runtime.

use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, info, warn};

use crate::dag::{ScheduledTask, Scheduler};
use crate::engine::queue::TriggerQueue;
use crate::engine::{Phase, RuntimeOptions, TaskOutcome, TriggerReason};
use crate::types::TaskId;

/// Command produced by the pure core, to be executed by the outer IO shell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Send these tasks to the executor.
    DispatchTasks(Vec<ScheduledTask>),
    /// The full build succeeded and watch mode begins: start the watcher.
    StartWatching,
    /// Nothing left to do; the process should exit.
    RequestExit,
}

/// Decision returned by the core after handling a single `RuntimeEvent`.
#[derive(Debug, Clone)]
pub struct CoreStep {
    /// Commands the IO shell should execute, in order.
    pub commands: Vec<CoreCommand>,
    /// Whether the outer runtime loop should keep running.
    pub keep_running: bool,
}

impl CoreStep {
    fn running(commands: Vec<CoreCommand>) -> Self {
        Self {
            commands,
            keep_running: true,
        }
    }
}

/// Mutable state of the core, shared by the handlers below.
#[derive(Debug)]
pub(crate) struct CoreState {
    pub(crate) scheduler: Scheduler,
    pub(crate) queue: TriggerQueue,
    pub(crate) options: RuntimeOptions,
    pub(crate) phase: Phase,
    pub(crate) next_run_id: u64,
    /// Tasks currently executing in watch mode.
    pub(crate) running: BTreeSet<TaskId>,
    /// Triggers received before watch mode was entered.
    pub(crate) deferred: BTreeSet<TaskId>,
    /// Failures of the full build.
    pub(crate) failures: BTreeMap<TaskId, String>,
    pub(crate) interrupted: bool,
}

impl CoreState {
    fn next_run_id(&mut self) -> u64 {
        self.next_run_id += 1;
        self.next_run_id
    }
}

/// Start the full build: every task, HTML after the rest.
pub(crate) fn handle_build_request(state: &mut CoreState) -> CoreStep {
    if state.phase != Phase::Idle {
        warn!(phase = ?state.phase, "build requested more than once; ignoring");
        return CoreStep::running(Vec::new());
    }

    state.phase = Phase::FullBuild;
    let run_id = state.next_run_id();
    info!(run_id, "full build started");

    let ready = state.scheduler.start_run(run_id);
    let mut commands = Vec::new();
    if !ready.is_empty() {
        commands.push(CoreCommand::DispatchTasks(ready));
    }
    CoreStep::running(commands)
}

/// Handle a single-task trigger.
///
/// - Before watch mode is entered the trigger is deferred.
/// - While watching, an idle task is dispatched at once; a running one gets
///   a (bounded) follow-up run.
pub(crate) fn handle_task_trigger(
    state: &mut CoreState,
    task: TaskId,
    reason: TriggerReason,
) -> CoreStep {
    match state.phase {
        Phase::Watching => {}
        Phase::Idle | Phase::FullBuild | Phase::Done => {
            debug!(task = %task, ?reason, "trigger before watch mode; deferring");
            state.deferred.insert(task);
            return CoreStep::running(Vec::new());
        }
        Phase::Failed => {
            debug!(task = %task, "trigger after failed build; ignoring");
            return CoreStep::running(Vec::new());
        }
    }

    if state.running.contains(&task) {
        state.queue.record_trigger(task);
        return CoreStep::running(Vec::new());
    }

    debug!(task = %task, ?reason, "dispatching re-run");
    CoreStep::running(vec![dispatch_single(state, task)])
}

/// Handle a task completion event.
pub(crate) fn handle_task_completion(
    state: &mut CoreState,
    task: TaskId,
    outcome: TaskOutcome,
) -> CoreStep {
    match state.phase {
        Phase::FullBuild => full_build_completion(state, task, outcome),
        Phase::Watching => watch_completion(state, task, outcome),
        other => {
            warn!(task = %task, phase = ?other, "unexpected completion; ignoring");
            CoreStep::running(Vec::new())
        }
    }
}

fn full_build_completion(state: &mut CoreState, task: TaskId, outcome: TaskOutcome) -> CoreStep {
    if let TaskOutcome::Failed(message) = &outcome {
        state.failures.insert(task, message.clone());
    }

    let mut commands = Vec::new();
    let ready = state.scheduler.handle_completion(task, outcome.is_success());
    if !ready.is_empty() {
        commands.push(CoreCommand::DispatchTasks(ready));
    }

    if !state.scheduler.is_idle() {
        return CoreStep::running(commands);
    }

    if !state.failures.is_empty() {
        state.phase = Phase::Failed;
        warn!(failed = state.failures.len(), "full build failed");
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    state.phase = Phase::Done;
    info!("full build succeeded");

    if !state.options.watch {
        commands.push(CoreCommand::RequestExit);
        return CoreStep {
            commands,
            keep_running: false,
        };
    }

    commands.extend(enter_watching(state));
    CoreStep::running(commands)
}

fn watch_completion(state: &mut CoreState, task: TaskId, outcome: TaskOutcome) -> CoreStep {
    if !state.running.remove(&task) {
        warn!(task = %task, "completion for a task that is not running; ignoring");
        return CoreStep::running(Vec::new());
    }

    match &outcome {
        TaskOutcome::Success => info!(task = %task, "rebuilt"),
        TaskOutcome::Failed(message) => {
            warn!(task = %task, "rebuild failed; previous artifact left in place: {message}")
        }
    }

    let mut commands = Vec::new();
    if state.queue.take(task) {
        commands.push(dispatch_single(state, task));
    }
    CoreStep::running(commands)
}

fn enter_watching(state: &mut CoreState) -> Vec<CoreCommand> {
    state.phase = Phase::Watching;
    info!("watching for changes");

    let mut commands = vec![CoreCommand::StartWatching];
    let deferred = std::mem::take(&mut state.deferred);
    for task in deferred {
        commands.push(dispatch_single(state, task));
    }
    commands
}

fn dispatch_single(state: &mut CoreState, task: TaskId) -> CoreCommand {
    state.running.insert(task);
    let run_id = state.next_run_id();
    CoreCommand::DispatchTasks(vec![ScheduledTask { task, run_id }])
}
