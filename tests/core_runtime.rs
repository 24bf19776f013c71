// tests/core_runtime.rs

use sitepipe::dag::{DagGraph, ScheduledTask, Scheduler, TaskRunState};
use sitepipe::engine::{
    BuildStatus, CoreCommand, CoreRuntime, Phase, RuntimeEvent, RuntimeOptions, TaskOutcome,
    TriggerReason,
};
use sitepipe::types::{AssetClass, TaskId};

const UI: TaskId = TaskId::Asset(AssetClass::UiModule);
const DEPS: TaskId = TaskId::Asset(AssetClass::Dependencies);
const TS: TaskId = TaskId::Asset(AssetClass::TypedScript);
const CSS: TaskId = TaskId::Asset(AssetClass::Stylesheet);
const ASSETS: [TaskId; 4] = [UI, DEPS, TS, CSS];

fn core(watch: bool, queue_length: usize) -> CoreRuntime {
    CoreRuntime::standard(queue_length, RuntimeOptions { watch })
}

fn completed(task: TaskId) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task,
        outcome: TaskOutcome::Success,
    }
}

fn failed(task: TaskId, message: &str) -> RuntimeEvent {
    RuntimeEvent::TaskCompleted {
        task,
        outcome: TaskOutcome::Failed(message.to_string()),
    }
}

fn triggered(task: TaskId) -> RuntimeEvent {
    RuntimeEvent::TaskTriggered {
        task,
        reason: TriggerReason::FileWatch,
    }
}

fn dispatched(commands: &[CoreCommand]) -> Vec<TaskId> {
    commands
        .iter()
        .filter_map(|c| match c {
            CoreCommand::DispatchTasks(tasks) => Some(tasks.iter().map(|t| t.task)),
            _ => None,
        })
        .flatten()
        .collect()
}

/// Run the full build to the point where only the HTML task is left.
fn run_assets(core: &mut CoreRuntime) {
    let step = core.step(RuntimeEvent::BuildRequested);
    assert_eq!(dispatched(&step.commands), ASSETS.to_vec());
    for task in ASSETS {
        core.step(completed(task));
    }
}

#[test]
fn standard_graph_puts_html_after_every_asset() {
    let graph = DagGraph::standard();

    assert_eq!(graph.tasks().count(), 5);
    assert_eq!(graph.dependencies_of(TaskId::Html), ASSETS.to_vec());
    assert_eq!(graph.dependents_of(CSS), vec![TaskId::Html]);
    assert!(graph.dependencies_of(UI).is_empty());

    let order = graph.build_order().unwrap();
    assert_eq!(order.last(), Some(&TaskId::Html));
    assert_eq!(order.len(), 5);
}

#[test]
fn scheduler_releases_html_once_every_asset_has_run() {
    let mut scheduler = Scheduler::new(DagGraph::standard());

    let ready = scheduler.start_run(7);
    assert_eq!(ready.len(), 4);
    assert!(ready.iter().all(|t| t.run_id == 7));
    assert_eq!(scheduler.run_state_of(TaskId::Html), Some(TaskRunState::Pending));

    assert!(scheduler.handle_completion(UI, true).is_empty());
    assert!(scheduler.handle_completion(DEPS, false).is_empty());
    assert!(scheduler.handle_completion(TS, true).is_empty());
    let ready = scheduler.handle_completion(CSS, true);

    assert_eq!(
        ready,
        vec![ScheduledTask {
            task: TaskId::Html,
            run_id: 7
        }]
    );
    assert!(!scheduler.is_idle());

    scheduler.handle_completion(TaskId::Html, true);
    assert!(scheduler.is_idle());
    assert_eq!(scheduler.failed_tasks(), vec![DEPS]);
}

#[test]
fn scheduler_ignores_completion_of_tasks_not_running() {
    let mut scheduler = Scheduler::new(DagGraph::standard());
    scheduler.start_run(1);

    assert!(scheduler.handle_completion(TaskId::Html, true).is_empty());
    assert_eq!(scheduler.run_state_of(TaskId::Html), Some(TaskRunState::Pending));
}

#[test]
fn full_build_dispatches_html_last_and_exits() {
    let mut core = core(false, 1);
    run_assets(&mut core);
    assert_eq!(core.phase(), Phase::FullBuild);

    // HTML was dispatched by the last asset completion.
    assert_eq!(
        core.scheduler().run_state_of(TaskId::Html),
        Some(TaskRunState::Running)
    );

    let step = core.step(completed(TaskId::Html));

    assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
    assert!(!step.keep_running);
    assert_eq!(core.phase(), Phase::Done);
    assert_eq!(core.status(), BuildStatus::Succeeded);
}

#[test]
fn last_asset_completion_dispatches_html() {
    let mut core = core(false, 1);
    core.step(RuntimeEvent::BuildRequested);
    for task in [UI, DEPS, TS] {
        let step = core.step(completed(task));
        assert!(step.commands.is_empty());
    }

    let step = core.step(completed(CSS));

    assert_eq!(dispatched(&step.commands), vec![TaskId::Html]);
    assert!(step.keep_running);
}

#[test]
fn failures_do_not_stop_other_tasks_but_fail_the_build() {
    let mut core = core(true, 1);
    core.step(RuntimeEvent::BuildRequested);
    core.step(completed(UI));
    core.step(failed(DEPS, "package 'ghost' not found"));
    core.step(completed(TS));
    let step = core.step(completed(CSS));
    assert_eq!(dispatched(&step.commands), vec![TaskId::Html]);

    let step = core.step(completed(TaskId::Html));

    assert_eq!(step.commands, vec![CoreCommand::RequestExit]);
    assert!(!step.keep_running);
    assert_eq!(core.phase(), Phase::Failed);
    assert_eq!(
        core.status(),
        BuildStatus::Failed(vec![(DEPS, "package 'ghost' not found".to_string())])
    );
}

#[test]
fn successful_build_in_watch_mode_starts_watching() {
    let mut core = core(true, 1);
    run_assets(&mut core);

    let step = core.step(completed(TaskId::Html));

    assert_eq!(step.commands, vec![CoreCommand::StartWatching]);
    assert!(step.keep_running);
    assert_eq!(core.phase(), Phase::Watching);
}

#[test]
fn stylesheet_change_reruns_only_the_stylesheet_task() {
    let mut core = core(true, 1);
    run_assets(&mut core);
    core.step(completed(TaskId::Html));

    let step = core.step(triggered(CSS));

    assert_eq!(dispatched(&step.commands), vec![CSS]);
    assert!(core.is_running(CSS));
    assert!(!core.is_running(TaskId::Html));

    let step = core.step(completed(CSS));
    assert!(step.commands.is_empty());
    assert!(!core.is_running(CSS));
}

#[test]
fn run_ids_keep_increasing_across_watch_reruns() {
    let mut core = core(true, 1);
    run_assets(&mut core);
    core.step(completed(TaskId::Html));

    let first = core.step(triggered(TS));
    core.step(completed(TS));
    let second = core.step(triggered(TS));

    let run_id = |commands: &[CoreCommand]| match &commands[0] {
        CoreCommand::DispatchTasks(tasks) => tasks[0].run_id,
        other => panic!("unexpected command {other:?}"),
    };
    assert_eq!(run_id(&first.commands), 2);
    assert_eq!(run_id(&second.commands), 3);
}

#[test]
fn triggers_while_running_are_coalesced_into_one_follow_up() {
    let mut core = core(true, 1);
    run_assets(&mut core);
    core.step(completed(TaskId::Html));
    core.step(triggered(CSS));

    for _ in 0..5 {
        let step = core.step(triggered(CSS));
        assert!(step.commands.is_empty());
    }
    assert_eq!(core.queued_runs(CSS), 1);

    let step = core.step(completed(CSS));
    assert_eq!(dispatched(&step.commands), vec![CSS]);
    assert_eq!(core.queued_runs(CSS), 0);

    let step = core.step(completed(CSS));
    assert!(step.commands.is_empty());
}

#[test]
fn queue_length_caps_follow_up_runs() {
    let mut core = core(true, 3);
    run_assets(&mut core);
    core.step(completed(TaskId::Html));
    core.step(triggered(UI));

    for _ in 0..10 {
        core.step(triggered(UI));
    }
    assert_eq!(core.queued_runs(UI), 3);

    let mut reruns = 0;
    loop {
        let step = core.step(completed(UI));
        if dispatched(&step.commands).is_empty() {
            break;
        }
        reruns += 1;
    }
    assert_eq!(reruns, 3);
}

#[test]
fn failed_rerun_keeps_watching() {
    let mut core = core(true, 1);
    run_assets(&mut core);
    core.step(completed(TaskId::Html));
    core.step(triggered(TS));

    let step = core.step(failed(TS, "syntax error"));

    assert!(step.keep_running);
    assert_eq!(core.phase(), Phase::Watching);
    let step = core.step(triggered(TS));
    assert_eq!(dispatched(&step.commands), vec![TS]);
}

#[test]
fn triggers_during_the_full_build_are_deferred_until_watching() {
    let mut core = core(true, 1);
    core.step(RuntimeEvent::BuildRequested);

    let step = core.step(triggered(CSS));
    assert!(step.commands.is_empty());
    core.step(triggered(CSS));
    core.step(triggered(UI));

    for task in ASSETS {
        core.step(completed(task));
    }
    let step = core.step(completed(TaskId::Html));

    assert_eq!(step.commands[0], CoreCommand::StartWatching);
    assert_eq!(dispatched(&step.commands), vec![UI, CSS]);
}

#[test]
fn triggers_after_a_failed_build_are_ignored() {
    let mut core = core(true, 1);
    core.step(RuntimeEvent::BuildRequested);
    for task in ASSETS {
        core.step(failed(task, "broken"));
    }
    core.step(completed(TaskId::Html));
    assert_eq!(core.phase(), Phase::Failed);

    let step = core.step(triggered(CSS));

    assert!(step.commands.is_empty());
}

#[test]
fn second_build_request_is_ignored() {
    let mut core = core(false, 1);
    core.step(RuntimeEvent::BuildRequested);

    let step = core.step(RuntimeEvent::BuildRequested);

    assert!(step.commands.is_empty());
    assert!(step.keep_running);
}

#[test]
fn shutdown_interrupts_in_any_phase() {
    let mut core = core(true, 1);
    run_assets(&mut core);
    core.step(completed(TaskId::Html));

    let step = core.step(RuntimeEvent::ShutdownRequested);

    assert!(!step.keep_running);
    assert_eq!(core.status(), BuildStatus::Interrupted);
}
