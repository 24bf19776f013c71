// src/lib.rs

pub mod cli;
pub mod compile;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod fs;
pub mod inject;
pub mod logging;
pub mod open;
pub mod registry;
pub mod resolve;
pub mod task;
pub mod types;
pub mod watch;

use std::path::Path;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::cli::{CliArgs, Command};
use crate::compile::ProcessToolchain;
use crate::config::{load_or_default, BuildConfig};
use crate::dag::DagGraph;
use crate::engine::{BuildStatus, CoreRuntime, Runtime, RuntimeEvent, RuntimeOptions};
use crate::errors::BuildError;
use crate::exec::{execute_once, PipelineExecutor};
use crate::fs::{FileSystem, RealFileSystem};
use crate::task::Pipeline;
use crate::types::TaskId;
use crate::watch::{spawn_watcher, HashFilter, WatchContext, WatchTable};

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - the task pipeline and its executor
/// - core runtime / async runtime
/// - (optional) file watcher
/// - Ctrl-C handling
pub async fn run(args: CliArgs) -> Result<()> {
    let cfg = Arc::new(load_or_default(args.config.as_deref().map(Path::new))?);
    let fs: Arc<dyn FileSystem> = Arc::new(RealFileSystem);
    let pipeline = Arc::new(Pipeline::new(
        Arc::clone(&cfg),
        Arc::clone(&fs),
        Arc::new(ProcessToolchain),
    )?);

    if args.dry_run {
        print_dry_run(&pipeline, &args.command)?;
        return Ok(());
    }

    match &args.command {
        Command::OpenSite { viewer } => {
            open::open_site(&cfg, fs.as_ref(), viewer.as_deref())?;
        }
        Command::Build => report(run_pipeline(pipeline, false).await?)?,
        Command::Watch => report(run_pipeline(pipeline, true).await?)?,
        other => {
            if let Some(task) = other.single_task() {
                let path = execute_once(pipeline, task).await?;
                info!(task = %task, artifact = ?path, "done");
            }
        }
    }
    Ok(())
}

/// Full build (and optionally watch mode) through the runtime.
pub async fn run_pipeline(pipeline: Arc<Pipeline>, watch: bool) -> Result<BuildStatus> {
    let cfg = Arc::clone(pipeline.config());

    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);
    let executor = PipelineExecutor::new(Arc::clone(&pipeline), rt_tx.clone());
    let core = CoreRuntime::standard(cfg.watch.queue_length, RuntimeOptions { watch });
    let mut runtime = Runtime::new(core, rt_rx, executor);

    if watch {
        let ctx = watch_context(&cfg, Arc::clone(pipeline.fs()), rt_tx.clone())?;
        runtime = runtime.with_watch_starter(Box::new(move || spawn_watcher(ctx)));
    }

    // Ctrl-C -> graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    rt_tx.send(RuntimeEvent::BuildRequested).await?;
    Ok(runtime.run().await?)
}

fn watch_context(
    cfg: &BuildConfig,
    fs: Arc<dyn FileSystem>,
    runtime_tx: mpsc::Sender<RuntimeEvent>,
) -> Result<WatchContext> {
    let table = Arc::new(WatchTable::from_config(cfg)?);
    let hash_filter = cfg
        .watch
        .use_hash
        .then(|| Arc::new(Mutex::new(HashFilter::new(Arc::clone(&fs)))));

    Ok(WatchContext {
        root: cfg.root().to_path_buf(),
        root_aliases: Vec::new(),
        table,
        fs,
        hash_filter,
        runtime_tx,
    })
}

/// Map the final status onto the process result.
fn report(status: BuildStatus) -> Result<()> {
    match status {
        BuildStatus::Succeeded => {
            info!("build succeeded");
            Ok(())
        }
        BuildStatus::Interrupted => {
            info!("interrupted");
            Ok(())
        }
        BuildStatus::Failed(failures) => {
            for (task, message) in &failures {
                error!(task = %task, "{message}");
            }
            let names: Vec<String> = failures.iter().map(|(t, _)| t.to_string()).collect();
            Err(BuildError::BuildFailed(format!(
                "{} task(s) failed: {}",
                failures.len(),
                names.join(", ")
            ))
            .into())
        }
    }
}

/// Print the resolved plan for `command` without running anything.
fn print_dry_run(pipeline: &Pipeline, command: &Command) -> Result<()> {
    let cfg = pipeline.config();
    println!("sitepipe dry-run");
    println!("  root = {}", cfg.root().display());
    println!("  target_dir = {}", cfg.target_dir().display());
    println!();

    if let Command::OpenSite { viewer } = command {
        let site = cfg.site_output_path();
        let (program, args) = open::viewer_command(cfg, viewer.as_deref(), &site);
        println!("open-site: {program} {}", args.join(" "));
        return Ok(());
    }

    let tasks: Vec<TaskId> = match command.single_task() {
        Some(task) => vec![task],
        None => DagGraph::standard().build_order()?,
    };

    println!("tasks ({}):", tasks.len());
    for id in tasks {
        let Some(task) = pipeline.task(id) else {
            continue;
        };
        let files = pipeline.resolve(id)?;
        println!("  - {id}");
        println!("      patterns: {:?}", task.sources().patterns());
        println!("      files ({}):", files.len());
        for file in files.iter() {
            println!("        {}", file.display());
        }
        println!("      output: {}", pipeline.output_path(id).display());
    }

    debug!("dry-run complete (no execution)");
    Ok(())
}
