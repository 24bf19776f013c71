// src/task.rs

//! Build tasks and the pipeline that executes them.
//!
//! A [`BuildTask`] is stateless: every execution resolves its sources
//! afresh, runs the adapter (or the injector) and writes the single
//! artifact. The [`Pipeline`] owns everything a task needs and is shared by
//! the executor, so one task execution is a plain call returning `Result`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use tracing::{debug, info};

use crate::compile::{AdapterRegistry, CompileContext, Toolchain};
use crate::config::BuildConfig;
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::inject::{HtmlInjector, HtmlTemplate};
use crate::registry::ArtifactRegistry;
use crate::resolve::{resolve, ResolvedFileSet, SourcePatternSet};
use crate::types::{AssetClass, TaskId};

/// What running a task does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    Compile(AssetClass),
    InjectHtml,
}

#[derive(Debug, Clone)]
pub struct BuildTask {
    id: TaskId,
    sources: SourcePatternSet,
    kind: TaskKind,
}

impl BuildTask {
    pub fn from_config(cfg: &BuildConfig, id: TaskId) -> Result<Self> {
        let sources = SourcePatternSet::for_task(cfg, id)?;
        let kind = match id {
            TaskId::Asset(class) => TaskKind::Compile(class),
            TaskId::Html => TaskKind::InjectHtml,
        };
        Ok(Self { id, sources, kind })
    }

    pub fn id(&self) -> TaskId {
        self.id
    }

    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    pub fn sources(&self) -> &SourcePatternSet {
        &self.sources
    }
}

/// Everything needed to execute any [`BuildTask`].
pub struct Pipeline {
    config: Arc<BuildConfig>,
    fs: Arc<dyn FileSystem>,
    toolchain: Arc<dyn Toolchain>,
    registry: ArtifactRegistry,
    adapters: AdapterRegistry,
    tasks: BTreeMap<TaskId, BuildTask>,
}

impl fmt::Debug for Pipeline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Pipeline")
            .field("root", &self.config.root())
            .field("tasks", &self.tasks.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl Pipeline {
    /// Pipeline with the standard adapters.
    pub fn new(
        config: Arc<BuildConfig>,
        fs: Arc<dyn FileSystem>,
        toolchain: Arc<dyn Toolchain>,
    ) -> Result<Self> {
        Self::with_adapters(config, fs, toolchain, AdapterRegistry::standard())
    }

    pub fn with_adapters(
        config: Arc<BuildConfig>,
        fs: Arc<dyn FileSystem>,
        toolchain: Arc<dyn Toolchain>,
        adapters: AdapterRegistry,
    ) -> Result<Self> {
        let registry = ArtifactRegistry::new(&config.target_dir());
        let tasks = TaskId::ALL
            .into_iter()
            .map(|id| BuildTask::from_config(&config, id).map(|t| (id, t)))
            .collect::<Result<BTreeMap<_, _>>>()?;

        Ok(Self {
            config,
            fs,
            toolchain,
            registry,
            adapters,
            tasks,
        })
    }

    pub fn config(&self) -> &Arc<BuildConfig> {
        &self.config
    }

    pub fn fs(&self) -> &Arc<dyn FileSystem> {
        &self.fs
    }

    pub fn tasks(&self) -> impl Iterator<Item = &BuildTask> {
        self.tasks.values()
    }

    pub fn task(&self, id: TaskId) -> Option<&BuildTask> {
        self.tasks.get(&id)
    }

    /// Where a task's artifact lands.
    pub fn output_path(&self, id: TaskId) -> PathBuf {
        match id {
            TaskId::Asset(class) => self.registry.get(class).target_path.clone(),
            TaskId::Html => self.config.site_output_path(),
        }
    }

    /// Current file set of a task.
    pub fn resolve(&self, id: TaskId) -> Result<ResolvedFileSet> {
        let task = self.lookup(id)?;
        Ok(resolve(self.fs.as_ref(), self.config.root(), task.sources())?)
    }

    /// Run one task to completion and return the artifact path.
    ///
    /// On failure nothing is written; the previous artifact stays in place.
    pub fn execute(&self, id: TaskId) -> Result<PathBuf> {
        let task = self.lookup(id)?;
        let files = resolve(self.fs.as_ref(), self.config.root(), task.sources())?;
        debug!(task = %id, files = files.len(), "executing task");

        let artifact = match task.kind() {
            TaskKind::Compile(class) => {
                let adapter = self.adapters.get(class).ok_or_else(|| {
                    BuildError::compile(class, "no compiler registered for this asset class")
                })?;
                let ctx = CompileContext {
                    config: &self.config,
                    fs: self.fs.as_ref(),
                    toolchain: self.toolchain.as_ref(),
                    spec: self.registry.get(class),
                };
                adapter.compile(&ctx, &files)?
            }
            TaskKind::InjectHtml => {
                let Some(source) = files.iter().next() else {
                    return Err(BuildError::Resolution {
                        task: id,
                        patterns: task.sources().patterns().to_vec(),
                    });
                };
                let template = HtmlTemplate {
                    source: source.to_path_buf(),
                    selector: self.config.selector().clone(),
                };
                HtmlInjector::new(self.config.site_output_path()).inject(
                    self.fs.as_ref(),
                    &template,
                    &self.registry.directives_in_order(),
                )?
            }
        };

        self.fs.write(&artifact.path, &artifact.bytes)?;
        info!(task = %id, artifact = ?artifact.path, bytes = artifact.bytes.len(), "task finished");
        Ok(artifact.path)
    }

    fn lookup(&self, id: TaskId) -> Result<&BuildTask> {
        self.tasks
            .get(&id)
            .ok_or_else(|| BuildError::BuildFailed(format!("unknown task {id}")))
    }
}
