// src/compile/ui_module.rs

use tracing::debug;

use super::toolchain::Invocation;
use super::{Artifact, CompileContext, CompilerAdapter};
use crate::errors::{BuildError, Result};
use crate::resolve::ResolvedFileSet;
use crate::types::{AssetClass, TaskId};

/// Compiles every UI module source into one program (`elm make`).
///
/// An empty source set is an error: the site has no program without it.
#[derive(Debug, Clone, Copy, Default)]
pub struct UiModuleCompiler;

impl CompilerAdapter for UiModuleCompiler {
    fn class(&self) -> AssetClass {
        AssetClass::UiModule
    }

    fn compile(&self, ctx: &CompileContext<'_>, files: &ResolvedFileSet) -> Result<Artifact> {
        if files.is_empty() {
            return Err(BuildError::Resolution {
                task: TaskId::Asset(AssetClass::UiModule),
                patterns: ctx.config.sources.ui_module.clone(),
            });
        }

        let bytes = compile_to_scratch(
            ctx,
            &ctx.config.toolchain.ui_module,
            files,
            self.class(),
            |out| vec![format!("--output={}", out.display())],
        )?;

        debug!(inputs = files.len(), bytes = bytes.len(), "compiled ui module");
        Ok(Artifact {
            path: ctx.spec.target_path.clone(),
            bytes,
        })
    }
}

/// Run a compiler that writes its result to a file, in a private scratch
/// directory, and return the file's content.
///
/// `output_args` renders the output-path flag(s); they come after the
/// configured argv and before the inputs.
pub(crate) fn compile_to_scratch(
    ctx: &CompileContext<'_>,
    argv: &[String],
    files: &ResolvedFileSet,
    class: AssetClass,
    output_args: impl FnOnce(&std::path::Path) -> Vec<String>,
) -> Result<Vec<u8>> {
    let scratch = tempfile::tempdir()
        .map_err(|e| BuildError::compile(class, format!("creating scratch directory: {e}")))?;
    let out = scratch.path().join(ctx.spec.basename);

    let mut extra = output_args(&out);
    extra.extend(files.iter().map(|p| p.to_string_lossy().into_owned()));
    let invocation = Invocation::from_argv(argv, extra, ctx.config.root().to_path_buf());

    ctx.toolchain
        .invoke(&invocation)
        .map_err(|failure| BuildError::compile(class, failure.describe(&invocation)))?;

    std::fs::read(&out).map_err(|e| {
        BuildError::compile(
            class,
            format!("`{}` produced no output at {:?}: {e}", invocation.program, out),
        )
    })
}
