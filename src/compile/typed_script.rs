// src/compile/typed_script.rs

use tracing::debug;

use super::ui_module::compile_to_scratch;
use super::{Artifact, CompileContext, CompilerAdapter};
use crate::errors::Result;
use crate::resolve::ResolvedFileSet;
use crate::types::AssetClass;

/// Compiles all typed-script sources in one `tsc --outFile` run.
#[derive(Debug, Clone, Copy, Default)]
pub struct TypedScriptCompiler;

impl CompilerAdapter for TypedScriptCompiler {
    fn class(&self) -> AssetClass {
        AssetClass::TypedScript
    }

    fn compile(&self, ctx: &CompileContext<'_>, files: &ResolvedFileSet) -> Result<Artifact> {
        // No sources: the artifact exists but is empty, so the site HTML can
        // still reference it.
        if files.is_empty() {
            debug!("no typed-script sources; writing empty artifact");
            return Ok(Artifact {
                path: ctx.spec.target_path.clone(),
                bytes: Vec::new(),
            });
        }

        let bytes = compile_to_scratch(
            ctx,
            &ctx.config.toolchain.typed_script,
            files,
            self.class(),
            |out| vec!["--outFile".to_string(), out.to_string_lossy().into_owned()],
        )?;

        debug!(inputs = files.len(), bytes = bytes.len(), "compiled typed scripts");
        Ok(Artifact {
            path: ctx.spec.target_path.clone(),
            bytes,
        })
    }
}
