// src/compile/stylesheet.rs

use tracing::{debug, trace};

use super::toolchain::Invocation;
use super::{Artifact, CompileContext, CompilerAdapter};
use crate::errors::{BuildError, Result};
use crate::resolve::ResolvedFileSet;
use crate::types::AssetClass;

/// Compiles each stylesheet source on its own (`lessc <file>` to stdout)
/// and concatenates the results in resolved order.
#[derive(Debug, Clone, Copy, Default)]
pub struct StylesheetCompiler;

impl CompilerAdapter for StylesheetCompiler {
    fn class(&self) -> AssetClass {
        AssetClass::Stylesheet
    }

    fn compile(&self, ctx: &CompileContext<'_>, files: &ResolvedFileSet) -> Result<Artifact> {
        let mut bytes = Vec::new();

        for file in files.iter() {
            let invocation = Invocation::from_argv(
                &ctx.config.toolchain.stylesheet,
                vec![file.to_string_lossy().into_owned()],
                ctx.config.root().to_path_buf(),
            );
            let css = ctx
                .toolchain
                .invoke(&invocation)
                .map_err(|failure| BuildError::compile(self.class(), failure.describe(&invocation)))?;
            trace!(file = ?file, bytes = css.len(), "compiled stylesheet");

            bytes.extend_from_slice(&css);
            if !css.is_empty() && !css.ends_with(b"\n") {
                bytes.push(b'\n');
            }
        }

        debug!(inputs = files.len(), bytes = bytes.len(), "compiled stylesheets");
        Ok(Artifact {
            path: ctx.spec.target_path.clone(),
            bytes,
        })
    }
}
