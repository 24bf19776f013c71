// src/compile/mod.rs

//! Compiler adapters.
//!
//! Each adapter turns one [`ResolvedFileSet`] into exactly one [`Artifact`]
//! held in memory. Nothing is written here: the owning task writes the
//! artifact only when the adapter succeeded, so a failing compile never
//! leaves a partial file behind.
//!
//! - [`ui_module`]: Elm sources, one program unit.
//! - [`typed_script`]: TypeScript sources, one compiler invocation.
//! - [`stylesheet`]: Less sources, compiled per file and concatenated.
//! - [`dependencies`]: Bower manifest, entry scripts concatenated natively.
//! - [`toolchain`]: how external compilers are invoked.

pub mod dependencies;
pub mod stylesheet;
pub mod toolchain;
pub mod typed_script;
pub mod ui_module;

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::PathBuf;

use crate::config::BuildConfig;
use crate::errors::Result;
use crate::fs::FileSystem;
use crate::registry::ArtifactSpec;
use crate::resolve::ResolvedFileSet;
use crate::types::AssetClass;

pub use dependencies::DependencyConcatenator;
pub use stylesheet::StylesheetCompiler;
pub use toolchain::{Invocation, ProcessToolchain, Toolchain};
pub use typed_script::TypedScriptCompiler;
pub use ui_module::UiModuleCompiler;

/// Output of one task run: destination plus complete content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: PathBuf,
    pub bytes: Vec<u8>,
}

/// Everything an adapter may use. Borrowed for the duration of one compile.
#[derive(Clone, Copy)]
pub struct CompileContext<'a> {
    pub config: &'a BuildConfig,
    pub fs: &'a dyn FileSystem,
    pub toolchain: &'a dyn Toolchain,
    pub spec: &'a ArtifactSpec,
}

/// One compiler backend.
pub trait CompilerAdapter: Send + Sync + Debug {
    fn class(&self) -> AssetClass;

    /// Compile `files` into the artifact described by `ctx.spec`.
    ///
    /// Must be deterministic: unchanged inputs give byte-identical output.
    fn compile(&self, ctx: &CompileContext<'_>, files: &ResolvedFileSet) -> Result<Artifact>;
}

/// Static mapping from asset class to adapter, assembled once.
#[derive(Debug)]
pub struct AdapterRegistry {
    adapters: BTreeMap<AssetClass, Box<dyn CompilerAdapter>>,
}

impl AdapterRegistry {
    /// The four production adapters.
    pub fn standard() -> Self {
        let adapters: Vec<Box<dyn CompilerAdapter>> = vec![
            Box::new(UiModuleCompiler),
            Box::new(DependencyConcatenator),
            Box::new(TypedScriptCompiler),
            Box::new(StylesheetCompiler),
        ];
        Self {
            adapters: adapters.into_iter().map(|a| (a.class(), a)).collect(),
        }
    }

    /// Replace the adapter for one class (tests, alternative backends).
    pub fn with_adapter(mut self, adapter: Box<dyn CompilerAdapter>) -> Self {
        self.adapters.insert(adapter.class(), adapter);
        self
    }

    pub fn get(&self, class: AssetClass) -> Option<&dyn CompilerAdapter> {
        self.adapters.get(&class).map(|a| a.as_ref())
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::standard()
    }
}
