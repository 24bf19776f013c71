// src/compile/dependencies.rs

//! Bower dependency concatenation.
//!
//! The manifest's `dependencies` object names the packages, in declared
//! order. Each package is looked up as a directory under the dependency
//! directory; its own metadata (`.bower.json`, then `bower.json`) supplies
//! transitive dependencies and entry scripts. Transitive dependencies are
//! emitted before the package that needs them and every package at most
//! once.

use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};

use anyhow::Context;
use serde_json::{Map, Value};
use tracing::{debug, trace};

use super::{Artifact, CompileContext, CompilerAdapter};
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;
use crate::resolve::ResolvedFileSet;
use crate::types::{AssetClass, TaskId};

const PACKAGE_METADATA: [&str; 2] = [".bower.json", "bower.json"];

#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyConcatenator;

impl CompilerAdapter for DependencyConcatenator {
    fn class(&self) -> AssetClass {
        AssetClass::Dependencies
    }

    fn compile(&self, ctx: &CompileContext<'_>, files: &ResolvedFileSet) -> Result<Artifact> {
        let Some(manifest_path) = files.iter().next() else {
            return Err(BuildError::Resolution {
                task: TaskId::Asset(AssetClass::Dependencies),
                patterns: vec![ctx.config.paths.manifest.to_string_lossy().into_owned()],
            });
        };

        let manifest = read_json(ctx.fs, manifest_path)?;
        let dep_dir = ctx.config.dependency_dir();

        let mut walk = Walk {
            ctx,
            dep_dir: &dep_dir,
            visited: HashSet::new(),
            scripts: Vec::new(),
        };
        for name in dependency_names(&manifest) {
            walk.visit(&name)?;
        }

        let separator = ctx.config.dependencies.separator.as_bytes();
        let mut bytes = Vec::new();
        for (i, script) in walk.scripts.iter().enumerate() {
            if i > 0 {
                bytes.extend_from_slice(separator);
            }
            let content = ctx
                .fs
                .read(script)
                .with_context(|| format!("reading dependency script {script:?}"))?;
            bytes.extend_from_slice(&content);
        }

        debug!(scripts = walk.scripts.len(), bytes = bytes.len(), "concatenated dependencies");
        Ok(Artifact {
            path: ctx.spec.target_path.clone(),
            bytes,
        })
    }
}

struct Walk<'a, 'c> {
    ctx: &'a CompileContext<'c>,
    dep_dir: &'a Path,
    visited: HashSet<String>,
    scripts: Vec<PathBuf>,
}

impl Walk<'_, '_> {
    fn visit(&mut self, name: &str) -> Result<()> {
        if !self.visited.insert(name.to_string()) {
            return Ok(());
        }
        if !is_package_name(name) {
            return Err(BuildError::compile(
                AssetClass::Dependencies,
                format!("invalid package name {name:?}"),
            ));
        }

        let package_dir = self.dep_dir.join(name);
        if !self.ctx.fs.is_dir(&package_dir) {
            return Err(BuildError::DependencyNotFound {
                package: name.to_string(),
                searched: self.dep_dir.to_path_buf(),
            });
        }

        let metadata = self.package_metadata(&package_dir)?;
        if let Some(meta) = &metadata {
            for dep in dependency_names(meta) {
                self.visit(&dep)?;
            }
        }

        let deps = &self.ctx.config.dependencies;
        if deps.exclude.iter().any(|e| e == name) {
            trace!(package = name, "excluded from concatenation");
            return Ok(());
        }

        let entries = match deps.main_files.get(name) {
            Some(files) => files.clone(),
            None => metadata
                .as_ref()
                .map(main_entries)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| vec![format!("{name}.js")]),
        };

        for entry in entries.iter().filter(|e| e.ends_with(".js")) {
            if !stays_inside(entry) {
                return Err(BuildError::compile(
                    AssetClass::Dependencies,
                    format!("package '{name}' entry {entry:?} points outside the package"),
                ));
            }
            let script = package_dir.join(entry.trim_start_matches("./"));
            if !self.ctx.fs.is_file(&script) {
                return Err(BuildError::compile(
                    AssetClass::Dependencies,
                    format!("package '{name}' declares entry script {entry:?}, which does not exist"),
                ));
            }
            trace!(package = name, script = ?script, "entry script");
            self.scripts.push(script);
        }
        Ok(())
    }

    fn package_metadata(&self, package_dir: &Path) -> Result<Option<Value>> {
        for file in PACKAGE_METADATA {
            let path = package_dir.join(file);
            if self.ctx.fs.is_file(&path) {
                return read_json(self.ctx.fs, &path).map(Some);
            }
        }
        Ok(None)
    }
}

/// A single directory name below the dependency directory.
fn is_package_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

fn stays_inside(entry: &str) -> bool {
    let path = Path::new(entry);
    !path.has_root()
        && path
            .components()
            .all(|c| !matches!(c, Component::ParentDir | Component::Prefix(_)))
}

fn read_json(fs: &dyn FileSystem, path: &Path) -> Result<Value> {
    let text = fs.read_to_string(path)?;
    serde_json::from_str(&text).map_err(|e| {
        BuildError::compile(AssetClass::Dependencies, format!("invalid JSON in {path:?}: {e}"))
    })
}

/// Keys of the `dependencies` object, in document order.
fn dependency_names(doc: &Value) -> Vec<String> {
    doc.get("dependencies")
        .and_then(Value::as_object)
        .map(Map::keys)
        .map(|keys| keys.cloned().collect())
        .unwrap_or_default()
}

/// `main` as a string or an array of strings.
fn main_entries(doc: &Value) -> Vec<String> {
    match doc.get("main") {
        Some(Value::String(s)) => vec![s.clone()],
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}
