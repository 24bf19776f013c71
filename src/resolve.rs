// src/resolve.rs

//! Source set resolution: configured patterns → concrete, ordered file lists.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};
use tracing::{debug, trace};

use crate::config::BuildConfig;
use crate::fs::FileSystem;
use crate::types::{AssetClass, TaskId};

/// Compiled include/exclude patterns owned by one task.
///
/// Patterns are relative to the project root and matched against
/// `/`-separated relative paths. `*` stays within one directory, `**`
/// crosses directories.
#[derive(Clone)]
pub struct SourcePatternSet {
    task: TaskId,
    patterns: Vec<String>,
    include: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for SourcePatternSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourcePatternSet")
            .field("task", &self.task)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

impl SourcePatternSet {
    pub fn new(task: TaskId, patterns: Vec<String>, excludes: &[String]) -> Result<Self> {
        let patterns: Vec<String> = patterns.iter().map(|p| normalize_pattern(p)).collect();
        let include = build_globset(&patterns)
            .with_context(|| format!("building source globset for {task}"))?;
        let exclude = if excludes.is_empty() {
            None
        } else {
            Some(
                build_globset(excludes)
                    .with_context(|| format!("building exclude globset for {task}"))?,
            )
        };
        Ok(Self {
            task,
            patterns,
            include,
            exclude,
        })
    }

    /// The configured pattern set for a task.
    ///
    /// The dependency task watches and reads the manifest, the HTML task the
    /// template; both are literal paths.
    pub fn for_task(cfg: &BuildConfig, task: TaskId) -> Result<Self> {
        let patterns = match task {
            TaskId::Asset(AssetClass::UiModule) => cfg.sources.ui_module.clone(),
            TaskId::Asset(AssetClass::TypedScript) => cfg.sources.typed_script.clone(),
            TaskId::Asset(AssetClass::Stylesheet) => cfg.sources.stylesheet.clone(),
            TaskId::Asset(AssetClass::Dependencies) => vec![path_pattern(&cfg.paths.manifest)],
            TaskId::Html => vec![path_pattern(&cfg.paths.template)],
        };
        Self::new(task, patterns, &cfg.sources.exclude)
    }

    pub fn task(&self) -> TaskId {
        self.task
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }

    /// True if the root-relative path `rel_path` belongs to this set.
    pub fn matches(&self, rel_path: &str) -> bool {
        if !self.include.is_match(rel_path) {
            return false;
        }
        match &self.exclude {
            Some(exclude) => !exclude.is_match(rel_path),
            None => true,
        }
    }

    /// Directories (or single files) the resolver has to look at, relative
    /// to the root. Derived from each pattern's leading literal components.
    fn walk_bases(&self) -> BTreeSet<PathBuf> {
        self.patterns.iter().map(|p| literal_base(p)).collect()
    }
}

/// Concrete files matching a [`SourcePatternSet`] at one point in time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedFileSet {
    pub task: TaskId,
    /// Absolute paths, deduplicated, lexicographically sorted.
    pub files: Vec<PathBuf>,
}

impl ResolvedFileSet {
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Path> {
        self.files.iter().map(PathBuf::as_path)
    }
}

/// Expand `set` against the filesystem below `root`.
///
/// Never fails on an empty match; whether that is acceptable is up to the
/// consumer.
pub fn resolve(fs: &dyn FileSystem, root: &Path, set: &SourcePatternSet) -> Result<ResolvedFileSet> {
    let mut found: BTreeSet<PathBuf> = BTreeSet::new();
    let mut visited: HashSet<PathBuf> = HashSet::new();

    for base in set.walk_bases() {
        let start = if base.as_os_str().is_empty() {
            root.to_path_buf()
        } else {
            root.join(&base)
        };
        if fs.is_file(&start) {
            consider(root, start, set, &mut found);
            continue;
        }
        if !fs.is_dir(&start) {
            trace!(task = %set.task, base = ?start, "walk base does not exist");
            continue;
        }

        let mut stack = vec![start];
        while let Some(dir) = stack.pop() {
            // Symlinked directories can point back up the tree.
            let canonical = fs.canonicalize(&dir)?;
            if !visited.insert(canonical) {
                trace!(task = %set.task, dir = ?dir, "directory already walked");
                continue;
            }
            for path in fs.read_dir(&dir)? {
                if fs.is_dir(&path) {
                    stack.push(path);
                } else if fs.is_file(&path) {
                    consider(root, path, set, &mut found);
                }
            }
        }
    }

    debug!(task = %set.task, files = found.len(), "resolved source set");
    Ok(ResolvedFileSet {
        task: set.task,
        files: found.into_iter().collect(),
    })
}

fn consider(root: &Path, path: PathBuf, set: &SourcePatternSet, found: &mut BTreeSet<PathBuf>) {
    if let Some(rel) = relative_str(root, &path) {
        if set.matches(&rel) {
            found.insert(path);
        }
    }
}

/// `path` relative to `root`, with forward slashes.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    path.strip_prefix(root)
        .ok()
        .map(|rel| rel.to_string_lossy().replace('\\', "/"))
}

/// Build a [`GlobSet`] where `*` does not match `/`.
pub fn build_globset(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns {
        let glob = GlobBuilder::new(&normalize_pattern(pat))
            .literal_separator(true)
            .build()
            .with_context(|| format!("invalid glob pattern: {pat}"))?;
        builder.add(glob);
    }
    Ok(builder.build()?)
}

fn normalize_pattern(pattern: &str) -> String {
    let p = pattern.replace('\\', "/");
    p.strip_prefix("./").map(str::to_string).unwrap_or(p)
}

fn path_pattern(path: &Path) -> String {
    normalize_pattern(&path.to_string_lossy())
}

/// Leading components of `pattern` that contain no glob metacharacters.
///
/// `src/main/**/*.elm` → `src/main`, `**/*.ts` → ``, `bower.json` →
/// `bower.json`.
fn literal_base(pattern: &str) -> PathBuf {
    let mut base = PathBuf::new();
    for component in pattern.split('/') {
        if component.contains(['*', '?', '[', '{']) {
            break;
        }
        if !component.is_empty() {
            base.push(component);
        }
    }
    base
}
