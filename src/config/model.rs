// src/config/model.rs

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::inject::Selector;

/// Top-level configuration as read from `Sitepipe.toml`.
///
/// ```toml
/// [paths]
/// target_dir = "target/site"
/// template = "src/site/index.html"
///
/// [sources]
/// ui_module = ["src/main/**/*.elm"]
///
/// [toolchain]
/// ui_module = ["elm", "make"]
/// ```
///
/// Every section is optional; the defaults describe the conventional
/// `src/main` (Elm) + `src/site` (TypeScript, Less, template) layout.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    /// Project root all relative paths are resolved against. Not read from
    /// TOML; the loader fills it from the config file location.
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub paths: PathsSection,

    #[serde(default)]
    pub sources: SourcesSection,

    #[serde(default)]
    pub inject: InjectSection,

    #[serde(default)]
    pub toolchain: ToolchainSection,

    #[serde(default)]
    pub dependencies: DependenciesSection,

    #[serde(default)]
    pub watch: WatchSection,
}

/// `[paths]` section. All entries are relative to the project root.
#[derive(Debug, Clone, Deserialize)]
pub struct PathsSection {
    /// Site output directory; every artifact lands directly inside it.
    #[serde(default = "default_target_dir")]
    pub target_dir: PathBuf,

    /// Template HTML document. The site HTML keeps its file name.
    #[serde(default = "default_template")]
    pub template: PathBuf,

    /// Bower manifest naming the browser dependencies.
    #[serde(default = "default_manifest")]
    pub manifest: PathBuf,

    /// Directory holding one sub-directory per installed dependency.
    #[serde(default = "default_dependency_dir")]
    pub dependency_dir: PathBuf,
}

fn default_target_dir() -> PathBuf {
    PathBuf::from("target/site")
}

fn default_template() -> PathBuf {
    PathBuf::from("src/site/index.html")
}

fn default_manifest() -> PathBuf {
    PathBuf::from("bower.json")
}

fn default_dependency_dir() -> PathBuf {
    PathBuf::from("bower_components")
}

impl Default for PathsSection {
    fn default() -> Self {
        Self {
            target_dir: default_target_dir(),
            template: default_template(),
            manifest: default_manifest(),
            dependency_dir: default_dependency_dir(),
        }
    }
}

/// `[sources]` section: glob patterns per glob-driven asset class.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesSection {
    #[serde(default = "default_ui_module_sources")]
    pub ui_module: Vec<String>,

    #[serde(default = "default_typed_script_sources")]
    pub typed_script: Vec<String>,

    #[serde(default = "default_stylesheet_sources")]
    pub stylesheet: Vec<String>,

    /// Patterns removed from every source set (and every watch binding).
    #[serde(default)]
    pub exclude: Vec<String>,
}

fn default_ui_module_sources() -> Vec<String> {
    vec!["src/main/**/*.elm".to_string()]
}

fn default_typed_script_sources() -> Vec<String> {
    vec!["src/site/**/*.ts".to_string()]
}

fn default_stylesheet_sources() -> Vec<String> {
    vec!["src/site/**/*.less".to_string()]
}

impl Default for SourcesSection {
    fn default() -> Self {
        Self {
            ui_module: default_ui_module_sources(),
            typed_script: default_typed_script_sources(),
            stylesheet: default_stylesheet_sources(),
            exclude: Vec::new(),
        }
    }
}

/// `[inject]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct InjectSection {
    /// Element the artifact references are appended to (`head`, `#id`,
    /// `tag#id`). Must match exactly once in the template.
    #[serde(default = "default_selector")]
    pub selector: String,
}

fn default_selector() -> String {
    "head".to_string()
}

impl Default for InjectSection {
    fn default() -> Self {
        Self {
            selector: default_selector(),
        }
    }
}

/// `[toolchain]` section: program + leading arguments for each compiler.
#[derive(Debug, Clone, Deserialize)]
pub struct ToolchainSection {
    #[serde(default = "default_ui_module_cmd")]
    pub ui_module: Vec<String>,

    #[serde(default = "default_typed_script_cmd")]
    pub typed_script: Vec<String>,

    #[serde(default = "default_stylesheet_cmd")]
    pub stylesheet: Vec<String>,

    /// Program used by `open-site`; empty means the platform opener.
    #[serde(default)]
    pub viewer: Vec<String>,
}

fn default_ui_module_cmd() -> Vec<String> {
    vec!["elm".to_string(), "make".to_string()]
}

fn default_typed_script_cmd() -> Vec<String> {
    vec!["tsc".to_string()]
}

fn default_stylesheet_cmd() -> Vec<String> {
    vec!["lessc".to_string()]
}

impl Default for ToolchainSection {
    fn default() -> Self {
        Self {
            ui_module: default_ui_module_cmd(),
            typed_script: default_typed_script_cmd(),
            stylesheet: default_stylesheet_cmd(),
            viewer: Vec::new(),
        }
    }
}

/// `[dependencies]` section: Bower concatenation overrides.
#[derive(Debug, Clone, Deserialize)]
pub struct DependenciesSection {
    /// Per-package entry scripts, relative to the package directory. Takes
    /// precedence over the package's own `main`.
    #[serde(default)]
    pub main_files: BTreeMap<String, Vec<String>>,

    /// Packages left out of the concatenation (their own dependencies are
    /// still included when something else needs them).
    #[serde(default)]
    pub exclude: Vec<String>,

    /// Text placed between two concatenated scripts.
    #[serde(default = "default_separator")]
    pub separator: String,
}

fn default_separator() -> String {
    "\n".to_string()
}

impl Default for DependenciesSection {
    fn default() -> Self {
        Self {
            main_files: BTreeMap::new(),
            exclude: Vec::new(),
            separator: default_separator(),
        }
    }
}

/// `[watch]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct WatchSection {
    /// Maximum number of follow-up runs remembered per task while it is
    /// still executing.
    #[serde(default = "default_queue_length")]
    pub queue_length: usize,

    /// Only rebuild when the content of the task's sources actually changed.
    #[serde(default)]
    pub use_hash: bool,
}

fn default_queue_length() -> usize {
    1
}

impl Default for WatchSection {
    fn default() -> Self {
        Self {
            queue_length: default_queue_length(),
            use_hash: false,
        }
    }
}

/// Validated, immutable build configuration.
///
/// Built once at startup (see [`crate::config::load_and_validate`]) and
/// shared behind an `Arc` by the orchestrator, every task and the watcher.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    root: PathBuf,
    pub paths: PathsSection,
    pub sources: SourcesSection,
    pub toolchain: ToolchainSection,
    pub dependencies: DependenciesSection,
    pub watch: WatchSection,
    selector: Selector,
}

impl BuildConfig {
    /// Internal constructor used after validation.
    pub(crate) fn new_unchecked(raw: RawConfigFile, selector: Selector) -> Self {
        Self {
            root: raw.root,
            paths: raw.paths,
            sources: raw.sources,
            toolchain: raw.toolchain,
            dependencies: raw.dependencies,
            watch: raw.watch,
            selector,
        }
    }

    /// Project root every relative path and pattern is evaluated against.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    pub fn target_dir(&self) -> PathBuf {
        self.root.join(&self.paths.target_dir)
    }

    pub fn template_path(&self) -> PathBuf {
        self.root.join(&self.paths.template)
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join(&self.paths.manifest)
    }

    pub fn dependency_dir(&self) -> PathBuf {
        self.root.join(&self.paths.dependency_dir)
    }

    /// File name of the site HTML (the template's file name).
    pub fn site_basename(&self) -> String {
        self.paths
            .template
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Where the final site HTML is written.
    pub fn site_output_path(&self) -> PathBuf {
        self.target_dir().join(self.site_basename())
    }
}
