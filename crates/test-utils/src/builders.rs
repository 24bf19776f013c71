#![allow(dead_code)]

use std::path::{Path, PathBuf};

use sitepipe::config::{BuildConfig, RawConfigFile};
use sitepipe::errors::Result;

/// Builder for `BuildConfig` to simplify test setup.
///
/// Starts from the built-in defaults rooted at `root`.
pub struct BuildConfigBuilder {
    config: RawConfigFile,
}

impl BuildConfigBuilder {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            config: RawConfigFile {
                root: root.into(),
                ..RawConfigFile::default()
            },
        }
    }

    pub fn target_dir(mut self, dir: &str) -> Self {
        self.config.paths.target_dir = PathBuf::from(dir);
        self
    }

    pub fn template(mut self, path: &str) -> Self {
        self.config.paths.template = PathBuf::from(path);
        self
    }

    pub fn manifest(mut self, path: &str) -> Self {
        self.config.paths.manifest = PathBuf::from(path);
        self
    }

    pub fn selector(mut self, selector: &str) -> Self {
        self.config.inject.selector = selector.to_string();
        self
    }

    pub fn ui_module_sources(mut self, patterns: &[&str]) -> Self {
        self.config.sources.ui_module = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn typed_script_sources(mut self, patterns: &[&str]) -> Self {
        self.config.sources.typed_script = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn stylesheet_sources(mut self, patterns: &[&str]) -> Self {
        self.config.sources.stylesheet = patterns.iter().map(|p| p.to_string()).collect();
        self
    }

    pub fn exclude(mut self, pattern: &str) -> Self {
        self.config.sources.exclude.push(pattern.to_string());
        self
    }

    pub fn main_files(mut self, package: &str, files: &[&str]) -> Self {
        self.config.dependencies.main_files.insert(
            package.to_string(),
            files.iter().map(|f| f.to_string()).collect(),
        );
        self
    }

    pub fn exclude_package(mut self, package: &str) -> Self {
        self.config.dependencies.exclude.push(package.to_string());
        self
    }

    pub fn separator(mut self, separator: &str) -> Self {
        self.config.dependencies.separator = separator.to_string();
        self
    }

    pub fn queue_length(mut self, len: usize) -> Self {
        self.config.watch.queue_length = len;
        self
    }

    pub fn use_hash(mut self, val: bool) -> Self {
        self.config.watch.use_hash = val;
        self
    }

    pub fn raw(self) -> RawConfigFile {
        self.config
    }

    pub fn try_build(self) -> Result<BuildConfig> {
        BuildConfig::try_from(self.config)
    }

    pub fn build(self) -> BuildConfig {
        self.try_build()
            .expect("Failed to build valid config from builder")
    }
}

/// Write `content` to `root/rel`, creating parent directories.
pub fn write_file(root: &Path, rel: &str, content: &str) -> PathBuf {
    let path = root.join(rel);
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).expect("create parent dirs");
    }
    std::fs::write(&path, content).expect("write fixture file");
    path
}
