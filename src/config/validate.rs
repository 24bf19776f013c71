// src/config/validate.rs

use crate::config::model::{BuildConfig, RawConfigFile};
use crate::errors::{BuildError, Result};
use crate::inject::Selector;
use crate::registry::ArtifactRegistry;
use crate::resolve::build_globset;

impl TryFrom<RawConfigFile> for BuildConfig {
    type Error = BuildError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_sources(&raw)?;
        validate_toolchain(&raw)?;
        validate_paths(&raw)?;
        validate_watch(&raw)?;
        let selector = Selector::parse(&raw.inject.selector).map_err(BuildError::ConfigError)?;
        Ok(BuildConfig::new_unchecked(raw, selector))
    }
}

fn validate_sources(cfg: &RawConfigFile) -> Result<()> {
    let groups = [
        ("ui_module", &cfg.sources.ui_module),
        ("typed_script", &cfg.sources.typed_script),
        ("stylesheet", &cfg.sources.stylesheet),
    ];

    for (key, patterns) in groups {
        if patterns.is_empty() {
            return Err(BuildError::ConfigError(format!(
                "[sources].{key} must list at least one pattern"
            )));
        }
        check_globs(&format!("[sources].{key}"), patterns)?;
    }

    check_globs("[sources].exclude", &cfg.sources.exclude)
}

fn check_globs(what: &str, patterns: &[String]) -> Result<()> {
    build_globset(patterns)
        .map(|_| ())
        .map_err(|e| BuildError::ConfigError(format!("{what}: {e:#}")))
}

fn validate_toolchain(cfg: &RawConfigFile) -> Result<()> {
    let commands = [
        ("ui_module", &cfg.toolchain.ui_module),
        ("typed_script", &cfg.toolchain.typed_script),
        ("stylesheet", &cfg.toolchain.stylesheet),
    ];

    for (key, argv) in commands {
        match argv.first() {
            Some(program) if !program.trim().is_empty() => {}
            _ => {
                return Err(BuildError::ConfigError(format!(
                    "[toolchain].{key} must name a program"
                )));
            }
        }
    }
    Ok(())
}

fn validate_paths(cfg: &RawConfigFile) -> Result<()> {
    if cfg.paths.manifest.as_os_str().is_empty() {
        return Err(BuildError::ConfigError(
            "[paths].manifest must not be empty".to_string(),
        ));
    }

    // Both are also source patterns, which are always project-relative.
    for (key, path) in [("template", &cfg.paths.template), ("manifest", &cfg.paths.manifest)] {
        if path.has_root() {
            return Err(BuildError::ConfigError(format!(
                "[paths].{key} must be relative to the project root (got {path:?})"
            )));
        }
    }

    let site_name = match cfg.paths.template.file_name() {
        Some(name) => name.to_string_lossy().into_owned(),
        None => {
            return Err(BuildError::ConfigError(format!(
                "[paths].template has no file name: {:?}",
                cfg.paths.template
            )));
        }
    };

    // The site HTML shares the target directory with the artifacts.
    if ArtifactRegistry::basenames().any(|b| b == site_name) {
        return Err(BuildError::ConfigError(format!(
            "[paths].template file name '{site_name}' collides with an artifact name"
        )));
    }

    Ok(())
}

fn validate_watch(cfg: &RawConfigFile) -> Result<()> {
    if cfg.watch.queue_length == 0 {
        return Err(BuildError::ConfigError(
            "[watch].queue_length must be >= 1 (got 0)".to_string(),
        ));
    }
    Ok(())
}
