// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::model::{BuildConfig, RawConfigFile};
use crate::errors::Result;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "Sitepipe.toml";

/// Load a configuration file and return the raw, unvalidated model.
///
/// `root` is set to the directory that contains the file. Use
/// [`load_and_validate`] to get a usable [`BuildConfig`].
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let mut config: RawConfigFile = toml::from_str(&contents)?;
    config.root = config_root_dir(path);

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<BuildConfig> {
    let raw_config = load_from_path(&path)?;
    let config = BuildConfig::try_from(raw_config)?;
    Ok(config)
}

/// Resolve the configuration used by the CLI.
///
/// - An explicit path must exist.
/// - Without one, `Sitepipe.toml` in the working directory is used if it
///   exists, otherwise the built-in defaults rooted at the working directory.
pub fn load_or_default(explicit: Option<&Path>) -> Result<BuildConfig> {
    if let Some(path) = explicit {
        info!(config = ?path, "loading config");
        return load_and_validate(path);
    }

    let default_path = PathBuf::from(DEFAULT_CONFIG_FILE);
    if default_path.is_file() {
        info!(config = ?default_path, "loading config");
        return load_and_validate(&default_path);
    }

    debug!("no {DEFAULT_CONFIG_FILE} found; using built-in defaults");
    let raw = RawConfigFile {
        root: current_dir(),
        ..RawConfigFile::default()
    };
    BuildConfig::try_from(raw)
}

/// Figure out the project root for a config path.
///
/// - A config path with a non-empty parent (e.g. "site/Sitepipe.toml") uses
///   that directory, made absolute against the working directory.
/// - A bare file name ("Sitepipe.toml") falls back to the working directory.
pub fn config_root_dir(config_path: &Path) -> PathBuf {
    match config_path.parent() {
        Some(parent) if parent.is_absolute() => parent.to_path_buf(),
        Some(parent) if !parent.as_os_str().is_empty() => current_dir().join(parent),
        _ => current_dir(),
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
