// src/config/mod.rs

//! Configuration loading and validation.
//!
//! - [`model`]: the TOML-backed data model and the validated [`BuildConfig`].
//! - [`loader`]: reading a config file from disk.
//! - [`validate`]: turning a [`RawConfigFile`] into a [`BuildConfig`].

pub mod loader;
pub mod model;
pub mod validate;

pub use loader::{config_root_dir, load_and_validate, load_from_path, load_or_default, DEFAULT_CONFIG_FILE};
pub use model::{
    BuildConfig, DependenciesSection, InjectSection, PathsSection, RawConfigFile, SourcesSection,
    ToolchainSection, WatchSection,
};
