// src/errors.rs

//! Crate-wide error type.
//!
//! Task-level failures (`Resolution`, `Compile`, `Injection`,
//! `DependencyNotFound`) always name the task or asset class they belong to,
//! so they can be reported per task without further context.

use std::path::PathBuf;

use thiserror::Error;

use crate::types::{AssetClass, TaskId};

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("[{task}] no files matched {patterns:?}")]
    Resolution { task: TaskId, patterns: Vec<String> },

    #[error("[{class}] compile failed: {message}")]
    Compile { class: AssetClass, message: String },

    #[error("[inject-html] {0}")]
    Injection(String),

    #[error("[dependencies] package '{package}' not found (looked in {searched:?})")]
    DependencyNotFound { package: String, searched: PathBuf },

    #[error("Build failed: {0}")]
    BuildFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl BuildError {
    pub(crate) fn compile(class: AssetClass, message: impl Into<String>) -> Self {
        BuildError::Compile {
            class,
            message: message.into(),
        }
    }
}

pub use anyhow::Error;
pub type Result<T> = std::result::Result<T, BuildError>;
