// src/cli.rs

//! CLI argument parsing using `clap`.

use clap::{Parser, Subcommand, ValueEnum};

use crate::types::{AssetClass, TaskId};

/// Command-line arguments for `sitepipe`.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "sitepipe",
    version,
    about = "Build an Elm + TypeScript + Less + Bower static site, or watch and rebuild it.",
    long_about = None
)]
pub struct CliArgs {
    /// Path to the config file (TOML).
    ///
    /// Default: `Sitepipe.toml` in the current working directory. When that
    /// file does not exist, built-in defaults are used.
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<String>,

    /// Logging level (error, warn, info, debug, trace).
    ///
    /// If omitted, `SITEPIPE_LOG` or `info` is used.
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Resolve sources and print the build plan without running anything.
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Full build: every artifact once, then the site HTML.
    Build,
    /// Full build, then rebuild individual artifacts on file changes.
    Watch,
    /// Compile the Elm sources into `elm.js`.
    CompileUiModule,
    /// Concatenate Bower dependencies into `bower_components.js`.
    ConcatenateDependencies,
    /// Compile the TypeScript sources into `scripts.js`.
    CompileTypedScript,
    /// Compile the Less sources into `stylesheets.css`.
    CompileStylesheets,
    /// Inject artifact references into the template and write the site HTML.
    InjectHtml,
    /// Open the built site HTML in a viewer.
    OpenSite {
        /// Program used to open the page instead of the platform default.
        #[arg(long, value_name = "PROGRAM")]
        viewer: Option<String>,
    },
}

impl Command {
    /// The single build task this command runs, for the per-task commands.
    pub fn single_task(&self) -> Option<TaskId> {
        match self {
            Command::CompileUiModule => Some(TaskId::Asset(AssetClass::UiModule)),
            Command::ConcatenateDependencies => Some(TaskId::Asset(AssetClass::Dependencies)),
            Command::CompileTypedScript => Some(TaskId::Asset(AssetClass::TypedScript)),
            Command::CompileStylesheets => Some(TaskId::Asset(AssetClass::Stylesheet)),
            Command::InjectHtml => Some(TaskId::Html),
            Command::Build | Command::Watch | Command::OpenSite { .. } => None,
        }
    }
}

/// Log level as exposed on the CLI.
#[derive(Debug, Copy, Clone, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// Convenience wrapper around `CliArgs::parse()`.
pub fn parse() -> CliArgs {
    CliArgs::parse()
}
