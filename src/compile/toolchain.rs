// src/compile/toolchain.rs

//! External compiler invocation.
//!
//! Adapters describe what to run as an [`Invocation`]; a [`Toolchain`]
//! runs it. Production uses [`ProcessToolchain`] (a blocking child process;
//! the executor already runs tasks on the blocking pool). Tests substitute a
//! fake that never spawns anything.

use std::fmt::Debug;
use std::path::PathBuf;
use std::process::{Command, Stdio};

use anyhow::Context;
use tracing::{debug, info};

/// One compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub cwd: PathBuf,
}

impl Invocation {
    /// Build from a configured argv (`["elm", "make"]`) plus extra args.
    pub fn from_argv(argv: &[String], extra: Vec<String>, cwd: PathBuf) -> Self {
        let (program, leading) = match argv.split_first() {
            Some((program, rest)) => (program.clone(), rest.to_vec()),
            None => (String::new(), Vec::new()),
        };
        let mut args = leading;
        args.extend(extra);
        Self { program, args, cwd }
    }

    /// Shell-ish rendering for logs.
    pub fn display(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Why an invocation did not succeed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolFailure {
    /// The program could not be started at all.
    Spawn(String),
    /// The program ran and exited unsuccessfully.
    Exit { code: Option<i32>, stderr: String },
}

impl ToolFailure {
    /// Message suitable for a compile error.
    pub fn describe(&self, invocation: &Invocation) -> String {
        match self {
            ToolFailure::Spawn(err) => format!("could not run `{}`: {err}", invocation.program),
            ToolFailure::Exit { code, stderr } => {
                let code = code.map_or_else(|| "signal".to_string(), |c| c.to_string());
                let stderr = stderr.trim();
                if stderr.is_empty() {
                    format!("`{}` exited with {code}", invocation.display())
                } else {
                    format!("`{}` exited with {code}:\n{stderr}", invocation.display())
                }
            }
        }
    }
}

pub trait Toolchain: Send + Sync + Debug {
    /// Run `invocation` to completion and return its stdout on success.
    fn invoke(&self, invocation: &Invocation) -> std::result::Result<Vec<u8>, ToolFailure>;
}

/// Runs compilers as child processes.
#[derive(Debug, Clone, Default)]
pub struct ProcessToolchain;

impl Toolchain for ProcessToolchain {
    fn invoke(&self, invocation: &Invocation) -> std::result::Result<Vec<u8>, ToolFailure> {
        info!(cmd = %invocation.display(), "running compiler");

        let output = Command::new(&invocation.program)
            .args(&invocation.args)
            .current_dir(&invocation.cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .with_context(|| format!("spawning `{}`", invocation.program))
            .map_err(|e| ToolFailure::Spawn(format!("{e:#}")))?;

        let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
        for line in stderr.lines() {
            debug!(program = %invocation.program, "stderr: {}", line);
        }

        if output.status.success() {
            Ok(output.stdout)
        } else {
            // Some compilers (elm, tsc) report errors on stdout.
            let mut report = stderr;
            if report.trim().is_empty() {
                report = String::from_utf8_lossy(&output.stdout).into_owned();
            }
            Err(ToolFailure::Exit {
                code: output.status.code(),
                stderr: report,
            })
        }
    }
}
