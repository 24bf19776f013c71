// src/logging.rs

//! Logging setup using `tracing` + `tracing-subscriber`.
//!
//! Level selection, first match wins:
//! 1. `--log-level` on the command line
//! 2. `SITEPIPE_LOG`, either a bare level ("debug") or a full filter
//!    directive ("sitepipe::watch=trace,info")
//! 3. `info`
//!
//! Everything goes to STDERR; stdout is reserved for dry-run plans and
//! compiler diagnostics the user asked for.

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, EnvFilter};

use crate::cli::LogLevel;

pub const LOG_ENV_VAR: &str = "SITEPIPE_LOG";

/// Install the global subscriber. Call once, before anything logs.
pub fn init_logging(cli_level: Option<LogLevel>) -> Result<()> {
    let filter = match cli_level {
        Some(lvl) => EnvFilter::new(level_directive(lvl)),
        None => match std::env::var(LOG_ENV_VAR) {
            Ok(raw) if !raw.trim().is_empty() => EnvFilter::try_new(raw.trim())
                .with_context(|| format!("invalid {LOG_ENV_VAR} filter: {raw}"))?,
            _ => EnvFilter::new("info"),
        },
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("installing tracing subscriber: {e}"))?;

    Ok(())
}

fn level_directive(lvl: LogLevel) -> &'static str {
    match lvl {
        LogLevel::Error => "error",
        LogLevel::Warn => "warn",
        LogLevel::Info => "info",
        LogLevel::Debug => "debug",
        LogLevel::Trace => "trace",
    }
}
