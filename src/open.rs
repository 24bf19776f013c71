// src/open.rs

//! `open-site`: show the built site HTML in a viewer.

use std::path::Path;
use std::process::{Command, Stdio};

use anyhow::Context;
use tracing::info;

use crate::config::BuildConfig;
use crate::errors::{BuildError, Result};
use crate::fs::FileSystem;

/// Program and arguments that open `site` in a viewer.
///
/// Precedence: the `--viewer` override, then `[toolchain].viewer`, then the
/// platform opener.
pub fn viewer_command(cfg: &BuildConfig, viewer: Option<&str>, site: &Path) -> (String, Vec<String>) {
    let site = site.to_string_lossy().into_owned();

    if let Some(program) = viewer.map(str::trim).filter(|p| !p.is_empty()) {
        return (program.to_string(), vec![site]);
    }

    if let Some((program, args)) = cfg.toolchain.viewer.split_first() {
        let mut args = args.to_vec();
        args.push(site);
        return (program.clone(), args);
    }

    if cfg!(target_os = "macos") {
        ("open".to_string(), vec![site])
    } else if cfg!(windows) {
        (
            "cmd".to_string(),
            vec!["/C".to_string(), "start".to_string(), String::new(), site],
        )
    } else {
        ("xdg-open".to_string(), vec![site])
    }
}

/// Open the site HTML. Builds nothing; the file must already exist.
pub fn open_site(cfg: &BuildConfig, fs: &dyn FileSystem, viewer: Option<&str>) -> Result<()> {
    let site = cfg.site_output_path();
    if !fs.is_file(&site) {
        return Err(BuildError::BuildFailed(format!(
            "site HTML {:?} does not exist; run `sitepipe build` first",
            site
        )));
    }

    let (program, args) = viewer_command(cfg, viewer, &site);
    info!(program = %program, site = ?site, "opening site");

    // The viewer outlives us; do not wait for it.
    Command::new(&program)
        .args(&args)
        .stdin(Stdio::null())
        .spawn()
        .with_context(|| format!("starting viewer `{program}`"))?;
    Ok(())
}
