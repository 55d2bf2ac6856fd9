//! CLI execution logic.
//!
//! Keeps [`main`](crate) minimal by providing a single entry point that runs
//! the whole pipeline: load descriptors, build the registry, resolve
//! settings, compile the build graph, render it, and write the output file
//! atomically. Every stage fails the run before anything is written, so a
//! broken descriptor never leaves a truncated build file behind.

use anyhow::{Context, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::io::Write;
use tracing::{debug, info};

use crate::cli::Cli;
use crate::descriptor;
use crate::ir::BuildGraph;
use crate::ninja_gen;
use crate::registry::{CollisionPolicy, Layout, TargetRegistry};
use crate::settings::{Platform, ResolvedSettings};

/// Execute the parsed [`Cli`].
///
/// # Errors
///
/// Returns an error if any descriptor is unreadable or malformed, the target
/// set fails validation, or the output file cannot be written.
pub fn run(cli: &Cli) -> Result<()> {
    let cwd = Utf8PathBuf::from_path_buf(std::env::current_dir().context("working directory")?)
        .map_err(|p| anyhow::anyhow!("working directory {} is not UTF-8", p.display()))?;
    let primary = descriptor::resolve_against(&cwd, &cli.project);
    let ninja = generate_ninja(cli, &primary, &cwd)?;
    write_atomic(&cli.output, &ninja)
        .with_context(|| format!("writing build file {}", cli.output))?;
    info!("generated build file at {}", cli.output);
    Ok(())
}

/// Run every stage up to rendering, returning the Ninja text.
fn generate_ninja(cli: &Cli, primary: &Utf8Path, cwd: &Utf8Path) -> Result<String> {
    let descriptors = descriptor::load_project(primary)
        .with_context(|| format!("loading project descriptor {primary}"))?;
    debug!(
        files = descriptors.len(),
        config = %cli.config,
        "descriptors loaded",
    );

    let layout = Layout::new(cwd, cli.config.clone());
    let policy = if cli.strict {
        CollisionPolicy::Reject
    } else {
        CollisionPolicy::Warn
    };
    let registry = TargetRegistry::build(&descriptors, &layout, policy)
        .context("building target registry")?;

    // Rule parameterisation uses the primary descriptor's settings block;
    // included descriptors contribute targets only.
    let settings = descriptors
        .first()
        .map(|d| ResolvedSettings::resolve(&d.settings, &cli.config, Platform::host()))
        .context("no descriptor loaded")?;
    let srcroot = descriptors
        .first()
        .map(|d| d.dir.clone())
        .context("no descriptor loaded")?;

    let graph = BuildGraph::from_project(&registry, &settings, &layout, &srcroot)
        .context("compiling build graph")?;
    debug!(edges = graph.edges.len(), "build graph compiled");
    Ok(ninja_gen::generate(&graph))
}

/// Write `content` to `path` via a temporary file in the same directory,
/// renamed into place once fully written.
fn write_atomic(path: &Utf8Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent.to_owned(),
        _ => Utf8PathBuf::from("."),
    };
    let mut tmp = tempfile::Builder::new()
        .prefix(".ninjagen.")
        .suffix(".tmp")
        .tempfile_in(&dir)
        .context("create temporary file")?;
    tmp.write_all(content.as_bytes())
        .context("write temporary file")?;
    tmp.persist(path).context("rename into place")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_atomic_replaces_existing_content() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let dir = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf-8");
        let path = dir.join("build.ninja");
        std::fs::write(&path, "old").expect("seed");

        write_atomic(&path, "new contents\n").expect("write");
        assert_eq!(
            std::fs::read_to_string(&path).expect("read"),
            "new contents\n",
        );
    }

    #[test]
    fn write_atomic_handles_bare_filename() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let old = std::env::current_dir().expect("cwd");
        std::env::set_current_dir(tmp.path()).expect("chdir");
        let result = write_atomic(Utf8Path::new("build.ninja"), "x\n");
        std::env::set_current_dir(old).expect("chdir back");
        result.expect("write");
    }
}
