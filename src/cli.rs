//! Command line interface definition using clap.

use camino::Utf8PathBuf;
use clap::Parser;

/// Compile a declarative project descriptor into a Ninja build file.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to the project descriptor.
    #[arg(value_name = "FILE", default_value = "project.yml")]
    pub project: Utf8PathBuf,

    /// Build configuration whose settings overrides apply.
    #[arg(short, long, value_name = "NAME", default_value = "Release")]
    pub config: String,

    /// Where to write the generated build file.
    #[arg(short, long, value_name = "FILE", default_value = "build.ninja")]
    pub output: Utf8PathBuf,

    /// Treat cross-descriptor target-name collisions as errors instead of
    /// warnings.
    #[arg(long)]
    pub strict: bool,

    /// Enable verbose logging output.
    #[arg(short, long)]
    pub verbose: bool,
}
