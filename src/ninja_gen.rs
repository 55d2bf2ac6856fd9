//! Ninja file generator.
//!
//! Renders a [`BuildGraph`] into the textual form expected by the Ninja
//! build executor: rule blocks first, then one `build` statement per edge in
//! graph order. Spaces in paths are escaped as `$ ` per Ninja syntax.

use std::fmt::{self, Display, Formatter, Write};

use camino::Utf8Path;
use itertools::Itertools;

use crate::ir::{BuildEdge, BuildGraph, BuildRule};

/// Render the build graph as Ninja text.
///
/// # Panics
///
/// Panics if formatting into the output string fails, which cannot happen
/// for in-memory writes.
#[must_use]
pub fn generate(graph: &BuildGraph) -> String {
    let mut out = String::new();
    for rule in &graph.rules {
        write!(out, "{}", DisplayRule(rule)).expect("write Ninja rule");
    }
    for edge in &graph.edges {
        write!(out, "{}", DisplayEdge(edge)).expect("write Ninja edge");
    }
    out
}

/// Escape a path for use in a `build` statement.
fn escape(path: &Utf8Path) -> String {
    path.as_str().replace(' ', "$ ")
}

struct DisplayRule<'a>(&'a BuildRule);

impl Display for DisplayRule<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        writeln!(f, "rule {}", self.0.kind.name())?;
        if let Some(depfile) = &self.0.depfile {
            writeln!(f, "  depfile = {depfile}")?;
        }
        writeln!(f, "  command = {}", self.0.command)?;
        writeln!(f)
    }
}

struct DisplayEdge<'a>(&'a BuildEdge);

impl Display for DisplayEdge<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "build {}: {}", escape(&self.0.output), self.0.rule.name())?;
        if !self.0.inputs.is_empty() {
            write!(f, " {}", self.0.inputs.iter().map(|p| escape(p)).join(" "))?;
        }
        writeln!(f)?;
        if let Some(flags) = &self.0.flags {
            writeln!(f, "  flags = {flags}")?;
        }
        Ok(())
    }
}
