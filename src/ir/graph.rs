//! Build-graph structures.

use camino::Utf8PathBuf;
use thiserror::Error;

use crate::sources::SourceError;

/// The closed set of rule templates the emitter produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleKind {
    /// Compile one source file into an object file.
    CompileCpp,
    /// Archive object files into a static library.
    Archive,
    /// Link objects and library products into an executable.
    Link,
}

impl RuleKind {
    /// Rule name as written to the build file.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::CompileCpp => "compile_cpp",
            Self::Archive => "archive",
            Self::Link => "link",
        }
    }
}

/// A rule template: a name plus a command line with `$in`/`$out`/`$flags`
/// placeholders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRule {
    /// Which rule this is.
    pub kind: RuleKind,
    /// Command template.
    pub command: String,
    /// Optional depfile declaration.
    pub depfile: Option<String>,
}

/// One production step: an output, the rule producing it, and its ordered
/// inputs. Consumed by the generator and not retained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildEdge {
    /// Output path.
    pub output: Utf8PathBuf,
    /// Rule producing the output.
    pub rule: RuleKind,
    /// Ordered input paths.
    pub inputs: Vec<Utf8PathBuf>,
    /// Extra per-edge flags, substituted for `$flags`.
    pub flags: Option<String>,
}

/// The complete in-memory build graph: rule templates plus edges in emission
/// order. Built once, validated, then rendered.
#[derive(Debug, Default)]
pub struct BuildGraph {
    /// The fixed rule templates.
    pub rules: Vec<BuildRule>,
    /// Build edges in registry iteration order.
    pub edges: Vec<BuildEdge>,
}

/// Errors raised while constructing the build graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// A target references a dependency name that is not in the registry.
    #[error("target '{target}' depends on unknown target '{dependency}'")]
    UnknownDependency {
        /// The depending target.
        target: String,
        /// The dangling name.
        dependency: String,
    },
    /// The dependency relation among targets contains a cycle.
    #[error("dependency cycle among targets: {}", cycle.join(" -> "))]
    CircularDependency {
        /// Cycle members, first repeated at the end.
        cycle: Vec<String>,
    },
    /// A target's source list resolved to nothing compilable.
    #[error(transparent)]
    Source(#[from] SourceError),
}
