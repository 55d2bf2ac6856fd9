//! Project-to-graph emission.
//!
//! Validates the registry globally (dependency resolvability, acyclicity)
//! and then synthesises the rule templates and build edges. Emission follows
//! registry iteration order; product paths were computed at registry-build
//! time, so a target may be emitted before or after a target that links
//! against it without affecting correctness. Ordering at build time is the
//! executor's job, which resolves edges by declared inputs.

use camino::Utf8Path;
use itertools::Itertools;

use crate::registry::{Layout, ResolvedTarget, TargetRegistry};
use crate::settings::ResolvedSettings;
use crate::sources::ResolvedSources;

use super::{
    cycle::{self, DependencyReport},
    graph::{BuildEdge, BuildGraph, BuildRule, GraphError, RuleKind},
};

/// Placeholder expanded to the primary descriptor's directory inside
/// path-valued settings.
pub const SRCROOT_PLACEHOLDER: &str = "${SRCROOT}";

impl BuildGraph {
    /// Compile the registry into a build graph.
    ///
    /// `settings` is the resolved project-level mapping used to parameterise
    /// the rule templates; `srcroot` is the primary descriptor's directory.
    ///
    /// # Errors
    ///
    /// Returns a [`GraphError`] for dangling dependency references,
    /// dependency cycles, or a target with no compilable sources.
    pub fn from_project(
        registry: &TargetRegistry,
        settings: &ResolvedSettings,
        layout: &Layout,
        srcroot: &Utf8Path,
    ) -> Result<Self, GraphError> {
        let DependencyReport { cycle, missing } = cycle::analyse(registry);
        if let Some((target, dependency)) = missing.into_iter().next() {
            return Err(GraphError::UnknownDependency { target, dependency });
        }
        if let Some(cycle) = cycle {
            return Err(GraphError::CircularDependency { cycle });
        }

        let mut graph = Self {
            rules: rule_templates(settings),
            edges: Vec::new(),
        };
        for target in registry.iter() {
            emit_target(&mut graph.edges, target, registry, settings, layout, srcroot)?;
        }
        Ok(graph)
    }
}

/// Synthesise the three fixed rule templates from the project settings.
fn rule_templates(settings: &ResolvedSettings) -> Vec<BuildRule> {
    let mut compile = String::from("g++ -c -MD -MF $out.d");
    if let Some(std) = settings.string("CLANG_CXX_LANGUAGE_STANDARD") {
        compile.push_str(" -std=");
        compile.push_str(std);
    }
    if settings.flag("GCC_WARN_PEDANTIC") {
        compile.push_str(" -pedantic");
    }
    if settings.flag("GCC_TREAT_WARNINGS_AS_ERRORS") {
        compile.push_str(" -Werror");
    }
    compile.push_str(" $flags -o $out $in");
    vec![
        BuildRule {
            kind: RuleKind::CompileCpp,
            command: compile,
            depfile: Some("$out.d".to_owned()),
        },
        BuildRule {
            kind: RuleKind::Archive,
            command: "ar rcs $out $in".to_owned(),
            depfile: None,
        },
        BuildRule {
            kind: RuleKind::Link,
            command: "g++ -o $out $in $flags".to_owned(),
            depfile: None,
        },
    ]
}

fn emit_target(
    edges: &mut Vec<BuildEdge>,
    target: &ResolvedTarget,
    registry: &TargetRegistry,
    settings: &ResolvedSettings,
    layout: &Layout,
    srcroot: &Utf8Path,
) -> Result<(), GraphError> {
    let sources = ResolvedSources::resolve(target)?;
    let intermediate_dir = layout.intermediate_dir(&target.name);
    let objects = sources.object_paths(&intermediate_dir);
    let target_settings =
        ResolvedSettings::from_map(target.settings.clone(), settings.platform());

    let compile_flags = compile_flags(&target_settings, srcroot);
    for (source, object) in sources.files.iter().zip(&objects) {
        edges.push(BuildEdge {
            output: object.clone(),
            rule: RuleKind::CompileCpp,
            inputs: vec![source.clone()],
            flags: compile_flags.clone(),
        });
    }

    let aggregate = match target.kind {
        crate::ast::TargetKind::StaticLibrary => BuildEdge {
            output: target.product_path.clone(),
            rule: RuleKind::Archive,
            inputs: objects,
            flags: None,
        },
        crate::ast::TargetKind::Tool => {
            let mut inputs = objects;
            for dep in &target.dependencies {
                if !dep.link {
                    continue;
                }
                let product = registry.get(&dep.target).map(|t| t.product_path.clone());
                inputs.push(product.ok_or_else(|| GraphError::UnknownDependency {
                    target: target.name.clone(),
                    dependency: dep.target.clone(),
                })?);
            }
            BuildEdge {
                output: target.product_path.clone(),
                rule: RuleKind::Link,
                inputs,
                flags: linker_flags(&target_settings, srcroot),
            }
        }
    };
    edges.push(aggregate);
    Ok(())
}

/// Per-target compiler flags: system and user header search paths, each
/// individually quoted, with `${SRCROOT}` expanded.
fn compile_flags(settings: &ResolvedSettings, srcroot: &Utf8Path) -> Option<String> {
    let system = settings
        .paths("SYSTEM_HEADER_SEARCH_PATHS")
        .into_iter()
        .map(|p| format!("-isystem \"{}\"", expand_srcroot(&p, srcroot)));
    let user = settings
        .paths("HEADER_SEARCH_PATHS")
        .into_iter()
        .map(|p| format!("-I \"{}\"", expand_srcroot(&p, srcroot)));
    non_empty(system.chain(user).join(" "))
}

/// Per-target linker flags: library search paths plus any extra flags.
fn linker_flags(settings: &ResolvedSettings, srcroot: &Utf8Path) -> Option<String> {
    let libraries = settings
        .paths("LIBRARY_SEARCH_PATHS")
        .into_iter()
        .map(|p| format!("-L \"{}\"", expand_srcroot(&p, srcroot)));
    let extra = settings
        .string("OTHER_LDFLAGS")
        .map(str::to_owned)
        .into_iter();
    non_empty(libraries.chain(extra).join(" "))
}

fn expand_srcroot(path: &str, srcroot: &Utf8Path) -> String {
    path.replace(SRCROOT_PLACEHOLDER, srcroot.as_str())
}

fn non_empty(flags: String) -> Option<String> {
    if flags.is_empty() {
        None
    } else {
        Some(flags)
    }
}
