//! Project descriptor data model.
//!
//! This module defines the structures deserialised from a `project.yml`
//! descriptor and its included descriptor files. They mirror the YAML schema
//! and are deserialised with `serde_yml`.
//!
//! ```rust
//! use ninjagen::ast::{RawTargetSpec, TargetKind};
//!
//! let yaml = "kind: tool\nsources:\n  - path: main.cpp";
//! let spec: RawTargetSpec = serde_yml::from_str(yaml).expect("parse");
//! assert_eq!(spec.kind, TargetKind::Tool);
//! ```

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use serde::{de::Deserializer, Deserialize};
use serde_yml::Value;

/// Map type for settings blocks, preserving declaration order and loosely
/// typed YAML values.
pub type SettingsMap = IndexMap<String, Value>;

/// The kind of artefact a target produces.
///
/// The set is closed: product-path computation and aggregate-edge selection
/// match on it exhaustively, so adding a kind is a compile-time-enforced
/// change site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub enum TargetKind {
    /// A static library, archived with `ar` into `lib<name>.a`.
    #[serde(rename = "library.static")]
    StaticLibrary,
    /// An executable, produced by the link rule as `<name>`.
    #[serde(rename = "tool")]
    Tool,
}

/// One entry in a target's `sources` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SourceEntry {
    /// File path, relative to the declaring descriptor's directory unless
    /// absolute.
    pub path: Utf8PathBuf,
    /// Marks the entry as excluded from the build.
    #[serde(default, deserialize_with = "loose_bool")]
    pub excluded: bool,
}

/// A declared dependency on another target.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Dependency {
    /// Name of the referenced target.
    pub target: String,
    /// Whether the referenced target's product feeds the link step.
    #[serde(default, deserialize_with = "loose_bool")]
    pub link: bool,
}

/// A raw target record as declared in a descriptor file.
///
/// The record is immutable once deserialised; resolution stages produce new
/// types rather than widening this one.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawTargetSpec {
    /// Artefact kind tag.
    #[serde(alias = "type")]
    pub kind: TargetKind,
    /// Ordered source entries.
    #[serde(default)]
    pub sources: Vec<SourceEntry>,
    /// Target-scoped settings overriding nothing; consulted for header and
    /// library search paths and extra linker flags.
    #[serde(default)]
    pub settings: SettingsMap,
    /// Ordered references to other targets.
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
}

/// The project-level `settings` block: a `base` mapping plus per-configuration
/// override mappings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SettingsBlock {
    /// Settings applied for every configuration.
    #[serde(default)]
    pub base: SettingsMap,
    /// Per-configuration overrides, keyed by configuration name.
    #[serde(default)]
    pub configs: IndexMap<String, SettingsMap>,
}

/// Coerce a loosely typed YAML value to a boolean.
///
/// A native boolean passes through. Any other value whose lowercased string
/// form is one of `true`, `yes`, or `1` becomes `true`; everything else,
/// absent keys included, becomes `false`. Applied only to flag-valued keys,
/// never to string-valued settings.
#[must_use]
pub fn coerce_bool(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::String(s) => matches!(s.to_lowercase().as_str(), "true" | "yes" | "1"),
        Value::Number(n) => n.to_string() == "1",
        _ => false,
    }
}

fn loose_bool<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(coerce_bool(&value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("true", true)]
    #[case("\"Yes\"", true)]
    #[case("\"1\"", true)]
    #[case("1", true)]
    #[case("false", false)]
    #[case("\"no\"", false)]
    #[case("\"\"", false)]
    #[case("0", false)]
    #[case("[]", false)]
    fn coerce_bool_table(#[case] yaml: &str, #[case] expected: bool) {
        let value: Value = serde_yml::from_str(yaml).expect("parse");
        assert_eq!(coerce_bool(&value), expected);
    }

    #[rstest]
    fn unknown_kind_is_rejected() {
        let err = serde_yml::from_str::<RawTargetSpec>("kind: framework")
            .expect_err("unknown kind must fail");
        assert!(err.to_string().contains("framework"));
    }

    #[rstest]
    fn kind_accepts_legacy_type_key() {
        let spec: RawTargetSpec =
            serde_yml::from_str("type: library.static").expect("parse");
        assert_eq!(spec.kind, TargetKind::StaticLibrary);
    }

    #[rstest]
    fn dependency_link_flag_is_coerced() {
        let dep: Dependency =
            serde_yml::from_str("target: core\nlink: yes").expect("parse");
        assert!(dep.link);
        let dep: Dependency = serde_yml::from_str("target: core").expect("parse");
        assert!(!dep.link);
    }
}
