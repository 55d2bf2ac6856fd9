//! Settings resolution.
//!
//! Merges the project's layered settings (`base` plus the active
//! configuration's overrides) into one flat mapping and provides typed,
//! platform-aware lookups on it. Lookups honour shadow keys: on Linux the key
//! `_LINUX_FOO` overrides `FOO`, and likewise for the other platforms. The
//! same lookup rules apply to per-target settings mappings.

use serde_yml::Value;

use crate::ast::{coerce_bool, SettingsBlock, SettingsMap};

/// Host platform used for shadow-key lookups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// Linux hosts; shadow prefix `_LINUX_`.
    Linux,
    /// macOS hosts; shadow prefix `_MACOS_`.
    MacOs,
    /// Windows hosts; shadow prefix `_WINDOWS_`.
    Windows,
}

impl Platform {
    /// Detect the platform this binary was compiled for.
    #[must_use]
    pub const fn host() -> Self {
        if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Linux
        }
    }

    const fn shadow_prefix(self) -> &'static str {
        match self {
            Self::Linux => "_LINUX_",
            Self::MacOs => "_MACOS_",
            Self::Windows => "_WINDOWS_",
        }
    }
}

/// A flat settings mapping with platform-aware lookup.
///
/// Built either by merging the project block ([`ResolvedSettings::resolve`])
/// or directly from a target's own settings mapping
/// ([`ResolvedSettings::from_map`]). Immutable once built.
#[derive(Debug, Clone)]
pub struct ResolvedSettings {
    values: SettingsMap,
    platform: Platform,
}

impl ResolvedSettings {
    /// Merge `base` with the overrides of the named configuration. A key
    /// present in both takes the configuration's value.
    #[must_use]
    pub fn resolve(block: &SettingsBlock, config: &str, platform: Platform) -> Self {
        let mut values = block.base.clone();
        if let Some(overrides) = block.configs.get(config) {
            for (key, value) in overrides {
                values.insert(key.clone(), value.clone());
            }
        }
        Self { values, platform }
    }

    /// Wrap an already-flat mapping, e.g. a target's own settings.
    #[must_use]
    pub fn from_map(values: SettingsMap, platform: Platform) -> Self {
        Self { values, platform }
    }

    /// The platform these settings were resolved for.
    #[must_use]
    pub const fn platform(&self) -> Platform {
        self.platform
    }

    /// Look up `key`, honouring the platform shadow: if
    /// `<PLATFORM-PREFIX><key>` exists it wins, otherwise the bare key is
    /// used.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        let shadow = format!("{}{key}", self.platform.shadow_prefix());
        self.values.get(&shadow).or_else(|| self.values.get(key))
    }

    /// Look up a string-valued setting. Non-string values yield `None`.
    #[must_use]
    pub fn string(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Look up a boolean-like flag, applying the loose coercion rules. An
    /// absent key is `false`.
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        self.get(key).is_some_and(coerce_bool)
    }

    /// Look up a path-valued setting: a single string or an arbitrarily
    /// nested list of strings, flattened in declaration order.
    #[must_use]
    pub fn paths(&self, key: &str) -> Vec<String> {
        let mut out = Vec::new();
        if let Some(value) = self.get(key) {
            collect_paths(value, &mut out);
        }
        out
    }
}

fn collect_paths(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.push(s.clone()),
        Value::Sequence(items) => {
            for item in items {
                collect_paths(item, out);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn block(yaml: &str) -> SettingsBlock {
        serde_yml::from_str(yaml).expect("parse settings block")
    }

    fn map(yaml: &str) -> SettingsMap {
        serde_yml::from_str(yaml).expect("parse settings map")
    }

    #[rstest]
    fn config_overrides_base_on_collision() {
        let resolved = ResolvedSettings::resolve(
            &block(
                "base:\n  OPT: '-O0'\n  STD: c++20\nconfigs:\n  Release:\n    OPT: '-O2'\n",
            ),
            "Release",
            Platform::Linux,
        );
        assert_eq!(resolved.string("OPT"), Some("-O2"));
        assert_eq!(resolved.string("STD"), Some("c++20"));
    }

    #[rstest]
    fn unknown_config_leaves_base_untouched() {
        let resolved = ResolvedSettings::resolve(
            &block("base:\n  OPT: '-O0'\nconfigs:\n  Release:\n    OPT: '-O2'\n"),
            "Debug",
            Platform::Linux,
        );
        assert_eq!(resolved.string("OPT"), Some("-O0"));
    }

    #[rstest]
    #[case(Platform::Linux, Some("linux-value"))]
    #[case(Platform::MacOs, Some("generic-value"))]
    fn shadow_key_wins_only_on_matching_platform(
        #[case] platform: Platform,
        #[case] expected: Option<&str>,
    ) {
        let settings = ResolvedSettings::from_map(
            map("KEY: generic-value\n_LINUX_KEY: linux-value\n"),
            platform,
        );
        assert_eq!(settings.string("KEY"), expected);
    }

    #[rstest]
    fn shadow_key_alone_is_invisible_elsewhere() {
        let settings =
            ResolvedSettings::from_map(map("_LINUX_KEY: linux-only\n"), Platform::Windows);
        assert_eq!(settings.get("KEY"), None);
    }

    #[rstest]
    fn flag_coerces_and_defaults_to_false() {
        let settings = ResolvedSettings::from_map(
            map("A: 'Yes'\nB: true\nC: 'off'\n"),
            Platform::Linux,
        );
        assert!(settings.flag("A"));
        assert!(settings.flag("B"));
        assert!(!settings.flag("C"));
        assert!(!settings.flag("ABSENT"));
    }

    #[rstest]
    fn paths_accepts_string_or_nested_lists() {
        let settings = ResolvedSettings::from_map(
            map("ONE: include\nMANY:\n  - a\n  - [b, c]\n"),
            Platform::Linux,
        );
        assert_eq!(settings.paths("ONE"), vec!["include"]);
        assert_eq!(settings.paths("MANY"), vec!["a", "b", "c"]);
        assert!(settings.paths("ABSENT").is_empty());
    }

    #[rstest]
    fn merge_is_deterministic_across_calls() {
        let shared = block("base:\n  K: base\nconfigs:\n  Release:\n    K: release\n");
        let first = ResolvedSettings::resolve(&shared, "Release", Platform::Linux);
        let second = ResolvedSettings::resolve(&shared, "Release", Platform::Linux);
        assert_eq!(first.string("K"), second.string("K"));
        assert_eq!(first.string("K"), Some("release"));
    }
}
