//! Target registry construction.
//!
//! Folds the primary and included descriptors into one registry of immutable
//! [`ResolvedTarget`]s, in declaration order. Each resolved target carries the
//! directory of the descriptor that declared it (relative source paths
//! resolve there) and its product path, computed here as a pure function of
//! kind, name, and the products directory so later stages never depend on
//! emission order.
//!
//! A name declared in more than one descriptor resolves last-write-wins, but
//! never silently: the collision is logged as a warning, or rejected outright
//! in strict mode.

use camino::Utf8PathBuf;
use indexmap::IndexMap;
use thiserror::Error;

use crate::ast::{Dependency, SettingsMap, SourceEntry, TargetKind};
use crate::descriptor::LoadedDescriptor;

/// Archive extension for static-library products.
const ARCHIVE_EXTENSION: &str = "a";

/// Errors raised while building the registry.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// Strict mode: the same target name is declared in two descriptors.
    #[error("target '{name}' declared in both {first} and {second}")]
    DuplicateTarget {
        /// The colliding name.
        name: String,
        /// Descriptor holding the earlier declaration.
        first: Utf8PathBuf,
        /// Descriptor holding the later declaration.
        second: Utf8PathBuf,
    },
}

/// How cross-descriptor name collisions are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollisionPolicy {
    /// Keep the later declaration and log a warning.
    Warn,
    /// Fail the run on the first collision.
    Reject,
}

/// Output directory layout for one configuration.
///
/// Intermediates live under `<root>/<config>/Intermediates/<target>/` and
/// products under `<root>/<config>/Products/`.
#[derive(Debug, Clone)]
pub struct Layout {
    root: Utf8PathBuf,
    config: String,
}

impl Layout {
    /// Create a layout rooted at `root` (normally the working directory) for
    /// the named build configuration.
    #[must_use]
    pub fn new(root: impl Into<Utf8PathBuf>, config: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            config: config.into(),
        }
    }

    /// Directory receiving final products.
    #[must_use]
    pub fn products_dir(&self) -> Utf8PathBuf {
        self.root.join(&self.config).join("Products")
    }

    /// Per-target directory receiving object files.
    #[must_use]
    pub fn intermediate_dir(&self, target_name: &str) -> Utf8PathBuf {
        self.root
            .join(&self.config)
            .join("Intermediates")
            .join(target_name)
    }

    /// Compute the product path for a target. Pure in (kind, name, layout).
    #[must_use]
    pub fn product_path(&self, kind: TargetKind, name: &str) -> Utf8PathBuf {
        let products = self.products_dir();
        match kind {
            TargetKind::StaticLibrary => products.join(format!("lib{name}.{ARCHIVE_EXTENSION}")),
            TargetKind::Tool => products.join(name),
        }
    }
}

/// A target record after registry resolution. Immutable once built.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    /// Registry name.
    pub name: String,
    /// Artefact kind.
    pub kind: TargetKind,
    /// Ordered source entries as declared.
    pub sources: Vec<SourceEntry>,
    /// Target-scoped settings mapping.
    pub settings: SettingsMap,
    /// Ordered dependency references.
    pub dependencies: Vec<Dependency>,
    /// Directory of the declaring descriptor file.
    pub origin_dir: Utf8PathBuf,
    /// Declaring descriptor file, for diagnostics.
    pub origin_file: Utf8PathBuf,
    /// Computed product path.
    pub product_path: Utf8PathBuf,
}

/// All resolved targets, iterable in declaration order.
#[derive(Debug)]
pub struct TargetRegistry {
    targets: IndexMap<String, ResolvedTarget>,
}

impl TargetRegistry {
    /// Build the registry from the loaded descriptors, primary first.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateTarget`] under
    /// [`CollisionPolicy::Reject`] when a name is declared twice.
    pub fn build(
        descriptors: &[LoadedDescriptor],
        layout: &Layout,
        policy: CollisionPolicy,
    ) -> Result<Self, RegistryError> {
        let mut targets: IndexMap<String, ResolvedTarget> = IndexMap::new();
        for descriptor in descriptors {
            for (name, spec) in &descriptor.targets {
                let resolved = ResolvedTarget {
                    name: name.clone(),
                    kind: spec.kind,
                    sources: spec.sources.clone(),
                    settings: spec.settings.clone(),
                    dependencies: spec.dependencies.clone(),
                    origin_dir: descriptor.dir.clone(),
                    origin_file: descriptor.path.clone(),
                    product_path: layout.product_path(spec.kind, name),
                };
                if let Some(previous) = targets.insert(name.clone(), resolved) {
                    match policy {
                        CollisionPolicy::Reject => {
                            return Err(RegistryError::DuplicateTarget {
                                name: name.clone(),
                                first: previous.origin_file,
                                second: descriptor.path.clone(),
                            });
                        }
                        CollisionPolicy::Warn => {
                            tracing::warn!(
                                target_name = %name,
                                first = %previous.origin_file,
                                second = %descriptor.path,
                                "target redefined; keeping the later declaration",
                            );
                        }
                    }
                }
            }
        }
        Ok(Self { targets })
    }

    /// Look up a target by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ResolvedTarget> {
        self.targets.get(name)
    }

    /// Iterate targets in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ResolvedTarget> {
        self.targets.values()
    }

    /// Number of registered targets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    /// Whether the registry holds no targets.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}
