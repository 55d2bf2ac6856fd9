//! Source resolution.
//!
//! Turns a target's declared source entries into the ordered list of absolute
//! paths to compile, and derives each one's object path. Filtering drops
//! entries marked excluded and anything without a recognised source
//! extension. Relative paths resolve against the directory of the descriptor
//! that declared the target, so included descriptors reference files relative
//! to their own location.
//!
//! Object paths mirror the sources' directory structure below a common
//! anchor: the deepest shared ancestor directory when a target has several
//! sources, or the single source's parent otherwise. Because every compiled
//! source has a distinct path under the anchor, object paths are injective
//! within a target.

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;

use crate::descriptor::resolve_against;
use crate::registry::ResolvedTarget;

/// Extensions recognised as compilable source code, lowercase.
const SOURCE_EXTENSIONS: &[&str] = &["cpp", "cc"];

/// Extension appended to derive an object path.
const OBJECT_EXTENSION: &str = "o";

/// Errors raised during source resolution.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Every entry was excluded or unrecognised; the anchor is undefined for
    /// an empty set, so this aborts the run.
    #[error("target '{target}' has no compilable sources")]
    EmptySourceSet {
        /// The offending target.
        target: String,
    },
}

/// The compiled sources of one target, with their layout anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSources {
    /// Absolute source paths in declaration order. Never empty.
    pub files: Vec<Utf8PathBuf>,
    /// Deepest common ancestor directory of `files`.
    pub anchor: Utf8PathBuf,
}

impl ResolvedSources {
    /// Resolve a target's source list.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::EmptySourceSet`] when filtering leaves nothing
    /// to compile.
    pub fn resolve(target: &ResolvedTarget) -> Result<Self, SourceError> {
        let files: Vec<Utf8PathBuf> = target
            .sources
            .iter()
            .filter(|entry| !entry.excluded && has_source_extension(&entry.path))
            .map(|entry| resolve_against(&target.origin_dir, &entry.path))
            .collect();
        let anchor = match files.as_slice() {
            [] => {
                return Err(SourceError::EmptySourceSet {
                    target: target.name.clone(),
                })
            }
            [only] => only.parent().unwrap_or(Utf8Path::new("")).to_owned(),
            many => common_ancestor(many),
        };
        Ok(Self { files, anchor })
    }

    /// Derive the object path for one of `files` under `intermediate_dir`,
    /// mirroring its position relative to the anchor.
    #[must_use]
    pub fn object_path(&self, source: &Utf8Path, intermediate_dir: &Utf8Path) -> Utf8PathBuf {
        let relative = source.strip_prefix(&self.anchor).unwrap_or(source);
        let mut object = intermediate_dir.join(relative).into_string();
        object.push('.');
        object.push_str(OBJECT_EXTENSION);
        Utf8PathBuf::from(object)
    }

    /// Object paths for every compiled source, in source order.
    #[must_use]
    pub fn object_paths(&self, intermediate_dir: &Utf8Path) -> Vec<Utf8PathBuf> {
        self.files
            .iter()
            .map(|source| self.object_path(source, intermediate_dir))
            .collect()
    }
}

fn has_source_extension(path: &Utf8Path) -> bool {
    path.extension()
        .map(str::to_lowercase)
        .is_some_and(|ext| SOURCE_EXTENSIONS.contains(&ext.as_str()))
}

/// Deepest directory that is an ancestor of every path in `paths`.
fn common_ancestor(paths: &[Utf8PathBuf]) -> Utf8PathBuf {
    let mut iter = paths.iter();
    let Some(first) = iter.next() else {
        return Utf8PathBuf::new();
    };
    let mut shared: Vec<&str> = first.components().map(|c| c.as_str()).collect();
    // The last component of a file path is the file itself; never part of a
    // directory anchor.
    shared.pop();
    for path in iter {
        let components: Vec<&str> = path.components().map(|c| c.as_str()).collect();
        let keep = shared
            .iter()
            .zip(components.iter().take(components.len().saturating_sub(1)))
            .take_while(|(a, b)| a == b)
            .count();
        shared.truncate(keep);
    }
    shared.iter().collect()
}
