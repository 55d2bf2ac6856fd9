//! Descriptor file loading.
//!
//! Reads the primary `project.yml` and every descriptor it includes, in
//! declaration order. Parsing happens in two stages, like the manifest loader
//! this crate grew out of: the document is parsed into loosely typed YAML
//! values first, then each target record is deserialised on its own so a
//! schema violation can name the offending target and file instead of a bare
//! line number.

use camino::{Utf8Path, Utf8PathBuf};
use indexmap::IndexMap;
use serde::Deserialize;
use serde_yml::Value;
use thiserror::Error;

use crate::ast::{RawTargetSpec, SettingsBlock};

/// Errors raised while reading or deserialising descriptor files.
#[derive(Debug, Error)]
pub enum DescriptorError {
    /// A primary or included descriptor could not be read.
    #[error("failed to read descriptor {path}")]
    Read {
        /// Path of the unreadable file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// A descriptor file is not valid YAML or has a malformed top-level shape.
    #[error("failed to parse descriptor {path}")]
    Parse {
        /// Path of the malformed file.
        path: Utf8PathBuf,
        /// Underlying deserialisation error.
        #[source]
        source: serde_yml::Error,
    },
    /// A target record violates the schema, e.g. a missing or unknown kind.
    #[error("invalid target '{name}' in {path}")]
    InvalidTarget {
        /// Name of the offending target.
        name: String,
        /// Descriptor file declaring it.
        path: Utf8PathBuf,
        /// Underlying deserialisation error.
        #[source]
        source: serde_yml::Error,
    },
    /// A descriptor path has no parent directory to resolve sources against.
    #[error("descriptor path {path} has no parent directory")]
    NoParent {
        /// The offending path.
        path: Utf8PathBuf,
    },
}

/// Top-level shape of a descriptor file. Targets stay loosely typed here so
/// they can be deserialised one at a time.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDocument {
    #[serde(default)]
    include: Vec<Utf8PathBuf>,
    #[serde(default)]
    settings: SettingsBlock,
    #[serde(default)]
    targets: IndexMap<String, Value>,
}

/// One fully parsed descriptor file.
#[derive(Debug)]
pub struct LoadedDescriptor {
    /// Absolute path of the file.
    pub path: Utf8PathBuf,
    /// Directory containing the file; relative source paths resolve here.
    pub dir: Utf8PathBuf,
    /// Project-level settings block. Only the primary descriptor's block is
    /// consulted for rule parameterisation; included blocks are ignored.
    pub settings: SettingsBlock,
    /// Target records in declaration order.
    pub targets: Vec<(String, RawTargetSpec)>,
}

/// Load the primary descriptor and every file it includes.
///
/// Include paths are resolved relative to the primary descriptor's directory
/// when not absolute. Includes are not transitive: only the primary's
/// `include` list is honoured, matching the descriptor format.
///
/// # Errors
///
/// Returns a [`DescriptorError`] if any file is unreadable, unparsable, or
/// declares a schema-violating target.
pub fn load_project(primary: &Utf8Path) -> Result<Vec<LoadedDescriptor>, DescriptorError> {
    let first = load_file(primary)?;
    let includes: Vec<Utf8PathBuf> = first
        .1
        .include
        .iter()
        .map(|p| resolve_against(&first.0.dir, p))
        .collect();
    let mut descriptors = vec![finish(first.0, first.1)?];
    for path in includes {
        let (loaded, raw) = load_file(&path)?;
        descriptors.push(finish(loaded, raw)?);
    }
    Ok(descriptors)
}

struct FileInfo {
    path: Utf8PathBuf,
    dir: Utf8PathBuf,
}

fn load_file(path: &Utf8Path) -> Result<(FileInfo, RawDocument), DescriptorError> {
    let text = std::fs::read_to_string(path).map_err(|source| DescriptorError::Read {
        path: path.to_owned(),
        source,
    })?;
    let raw: RawDocument =
        serde_yml::from_str(&text).map_err(|source| DescriptorError::Parse {
            path: path.to_owned(),
            source,
        })?;
    let dir = path
        .parent()
        .ok_or_else(|| DescriptorError::NoParent {
            path: path.to_owned(),
        })?
        .to_owned();
    tracing::debug!(descriptor = %path, targets = raw.targets.len(), "loaded descriptor");
    Ok((
        FileInfo {
            path: path.to_owned(),
            dir,
        },
        raw,
    ))
}

fn finish(info: FileInfo, raw: RawDocument) -> Result<LoadedDescriptor, DescriptorError> {
    let mut targets = Vec::with_capacity(raw.targets.len());
    for (name, value) in raw.targets {
        let spec: RawTargetSpec =
            serde_yml::from_value(value).map_err(|source| DescriptorError::InvalidTarget {
                name: name.clone(),
                path: info.path.clone(),
                source,
            })?;
        targets.push((name, spec));
    }
    Ok(LoadedDescriptor {
        path: info.path,
        dir: info.dir,
        settings: raw.settings,
        targets,
    })
}

/// Join `path` onto `dir` unless it is already absolute.
pub(crate) fn resolve_against(dir: &Utf8Path, path: &Utf8Path) -> Utf8PathBuf {
    if path.is_absolute() {
        path.to_owned()
    } else {
        dir.join(path)
    }
}
