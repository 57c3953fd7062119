//! Component and artifact identifiers plus the path normalizer.
//!
//! A [`ComponentId`] is a project-relative, forward-slash path ending in the
//! component extension (`./src/components/card.vue`). The bundler refers to
//! sub-resources of a single source file by appending a query string
//! (`card.vue?vue&type=style&index=0`); normalization drops it so every
//! sub-resource maps back to its owning component.
//!
//! An [`ArtifactId`] is the file name of a compiled output relative to the
//! cache directory (`card.json`).

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::utils::platform::normalize_path_for_storage;

/// Canonical, project-relative identifier of a source component.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ComponentId(String);

impl ComponentId {
    /// Wrap an already-normalized identifier.
    ///
    /// Use [`PathNormalizer::to_component_id`] for raw filesystem paths.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ComponentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ComponentId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for ComponentId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// File name of a compiled artifact, relative to the cache directory.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ArtifactId(String);

impl ArtifactId {
    /// Wrap an artifact file name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// The file name as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ArtifactId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ArtifactId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl Borrow<str> for ArtifactId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

/// Converts between absolute filesystem paths and [`ComponentId`]s.
///
/// # Examples
///
/// ```rust,no_run
/// use stylegraph::core::PathNormalizer;
///
/// let normalizer = PathNormalizer::new("/project", "vue");
/// let id = normalizer.to_component_id("/project/src/card.vue?vue&type=style&index=0");
/// assert_eq!(id.as_str(), "./src/card.vue");
/// ```
#[derive(Debug, Clone)]
pub struct PathNormalizer {
    working_dir: PathBuf,
    working_dir_str: String,
    extension: String,
}

impl PathNormalizer {
    /// Create a normalizer rooted at `working_dir`.
    ///
    /// `extension` may be given with or without the leading dot.
    pub fn new(working_dir: impl Into<PathBuf>, extension: &str) -> Self {
        let working_dir = working_dir.into();
        let mut working_dir_str = normalize_path_for_storage(&working_dir);
        while working_dir_str.len() > 1 && working_dir_str.ends_with('/') {
            working_dir_str.pop();
        }

        Self {
            working_dir,
            working_dir_str,
            extension: format!(".{}", extension.trim_start_matches('.')),
        }
    }

    /// The working directory identifiers are relative to.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The component extension including its leading dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Normalize a path (absolute, relative, or bundler sub-resource id) to a
    /// [`ComponentId`].
    ///
    /// The working directory prefix is replaced by `.`, separators become `/`,
    /// and everything after the first occurrence of the component extension
    /// that ends the file name (a query string) is discarded. Normalizing an
    /// identifier again returns it unchanged.
    pub fn to_component_id(&self, full_path: impl AsRef<Path>) -> ComponentId {
        let raw = normalize_path_for_storage(full_path.as_ref());
        let truncated = self.truncate_at_extension(&raw);

        let relative = match truncated.strip_prefix(self.working_dir_str.as_str()) {
            Some(rest) if rest.starts_with('/') => format!(".{rest}"),
            Some("") => ".".to_string(),
            _ => truncated.to_string(),
        };

        let id = if relative.starts_with("./")
            || relative.starts_with("../")
            || relative.starts_with('/')
            || relative == "."
            || has_drive_prefix(&relative)
        {
            relative
        } else {
            format!("./{relative}")
        };

        ComponentId(id)
    }

    /// Resolve an identifier back to an absolute path under the working directory.
    pub fn to_absolute(&self, id: &ComponentId) -> PathBuf {
        let rel = id.as_str();
        if rel.starts_with('/') || has_drive_prefix(rel) {
            return PathBuf::from(rel);
        }
        self.working_dir.join(rel.trim_start_matches("./"))
    }

    /// Returns `true` when `path` names a component source file.
    ///
    /// Matching is case-insensitive and ignores a trailing query string.
    pub fn has_component_extension(&self, path: impl AsRef<Path>) -> bool {
        let raw = normalize_path_for_storage(path.as_ref());
        let without_query = raw.split('?').next().unwrap_or_default();
        without_query.to_ascii_lowercase().ends_with(&self.extension.to_ascii_lowercase())
    }

    fn truncate_at_extension<'a>(&self, raw: &'a str) -> &'a str {
        let ext = self.extension.as_str();
        let mut search_from = 0;
        while let Some(pos) = raw[search_from..].find(ext) {
            let end = search_from + pos + ext.len();
            match raw[end..].chars().next() {
                None | Some('?') => return &raw[..end],
                _ => search_from = end,
            }
        }
        raw.split('?').next().unwrap_or(raw)
    }
}

fn has_drive_prefix(path: &str) -> bool {
    let bytes = path.as_bytes();
    bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':'
}
