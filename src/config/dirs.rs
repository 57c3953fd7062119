//! Absolute project directories derived from [`PluginOptions`].

use std::path::{Path, PathBuf};

use super::PluginOptions;
use crate::utils::platform::normalize_path_for_storage;

/// Resolved directory layout for one project.
///
/// `input_dir` and `cache_dir` are resolved against the working directory,
/// `includes_dir` and `layouts_dir` against the input directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectDirs {
    /// Root that component identifiers are relative to
    pub working_dir: PathBuf,
    /// Directory searched for page components
    pub input_dir: PathBuf,
    /// Directory of include-only components
    pub includes_dir: PathBuf,
    /// Optional directory of layout components
    pub layouts_dir: Option<PathBuf>,
    /// Output directory for compiled artifacts and snapshots
    pub cache_dir: PathBuf,
}

impl ProjectDirs {
    /// Resolve the directories named in `options` against `working_dir`.
    pub fn resolve(working_dir: impl Into<PathBuf>, options: &PluginOptions) -> Self {
        let working_dir = working_dir.into();
        let input_dir = join_clean(&working_dir, &options.input_dir);
        let includes_dir = join_clean(&input_dir, &options.includes_dir);
        let layouts_dir = options.layouts_dir.as_ref().map(|dir| join_clean(&input_dir, dir));
        let cache_dir = join_clean(&working_dir, &options.cache_directory);

        Self {
            working_dir,
            input_dir,
            includes_dir,
            layouts_dir,
            cache_dir,
        }
    }

    /// Returns `true` when `path` lives under the includes or layouts directory.
    ///
    /// Such files are always discovered, regardless of host ignore patterns.
    pub fn is_include_file(&self, path: &Path) -> bool {
        let candidate = normalize_path_for_storage(path);
        let under = |dir: &Path| {
            let prefix = normalize_path_for_storage(dir);
            let prefix = prefix.trim_end_matches('/');
            candidate.len() > prefix.len()
                && candidate.starts_with(prefix)
                && candidate.as_bytes()[prefix.len()] == b'/'
        };

        under(&self.includes_dir) || self.layouts_dir.as_deref().is_some_and(under)
    }

    /// Directories a full discovery pass searches, deduplicated, in search order.
    pub fn search_roots(&self) -> Vec<PathBuf> {
        let mut roots = vec![self.input_dir.clone(), self.includes_dir.clone()];
        if let Some(layouts) = &self.layouts_dir {
            roots.push(layouts.clone());
        }
        let mut seen = std::collections::HashSet::new();
        roots.retain(|root| seen.insert(root.clone()));
        roots
    }
}

/// Join `relative` onto `base`, dropping `.` components so prefixes compare cleanly.
fn join_clean(base: &Path, relative: &Path) -> PathBuf {
    let mut joined = base.to_path_buf();
    for component in relative.components() {
        match component {
            std::path::Component::CurDir => {}
            other => joined.push(other.as_os_str()),
        }
    }
    joined
}
