//! Component file discovery.
//!
//! A full search walks the input, includes and layouts directories for
//! `**/*.<ext>` (matched case-insensitively). Host ignore globs apply to page
//! components only: files under the includes or layouts directory are always
//! found, since pages cannot compile without them.

use glob::{MatchOptions, Pattern};
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use tracing::{debug, trace};
use walkdir::WalkDir;

use crate::config::ProjectDirs;
use crate::core::StylegraphError;
use crate::utils::platform::{clean_path, normalize_path_for_storage};

/// Directory names never searched.
const SKIPPED_DIRS: &[&str] = &["node_modules", ".git"];

const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: false,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Candidate files for one build pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    /// Absolute paths, sorted and deduplicated
    pub files: Vec<PathBuf>,
    /// `true` when the set is a subset of the project (watch mode or override)
    pub partial: bool,
}

impl FileSet {
    /// A full-project file set.
    pub fn full(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: sorted_unique(files),
            partial: false,
        }
    }

    /// A subset of the project.
    pub fn partial(files: impl IntoIterator<Item = PathBuf>) -> Self {
        Self {
            files: sorted_unique(files),
            partial: true,
        }
    }

    /// Number of files.
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set has no files.
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Split off the files that no longer exist on disk.
    pub fn take_missing(&mut self) -> Vec<PathBuf> {
        let (present, missing) = std::mem::take(&mut self.files).into_iter().partition(|f| f.exists());
        self.files = present;
        missing
    }
}

fn sorted_unique(files: impl IntoIterator<Item = PathBuf>) -> Vec<PathBuf> {
    files.into_iter().map(|f| clean_path(&f)).collect::<BTreeSet<_>>().into_iter().collect()
}

/// Finds component files under the project directories.
#[derive(Debug, Clone)]
pub struct ComponentDiscovery {
    dirs: ProjectDirs,
    search: Pattern,
    ignores: Vec<Pattern>,
}

impl ComponentDiscovery {
    /// Create a discovery for files with `extension`.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::InvalidPattern`] when the extension does not
    /// form a valid glob.
    pub fn new(dirs: ProjectDirs, extension: &str) -> Result<Self, StylegraphError> {
        let search = format!("**/*.{}", extension.trim_start_matches('.'));
        Ok(Self {
            dirs,
            search: compile_pattern(&search)?,
            ignores: Vec::new(),
        })
    }

    /// The project layout searched.
    pub fn dirs(&self) -> &ProjectDirs {
        &self.dirs
    }

    /// Add host ignore globs, relative to the working directory.
    ///
    /// A leading `./` or `!` prefix is not meaningful here and is stripped.
    /// Patterns already present are not added twice.
    pub fn add_ignores<I, S>(&mut self, patterns: I) -> Result<(), StylegraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        for pattern in patterns {
            let raw = pattern.as_ref().trim();
            let raw = raw.trim_start_matches('!').trim_start_matches("./");
            if raw.is_empty() {
                continue;
            }
            let compiled = compile_pattern(raw)?;
            if !self.ignores.iter().any(|existing| existing.as_str() == compiled.as_str()) {
                debug!("Ignoring component pattern '{}'", raw);
                self.ignores.push(compiled);
            }
        }
        Ok(())
    }

    /// Registered ignore patterns.
    pub fn ignores(&self) -> Vec<&str> {
        self.ignores.iter().map(Pattern::as_str).collect()
    }

    /// Whether host ignores exclude `path`. Include and layout files never are.
    pub fn is_ignored(&self, path: &Path) -> bool {
        if self.dirs.is_include_file(path) {
            return false;
        }
        let relative = path.strip_prefix(&self.dirs.working_dir).unwrap_or(path);
        let relative = normalize_path_for_storage(relative);
        let absolute = normalize_path_for_storage(path);
        self.ignores.iter().any(|pattern| {
            pattern.matches_with(&relative, MATCH_OPTIONS) || pattern.matches_with(&absolute, MATCH_OPTIONS)
        })
    }

    /// Whether `path` names a component file.
    pub fn is_component_file(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| {
            self.search.matches_with(&name.to_string_lossy(), MATCH_OPTIONS)
        })
    }

    /// Walk every search root and return all non-ignored component files.
    pub fn discover(&self) -> Vec<PathBuf> {
        let mut found = BTreeSet::new();
        let cache_dir = clean_path(&self.dirs.cache_dir);

        for root in self.dirs.search_roots() {
            if !root.is_dir() {
                trace!("Search root {} does not exist, skipping", root.display());
                continue;
            }

            let walker = WalkDir::new(&root).follow_links(false).into_iter().filter_entry(|entry| {
                let name = entry.file_name().to_string_lossy();
                let skipped = entry.file_type().is_dir()
                    && entry.depth() > 0
                    && (SKIPPED_DIRS.contains(&name.as_ref()) || clean_path(entry.path()) == cache_dir);
                !skipped
            });

            for entry in walker.filter_map(Result::ok) {
                if !entry.file_type().is_file() {
                    continue;
                }
                let Ok(relative) = entry.path().strip_prefix(&root) else {
                    continue;
                };
                if !self.search.matches_with(&normalize_path_for_storage(relative), MATCH_OPTIONS) {
                    continue;
                }

                let path = clean_path(entry.path());
                if self.is_ignored(&path) {
                    trace!("Ignored {}", path.display());
                    continue;
                }
                found.insert(path);
            }
        }

        debug!("Discovered {} component files", found.len());
        found.into_iter().collect()
    }

    /// Keep the component files of a host change notification.
    pub fn filter_changed(&self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let filtered = sorted_unique(
            paths
                .iter()
                .map(|p| {
                    if p.is_absolute() {
                        p.clone()
                    } else {
                        self.dirs.working_dir.join(p)
                    }
                })
                .filter(|p| self.is_component_file(p)),
        );
        trace!("{} of {} changed files are components", filtered.len(), paths.len());
        filtered
    }
}

fn compile_pattern(pattern: &str) -> Result<Pattern, StylegraphError> {
    Pattern::new(pattern).map_err(|e| StylegraphError::InvalidPattern {
        pattern: pattern.to_string(),
        reason: e.to_string(),
    })
}
