//! Platform helpers for path handling.

use std::path::{Component, Path, PathBuf};

/// Returns `true` when compiled for Windows.
#[must_use]
pub const fn is_windows() -> bool {
    cfg!(windows)
}

/// Normalizes a path for storage by converting all separators to forward slashes.
///
/// Component identifiers, snapshot keys and bundler sub-resource ids must be
/// identical across platforms, so every stored path goes through this function.
/// Windows extended-length prefixes are stripped first.
///
/// ```rust,no_run
/// use stylegraph::utils::platform::normalize_path_for_storage;
/// use std::path::Path;
///
/// assert_eq!(normalize_path_for_storage(Path::new("src\\components\\card.vue")), "src/components/card.vue");
/// ```
#[must_use]
pub fn normalize_path_for_storage<P: AsRef<Path>>(path: P) -> String {
    let path_str = path.as_ref().to_string_lossy();

    let cleaned = if let Some(stripped) = path_str.strip_prefix(r"\\?\UNC\") {
        format!("//{stripped}")
    } else if let Some(stripped) = path_str.strip_prefix(r"\\?\") {
        stripped.to_string()
    } else {
        path_str.to_string()
    };

    cleaned.replace('\\', "/")
}

/// Resolves `.` and `..` components without touching the filesystem.
///
/// `..` at the root is dropped; a relative path keeps leading `..` components.
#[must_use]
pub fn clean_path(path: &Path) -> PathBuf {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let popped = matches!(cleaned.components().next_back(), Some(Component::Normal(_)))
                    && cleaned.pop();
                if !popped && !cleaned.has_root() {
                    cleaned.push("..");
                }
            }
            other => cleaned.push(other.as_os_str()),
        }
    }
    cleaned
}
