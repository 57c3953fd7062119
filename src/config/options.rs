//! Plugin options loaded from `stylegraph.toml`.
//!
//! Every field has a default, so a partial file merges over the defaults:
//!
//! ```toml
//! cache_directory = ".cache/vue/"
//! input_dir = "src"
//! includes_dir = "_includes"
//! layouts_dir = "_layouts"
//! extension = "vue"
//! ignores = ["drafts/**"]
//! snapshot = "read"
//! transitive_css = true
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::constants::{
    CONFIG_FILE_NAME, DEFAULT_CACHE_DIRECTORY, DEFAULT_EXTENSION, DEFAULT_INCLUDES_DIR,
};
use crate::core::StylegraphError;

/// How build passes interact with the persisted snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnapshotMode {
    /// Never read or write snapshots.
    #[default]
    Disabled,
    /// Always compile; write a snapshot after every full pass.
    Write,
    /// Restore from a snapshot when a valid one exists, otherwise compile and write one.
    Read,
}

impl SnapshotMode {
    /// Whether full passes persist a snapshot.
    pub const fn writes(self) -> bool {
        matches!(self, Self::Write | Self::Read)
    }

    /// Whether initialization may restore from a snapshot instead of compiling.
    pub const fn reads(self) -> bool {
        matches!(self, Self::Read)
    }
}

fn default_cache_directory() -> PathBuf {
    PathBuf::from(DEFAULT_CACHE_DIRECTORY)
}

fn default_input_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_includes_dir() -> PathBuf {
    PathBuf::from(DEFAULT_INCLUDES_DIR)
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

const fn default_transitive_css() -> bool {
    true
}

/// Options controlling discovery, caching and CSS aggregation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PluginOptions {
    /// Directory compiled artifacts and snapshots are written to, relative to
    /// the working directory.
    #[serde(default = "default_cache_directory")]
    pub cache_directory: PathBuf,

    /// Input directory searched for page components, relative to the working directory.
    #[serde(default = "default_input_dir")]
    pub input_dir: PathBuf,

    /// Includes directory, relative to the input directory. Components here are
    /// only used as dependencies of other templates.
    #[serde(default = "default_includes_dir")]
    pub includes_dir: PathBuf,

    /// Optional layouts directory, relative to the input directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub layouts_dir: Option<PathBuf>,

    /// Component file extension, with or without the leading dot.
    #[serde(default = "default_extension")]
    pub extension: String,

    /// Glob patterns excluded from discovery. They never exclude files in the
    /// includes or layouts directories.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub ignores: Vec<String>,

    /// Snapshot persistence mode.
    #[serde(default)]
    pub snapshot: SnapshotMode,

    /// Follow imports transitively when aggregating page CSS. When `false`
    /// only one level of imports is expanded.
    #[serde(default = "default_transitive_css")]
    pub transitive_css: bool,
}

impl Default for PluginOptions {
    fn default() -> Self {
        Self {
            cache_directory: default_cache_directory(),
            input_dir: default_input_dir(),
            includes_dir: default_includes_dir(),
            layouts_dir: None,
            extension: default_extension(),
            ignores: Vec::new(),
            snapshot: SnapshotMode::default(),
            transitive_css: default_transitive_css(),
        }
    }
}

impl PluginOptions {
    /// Load options from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, does not parse, or fails
    /// [`validate`](Self::validate).
    pub async fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read configuration from {}", path.display()))?;

        let options: Self =
            toml::from_str(&content).map_err(|e| StylegraphError::ConfigParseError {
                file: path.display().to_string(),
                reason: e.to_string(),
            })?;

        options.validate()?;
        Ok(options)
    }

    /// Load `stylegraph.toml` from `dir`, or the defaults when the file is absent.
    pub async fn load_or_default(dir: &Path) -> Result<Self> {
        let path = dir.join(CONFIG_FILE_NAME);
        if fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!("Loading configuration from {}", path.display());
            Self::load_from(&path).await
        } else {
            tracing::debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Ok(Self::default())
        }
    }

    /// Write the options as TOML.
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).await.with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        fs::write(path, content)
            .await
            .with_context(|| format!("Failed to write configuration to {}", path.display()))?;
        Ok(())
    }

    /// Check option values that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::ConfigError`] when the extension is empty or
    /// the includes/layouts directories are absolute.
    pub fn validate(&self) -> Result<(), StylegraphError> {
        if self.extension.trim_start_matches('.').trim().is_empty() {
            return Err(StylegraphError::ConfigError {
                message: "extension must not be empty".to_string(),
            });
        }

        if self.includes_dir.is_absolute() {
            return Err(StylegraphError::ConfigError {
                message: format!(
                    "includes_dir must be relative to the input directory, got {}",
                    self.includes_dir.display()
                ),
            });
        }

        if let Some(layouts) = &self.layouts_dir
            && layouts.is_absolute()
        {
            return Err(StylegraphError::ConfigError {
                message: format!(
                    "layouts_dir must be relative to the input directory, got {}",
                    layouts.display()
                ),
            });
        }

        Ok(())
    }
}
