//! Configuration management for stylegraph
//!
//! Options live in `stylegraph.toml` at the project root. Every field has a
//! default, so a missing file or a partial file is valid:
//!
//! ```toml
//! input_dir = "src"
//! includes_dir = "_includes"
//! ignores = ["drafts/**"]
//! snapshot = "write"
//! ```
//!
//! # Modules
//!
//! - `options` - [`PluginOptions`] and [`SnapshotMode`], loaded with `tokio::fs` + `toml`
//! - `dirs` - [`ProjectDirs`], the absolute layout derived from the options

mod dirs;
mod options;

pub use dirs::ProjectDirs;
pub use options::{PluginOptions, SnapshotMode};
