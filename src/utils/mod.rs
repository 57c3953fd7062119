//! Cross-platform utilities and helpers
//!
//! # Modules
//!
//! - [`fs`] - Directory creation and atomic file writes
//! - [`platform`] - Path normalization for stored identifiers
//! - [`progress`] - Terminal spinners for long-running passes
//!
//! # Example
//!
//! ```rust,no_run
//! use stylegraph::utils::{atomic_write, ensure_dir};
//! use std::path::Path;
//!
//! # fn example() -> anyhow::Result<()> {
//! ensure_dir(Path::new(".cache/vue"))?;
//! atomic_write(Path::new(".cache/vue/card.json"), b"{}")?;
//! # Ok(())
//! # }
//! ```

pub mod fs;
pub mod platform;
pub mod progress;

pub use fs::{atomic_write, atomic_write_multiple, ensure_dir};
pub use platform::{clean_path, is_windows, normalize_path_for_storage};
