//! File system utilities for the cache directory.
//!
//! Compiled artifacts and snapshots are written with a temp-and-rename strategy
//! so a reader never observes a partially written file.

mod atomic;
mod dirs;

pub use atomic::{atomic_write, atomic_write_multiple};
pub use dirs::ensure_dir;
