//! Atomic file write operations using temp-and-rename strategy.

use crate::utils::fs::dirs::ensure_dir;
use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Atomically writes bytes to a file using a write-then-rename strategy.
///
/// 1. Writes content to a sibling temporary file (`<name>.tmp`)
/// 2. Syncs the temporary file to disk
/// 3. Renames the temporary file over the target path
///
/// Parent directories are created when missing.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<()> {
    use std::io::Write;

    if let Some(parent) = path.parent() {
        ensure_dir(parent)?;
    }

    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Cannot write to a path without a file name: {}", path.display()))?;
    let temp_path = path.with_file_name(format!("{}.tmp", file_name.to_string_lossy()));

    {
        let mut file = fs::File::create(&temp_path)
            .with_context(|| format!("Failed to create temp file: {}", temp_path.display()))?;

        file.write_all(content)
            .with_context(|| format!("Failed to write to temp file: {}", temp_path.display()))?;

        file.sync_all().with_context(|| "Failed to sync file to disk")?;
    }

    fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temp file to: {}", path.display()))?;

    Ok(())
}

/// Writes multiple files atomically in parallel.
///
/// Each file is written with [`atomic_write`] on the blocking pool. All writes
/// are attempted; failures are collected into a single error.
pub async fn atomic_write_multiple(files: &[(PathBuf, Vec<u8>)]) -> Result<()> {
    use futures::future::try_join_all;

    if files.is_empty() {
        return Ok(());
    }

    let mut tasks = Vec::new();

    for (path, content) in files {
        let path = path.clone();
        let content = content.clone();
        let task =
            tokio::task::spawn_blocking(move || atomic_write(&path, &content).map(|()| path));
        tasks.push(task);
    }

    let results = try_join_all(tasks).await.context("Failed to join atomic write tasks")?;

    let errors: Vec<String> =
        results.into_iter().filter_map(Result::err).map(|error| format!("  {error:#}")).collect();

    if !errors.is_empty() {
        return Err(anyhow::anyhow!(
            "Failed to write {} files:\n{}",
            errors.len(),
            errors.join("\n")
        ));
    }

    Ok(())
}
