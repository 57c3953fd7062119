//! Persisted build snapshots.
//!
//! A snapshot lets a later run skip compilation entirely. It is stored as two
//! JSON documents in the cache directory:
//!
//! - `stylegraph-snapshot.json` holds the format version, the component to
//!   artifact mapping, the relationship list and a checksum of the styles file.
//! - `stylegraph-styles.json` holds the raw style fragments per component.
//!
//! Both files are written together with temp-and-rename. Loading validates the
//! version, the checksum, that every relationship endpoint is a mapped artifact
//! and that every artifact file still exists; any failure is reported as
//! [`StylegraphError::SnapshotCorrupt`].

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashSet};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::constants::{SNAPSHOT_FILE_NAME, SNAPSHOT_VERSION, STYLES_SNAPSHOT_FILE_NAME};
use crate::core::{ArtifactId, ComponentId, StylegraphError};
use crate::graph::Relationship;
use crate::utils::{atomic_write_multiple, ensure_dir};

/// In-memory build results that survive between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildSnapshot {
    /// Component to artifact mapping
    pub component_to_artifact: BTreeMap<ComponentId, ArtifactId>,
    /// Import relationships in recording order
    pub relationships: Vec<Relationship>,
    /// Raw style fragments per component
    pub styles: BTreeMap<ComponentId, Vec<String>>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnapshotFile {
    version: u32,
    component_to_artifact: BTreeMap<ComponentId, ArtifactId>,
    relationships: Vec<Relationship>,
    styles_checksum: String,
}

/// Reads and writes snapshots in one cache directory.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    dir: PathBuf,
}

impl SnapshotStore {
    /// Store snapshots under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
        }
    }

    /// Path of the mapping document.
    pub fn snapshot_path(&self) -> PathBuf {
        self.dir.join(SNAPSHOT_FILE_NAME)
    }

    /// Path of the styles document.
    pub fn styles_path(&self) -> PathBuf {
        self.dir.join(STYLES_SNAPSHOT_FILE_NAME)
    }

    /// Whether a snapshot has been written.
    pub fn exists(&self) -> bool {
        self.snapshot_path().is_file()
    }

    /// Write `snapshot`, replacing any previous one.
    pub async fn save(&self, snapshot: &BuildSnapshot) -> Result<(), StylegraphError> {
        ensure_dir(&self.dir).map_err(|e| StylegraphError::FileSystemError {
            operation: format!("create snapshot directory: {e}"),
            path: self.dir.display().to_string(),
        })?;

        let styles = serde_json::to_vec_pretty(&snapshot.styles)?;
        let file = SnapshotFile {
            version: SNAPSHOT_VERSION,
            component_to_artifact: snapshot.component_to_artifact.clone(),
            relationships: snapshot.relationships.clone(),
            styles_checksum: checksum(&styles),
        };
        let mapping = serde_json::to_vec_pretty(&file)?;

        // A crash between the two renames leaves a checksum mismatch, read back as corrupt.
        let files = vec![(self.styles_path(), styles), (self.snapshot_path(), mapping)];
        atomic_write_multiple(&files).await.map_err(|e| StylegraphError::FileSystemError {
            operation: format!("write snapshot: {e}"),
            path: self.snapshot_path().display().to_string(),
        })?;

        debug!(
            "Wrote snapshot with {} components and {} relationships",
            snapshot.component_to_artifact.len(),
            snapshot.relationships.len()
        );
        Ok(())
    }

    /// Load the snapshot, or `None` when none has been written.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::SnapshotCorrupt`] when either document is
    /// unreadable or fails validation.
    pub async fn load(&self) -> Result<Option<BuildSnapshot>, StylegraphError> {
        let snapshot_path = self.snapshot_path();
        let mapping = match tokio::fs::read(&snapshot_path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(corrupt(&snapshot_path, e.to_string())),
        };
        let file: SnapshotFile =
            serde_json::from_slice(&mapping).map_err(|e| corrupt(&snapshot_path, e.to_string()))?;

        if file.version != SNAPSHOT_VERSION {
            return Err(corrupt(
                &snapshot_path,
                format!("unsupported version {} (expected {SNAPSHOT_VERSION})", file.version),
            ));
        }

        let styles_path = self.styles_path();
        let styles_bytes =
            tokio::fs::read(&styles_path).await.map_err(|e| corrupt(&styles_path, e.to_string()))?;
        if checksum(&styles_bytes) != file.styles_checksum {
            return Err(corrupt(&styles_path, "checksum mismatch".to_string()));
        }
        let styles: BTreeMap<ComponentId, Vec<String>> =
            serde_json::from_slice(&styles_bytes).map_err(|e| corrupt(&styles_path, e.to_string()))?;

        self.validate(&file, &styles).map_err(|reason| corrupt(&snapshot_path, reason))?;

        debug!(
            "Loaded snapshot with {} components and {} relationships",
            file.component_to_artifact.len(),
            file.relationships.len()
        );
        Ok(Some(BuildSnapshot {
            component_to_artifact: file.component_to_artifact,
            relationships: file.relationships,
            styles,
        }))
    }

    /// Delete both documents if present.
    pub async fn remove(&self) -> Result<(), StylegraphError> {
        for path in [self.snapshot_path(), self.styles_path()] {
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }
        Ok(())
    }

    fn validate(
        &self,
        file: &SnapshotFile,
        styles: &BTreeMap<ComponentId, Vec<String>>,
    ) -> Result<(), String> {
        let artifacts: HashSet<&ArtifactId> = file.component_to_artifact.values().collect();

        for relationship in &file.relationships {
            for endpoint in [&relationship.from, &relationship.to] {
                if !artifacts.contains(endpoint) {
                    return Err(format!(
                        "relationship {relationship} refers to unknown artifact {endpoint}"
                    ));
                }
            }
        }

        if let Some(id) = styles.keys().find(|id| !file.component_to_artifact.contains_key(*id)) {
            return Err(format!("styles recorded for unknown component {id}"));
        }

        if let Some(missing) = artifacts.iter().find(|a| !self.dir.join(a.as_str()).is_file()) {
            return Err(format!("artifact {missing} is missing from the cache directory"));
        }

        Ok(())
    }
}

fn checksum(bytes: &[u8]) -> String {
    format!("sha256:{}", hex::encode(Sha256::digest(bytes)))
}

fn corrupt(path: &Path, reason: String) -> StylegraphError {
    StylegraphError::SnapshotCorrupt {
        file: path.display().to_string(),
        reason,
    }
}
