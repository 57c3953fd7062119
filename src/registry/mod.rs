//! Component registry: component → artifact mapping plus the loaded-artifact cache.
//!
//! The registry records which compiled artifact currently belongs to each
//! component and loads artifacts on demand through a [`ModuleLoader`]. Loaded
//! values are cached by component together with a fingerprint (size and
//! modification time) of the artifact file; a changed fingerprint or an
//! explicit [`invalidate`](ComponentRegistry::invalidate) forces a reload.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::SystemTime;
use tracing::{debug, trace};

use crate::bundler::ModuleLoader;
use crate::core::{ArtifactId, ComponentId, StylegraphError};

/// Identity of an artifact file on disk at load time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Fingerprint {
    len: u64,
    modified: Option<SystemTime>,
}

impl Fingerprint {
    async fn of(path: &Path) -> Result<Self, StylegraphError> {
        let metadata = tokio::fs::metadata(path).await.map_err(|e| {
            StylegraphError::ArtifactLoadError {
                path: path.display().to_string(),
                reason: e.to_string(),
            }
        })?;
        Ok(Self {
            len: metadata.len(),
            modified: metadata.modified().ok(),
        })
    }
}

struct CachedArtifact<T> {
    artifact: ArtifactId,
    fingerprint: Fingerprint,
    value: Arc<T>,
}

/// Maps components to compiled artifacts and loads them.
pub struct ComponentRegistry<L: ModuleLoader> {
    loader: L,
    cache_dir: PathBuf,
    artifacts: BTreeMap<ComponentId, ArtifactId>,
    loaded: HashMap<ComponentId, CachedArtifact<L::Artifact>>,
    hits: usize,
    misses: usize,
}

impl<L: ModuleLoader> ComponentRegistry<L> {
    /// Create an empty registry resolving artifacts under `cache_dir`.
    pub fn new(loader: L, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            loader,
            cache_dir: cache_dir.into(),
            artifacts: BTreeMap::new(),
            loaded: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Directory artifact paths are resolved against.
    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// The loader used for cache misses.
    pub fn loader(&self) -> &L {
        &self.loader
    }

    /// Set or overwrite the artifact of `component`.
    ///
    /// A changed artifact drops the cached value of that component.
    pub fn record_artifact(&mut self, component: ComponentId, artifact: ArtifactId) {
        if self.artifacts.get(&component) != Some(&artifact) {
            self.loaded.remove(&component);
        }
        trace!("Registered {} -> {}", component, artifact);
        self.artifacts.insert(component, artifact);
    }

    /// Remove the mapping of `component`.
    pub fn remove(&mut self, component: &ComponentId) -> Option<ArtifactId> {
        self.loaded.remove(component);
        self.artifacts.remove(component)
    }

    /// The artifact currently mapped to `component`.
    pub fn artifact_for(&self, component: &ComponentId) -> Option<&ArtifactId> {
        self.artifacts.get(component)
    }

    /// The component an artifact belongs to.
    ///
    /// Artifact names are not guaranteed unique; the first component in
    /// identifier order wins.
    pub fn component_for(&self, artifact: &ArtifactId) -> Option<&ComponentId> {
        self.artifacts.iter().find(|(_, a)| *a == artifact).map(|(c, _)| c)
    }

    /// Absolute path of the compiled artifact for `component`.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::UnknownComponent`] when no artifact is mapped.
    pub fn resolve_artifact_path(&self, component: &ComponentId) -> Result<PathBuf, StylegraphError> {
        self.artifacts
            .get(component)
            .map(|artifact| self.cache_dir.join(artifact.as_str()))
            .ok_or_else(|| StylegraphError::UnknownComponent {
                id: component.to_string(),
            })
    }

    /// Load the compiled artifact of `component`.
    ///
    /// Returns the cached value when the artifact file is unchanged since it
    /// was last loaded. Loader errors propagate unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::UnknownComponent`] for unmapped components,
    /// [`StylegraphError::ArtifactLoadError`] when the artifact file is missing,
    /// or whatever the loader reports.
    pub async fn load_component(
        &mut self,
        component: &ComponentId,
    ) -> Result<Arc<L::Artifact>, StylegraphError> {
        let path = self.resolve_artifact_path(component)?;
        let artifact = self.artifacts.get(component).cloned().ok_or_else(|| {
            StylegraphError::UnknownComponent {
                id: component.to_string(),
            }
        })?;
        let fingerprint = Fingerprint::of(&path).await?;

        if let Some(cached) = self.loaded.get(component)
            && cached.artifact == artifact
            && cached.fingerprint == fingerprint
        {
            self.hits += 1;
            trace!("Artifact cache hit for {}", component);
            return Ok(Arc::clone(&cached.value));
        }

        self.misses += 1;
        debug!("Loading {} from {}", component, path.display());
        let value = Arc::new(self.loader.load(&path).await?);
        self.loaded.insert(
            component.clone(),
            CachedArtifact {
                artifact,
                fingerprint,
                value: Arc::clone(&value),
            },
        );
        Ok(value)
    }

    /// Drop the cached value of `component`. Returns whether one was cached.
    pub fn invalidate(&mut self, component: &ComponentId) -> bool {
        self.loaded.remove(component).is_some()
    }

    /// Drop every cached value.
    pub fn invalidate_all(&mut self) {
        if !self.loaded.is_empty() {
            debug!("Invalidating {} loaded artifacts", self.loaded.len());
        }
        self.loaded.clear();
    }

    /// Replace all mappings, dropping every cached value.
    pub fn restore(&mut self, artifacts: BTreeMap<ComponentId, ArtifactId>) {
        self.invalidate_all();
        self.artifacts = artifacts;
    }

    /// Clear mappings and cache.
    pub fn clear(&mut self) {
        self.restore(BTreeMap::new());
    }

    /// All mappings, sorted by component.
    pub fn mappings(&self) -> &BTreeMap<ComponentId, ArtifactId> {
        &self.artifacts
    }

    /// Number of mapped components.
    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    /// Whether no component is mapped.
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Cache hits and misses since creation.
    pub fn cache_stats(&self) -> (usize, usize) {
        (self.hits, self.misses)
    }
}
