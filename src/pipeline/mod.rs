//! Build orchestration.
//!
//! A [`Pipeline`] owns every piece of build state (registry, CSS store, import
//! graph, relationship list and CSS aggregator) and drives build passes over
//! it:
//!
//! 1. **Discover**: an override list, the pending watch-mode changes, or a full
//!    search of the project directories.
//! 2. **Compile** and write through the [`ComponentCompiler`], buffering style
//!    text per component.
//! 3. **Materialize**: record artifacts, install buffered CSS with one
//!    replace per component and record import relationships.
//! 4. **Persist** a snapshot after full passes when the snapshot mode writes.
//!
//! Initialization may instead **restore** a snapshot and skip compilation.
//!
//! Every mutating operation takes `&mut self`, so a render can never observe a
//! half-materialized pass. When a pass fails, state is left as it was at the
//! point of failure; run a full [`build`](Pipeline::build) before relying on
//! it again.
//!
//! # Example
//!
//! ```rust,no_run
//! use stylegraph::config::PluginOptions;
//! use stylegraph::pipeline::SfcPipeline;
//! use serde_json::json;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let mut pipeline = SfcPipeline::with_options(PluginOptions::default(), "/site")?;
//! pipeline.init().await?;
//!
//! let html = pipeline.render_page("./index.vue", json!({ "page": { "url": "/" } })).await?;
//! let css = pipeline.css_for_url("/");
//! # Ok(())
//! # }
//! ```

mod discovery;
mod pass;
mod snapshot;

pub use discovery::{ComponentDiscovery, FileSet};
pub use pass::{BufferedStyleSink, BuildPass, BuildReport, PassPhase};
pub use snapshot::{BuildSnapshot, SnapshotStore};

use anyhow::{Context, Result};
use indexmap::IndexSet;
use serde_json::Value;
use std::collections::{BTreeSet, HashSet};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::bundler::{
    ArtifactDescriptor, ComponentCompiler, ComponentRenderer, ModuleLoader, RenderContext, ReservedNames,
};
use crate::config::{PluginOptions, ProjectDirs};
use crate::core::{ArtifactId, ComponentId, PathNormalizer, StylegraphError};
use crate::css::{CssAggregator, CssStore};
use crate::graph::{DependencyGraph, Relationship};
use crate::registry::ComponentRegistry;
use crate::sfc::{ArtifactLoader, HelperRegistry, SfcCompiler, TeraRenderer};

/// Pipeline over the bundled single-file component toolchain.
pub type SfcPipeline = Pipeline<SfcCompiler, ArtifactLoader, TeraRenderer>;

/// Build state plus the capabilities that produce and consume it.
pub struct Pipeline<C, L, R>
where
    C: ComponentCompiler,
    L: ModuleLoader,
    R: ComponentRenderer<Artifact = L::Artifact>,
{
    options: PluginOptions,
    normalizer: PathNormalizer,
    discovery: ComponentDiscovery,
    snapshots: SnapshotStore,
    compiler: C,
    renderer: R,
    registry: ComponentRegistry<L>,
    css: CssStore,
    graph: DependencyGraph,
    relationships: IndexSet<Relationship>,
    aggregator: CssAggregator,
    pending_changes: Option<Vec<PathBuf>>,
}

impl SfcPipeline {
    /// Pipeline using the bundled compiler, loader and renderer with the
    /// default helper filters.
    pub fn with_options(options: PluginOptions, working_dir: impl Into<PathBuf>) -> Result<Self> {
        let compiler = SfcCompiler::new(&options.extension)?;
        let renderer = TeraRenderer::new(HelperRegistry::new().with_defaults());
        Self::new(options, working_dir, compiler, ArtifactLoader::new(), renderer)
    }
}

impl<C, L, R> Pipeline<C, L, R>
where
    C: ComponentCompiler,
    L: ModuleLoader,
    R: ComponentRenderer<Artifact = L::Artifact>,
{
    /// Create a pipeline rooted at `working_dir`.
    ///
    /// # Errors
    ///
    /// Fails when the options are invalid or an ignore pattern does not parse.
    pub fn new(
        options: PluginOptions,
        working_dir: impl Into<PathBuf>,
        compiler: C,
        loader: L,
        renderer: R,
    ) -> Result<Self> {
        options.validate()?;

        let dirs = ProjectDirs::resolve(working_dir, &options);
        let normalizer = PathNormalizer::new(&dirs.working_dir, &options.extension);
        let mut discovery = ComponentDiscovery::new(dirs.clone(), &options.extension)?;
        discovery.add_ignores(&options.ignores)?;

        debug!(
            "Pipeline rooted at {} (cache {})",
            dirs.working_dir.display(),
            dirs.cache_dir.display()
        );

        Ok(Self {
            snapshots: SnapshotStore::new(&dirs.cache_dir),
            registry: ComponentRegistry::new(loader, &dirs.cache_dir),
            aggregator: CssAggregator::new(options.transitive_css),
            options,
            normalizer,
            discovery,
            compiler,
            renderer,
            css: CssStore::new(),
            graph: DependencyGraph::new(),
            relationships: IndexSet::new(),
            pending_changes: None,
        })
    }

    /// Merge host ignore globs into discovery.
    pub fn add_ignores<I, S>(&mut self, patterns: I) -> Result<(), StylegraphError>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.discovery.add_ignores(patterns)
    }

    /// Record a host change notification for the next pass.
    ///
    /// Only component files are kept. Returns the kept files. Notifications
    /// accumulate until a pass consumes them.
    pub fn files_changed(&mut self, paths: &[PathBuf]) -> Vec<PathBuf> {
        let changed = self.discovery.filter_changed(paths);
        let pending = self.pending_changes.get_or_insert_with(Vec::new);
        for path in &changed {
            if !pending.contains(path) {
                pending.push(path.clone());
            }
        }
        debug!("{} changed component files pending", pending.len());
        changed
    }

    /// Components that need re-rendering when `paths` change: the changed
    /// components themselves plus every component importing them, directly or
    /// not. Sorted by identifier.
    pub fn affected_components(&self, paths: &[PathBuf]) -> Vec<ComponentId> {
        let mut affected = BTreeSet::new();
        for path in self.discovery.filter_changed(paths) {
            let id = self.normalizer.to_component_id(&path);
            if let Some(artifact) = self.registry.artifact_for(&id) {
                for ancestor in self.graph.ancestors_of(artifact) {
                    if let Some(component) = self.registry.component_for(&ancestor) {
                        affected.insert(component.clone());
                    }
                }
            }
            affected.insert(id);
        }
        affected.into_iter().collect()
    }

    /// Bring state up to date for the first time.
    ///
    /// In snapshot read mode a valid snapshot is restored; a corrupt one is
    /// reported and replaced by a full build. Otherwise a full build runs.
    pub async fn init(&mut self) -> Result<BuildReport> {
        if self.options.snapshot.reads() {
            match self.restore_snapshot().await {
                Ok(Some(report)) => return Ok(report),
                Ok(None) => debug!("No snapshot found, running a full build"),
                Err(e @ StylegraphError::SnapshotCorrupt { .. }) => {
                    warn!("{e}; falling back to a full build");
                }
                Err(e) => return Err(e.into()),
            }
        }
        self.pending_changes = None;
        self.build(None).await
    }

    /// Run one build pass.
    ///
    /// `files` overrides discovery with an explicit subset. Without it, pending
    /// watch-mode changes are built as a partial pass, or the whole project is
    /// searched. An empty candidate set completes as a no-op.
    ///
    /// Files of a partial pass that no longer exist are dropped from state
    /// instead of compiled. Recompiled components keep their artifact names.
    ///
    /// # Errors
    ///
    /// Compile failures abort the pass and are returned with their location.
    pub async fn build(&mut self, files: Option<Vec<PathBuf>>) -> Result<BuildReport> {
        let mut file_set = self.discover(files);
        let removed = if file_set.partial {
            let missing = file_set.take_missing();
            self.remove_components(&missing).await
        } else {
            0
        };
        if file_set.is_empty() {
            if removed == 0 {
                debug!("No component files to build, keeping current state");
            } else {
                info!("Removed {} deleted components", removed);
            }
            return Ok(BuildReport {
                partial: file_set.partial,
                removed,
                ..BuildReport::default()
            });
        }

        let reserved = if file_set.partial {
            self.reserved_names()
        } else {
            ReservedNames::new()
        };
        let mut pass = BuildPass::<C>::new(file_set);
        pass.compile(&self.compiler)
            .await
            .with_context(|| format!("Build pass over {} files failed", pass.files().len()))?;

        let cache_dir = self.registry.cache_dir().to_path_buf();
        let (descriptors, styles) = {
            let mut sink = BufferedStyleSink::new(&self.normalizer);
            let descriptors = pass
                .write(&self.compiler, &cache_dir, &reserved, &mut sink)
                .await
                .with_context(|| format!("Failed to write artifacts to {}", cache_dir.display()))?;
            let styles = Self::drain_styles(&mut sink, &descriptors, &self.normalizer);
            (descriptors, styles)
        };

        let mut report = self.materialize(&descriptors, styles, pass.is_partial());
        report.files = pass.files().len();
        report.removed = removed;

        if self.options.snapshot.writes() && !report.partial {
            self.snapshots
                .save(&self.snapshot())
                .await
                .context("Failed to persist build snapshot")?;
            report.snapshot_written = true;
        }

        info!(
            "Built {} components ({} relationships){}",
            report.components,
            report.relationships,
            if report.partial { " in a partial pass" } else { "" }
        );
        Ok(report)
    }

    fn discover(&mut self, files: Option<Vec<PathBuf>>) -> FileSet {
        if let Some(files) = files {
            let working_dir = &self.discovery.dirs().working_dir;
            let absolute = files.into_iter().map(|f| {
                if f.is_absolute() {
                    f
                } else {
                    working_dir.join(f)
                }
            });
            return FileSet::partial(absolute);
        }
        if let Some(changed) = self.pending_changes.take() {
            debug!("Building {} changed files", changed.len());
            return FileSet::partial(changed);
        }
        let set = FileSet::full(self.discovery.discover());
        debug!("Discovered {} component files", set.len());
        set
    }

    /// Pull the buffered CSS of every emitted component out of the sink.
    fn drain_styles(
        sink: &mut BufferedStyleSink<'_>,
        descriptors: &[ArtifactDescriptor],
        normalizer: &PathNormalizer,
    ) -> Vec<(ComponentId, Vec<String>)> {
        let styles = descriptors
            .iter()
            .filter(|d| d.is_component())
            .filter_map(|d| d.source.as_ref())
            .map(|source| {
                let id = normalizer.to_component_id(source);
                let fragments = sink.take(&id);
                (id, fragments)
            })
            .collect();
        for orphan in sink.pending() {
            warn!("Discarding CSS for {}: the compiler emitted no artifact for it", orphan);
        }
        styles
    }

    fn materialize(
        &mut self,
        descriptors: &[ArtifactDescriptor],
        styles: Vec<(ComponentId, Vec<String>)>,
        partial: bool,
    ) -> BuildReport {
        let components: Vec<(ComponentId, &ArtifactDescriptor)> = descriptors
            .iter()
            .filter(|d| d.is_component())
            .filter_map(|d| d.source.as_ref().map(|s| (self.normalizer.to_component_id(s), d)))
            .collect();

        if partial {
            for (id, _) in &components {
                self.forget_component(id);
            }
        } else {
            self.css.reset_all();
            self.registry.clear();
            self.graph.clear();
            self.relationships.clear();
            self.aggregator.reset();
        }

        for (id, descriptor) in &components {
            self.registry.record_artifact(id.clone(), descriptor.file_name.clone());
            self.graph.ensure_node(&descriptor.file_name);
        }

        for (id, fragments) in styles {
            self.css.replace(&id, fragments);
            if let Some(artifact) = self.registry.artifact_for(&id) {
                self.aggregator.set_component_code(artifact, self.css.raw(&id));
            }
        }

        let intermediates: HashSet<&ArtifactId> =
            descriptors.iter().filter(|d| !d.is_component()).map(|d| &d.file_name).collect();
        let mut recorded = 0;
        for (_, descriptor) in &components {
            let from = &descriptor.file_name;
            for to in &descriptor.imports {
                if to == from || intermediates.contains(to) {
                    continue;
                }
                if self.record_relationship(Relationship::new(from.clone(), to.clone())) {
                    recorded += 1;
                }
            }
        }

        debug!("Materialized {} components from {} chunks", components.len(), descriptors.len());
        BuildReport {
            components: components.len(),
            artifacts: descriptors.len(),
            relationships: recorded,
            partial,
            ..BuildReport::default()
        }
    }

    /// Drop everything a recompiled component previously contributed.
    ///
    /// Relationships pointing at the component from elsewhere are kept. Loaded
    /// importers embed the old tree, so their cached values are dropped too.
    fn forget_component(&mut self, id: &ComponentId) {
        self.css.reset_one(id);
        self.registry.invalidate(id);
        let Some(old) = self.registry.artifact_for(id).cloned() else {
            return;
        };
        let importers: Vec<ComponentId> = self
            .graph
            .ancestors_of(&old)
            .iter()
            .filter_map(|a| self.registry.component_for(a).cloned())
            .collect();
        for importer in &importers {
            self.registry.invalidate(importer);
        }
        let removed = self.graph.remove_outgoing(&old);
        self.relationships.retain(|r| r.from != old);
        self.aggregator.forget_artifact(&old);
        debug!("Invalidated {} ({} import edges dropped)", id, removed);
    }

    /// Artifact names already handed out, keyed by absolute source path.
    fn reserved_names(&self) -> ReservedNames {
        let mut reserved = ReservedNames::new();
        for (id, artifact) in self.registry.mappings() {
            reserved.insert(self.normalizer.to_absolute(id), artifact.clone());
        }
        reserved
    }

    /// Drop deleted component files from state and the cache directory.
    ///
    /// Unregistered paths are skipped. Returns the number of components removed.
    async fn remove_components(&mut self, missing: &[PathBuf]) -> usize {
        let mut removed = 0;
        for path in missing {
            let id = self.normalizer.to_component_id(path);
            if self.registry.artifact_for(&id).is_none() {
                debug!("{} is gone and was never built, skipping", path.display());
                continue;
            }
            self.forget_component(&id);
            let Some(artifact) = self.registry.remove(&id) else {
                continue;
            };

            let stale = self.registry.cache_dir().join(artifact.as_str());
            match tokio::fs::remove_file(&stale).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => warn!("Failed to remove stale artifact {}: {}", stale.display(), e),
            }
            info!("Removed deleted component {} ({})", id, artifact);
            removed += 1;
        }
        removed
    }

    fn record_relationship(&mut self, relationship: Relationship) -> bool {
        self.graph.add_edge(&relationship.from, &relationship.to);
        self.aggregator.add_relationship(&relationship.from, &relationship.to);
        self.relationships.insert(relationship)
    }

    /// Current state as a persistable snapshot.
    pub fn snapshot(&self) -> BuildSnapshot {
        BuildSnapshot {
            component_to_artifact: self.registry.mappings().clone(),
            relationships: self.relationships.iter().cloned().collect(),
            styles: self.css.snapshot(),
        }
    }

    /// Replace all state with the persisted snapshot.
    ///
    /// Returns `None` when no snapshot exists, leaving state untouched.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::SnapshotCorrupt`] for an unusable snapshot;
    /// state is untouched in that case too.
    pub async fn restore_snapshot(&mut self) -> Result<Option<BuildReport>, StylegraphError> {
        let Some(snapshot) = self.snapshots.load().await? else {
            return Ok(None);
        };
        Ok(Some(self.apply_snapshot(snapshot)))
    }

    /// Replace all state with `snapshot`, as if a full pass had produced it.
    pub fn apply_snapshot(&mut self, snapshot: BuildSnapshot) -> BuildReport {
        self.css.restore(snapshot.styles);
        self.registry.restore(snapshot.component_to_artifact);
        self.graph.clear();
        self.relationships.clear();
        self.aggregator.reset();

        for (id, artifact) in self.registry.mappings() {
            self.graph.ensure_node(artifact);
            self.aggregator.set_component_code(artifact, self.css.raw(id));
        }
        let mut recorded = 0;
        for relationship in snapshot.relationships {
            if self.record_relationship(relationship) {
                recorded += 1;
            }
        }

        info!("Restored {} components from snapshot", self.registry.len());
        BuildReport {
            components: self.registry.len(),
            artifacts: self.registry.len(),
            relationships: recorded,
            restored: true,
            ..BuildReport::default()
        }
    }

    /// Resolve a page path (absolute, or relative to the working directory) to
    /// its component identifier.
    pub fn component_id(&self, input_path: impl AsRef<Path>) -> ComponentId {
        self.normalizer.to_component_id(input_path)
    }

    /// Register `component` as rendered directly on `url` without rendering it.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::UnknownComponent`] for unregistered components.
    pub fn use_component(
        &mut self,
        input_path: impl AsRef<Path>,
        url: Option<&str>,
    ) -> Result<ArtifactId, StylegraphError> {
        let id = self.component_id(input_path);
        let artifact = self.registry.artifact_for(&id).cloned().ok_or_else(|| {
            StylegraphError::UnknownComponent {
                id: id.to_string(),
            }
        })?;
        self.aggregator.record_usage(&artifact, url);
        Ok(artifact)
    }

    /// Render the page component at `input_path` with host `data`.
    ///
    /// Once rendering succeeds the component is registered against
    /// `data.page.url` (when present), so [`css_for_url`](Self::css_for_url)
    /// includes its CSS. A failed render records nothing.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::UnknownComponent`] for unregistered
    /// components, and load or render failures unchanged.
    pub async fn render_page(
        &mut self,
        input_path: impl AsRef<Path>,
        data: Value,
    ) -> Result<String, StylegraphError> {
        let context = RenderContext::from_data(data)?;
        let id = self.component_id(input_path);
        let artifact = self.registry.artifact_for(&id).cloned().ok_or_else(|| {
            StylegraphError::UnknownComponent {
                id: id.to_string(),
            }
        })?;
        debug!("Rendering {} ({})", id, artifact);

        let component = self.registry.load_component(&id).await?;
        let html = self.renderer.render(&component, &context).await?;
        self.aggregator.record_usage(&artifact, context.url());
        Ok(html)
    }

    /// Aggregated CSS for the page at `url`. Unknown URLs yield `""`.
    pub fn css_for_url(&self, url: &str) -> String {
        self.aggregator.render(url)
    }

    /// Components that depend on `input_path`, directly or not. Sorted.
    pub fn dependants_of(&self, input_path: impl AsRef<Path>) -> Result<Vec<ComponentId>, StylegraphError> {
        let id = self.component_id(input_path);
        let artifact = self.registry.artifact_for(&id).ok_or_else(|| StylegraphError::UnknownComponent {
            id: id.to_string(),
        })?;
        let dependants: BTreeSet<ComponentId> = self
            .graph
            .ancestors_of(artifact)
            .iter()
            .filter_map(|a| self.registry.component_for(a).cloned())
            .collect();
        Ok(dependants.into_iter().collect())
    }

    /// Import tree of `input_path` as indented text.
    pub fn import_tree(&self, input_path: impl AsRef<Path>) -> Result<String, StylegraphError> {
        let id = self.component_id(input_path);
        let artifact = self.registry.artifact_for(&id).ok_or_else(|| StylegraphError::UnknownComponent {
            id: id.to_string(),
        })?;
        Ok(self.graph.to_tree_string(artifact))
    }

    /// Options the pipeline was created with.
    pub fn options(&self) -> &PluginOptions {
        &self.options
    }

    /// Resolved project directories.
    pub fn dirs(&self) -> &ProjectDirs {
        self.discovery.dirs()
    }

    /// Path normalizer for this project.
    pub fn normalizer(&self) -> &PathNormalizer {
        &self.normalizer
    }

    /// Raw CSS fragments per component.
    pub fn css_store(&self) -> &CssStore {
        &self.css
    }

    /// Page usage and per-artifact CSS.
    pub fn aggregator(&self) -> &CssAggregator {
        &self.aggregator
    }

    /// Import graph over artifacts.
    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Component to artifact registry.
    pub fn registry(&self) -> &ComponentRegistry<L> {
        &self.registry
    }

    /// Recorded relationships, oldest first.
    pub fn relationships(&self) -> impl Iterator<Item = &Relationship> {
        self.relationships.iter()
    }

    /// Changed files waiting for the next pass.
    pub fn pending_changes(&self) -> &[PathBuf] {
        self.pending_changes.as_deref().unwrap_or_default()
    }

    /// Snapshot persistence for this project.
    pub fn snapshots(&self) -> &SnapshotStore {
        &self.snapshots
    }
}
