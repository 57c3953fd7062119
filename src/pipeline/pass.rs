//! One build pass: compile, then write.
//!
//! A [`BuildPass`] owns the file set and the compiled bundle between the two
//! compiler phases. Writing consumes the bundle, so a pass that was never
//! compiled, or is written twice, fails with [`StylegraphError::MissingBundle`].

use indexmap::IndexMap;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, trace};

use super::discovery::FileSet;
use crate::bundler::{ArtifactDescriptor, ComponentCompiler, ReservedNames, StyleSink};
use crate::core::{ComponentId, PathNormalizer, StylegraphError};

/// Progress of a [`BuildPass`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassPhase {
    /// Files are known, nothing compiled yet
    Discovered,
    /// A bundle is held and ready to be written
    Compiled,
    /// Artifacts were written
    Written,
}

/// State of one build pass.
pub struct BuildPass<C: ComponentCompiler> {
    files: FileSet,
    bundle: Option<C::Bundle>,
    phase: PassPhase,
}

impl<C: ComponentCompiler> BuildPass<C> {
    /// Start a pass over `files`.
    pub fn new(files: FileSet) -> Self {
        Self {
            files,
            bundle: None,
            phase: PassPhase::Discovered,
        }
    }

    /// The candidate files.
    pub fn files(&self) -> &FileSet {
        &self.files
    }

    /// Whether the pass covers only part of the project.
    pub fn is_partial(&self) -> bool {
        self.files.partial
    }

    /// Current phase.
    pub fn phase(&self) -> PassPhase {
        self.phase
    }

    /// Run the compile phase over the file set.
    pub async fn compile(&mut self, compiler: &C) -> Result<(), StylegraphError> {
        debug!("Compiling {} component files", self.files.len());
        let bundle = compiler.compile(&self.files.files).await?;
        self.bundle = Some(bundle);
        self.phase = PassPhase::Compiled;
        Ok(())
    }

    /// Write the compiled bundle into `out_dir`, keeping the `reserved` names.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::MissingBundle`] when no bundle is held.
    pub async fn write(
        &mut self,
        compiler: &C,
        out_dir: &Path,
        reserved: &ReservedNames,
        styles: &mut (dyn StyleSink + Send),
    ) -> Result<Vec<ArtifactDescriptor>, StylegraphError> {
        let bundle = self.bundle.take().ok_or(StylegraphError::MissingBundle)?;
        let descriptors = compiler.write(bundle, out_dir, reserved, styles).await?;
        self.phase = PassPhase::Written;
        debug!("Compiler emitted {} chunks", descriptors.len());
        Ok(descriptors)
    }
}

/// Style sink that buffers fragments per component until the pass materializes.
///
/// Style ids reported by the compiler are normalized to [`ComponentId`]s, so
/// every sub-resource of one source file lands in the same list, in emit order.
#[derive(Debug)]
pub struct BufferedStyleSink<'a> {
    normalizer: &'a PathNormalizer,
    styles: IndexMap<ComponentId, Vec<String>>,
}

impl<'a> BufferedStyleSink<'a> {
    /// Create an empty sink.
    pub fn new(normalizer: &'a PathNormalizer) -> Self {
        Self {
            normalizer,
            styles: IndexMap::new(),
        }
    }

    /// Remove and return the buffered fragments of `id`.
    pub fn take(&mut self, id: &ComponentId) -> Vec<String> {
        self.styles.shift_remove(id).unwrap_or_default()
    }

    /// Components that still have buffered fragments.
    pub fn pending(&self) -> impl Iterator<Item = &ComponentId> {
        self.styles.keys()
    }
}

impl StyleSink for BufferedStyleSink<'_> {
    fn emit(&mut self, source_id: &str, css: &str) {
        let id = self.normalizer.to_component_id(source_id);
        trace!("Buffered {} bytes of CSS for {}", css.len(), id);
        self.styles.entry(id).or_default().push(css.to_string());
    }
}

/// Summary of a finished pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BuildReport {
    /// Candidate files handed to the compiler
    pub files: usize,
    /// Components materialized by this pass
    pub components: usize,
    /// Chunks the compiler emitted, intermediates included
    pub artifacts: usize,
    /// Relationships recorded by this pass
    pub relationships: usize,
    /// Deleted components dropped by this pass
    pub removed: usize,
    /// Whether the pass covered only part of the project
    pub partial: bool,
    /// Whether state came from a snapshot instead of the compiler
    pub restored: bool,
    /// Whether a snapshot was written
    pub snapshot_written: bool,
}

impl BuildReport {
    /// Whether the pass did nothing.
    pub fn is_noop(&self) -> bool {
        self.files == 0 && self.removed == 0 && !self.restored
    }
}
