//! Loads compiled component artifacts.

use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use super::compiler::ArtifactFile;
use crate::bundler::ModuleLoader;
use crate::constants::MAX_COMPONENT_DEPTH;
use crate::core::{ArtifactId, StylegraphError};

/// A loaded component with its children resolved.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledComponent {
    /// Component name
    pub name: String,
    /// Artifact file name this component was loaded from
    pub artifact: ArtifactId,
    /// Template text
    pub template: String,
    /// Data defaults
    pub data: Map<String, Value>,
    /// Children keyed by the local name the template uses
    pub children: BTreeMap<String, CompiledComponent>,
}

impl CompiledComponent {
    /// Number of components in this tree, including the root.
    pub fn tree_size(&self) -> usize {
        1 + self.children.values().map(Self::tree_size).sum::<usize>()
    }
}

/// The bundled [`ModuleLoader`]: reads JSON artifacts and their children from disk.
///
/// Children are resolved relative to the directory of the artifact being
/// loaded. Import cycles and trees deeper than [`MAX_COMPONENT_DEPTH`] are
/// rejected.
#[derive(Debug, Clone, Default)]
pub struct ArtifactLoader;

impl ArtifactLoader {
    /// Create a loader.
    pub fn new() -> Self {
        Self
    }

    fn load_tree<'a>(
        &'a self,
        path: PathBuf,
        stack: Vec<ArtifactId>,
    ) -> Pin<Box<dyn Future<Output = Result<CompiledComponent, StylegraphError>> + Send + 'a>> {
        Box::pin(async move {
            let load_error = |reason: String| StylegraphError::ArtifactLoadError {
                path: path.display().to_string(),
                reason,
            };

            if stack.len() > MAX_COMPONENT_DEPTH {
                return Err(load_error(format!(
                    "component nesting deeper than {MAX_COMPONENT_DEPTH} levels"
                )));
            }

            let artifact = ArtifactId::new(
                path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default(),
            );
            if stack.contains(&artifact) {
                let chain: Vec<&str> = stack.iter().map(ArtifactId::as_str).collect();
                return Err(load_error(format!(
                    "circular component import: {} -> {}",
                    chain.join(" -> "),
                    artifact
                )));
            }

            let bytes = tokio::fs::read(&path).await.map_err(|e| load_error(e.to_string()))?;
            let file: ArtifactFile =
                serde_json::from_slice(&bytes).map_err(|e| load_error(e.to_string()))?;

            let dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
            let mut next_stack = stack;
            next_stack.push(artifact.clone());

            let mut children = BTreeMap::new();
            for (name, child_artifact) in &file.children {
                let child =
                    self.load_tree(dir.join(child_artifact.as_str()), next_stack.clone()).await?;
                children.insert(name.clone(), child);
            }

            Ok(CompiledComponent {
                name: file.name,
                artifact,
                template: file.template,
                data: file.data,
                children,
            })
        })
    }
}

impl ModuleLoader for ArtifactLoader {
    type Artifact = CompiledComponent;

    async fn load(&self, path: &Path) -> Result<CompiledComponent, StylegraphError> {
        self.load_tree(path.to_path_buf(), Vec::new()).await
    }
}
