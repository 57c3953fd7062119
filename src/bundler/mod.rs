//! Capability seams between the pipeline and the component toolchain.
//!
//! The pipeline never parses, bundles or renders components itself. It drives
//! three capabilities:
//!
//! - [`ComponentCompiler`] turns a set of source files into compiled artifacts,
//!   reporting style text through a [`StyleSink`] while it writes them.
//! - [`ModuleLoader`] loads one compiled artifact from the cache directory.
//! - [`ComponentRenderer`] turns a loaded artifact plus a [`RenderContext`] into markup.
//!
//! [`crate::sfc`] provides the bundled implementation of all three.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::core::{ArtifactId, StylegraphError};
use crate::utils::platform::clean_path;

/// One output chunk produced by [`ComponentCompiler::write`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactDescriptor {
    /// Absolute path of the originating source file. `None` for chunks that
    /// have no single source, such as shared runtime code.
    pub source: Option<PathBuf>,
    /// Output file name relative to the output directory.
    pub file_name: ArtifactId,
    /// File names of the chunks this chunk imports directly.
    pub imports: Vec<ArtifactId>,
    /// Set for compiler-internal chunks that never correspond to a component.
    #[serde(default)]
    pub intermediate: bool,
}

impl ArtifactDescriptor {
    /// Descriptor for a component chunk.
    pub fn component(source: impl Into<PathBuf>, file_name: impl Into<ArtifactId>) -> Self {
        Self {
            source: Some(source.into()),
            file_name: file_name.into(),
            imports: Vec::new(),
            intermediate: false,
        }
    }

    /// Descriptor for a compiler-internal chunk.
    pub fn intermediate(file_name: impl Into<ArtifactId>) -> Self {
        Self {
            source: None,
            file_name: file_name.into(),
            imports: Vec::new(),
            intermediate: true,
        }
    }

    /// Add direct imports.
    #[must_use]
    pub fn with_imports<I, A>(mut self, imports: I) -> Self
    where
        I: IntoIterator<Item = A>,
        A: Into<ArtifactId>,
    {
        self.imports.extend(imports.into_iter().map(Into::into));
        self
    }

    /// Whether this descriptor maps to a component.
    pub fn is_component(&self) -> bool {
        !self.intermediate && self.source.as_ref().is_some_and(|s| !s.as_os_str().is_empty())
    }
}

/// Receiver of style text reported while artifacts are written.
///
/// `source_id` is the absolute path of the owning source file, possibly with a
/// sub-resource query string appended.
pub trait StyleSink {
    /// Receive one block of raw style text.
    fn emit(&mut self, source_id: &str, css: &str);
}

impl StyleSink for Vec<(String, String)> {
    fn emit(&mut self, source_id: &str, css: &str) {
        self.push((source_id.to_string(), css.to_string()));
    }
}

/// Artifact names already owned by known components, keyed by absolute source path.
///
/// A compiler must give a listed source its existing name back, and must not
/// hand a listed name to any other source. This keeps every component on one
/// artifact no matter which subset of the project a pass compiles.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReservedNames {
    by_source: HashMap<PathBuf, ArtifactId>,
}

impl ReservedNames {
    /// No reservations; the compiler names everything from scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserve `artifact` for `source`.
    pub fn insert(&mut self, source: impl AsRef<Path>, artifact: ArtifactId) {
        self.by_source.insert(clean_path(source.as_ref()), artifact);
    }

    /// Name reserved for `source`.
    pub fn get(&self, source: &Path) -> Option<&ArtifactId> {
        self.by_source.get(&clean_path(source))
    }

    /// Whether `artifact` belongs to a source other than `source`.
    pub fn is_taken_by_other(&self, artifact: &ArtifactId, source: &Path) -> bool {
        let source = clean_path(source);
        self.by_source.iter().any(|(owner, name)| name == artifact && *owner != source)
    }

    /// Number of reserved names.
    pub fn len(&self) -> usize {
        self.by_source.len()
    }

    /// Whether nothing is reserved.
    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }
}

/// Compiles component sources into loadable artifacts.
///
/// Compilation is split into two phases. `compile` produces an in-memory
/// bundle; `write` materializes it under `out_dir` and returns one descriptor
/// per emitted chunk.
pub trait ComponentCompiler: Send + Sync {
    /// In-memory result of the compile phase.
    type Bundle: Send;

    /// Compile the given absolute source paths.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::CompileFailure`], with a location when one is known.
    fn compile(
        &self,
        files: &[PathBuf],
    ) -> impl std::future::Future<Output = Result<Self::Bundle, StylegraphError>> + Send;

    /// Write `bundle` under `out_dir`, reporting style blocks to `styles`.
    ///
    /// Sources listed in `reserved` keep their existing artifact names.
    fn write(
        &self,
        bundle: Self::Bundle,
        out_dir: &Path,
        reserved: &ReservedNames,
        styles: &mut (dyn StyleSink + Send),
    ) -> impl std::future::Future<Output = Result<Vec<ArtifactDescriptor>, StylegraphError>> + Send;
}

/// Loads compiled artifacts.
///
/// Implementations must not cache: the registry owns caching and
/// invalidation, and calls `load` again whenever a fresh value is required.
pub trait ModuleLoader: Send + Sync {
    /// Runtime value of a loaded artifact.
    type Artifact: Send + Sync;

    /// Load the artifact at the absolute path `path`.
    fn load(
        &self,
        path: &Path,
    ) -> impl std::future::Future<Output = Result<Self::Artifact, StylegraphError>> + Send;
}

/// Renders a loaded artifact into markup.
pub trait ComponentRenderer: Send + Sync {
    /// The artifact type this renderer understands.
    type Artifact: Send + Sync;

    /// Render `artifact` with `context`.
    ///
    /// Implementations must not keep state between calls: rendering the same
    /// artifact with the same context must produce identical output.
    fn render(
        &self,
        artifact: &Self::Artifact,
        context: &RenderContext,
    ) -> impl std::future::Future<Output = Result<String, StylegraphError>> + Send;
}

/// Metadata about the page being rendered.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageContext {
    /// Output URL of the page. Unknown during some early renders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Source path of the page template.
    #[serde(
        default,
        rename = "inputPath",
        skip_serializing_if = "Option::is_none"
    )]
    pub input_path: Option<String>,
    /// Any further page fields supplied by the host.
    #[serde(flatten)]
    pub extras: Map<String, Value>,
}

/// Everything one render call can see.
///
/// The context is passed explicitly into every render and exposed to nested
/// components by the renderer. Nothing is stored between renders.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderContext {
    /// Metadata of the current page
    pub page: PageContext,
    /// Data cascade for the root component, without the `page` key
    pub data: Map<String, Value>,
}

impl RenderContext {
    /// Build a context from host data.
    ///
    /// A `page` object inside `data` becomes [`RenderContext::page`]; the
    /// remaining keys form the data cascade. A non-object `data` yields an
    /// empty cascade.
    ///
    /// # Errors
    ///
    /// Returns [`StylegraphError::JsonError`] when `page` is present but is not
    /// a valid page object.
    pub fn from_data(data: Value) -> Result<Self, StylegraphError> {
        let mut data = match data {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        let page = match data.remove("page") {
            Some(page) => serde_json::from_value(page)?,
            None => PageContext::default(),
        };
        Ok(Self {
            page,
            data,
        })
    }

    /// Context for a page at `url` with no further data.
    pub fn for_url(url: impl Into<String>) -> Self {
        Self {
            page: PageContext {
                url: Some(url.into()),
                ..PageContext::default()
            },
            data: Map::new(),
        }
    }

    /// The page URL, if known and non-empty.
    pub fn url(&self) -> Option<&str> {
        self.page.url.as_deref().filter(|u| !u.is_empty())
    }

    /// `page` rendered as a JSON value.
    pub fn page_value(&self) -> Value {
        serde_json::to_value(&self.page).unwrap_or(Value::Null)
    }
}
