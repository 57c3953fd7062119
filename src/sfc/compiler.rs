//! Single-file component compiler.
//!
//! Compiles `.vue`-style component files into JSON artifacts the
//! [`ArtifactLoader`](super::ArtifactLoader) understands. Imports are followed
//! transitively from the entry set, so compiling a page also recompiles every
//! component it pulls in. Component tags in a template are replaced by a
//! placeholder the renderer fills with the child's markup:
//!
//! ```text
//! <Child />            ->  {{ components.Child | safe }}
//! <Child></Child>      ->  {{ components.Child | safe }}
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};
use std::path::{Path, PathBuf};
use tera::Tera;
use tracing::{debug, trace};

use super::parser::{SfcDescriptor, SfcParser};
use crate::bundler::{ArtifactDescriptor, ComponentCompiler, ReservedNames, StyleSink};
use crate::constants::{ARTIFACT_EXTENSION, RUNTIME_CHUNK_NAME};
use crate::core::{ArtifactId, SourceLocation, StylegraphError};
use crate::utils::fs::{atomic_write_multiple, ensure_dir};
use crate::utils::platform::{clean_path, normalize_path_for_storage};

/// On-disk format of a compiled component.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArtifactFile {
    /// Component name (the source file stem)
    pub name: String,
    /// Normalized absolute path of the source file
    pub source: String,
    /// Template with component tags replaced by placeholders
    pub template: String,
    /// Data defaults from the script block
    #[serde(default)]
    pub data: Map<String, Value>,
    /// Child component name to artifact file name
    #[serde(default)]
    pub children: BTreeMap<String, ArtifactId>,
    /// Every chunk this artifact imports
    #[serde(default)]
    pub imports: Vec<ArtifactId>,
}

/// One compiled component held in a [`SfcBundle`].
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledModule {
    /// Absolute source path
    pub source: PathBuf,
    /// Component name (the source file stem)
    pub name: String,
    /// Rewritten template
    pub template: String,
    /// Data defaults
    pub data: Map<String, Value>,
    /// Imported children as (local name, absolute source path), in import order
    pub children: Vec<(String, PathBuf)>,
    /// Raw style blocks in source order
    pub styles: Vec<String>,
}

/// Result of [`SfcCompiler::compile`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SfcBundle {
    /// Compiled modules, entries first, then imports in discovery order
    pub modules: Vec<CompiledModule>,
}

impl SfcBundle {
    /// Number of compiled modules.
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether the bundle is empty.
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }
}

/// The bundled [`ComponentCompiler`].
#[derive(Debug, Clone)]
pub struct SfcCompiler {
    parser: SfcParser,
    extension: String,
    location_pattern: Regex,
}

impl SfcCompiler {
    /// Create a compiler for component files with `extension`.
    pub fn new(extension: &str) -> Result<Self, StylegraphError> {
        Ok(Self {
            parser: SfcParser::new()?,
            extension: format!(".{}", extension.trim_start_matches('.')).to_ascii_lowercase(),
            location_pattern: Regex::new(r"(\d+):(\d+)").map_err(|e| StylegraphError::Other {
                message: format!("Invalid location pattern: {e}"),
            })?,
        })
    }

    /// Compile one source file that has already been read.
    ///
    /// Returns the module and the absolute paths of its imports together with
    /// the location of each import statement.
    pub fn compile_source(
        &self,
        path: &Path,
        source: &str,
    ) -> Result<(CompiledModule, Vec<(PathBuf, SourceLocation)>), StylegraphError> {
        let file = normalize_path_for_storage(path);
        let descriptor = self.parser.parse(&file, source)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));

        let mut children = Vec::new();
        let mut imports = Vec::new();
        for import in &descriptor.imports {
            let location = SourceLocation::from_offset(&file, source, import.offset);
            if !import.specifier.to_ascii_lowercase().ends_with(&self.extension) {
                return Err(StylegraphError::compile_at(
                    format!(
                        "Unsupported import '{}': only {} components can be imported",
                        import.specifier, self.extension
                    ),
                    location,
                ));
            }
            let child = clean_path(&base.join(&import.specifier));
            children.push((import.name.clone(), child.clone()));
            imports.push((child, location));
        }

        let template = self.rewrite_template(&file, source, &descriptor)?;
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();

        Ok((
            CompiledModule {
                source: path.to_path_buf(),
                name,
                template,
                data: descriptor.data,
                children,
                styles: descriptor.styles.into_iter().map(|block| block.content).collect(),
            },
            imports,
        ))
    }

    /// Replace component tags and check the result parses as a Tera template.
    fn rewrite_template(
        &self,
        file: &str,
        source: &str,
        descriptor: &SfcDescriptor,
    ) -> Result<String, StylegraphError> {
        let Some(block) = &descriptor.template else {
            return Ok(String::new());
        };

        let mut template = block.content.trim().to_string();
        for import in &descriptor.imports {
            let name = regex::escape(&import.name);
            let tag = Regex::new(&format!(
                r"<{name}(?:\s[^>]*)?/>|<{name}(?:\s[^>]*)?>\s*</{name}\s*>"
            ))
            .map_err(|e| StylegraphError::compile(format!("Invalid component name '{}': {e}", import.name)))?;
            let placeholder = format!("{{{{ components.{} | safe }}}}", import.name);
            template = tag.replace_all(&template, regex::NoExpand(&placeholder)).into_owned();
        }

        let mut tera = Tera::default();
        if let Err(e) = tera.add_raw_template("template.html", &template) {
            let message = tera_error_message(&e);
            let leading = block.content.len() - block.content.trim_start().len();
            let block_start = SourceLocation::from_offset(file, source, block.offset + leading);
            let location = self
                .tera_location(&e)
                .map(|(line, column)| {
                    let column = if line == 1 {
                        block_start.column + column - 1
                    } else {
                        column
                    };
                    SourceLocation::new(file, block_start.line + line - 1, column)
                })
                .unwrap_or(block_start);
            return Err(StylegraphError::compile_at(message, location));
        }

        Ok(template)
    }

    /// Line and column reported by a Tera parse error.
    fn tera_location(&self, error: &tera::Error) -> Option<(usize, usize)> {
        let text = format!("{error:?}");
        let caps = self.location_pattern.captures(&text)?;
        let line = caps.get(1)?.as_str().parse::<usize>().ok()?;
        let column = caps.get(2)?.as_str().parse::<usize>().ok()?;
        (line > 0 && column > 0).then_some((line, column))
    }

    /// Assign artifact names.
    ///
    /// A source with a reserved name keeps it. Any other source gets
    /// `<stem>.json`, or `<stem>-<hash>.json` when its stem is shared within
    /// the bundle or the plain name belongs to another source.
    fn artifact_names(bundle: &SfcBundle, reserved: &ReservedNames) -> HashMap<PathBuf, ArtifactId> {
        let mut stems: HashMap<&str, usize> = HashMap::new();
        for module in &bundle.modules {
            *stems.entry(module.name.as_str()).or_default() += 1;
        }

        bundle
            .modules
            .iter()
            .map(|module| {
                if let Some(existing) = reserved.get(&module.source) {
                    return (module.source.clone(), existing.clone());
                }

                let plain = ArtifactId::new(format!("{}.{ARTIFACT_EXTENSION}", module.name));
                let shared_stem = stems.get(module.name.as_str()).copied().unwrap_or(0) > 1;
                let name = if shared_stem || reserved.is_taken_by_other(&plain, &module.source) {
                    let digest = Sha256::digest(normalize_path_for_storage(&module.source).as_bytes());
                    let short = hex::encode(digest);
                    ArtifactId::new(format!("{}-{}.{ARTIFACT_EXTENSION}", module.name, &short[..8]))
                } else {
                    plain
                };
                (module.source.clone(), name)
            })
            .collect()
    }
}

impl ComponentCompiler for SfcCompiler {
    type Bundle = SfcBundle;

    async fn compile(&self, files: &[PathBuf]) -> Result<SfcBundle, StylegraphError> {
        let mut queue: VecDeque<PathBuf> = files.iter().map(|f| clean_path(f)).collect();
        let mut seen = HashSet::new();
        let mut bundle = SfcBundle::default();

        debug!("Compiling {} entry components", queue.len());

        while let Some(path) = queue.pop_front() {
            if !seen.insert(path.clone()) {
                continue;
            }

            let source = tokio::fs::read_to_string(&path).await.map_err(|e| {
                StylegraphError::compile(format!("Failed to read {}: {e}", path.display()))
            })?;
            let (module, imports) = self.compile_source(&path, &source)?;
            trace!("Compiled {} ({} imports, {} styles)", path.display(), imports.len(), module.styles.len());

            for (child, location) in imports {
                if !tokio::fs::try_exists(&child).await.unwrap_or(false) {
                    return Err(StylegraphError::compile_at(
                        format!("Imported component not found: {}", child.display()),
                        location,
                    ));
                }
                if !seen.contains(&child) {
                    queue.push_back(child);
                }
            }

            bundle.modules.push(module);
        }

        debug!("Compiled {} components", bundle.len());
        Ok(bundle)
    }

    async fn write(
        &self,
        bundle: SfcBundle,
        out_dir: &Path,
        reserved: &ReservedNames,
        styles: &mut (dyn StyleSink + Send),
    ) -> Result<Vec<ArtifactDescriptor>, StylegraphError> {
        ensure_dir(out_dir).map_err(|e| StylegraphError::FileSystemError {
            operation: format!("create output directory ({e:#})"),
            path: out_dir.display().to_string(),
        })?;

        let names = Self::artifact_names(&bundle, reserved);
        let runtime = ArtifactId::new(RUNTIME_CHUNK_NAME);
        let mut files = Vec::with_capacity(bundle.len() + 1);
        let mut descriptors = Vec::with_capacity(bundle.len() + 1);

        for module in bundle.modules {
            let source_id = normalize_path_for_storage(&module.source);
            for (index, css) in module.styles.iter().enumerate() {
                styles.emit(&format!("{source_id}?vue&type=style&index={index}&lang.css"), css);
            }

            let artifact = names.get(&module.source).cloned().ok_or_else(|| StylegraphError::Other {
                message: format!("No artifact name assigned to {}", module.source.display()),
            })?;

            let mut children = BTreeMap::new();
            let mut imports: Vec<ArtifactId> = Vec::new();
            for (name, child) in &module.children {
                let child_artifact = names.get(child).cloned().ok_or_else(|| StylegraphError::Other {
                    message: format!("Imported component was not compiled: {}", child.display()),
                })?;
                if !imports.contains(&child_artifact) {
                    imports.push(child_artifact.clone());
                }
                children.insert(name.clone(), child_artifact);
            }
            imports.push(runtime.clone());

            let file = ArtifactFile {
                name: module.name,
                source: source_id,
                template: module.template,
                data: module.data,
                children,
                imports: imports.clone(),
            };
            files.push((out_dir.join(artifact.as_str()), serde_json::to_vec_pretty(&file)?));
            descriptors.push(ArtifactDescriptor::component(module.source, artifact).with_imports(imports));
        }

        let runtime_file = serde_json::json!({ "runtime": "stylegraph-sfc", "version": 1 });
        files.push((out_dir.join(RUNTIME_CHUNK_NAME), serde_json::to_vec_pretty(&runtime_file)?));
        descriptors.push(ArtifactDescriptor::intermediate(runtime));

        atomic_write_multiple(&files).await.map_err(|e| StylegraphError::FileSystemError {
            operation: format!("write compiled artifacts ({e:#})"),
            path: out_dir.display().to_string(),
        })?;

        debug!("Wrote {} artifacts to {}", descriptors.len(), out_dir.display());
        Ok(descriptors)
    }
}

/// Flatten a Tera error and its sources into one message.
pub(crate) fn tera_error_message(error: &tera::Error) -> String {
    let mut parts = vec![error.to_string()];
    let mut source = std::error::Error::source(error);
    while let Some(cause) = source {
        parts.push(cause.to_string());
        source = cause.source();
    }
    parts.join(": ")
}
