//! Constants shared across the pipeline.
//!
//! Default directory names, snapshot file names and the identifiers used by
//! the bundled single-file component toolchain live here so the magic strings
//! are discoverable in one place.

/// Default component file extension (without the dot).
pub const DEFAULT_EXTENSION: &str = "vue";

/// Default cache directory for compiled artifacts, relative to the working directory.
pub const DEFAULT_CACHE_DIRECTORY: &str = ".cache/vue/";

/// Default includes directory, relative to the input directory.
pub const DEFAULT_INCLUDES_DIR: &str = "_includes";

/// Name of the project configuration file.
pub const CONFIG_FILE_NAME: &str = "stylegraph.toml";

/// Snapshot document holding the component→artifact map and relationship list.
pub const SNAPSHOT_FILE_NAME: &str = "stylegraph-snapshot.json";

/// Snapshot document holding raw per-component style text.
pub const STYLES_SNAPSHOT_FILE_NAME: &str = "stylegraph-styles.json";

/// Current snapshot format version. Snapshots with any other version are ignored.
pub const SNAPSHOT_VERSION: u32 = 1;

/// File name of the shared runtime chunk the bundled compiler emits.
///
/// It is flagged as an intermediate descriptor and never becomes a component.
pub const RUNTIME_CHUNK_NAME: &str = "_sfc-runtime.json";

/// Extension of compiled artifacts written by the bundled compiler.
pub const ARTIFACT_EXTENSION: &str = "json";

/// Maximum depth of nested components the loader and renderer will follow.
pub const MAX_COMPONENT_DEPTH: usize = 32;
