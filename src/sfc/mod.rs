//! Bundled single-file component toolchain.
//!
//! Implements the three capabilities of [`crate::bundler`] for `.vue`-style
//! files whose templates are written in Tera syntax:
//!
//! - [`SfcCompiler`] parses components with [`SfcParser`], follows imports and
//!   writes one JSON artifact per component plus a shared runtime chunk.
//! - [`ArtifactLoader`] reads an artifact and its children back.
//! - [`TeraRenderer`] renders a loaded tree with the [`HelperRegistry`] filters.
//!
//! # Component format
//!
//! ```text
//! <template>
//!   <article><h1>{{ title }}</h1><Card /></article>
//! </template>
//!
//! <script>
//! import Card from "./_includes/card.vue";
//! export default { "title": "Fallback title" };
//! </script>
//!
//! <style>
//! article { margin: 0 auto; }
//! </style>
//! ```

mod compiler;
mod helpers;
mod loader;
mod parser;
mod renderer;

pub use compiler::{ArtifactFile, CompiledModule, SfcBundle, SfcCompiler};
pub use helpers::{HelperFn, HelperRegistry};
pub use loader::{ArtifactLoader, CompiledComponent};
pub use parser::{Block, ImportStatement, SfcDescriptor, SfcParser};
pub use renderer::TeraRenderer;
