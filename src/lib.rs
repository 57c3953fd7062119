//! stylegraph - build-time single-file component pipeline
//!
//! stylegraph discovers single-file components, compiles each into a
//! server-renderable artifact, tracks which components import which, and tells
//! a static-site generator exactly which stylesheets every rendered page needs.
//!
//! # Architecture Overview
//!
//! One build pass flows in a single direction:
//!
//! ```text
//! discovery -> compile/write -> artifact descriptors
//!           -> { CSS store, component registry, dependency graph }
//!           -> (at render time) CSS aggregator queries per page URL
//! ```
//!
//! - Components are keyed by a [`ComponentId`](core::ComponentId), a normalized
//!   project-relative path such as `./_includes/card.vue`.
//! - Compiled outputs are keyed by an [`ArtifactId`](core::ArtifactId), the file
//!   name inside the cache directory such as `card.json`.
//! - An import edge `A -> B` always means "artifact A imports artifact B".
//!   Page CSS follows edges forward; rebuild relevance follows them backward.
//!
//! # Core Modules
//!
//! - [`core`] - Identifiers, path normalization and error types
//! - [`css`] - Per-component style fragments and per-page CSS aggregation
//! - [`graph`] - Import relationships and the dependency graph
//! - [`registry`] - Component to artifact mapping and the loaded-artifact cache
//! - [`pipeline`] - Discovery, build passes, snapshots and the host surface
//!
//! # Toolchain
//!
//! - [`bundler`] - Capability traits for compiling, loading and rendering
//! - [`sfc`] - Bundled implementation of those capabilities using Tera templates
//!
//! # Supporting Modules
//!
//! - [`config`] - `stylegraph.toml` options and resolved project directories
//! - [`cli`] - The `stylegraph` command-line interface
//! - [`constants`] - Default names and limits
//! - [`utils`] - Atomic writes, path helpers and progress spinners
//!
//! # Configuration (stylegraph.toml)
//!
//! ```toml
//! cache_directory = ".cache/vue/"
//! includes_dir = "_includes"
//! ignores = ["drafts/**"]
//! snapshot = "read"
//! ```
//!
//! # Command-Line Usage
//!
//! ```bash
//! stylegraph build
//! stylegraph render index.vue --url /
//! stylegraph css index.vue --url /
//! stylegraph graph _includes/card.vue
//! ```
//!
//! # Library Usage
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
//! println!("{html}\n<style>{css}</style>");
//! # Ok(())
//! # }
//! ```

pub mod bundler;
pub mod cli;
pub mod config;
pub mod constants;
pub mod core;
pub mod css;
pub mod graph;
pub mod pipeline;
pub mod registry;
pub mod sfc;
pub mod utils;

// test_utils module is available for both unit tests and integration tests
#[cfg(test)]
pub mod test_utils;
