//! Core types for stylegraph
//!
//! This module holds the vocabulary shared by every other module:
//!
//! - [`StylegraphError`] and [`ErrorContext`] - error kinds and user-facing reporting
//! - [`ComponentId`] and [`ArtifactId`] - identities of source components and compiled outputs
//! - [`PathNormalizer`] - conversion from filesystem paths to component identities
//!
//! # Identity Model
//!
//! Each source component maps to exactly one compiled artifact at any time. The
//! component side is keyed by a normalized project-relative path; the artifact
//! side by the output file name inside the cache directory. CSS fragments are
//! keyed by component, import relationships and page usage by artifact.

pub mod component_id;
pub mod error;

pub use component_id::{ArtifactId, ComponentId, PathNormalizer};
pub use error::{ErrorContext, SourceLocation, StylegraphError, user_friendly_error};
