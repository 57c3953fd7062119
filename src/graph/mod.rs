//! Import relationships between compiled artifacts.
//!
//! Relationships are kept twice: as an ordered, deduplicated
//! [`Relationship`] list that is persisted in snapshots, and as edges of a
//! [`DependencyGraph`] used for reachability queries.

mod dependency_graph;

pub use dependency_graph::DependencyGraph;

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::core::ArtifactId;

/// `from` imports `to`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Relationship {
    /// Importing artifact
    pub from: ArtifactId,
    /// Imported artifact
    pub to: ArtifactId,
}

impl Relationship {
    /// Create a relationship.
    pub fn new(from: impl Into<ArtifactId>, to: impl Into<ArtifactId>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}
