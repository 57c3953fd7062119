//! Page-level CSS aggregation.
//!
//! The aggregator answers "which stylesheets does this output URL need". A page
//! registers the artifacts it renders directly; every import reachable from
//! those artifacts contributes too. Contributors are emitted in first-seen
//! order: direct usages in the order the page first used them, then imports
//! breadth-first in the order they were recorded. The order is never sorted,
//! so identical inputs always produce identical output.

use indexmap::IndexSet;
use std::collections::HashMap;
use tracing::trace;

use crate::core::ArtifactId;

/// Per-URL usage sets, artifact import lists and artifact CSS.
#[derive(Debug, Clone)]
pub struct CssAggregator {
    usage: HashMap<String, IndexSet<ArtifactId>>,
    imports: HashMap<ArtifactId, IndexSet<ArtifactId>>,
    code: HashMap<ArtifactId, Vec<String>>,
    transitive: bool,
}

impl Default for CssAggregator {
    fn default() -> Self {
        Self::new(true)
    }
}

impl CssAggregator {
    /// Create an aggregator. With `transitive == false` only one level of
    /// imports is expanded below the directly used artifacts.
    pub fn new(transitive: bool) -> Self {
        Self {
            usage: HashMap::new(),
            imports: HashMap::new(),
            code: HashMap::new(),
            transitive,
        }
    }

    /// Whether imports are followed past the first level.
    pub const fn is_transitive(&self) -> bool {
        self.transitive
    }

    /// Register `artifact` as rendered directly on `url`.
    ///
    /// Missing or empty URLs are ignored since a render can happen before the
    /// page's output URL is known. Registering the same pair twice is a no-op.
    pub fn record_usage(&mut self, artifact: &ArtifactId, url: Option<&str>) {
        let Some(url) = url.filter(|u| !u.is_empty()) else {
            return;
        };
        let added = self.usage.entry(url.to_string()).or_default().insert(artifact.clone());
        if added {
            trace!("Recorded usage of {} on {}", artifact, url);
        }
    }

    /// Record that `from` imports `to`.
    pub fn add_relationship(&mut self, from: &ArtifactId, to: &ArtifactId) {
        self.imports.entry(from.clone()).or_default().insert(to.clone());
    }

    /// Append a CSS fragment to `artifact`, skipping exact duplicates.
    pub fn add_component_code(&mut self, artifact: &ArtifactId, code: &str) {
        let trimmed = code.trim();
        if trimmed.is_empty() {
            return;
        }
        let list = self.code.entry(artifact.clone()).or_default();
        if !list.iter().any(|existing| existing == trimmed) {
            list.push(trimmed.to_string());
        }
    }

    /// Replace all CSS of `artifact`.
    pub fn set_component_code(&mut self, artifact: &ArtifactId, fragments: &[String]) {
        self.code.remove(artifact);
        for fragment in fragments {
            self.add_component_code(artifact, fragment);
        }
    }

    /// Artifacts registered directly on `url`, in first-use order.
    pub fn usages(&self, url: &str) -> Vec<ArtifactId> {
        self.usage.get(url).map(|set| set.iter().cloned().collect()).unwrap_or_default()
    }

    /// Every URL with at least one registered usage, sorted.
    pub fn urls(&self) -> Vec<String> {
        let mut urls: Vec<String> = self.usage.keys().cloned().collect();
        urls.sort();
        urls
    }

    /// Direct imports recorded for `artifact`, in insertion order.
    pub fn imports_of(&self, artifact: &ArtifactId) -> Vec<ArtifactId> {
        self.imports.get(artifact).map(|set| set.iter().cloned().collect()).unwrap_or_default()
    }

    /// Ordered, deduplicated list of artifacts whose CSS belongs on `url`.
    pub fn resolve_contributors(&self, url: &str) -> Vec<ArtifactId> {
        let Some(direct) = self.usage.get(url) else {
            return Vec::new();
        };

        let mut order: IndexSet<ArtifactId> = direct.iter().cloned().collect();
        let direct_count = order.len();
        let mut cursor = 0;

        while let Some(current) = order.get_index(cursor).cloned() {
            if !self.transitive && cursor >= direct_count {
                break;
            }
            if let Some(imports) = self.imports.get(&current) {
                for import in imports {
                    order.insert(import.clone());
                }
            }
            cursor += 1;
        }

        order.into_iter().collect()
    }

    /// Aggregated CSS for `url`.
    ///
    /// Each contributor with CSS becomes a block headed by
    /// `/* <artifact> Component */`; blocks are joined with `\n`. Unknown URLs
    /// yield `""`.
    pub fn render(&self, url: &str) -> String {
        self.resolve_contributors(url)
            .iter()
            .filter_map(|artifact| {
                let fragments = self.code.get(artifact)?;
                if fragments.is_empty() {
                    return None;
                }
                Some(format!("/* {artifact} Component */\n{}", fragments.join("\n")))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Drop the CSS, outgoing imports and page usages of `artifact`.
    ///
    /// Imports pointing at `artifact` from other artifacts are kept; they are
    /// still valid once the artifact is rebuilt.
    pub fn forget_artifact(&mut self, artifact: &ArtifactId) {
        self.code.remove(artifact);
        self.imports.remove(artifact);
        self.usage.retain(|_, set| {
            set.shift_remove(artifact);
            !set.is_empty()
        });
    }

    /// Clear everything.
    pub fn reset(&mut self) {
        self.usage.clear();
        self.imports.clear();
        self.code.clear();
    }
}
