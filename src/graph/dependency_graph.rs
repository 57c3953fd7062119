//! Import graph over compiled artifacts.
//!
//! An edge `A -> B` means artifact `A` imports artifact `B`. Dependencies of a
//! node are found by walking outgoing edges, its dependants ("ancestors") by
//! walking incoming edges. Nodes are never removed once added, so indices in
//! `node_map` stay valid for the lifetime of the graph; partial rebuilds only
//! drop edges.

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet, VecDeque};

use crate::core::ArtifactId;

/// Directed import graph keyed by [`ArtifactId`].
#[derive(Debug, Clone)]
pub struct DependencyGraph {
    /// The underlying directed graph.
    graph: DiGraph<ArtifactId, ()>,
    /// Map from artifact ids to their graph indices.
    node_map: HashMap<ArtifactId, NodeIndex>,
}

impl DependencyGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: DiGraph::new(),
            node_map: HashMap::new(),
        }
    }

    /// Add a node if it doesn't already exist and return its index.
    pub fn ensure_node(&mut self, id: &ArtifactId) -> NodeIndex {
        if let Some(&index) = self.node_map.get(id) {
            index
        } else {
            let index = self.graph.add_node(id.clone());
            self.node_map.insert(id.clone(), index);
            index
        }
    }

    /// Record that `from` imports `to`, creating both endpoints if needed.
    pub fn add_edge(&mut self, from: &ArtifactId, to: &ArtifactId) {
        let from_idx = self.ensure_node(from);
        let to_idx = self.ensure_node(to);

        if !self.graph.contains_edge(from_idx, to_idx) {
            self.graph.add_edge(from_idx, to_idx, ());
        }
    }

    /// Whether `id` is a node of the graph.
    pub fn contains(&self, id: &ArtifactId) -> bool {
        self.node_map.contains_key(id)
    }

    /// Whether the edge `from -> to` exists.
    pub fn has_edge(&self, from: &ArtifactId, to: &ArtifactId) -> bool {
        match (self.node_map.get(from), self.node_map.get(to)) {
            (Some(&f), Some(&t)) => self.graph.contains_edge(f, t),
            _ => false,
        }
    }

    /// Every artifact with a path to `id`, excluding `id` itself.
    ///
    /// These are the artifacts affected when `id` changes. Unknown ids yield an
    /// empty set.
    pub fn ancestors_of(&self, id: &ArtifactId) -> HashSet<ArtifactId> {
        self.reachable(id, Direction::Incoming)
    }

    /// Every artifact `id` imports directly or indirectly, excluding `id` itself.
    pub fn dependencies_of(&self, id: &ArtifactId) -> HashSet<ArtifactId> {
        self.reachable(id, Direction::Outgoing)
    }

    /// Direct imports of `id`, sorted by name.
    pub fn direct_imports(&self, id: &ArtifactId) -> Vec<ArtifactId> {
        self.neighbors_sorted(id, Direction::Outgoing)
    }

    /// Artifacts importing `id` directly, sorted by name.
    pub fn direct_importers(&self, id: &ArtifactId) -> Vec<ArtifactId> {
        self.neighbors_sorted(id, Direction::Incoming)
    }

    /// Remove every edge leaving `id`. The node itself stays.
    ///
    /// Returns the number of removed edges.
    pub fn remove_outgoing(&mut self, id: &ArtifactId) -> usize {
        let Some(&idx) = self.node_map.get(id) else {
            return 0;
        };
        let before = self.graph.edge_count();
        self.graph.retain_edges(|g, edge| g.edge_endpoints(edge).is_none_or(|(src, _)| src != idx));
        before - self.graph.edge_count()
    }

    /// Drop all nodes and edges.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.node_map.clear();
    }

    /// Check if the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Get the total number of edges in the graph.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes, sorted by name.
    pub fn nodes(&self) -> Vec<ArtifactId> {
        let mut nodes: Vec<ArtifactId> = self.node_map.keys().cloned().collect();
        nodes.sort();
        nodes
    }

    /// Build a human-readable import tree rooted at `root`.
    pub fn to_tree_string(&self, root: &ArtifactId) -> String {
        let mut result = format!("{root}\n");
        let mut visited = HashSet::from([root.clone()]);
        let deps = self.direct_imports(root);
        for (i, dep) in deps.iter().enumerate() {
            self.build_tree_string(dep, &mut result, "", i == deps.len() - 1, &mut visited);
        }
        result
    }

    fn build_tree_string(
        &self,
        node: &ArtifactId,
        result: &mut String,
        prefix: &str,
        is_last: bool,
        visited: &mut HashSet<ArtifactId>,
    ) {
        let connector = if is_last {
            "└── "
        } else {
            "├── "
        };
        result.push_str(&format!("{prefix}{connector}{node}\n"));

        let child_prefix = if is_last {
            format!("{prefix}    ")
        } else {
            format!("{prefix}│   ")
        };

        if !visited.insert(node.clone()) {
            result.push_str(&format!("{child_prefix}└── (circular reference)\n"));
            return;
        }

        let deps = self.direct_imports(node);
        for (i, dep) in deps.iter().enumerate() {
            self.build_tree_string(dep, result, &child_prefix, i == deps.len() - 1, visited);
        }
        visited.remove(node);
    }

    fn reachable(&self, id: &ArtifactId, direction: Direction) -> HashSet<ArtifactId> {
        let mut found = HashSet::new();
        let Some(&start) = self.node_map.get(id) else {
            return found;
        };

        let mut seen = HashSet::from([start]);
        let mut queue = VecDeque::from([start]);
        while let Some(current) = queue.pop_front() {
            for neighbor in self.graph.neighbors_directed(current, direction) {
                if seen.insert(neighbor) {
                    found.insert(self.graph[neighbor].clone());
                    queue.push_back(neighbor);
                }
            }
        }

        found
    }

    fn neighbors_sorted(&self, id: &ArtifactId, direction: Direction) -> Vec<ArtifactId> {
        let Some(&idx) = self.node_map.get(id) else {
            return Vec::new();
        };
        let mut out: Vec<ArtifactId> = self
            .graph
            .neighbors_directed(idx, direction)
            .map(|n| self.graph[n].clone())
            .collect();
        out.sort();
        out
    }
}

impl Default for DependencyGraph {
    fn default() -> Self {
        Self::new()
    }
}
