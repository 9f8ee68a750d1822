//! Token Graph
//!
//! The immutable graph produced by the builder, plus the [`DependencyView`]
//! trait every analysis is written against.

use indexmap::{IndexMap, IndexSet};

use super::node::GraphNode;
use crate::error::NotFoundError;

/// Read-only access to a dependency structure keyed by token name.
///
/// Implemented by the live [`TokenGraph`] and by the copy-on-write
/// [`Overlay`](super::Overlay) used during validation, so the same
/// traversal code runs against both.
pub trait DependencyView {
    /// Look up a node by name.
    fn node(&self, name: &str) -> Option<&GraphNode>;

    /// All token names, in a stable order.
    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_>;

    /// Number of nodes.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn contains(&self, name: &str) -> bool {
        self.node(name).is_some()
    }

    /// Names the given token references.
    fn dependencies(&self, name: &str) -> Option<&IndexSet<String>> {
        self.node(name).map(GraphNode::dependencies)
    }

    /// Names that reference the given token.
    fn dependents(&self, name: &str) -> Option<&IndexSet<String>> {
        self.node(name).map(GraphNode::dependents)
    }
}

/// A validated, acyclic token dependency graph.
///
/// Once built the graph is never mutated; share it behind an `Arc` and
/// build a new one when the token store changes.
#[derive(Debug, Clone, Default)]
pub struct TokenGraph {
    /// All nodes, indexed by name, in snapshot order.
    nodes: IndexMap<String, GraphNode>,

    /// Token store version this graph was built from.
    version: u64,

    /// Total number of dependency edges.
    edge_count: usize,
}

impl TokenGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_parts(nodes: IndexMap<String, GraphNode>, version: u64) -> Self {
        let edge_count = nodes.values().map(|n| n.dependencies().len()).sum();
        Self {
            nodes,
            version,
            edge_count,
        }
    }

    /// Get a node, or a [`NotFoundError`] naming the missing token.
    pub fn get(&self, name: &str) -> Result<&GraphNode, NotFoundError> {
        self.nodes.get(name).ok_or_else(|| NotFoundError {
            name: name.to_string(),
        })
    }

    /// Iterate over all nodes in snapshot order.
    pub fn iter(&self) -> impl Iterator<Item = &GraphNode> {
        self.nodes.values()
    }

    /// The token store version this graph reflects.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Get the total number of dependency edges.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Check that every dependency edge has its mirrored dependent edge and
    /// vice versa, and that no edge points outside the graph.
    pub fn is_symmetric(&self) -> bool {
        self.nodes.values().all(|node| {
            let forward = node.dependencies().iter().all(|dep| {
                self.nodes
                    .get(dep)
                    .is_some_and(|d| d.dependents().contains(node.name()))
            });
            let backward = node.dependents().iter().all(|dependent| {
                self.nodes
                    .get(dependent)
                    .is_some_and(|d| d.dependencies().contains(node.name()))
            });
            forward && backward
        })
    }
}

impl DependencyView for TokenGraph {
    fn node(&self, name: &str) -> Option<&GraphNode> {
        self.nodes.get(name)
    }

    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(self.nodes.keys().map(String::as_str))
    }

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
