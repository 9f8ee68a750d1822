//! Copy-on-Write Overlay
//!
//! An overlay simulates edits on top of a live [`TokenGraph`] without
//! touching it. Only nodes whose edge sets actually change are copied into
//! the overlay; every other lookup falls through to the base graph, so the
//! cost of an overlay is proportional to the edit, not to the graph.
//!
//! Overlays are not validated. They may contain cycles, which is exactly
//! what the change validator uses them to find.

use indexmap::{IndexMap, IndexSet};

use super::model::{DependencyView, TokenGraph};
use super::node::GraphNode;

/// A disposable view of `base` with some nodes replaced.
#[derive(Debug, Clone)]
pub struct Overlay<'g> {
    base: &'g TokenGraph,

    /// Copied or newly created nodes, shadowing the base.
    patched: IndexMap<String, GraphNode>,

    /// Names that do not exist in the base, in insertion order.
    added: Vec<String>,
}

impl<'g> Overlay<'g> {
    /// Create an overlay with no edits.
    pub fn new(base: &'g TokenGraph) -> Self {
        Self {
            base,
            patched: IndexMap::new(),
            added: Vec::new(),
        }
    }

    /// Number of nodes copied or created by this overlay.
    pub fn patched_len(&self) -> usize {
        self.patched.len()
    }

    /// Check whether the named node has been copied into the overlay.
    pub fn is_patched(&self, name: &str) -> bool {
        self.patched.contains_key(name)
    }

    /// Add a token that does not exist in the base graph.
    ///
    /// Has no effect if the name is already visible through the overlay.
    pub fn add_token(&mut self, name: &str, raw_value: &str, category: &str) {
        if self.contains(name) {
            return;
        }
        self.patched
            .insert(name.to_string(), GraphNode::new(name, raw_value, category));
        self.added.push(name.to_string());
    }

    /// Replace the dependency set of `name`, keeping dependents mirrored.
    ///
    /// References to names not visible through the overlay are dropped; the
    /// caller is expected to have reported them. Returns `false` if `name`
    /// itself is unknown.
    pub fn set_dependencies(
        &mut self,
        name: &str,
        dependencies: IndexSet<String>,
        raw_value: &str,
    ) -> bool {
        let previous = match self.dependencies(name) {
            Some(previous) => previous.clone(),
            None => return false,
        };

        for removed in previous.iter().filter(|d| !dependencies.contains(*d)) {
            if let Some(node) = self.patch(removed) {
                node.remove_dependent(name);
            }
        }

        let mut kept = IndexSet::with_capacity(dependencies.len());
        for dependency in dependencies {
            if !self.contains(&dependency) {
                continue;
            }
            if !previous.contains(&dependency) {
                if let Some(node) = self.patch(&dependency) {
                    node.add_dependent(name);
                }
            }
            kept.insert(dependency);
        }

        if let Some(node) = self.patch(name) {
            for old in &previous {
                if !kept.contains(old) {
                    node.remove_dependency(old);
                }
            }
            for dependency in kept {
                node.add_dependency(dependency);
            }
            node.set_raw_value(raw_value);
        }
        true
    }

    /// Copy a base node into the overlay on first write.
    fn patch(&mut self, name: &str) -> Option<&mut GraphNode> {
        if !self.patched.contains_key(name) {
            let node = self.base.node(name)?.clone();
            self.patched.insert(name.to_string(), node);
        }
        self.patched.get_mut(name)
    }
}

impl DependencyView for Overlay<'_> {
    fn node(&self, name: &str) -> Option<&GraphNode> {
        self.patched.get(name).or_else(|| self.base.node(name))
    }

    fn names(&self) -> Box<dyn Iterator<Item = &str> + '_> {
        Box::new(
            self.base
                .names()
                .chain(self.added.iter().map(String::as_str)),
        )
    }

    fn len(&self) -> usize {
        self.base.len() + self.added.len()
    }
}
