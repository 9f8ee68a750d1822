//! Graph Nodes
//!
//! This module defines the node type that lives in the token graph.

use indexmap::IndexSet;

use crate::token::Token;

/// A token in the dependency graph.
///
/// Edge sets are keyed by token name. `dependencies` is what this token's
/// value references; `dependents` is the mirror index of every other node
/// whose `dependencies` contain this one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphNode {
    /// The token name (unique within a graph).
    name: String,

    /// The raw value expression the edges were parsed from.
    raw_value: String,

    /// Opaque category carried through from the token store.
    category: String,

    /// Tokens this token's value references (parents in the DAG).
    dependencies: IndexSet<String>,

    /// Tokens whose values reference this token (children in the DAG).
    dependents: IndexSet<String>,
}

impl GraphNode {
    /// Create a node with no edges.
    pub fn new(
        name: impl Into<String>,
        raw_value: impl Into<String>,
        category: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            raw_value: raw_value.into(),
            category: category.into(),
            dependencies: IndexSet::new(),
            dependents: IndexSet::new(),
        }
    }

    /// Create an edge-less node from a token record.
    pub fn from_token(token: &Token) -> Self {
        Self::new(&token.name, &token.raw_value, &token.category)
    }

    /// Get the token name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Get the raw value expression.
    pub fn raw_value(&self) -> &str {
        &self.raw_value
    }

    /// Get the opaque category.
    pub fn category(&self) -> &str {
        &self.category
    }

    pub(crate) fn set_raw_value(&mut self, raw_value: impl Into<String>) {
        self.raw_value = raw_value.into();
    }

    /// Add a dependency (a token this token reads from).
    pub(crate) fn add_dependency(&mut self, name: impl Into<String>) {
        self.dependencies.insert(name.into());
    }

    /// Remove a dependency.
    pub(crate) fn remove_dependency(&mut self, name: &str) {
        self.dependencies.shift_remove(name);
    }

    /// Get all dependencies.
    pub fn dependencies(&self) -> &IndexSet<String> {
        &self.dependencies
    }

    /// Add a dependent (a token that reads from this token).
    pub(crate) fn add_dependent(&mut self, name: impl Into<String>) {
        self.dependents.insert(name.into());
    }

    /// Remove a dependent.
    pub(crate) fn remove_dependent(&mut self, name: &str) {
        self.dependents.shift_remove(name);
    }

    /// Get all dependents.
    pub fn dependents(&self) -> &IndexSet<String> {
        &self.dependents
    }
}
