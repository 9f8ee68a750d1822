//! Graph Builder
//!
//! Turns a token snapshot into a validated [`TokenGraph`].
//!
//! # Algorithm
//!
//! 1. Create one node per token, rejecting repeated names
//! 2. Parse every raw value, repeated records included, and check each
//!    referenced name exists
//! 3. If any problem was found, return all of them together
//! 4. Wire dependency edges and their mirrored dependent edges
//! 5. Run cycle detection over the finished graph
//!
//! A build is all-or-nothing: callers either get a graph that satisfies every
//! invariant or an error, never a partially wired graph.

use indexmap::{IndexMap, IndexSet};
use tracing::{debug, warn};

use super::model::TokenGraph;
use super::node::GraphNode;
use crate::analysis::detect_cycle;
use crate::error::{BuildError, DuplicateTokenError, SnapshotError, UnknownReferenceError};
use crate::reference::parse_references;
use crate::token::Token;

impl TokenGraph {
    /// Build a graph from a snapshot, recording version 0.
    pub fn build(tokens: &[Token]) -> Result<Self, BuildError> {
        build_graph(tokens, 0)
    }

    /// Build a graph from a snapshot taken at the given store version.
    pub fn build_versioned(tokens: &[Token], version: u64) -> Result<Self, BuildError> {
        build_graph(tokens, version)
    }
}

/// Build and validate a graph from a full token snapshot.
pub fn build_graph(tokens: &[Token], version: u64) -> Result<TokenGraph, BuildError> {
    let mut problems: Vec<SnapshotError> = Vec::new();
    let mut nodes: IndexMap<String, GraphNode> = IndexMap::with_capacity(tokens.len());
    let mut first_seen: IndexMap<&str, usize> = IndexMap::with_capacity(tokens.len());

    for (index, token) in tokens.iter().enumerate() {
        if let Some(&first_index) = first_seen.get(token.name.as_str()) {
            problems.push(
                DuplicateTokenError {
                    name: token.name.clone(),
                    first_index,
                    duplicate_index: index,
                }
                .into(),
            );
            continue;
        }
        first_seen.insert(&token.name, index);
        nodes.insert(token.name.clone(), GraphNode::from_token(token));
    }

    // Parse every record, duplicates included, before wiring anything.
    let mut edges: Vec<(usize, IndexSet<String>)> = Vec::with_capacity(nodes.len());
    for (token_index, token) in tokens.iter().enumerate() {
        let references = match parse_references(&token.name, &token.raw_value) {
            Ok(references) => references,
            Err(err) => {
                problems.push(err.into());
                continue;
            }
        };
        for reference in &references {
            if !nodes.contains_key(reference) {
                problems.push(
                    UnknownReferenceError {
                        token: token.name.clone(),
                        missing_ref: reference.clone(),
                    }
                    .into(),
                );
            }
        }
        // Only the kept record of a name contributes edges.
        if first_seen.get(token.name.as_str()) == Some(&token_index) {
            if let Some(node_index) = nodes.get_index_of(&token.name) {
                edges.push((node_index, references));
            }
        }
    }

    if !problems.is_empty() {
        warn!(
            version,
            tokens = tokens.len(),
            problems = problems.len(),
            "token snapshot rejected"
        );
        return Err(BuildError::Rejected(problems));
    }

    for (node_index, references) in edges {
        let name = match nodes.get_index(node_index) {
            Some((name, _)) => name.clone(),
            None => continue,
        };
        for reference in references {
            if let Some(target) = nodes.get_mut(&reference) {
                target.add_dependent(name.clone());
            }
            if let Some(node) = nodes.get_index_mut(node_index).map(|(_, node)| node) {
                node.add_dependency(reference);
            }
        }
    }

    let graph = TokenGraph::from_parts(nodes, version);

    if let Some(cycle) = detect_cycle(&graph) {
        warn!(version, cycle = %cycle, "token snapshot contains a cycle");
        return Err(BuildError::Cycle(cycle));
    }

    debug!(
        version,
        nodes = graph.iter().count(),
        edges = graph.edge_count(),
        "built token graph"
    );
    Ok(graph)
}
