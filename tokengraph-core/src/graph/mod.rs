//! Token Dependency Graph
//!
//! This module implements the directed graph of value references between
//! design tokens.
//!
//! # Overview
//!
//! The graph is a directed acyclic graph (DAG) where:
//!
//! - Nodes are tokens, keyed by name
//! - Edges are references: if `mid = "{base} + 1"`, then `mid` depends on
//!   `base` and `base` has `mid` as a dependent
//!
//! # Design Decisions
//!
//! 1. The graph is built once per token-store snapshot and never mutated
//!    afterwards. Edits are simulated on an [`Overlay`] instead.
//!
//! 2. Nodes are indexed by name in snapshot order, which keeps every
//!    traversal deterministic for a given snapshot.
//!
//! 3. We maintain both forward (dependencies) and reverse (dependents) edges
//!    to enable efficient traversal in both directions. The builder derives
//!    the reverse edges mechanically so the two never disagree.

mod builder;
mod model;
mod node;
mod overlay;

pub use builder::build_graph;
pub use model::{DependencyView, TokenGraph};
pub use node::GraphNode;
pub use overlay::Overlay;
