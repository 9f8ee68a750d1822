//! Cascade Analyzer
//!
//! Bounded breadth-first closure in either direction. "Direct dependencies"
//! is simply a cascade with a depth limit of one; "full impact" is a cascade
//! whose limit is the size of the graph. There is no separate code path for
//! either.
//!
//! Each node is recorded once, at the depth it was first discovered. Since
//! BFS discovers nodes in non-decreasing depth order, that is also its
//! shortest hop count from the root, independent of which path found it.

use std::collections::{HashSet, VecDeque};

use serde::Serialize;
use tracing::debug;

use crate::error::NotFoundError;
use crate::graph::DependencyView;

/// Which edge set a cascade follows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Follow `dependencies`: what the root is computed from.
    Upstream,
    /// Follow `dependents`: what is computed from the root.
    Downstream,
}

/// A token reached by a cascade and its hop distance from the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Reached {
    pub name: String,
    pub depth: usize,
}

/// The result of a bounded cascade.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeResult {
    pub root: String,
    pub direction: Direction,
    pub depth_limit: usize,
    /// Reached tokens in discovery order; the root itself is excluded.
    pub reached: Vec<Reached>,
    /// True when further tokens exist beyond `depth_limit`.
    pub truncated: bool,
}

impl CascadeResult {
    /// Names reached at exactly one hop.
    pub fn direct(&self) -> impl Iterator<Item = &str> {
        self.reached
            .iter()
            .filter(|r| r.depth == 1)
            .map(|r| r.name.as_str())
    }

    /// All reached names, in discovery order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.reached.iter().map(|r| r.name.as_str())
    }

    /// The deepest hop count reached, zero if nothing was reached.
    pub fn max_depth(&self) -> usize {
        self.reached.iter().map(|r| r.depth).max().unwrap_or(0)
    }
}

/// Run a cascade from `root`, expanding at most `depth_limit` hops.
///
/// A limit of zero is treated as one.
pub fn cascade<G: DependencyView + ?Sized>(
    graph: &G,
    root: &str,
    direction: Direction,
    depth_limit: usize,
) -> Result<CascadeResult, NotFoundError> {
    if !graph.contains(root) {
        return Err(NotFoundError {
            name: root.to_string(),
        });
    }
    let depth_limit = depth_limit.max(1);

    let neighbours = |name: &str| match direction {
        Direction::Upstream => graph.dependencies(name),
        Direction::Downstream => graph.dependents(name),
    };

    let mut seen: HashSet<&str> = HashSet::new();
    let mut queue: VecDeque<(&str, usize)> = VecDeque::new();
    let mut reached = Vec::new();
    let mut truncated = false;

    seen.insert(root);
    queue.push_back((root, 0));

    while let Some((name, depth)) = queue.pop_front() {
        let Some(next) = neighbours(name) else {
            continue;
        };

        if depth == depth_limit {
            // Frontier node: only check whether anything lies beyond it.
            if !truncated {
                truncated = next.iter().any(|n| !seen.contains(n.as_str()));
            }
            continue;
        }

        for neighbour in next {
            if seen.insert(neighbour.as_str()) {
                reached.push(Reached {
                    name: neighbour.clone(),
                    depth: depth + 1,
                });
                queue.push_back((neighbour.as_str(), depth + 1));
            }
        }
    }

    debug!(
        root,
        ?direction,
        depth_limit,
        reached = reached.len(),
        truncated,
        "cascade complete"
    );

    Ok(CascadeResult {
        root: root.to_string(),
        direction,
        depth_limit,
        reached,
        truncated,
    })
}

/// Run a cascade with no effective depth limit.
pub fn cascade_all<G: DependencyView + ?Sized>(
    graph: &G,
    root: &str,
    direction: Direction,
) -> Result<CascadeResult, NotFoundError> {
    cascade(graph, root, direction, graph.len())
}
