//! Evaluation Scheduler
//!
//! The scheduler determines the order in which derived tokens should be
//! generated. It ensures that every token's inputs are generated before it.
//!
//! # Algorithm
//!
//! 1. Collect the upstream closure of the target, plus the target itself
//! 2. Count, for each collected token, its dependencies inside that set
//! 3. Kahn's algorithm: repeatedly emit the ready token with the smallest
//!    name, then decrement the counts of its dependents inside the set
//! 4. If tokens remain that never became ready, they sit on a cycle
//!
//! Tie-breaking by name makes the order reproducible, so two dry runs over
//! the same graph can be diffed line by line.

use std::collections::{BTreeSet, HashMap};

use tracing::debug;

use super::cascade::{cascade_all, Direction};
use super::cycle::detect_cycle_from;
use crate::error::{CycleError, ScheduleError};
use crate::graph::DependencyView;

/// Produce an inputs-before-outputs order for `target` and everything it
/// depends on.
///
/// A built [`TokenGraph`](crate::graph::TokenGraph) is acyclic, so the cycle
/// branch only fires for unvalidated views such as an
/// [`Overlay`](crate::graph::Overlay).
pub fn schedule<G: DependencyView + ?Sized>(
    graph: &G,
    target: &str,
) -> Result<Vec<String>, ScheduleError> {
    let closure = cascade_all(graph, target, Direction::Upstream)?;

    let mut members: Vec<&str> = Vec::with_capacity(closure.reached.len() + 1);
    members.push(target);
    members.extend(closure.names());

    let order = topological_sort(graph, &members)?;
    debug!(token = target, tokens = order.len(), "scheduled generation order");
    Ok(order)
}

/// Topologically sort `members`, counting only edges between members.
pub fn topological_sort<G: DependencyView + ?Sized>(
    graph: &G,
    members: &[&str],
) -> Result<Vec<String>, CycleError> {
    let mut in_degree: HashMap<&str, usize> = HashMap::with_capacity(members.len());
    for &name in members {
        in_degree.insert(name, 0);
    }

    // Calculate in-degrees (only counting edges within the member set)
    for &name in members {
        let degree = graph
            .dependencies(name)
            .map(|deps| deps.iter().filter(|d| in_degree.contains_key(d.as_str())).count())
            .unwrap_or(0);
        in_degree.insert(name, degree);
    }

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, &degree)| degree == 0)
        .map(|(&name, _)| name)
        .collect();
    let mut order = Vec::with_capacity(members.len());

    while let Some(name) = ready.pop_first() {
        order.push(name.to_string());

        let Some(dependents) = graph.dependents(name) else {
            continue;
        };
        for dependent in dependents {
            if let Some(degree) = in_degree.get_mut(dependent.as_str()) {
                if *degree == 0 {
                    continue;
                }
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(dependent.as_str());
                }
            }
        }
    }

    if order.len() < in_degree.len() {
        let stuck: Vec<&str> = members
            .iter()
            .copied()
            .filter(|name| in_degree.get(name).is_some_and(|&d| d > 0))
            .collect();
        let cycle = detect_cycle_from(graph, stuck.iter().copied());
        return Err(cycle.unwrap_or_else(|| stuck_cycle(&stuck)));
    }

    Ok(order)
}

/// Every stuck member waits on another stuck member, so the search above
/// always finds a loop. Should it not, report the stuck set as a closed path.
fn stuck_cycle(stuck: &[&str]) -> CycleError {
    let mut path: Vec<String> = stuck.iter().map(|s| s.to_string()).collect();
    if let Some(first) = path.first().cloned() {
        path.push(first);
    }
    CycleError { path }
}
