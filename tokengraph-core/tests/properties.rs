//! Property Tests for the Token Graph Engine
//!
//! Token sets are generated acyclic by construction: token `t{i}` may only
//! reference tokens `t{j}` with `j < i`. Change batches are unconstrained and
//! may close loops, introduce new names or reference names that do not exist.

use proptest::prelude::*;
use proptest::sample::Index;

use tokengraph_core::analysis::{cascade, detect_cycle, schedule, validate, Direction};
use tokengraph_core::{DependencyView, GraphNode, ProposedChange, Token, TokenGraph};

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

/// Acyclic token sets of 1 to 40 tokens, each referencing up to three
/// earlier tokens.
fn token_set() -> impl Strategy<Value = Vec<Token>> {
    prop::collection::vec(prop::collection::vec(any::<Index>(), 0..4), 1..40).prop_map(
        |slots| {
            slots
                .iter()
                .enumerate()
                .map(|(i, picks)| {
                    let raw = if i == 0 || picks.is_empty() {
                        format!("{i}px")
                    } else {
                        picks
                            .iter()
                            .map(|pick| format!("{{t{}}}", pick.index(i)))
                            .collect::<Vec<_>>()
                            .join(" + ")
                    };
                    Token::new(format!("t{i}"), raw, "size")
                })
                .collect()
        },
    )
}

/// One proposed change: a target slot, reference slots and whether to add a
/// dangling reference. Slots are resolved against the token count, with two
/// spare names so batches can introduce new tokens.
type ChangeSlot = (Index, Vec<Index>, bool);

fn change_slots() -> impl Strategy<Value = Vec<ChangeSlot>> {
    prop::collection::vec(
        (
            any::<Index>(),
            prop::collection::vec(any::<Index>(), 0..3),
            prop::bool::weighted(0.2),
        ),
        0..5,
    )
}

fn resolve_changes(token_count: usize, slots: &[ChangeSlot]) -> Vec<ProposedChange> {
    let universe = token_count + 2;
    slots
        .iter()
        .map(|(target, refs, dangling)| {
            let mut parts: Vec<String> = refs
                .iter()
                .map(|r| format!("{{t{}}}", r.index(universe)))
                .collect();
            if *dangling {
                parts.push("{ghost}".to_string());
            }
            let raw = if parts.is_empty() {
                "0".to_string()
            } else {
                parts.join(" * ")
            };
            ProposedChange::new(format!("t{}", target.index(universe)), raw)
        })
        .collect()
}

/// Both edge sets of every node, for checking the live graph is untouched.
fn edge_snapshot(graph: &TokenGraph) -> Vec<(String, Vec<String>, Vec<String>)> {
    graph
        .iter()
        .map(|node| {
            (
                node.name().to_string(),
                node.dependencies().iter().cloned().collect(),
                node.dependents().iter().cloned().collect(),
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Property Tests
// ---------------------------------------------------------------------------

proptest! {
    #[test]
    fn built_graphs_are_symmetric_and_acyclic(tokens in token_set()) {
        let graph = TokenGraph::build(&tokens).unwrap();
        prop_assert_eq!(graph.len(), tokens.len());
        prop_assert!(graph.is_symmetric());
        prop_assert!(detect_cycle(&graph).is_none());
    }

    #[test]
    fn depth_one_cascade_is_direct_dependents(tokens in token_set()) {
        let graph = TokenGraph::build(&tokens).unwrap();
        for node in graph.iter() {
            let result = cascade(&graph, node.name(), Direction::Downstream, 1).unwrap();
            let mut reached: Vec<&str> = result.names().collect();
            reached.sort_unstable();

            let mut referrers: Vec<&str> = graph
                .iter()
                .filter(|n| n.dependencies().contains(node.name()))
                .map(GraphNode::name)
                .collect();
            referrers.sort_unstable();

            prop_assert_eq!(reached, referrers);
        }
    }

    #[test]
    fn schedules_put_inputs_first(tokens in token_set()) {
        let graph = TokenGraph::build(&tokens).unwrap();
        for node in graph.iter() {
            let order = schedule(&graph, node.name()).unwrap();
            prop_assert_eq!(order.last().map(String::as_str), Some(node.name()));

            let closure = cascade(&graph, node.name(), Direction::Upstream, graph.len()).unwrap();
            prop_assert_eq!(order.len(), closure.reached.len() + 1);

            for (position, name) in order.iter().enumerate() {
                for dependency in graph.dependencies(name).unwrap() {
                    let at = order.iter().position(|n| n == dependency);
                    prop_assert!(
                        at.is_some_and(|at| at < position),
                        "{} scheduled before its input {}",
                        name,
                        dependency
                    );
                }
            }
        }
    }

    #[test]
    fn validation_is_repeatable_and_read_only(tokens in token_set(), slots in change_slots()) {
        let graph = TokenGraph::build(&tokens).unwrap();
        let changes = resolve_changes(tokens.len(), &slots);
        let before = edge_snapshot(&graph);

        let first = validate(&graph, &changes);
        let second = validate(&graph, &changes);

        prop_assert_eq!(&first, &second);
        prop_assert_eq!(edge_snapshot(&graph), before);
        prop_assert_eq!(
            first.valid,
            first.introduced_cycles.is_empty()
                && first.unknown_references.is_empty()
                && first.parse_errors.is_empty()
        );
        for cycle in &first.introduced_cycles {
            prop_assert!(cycle.len() >= 2);
            prop_assert_eq!(cycle.first(), cycle.last());
        }
    }
}
