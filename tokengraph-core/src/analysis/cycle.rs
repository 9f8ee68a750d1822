//! Cycle Detector
//!
//! Depth-first search over `dependencies` edges with the classic three-colour
//! marking. A node is `InProgress` while it sits on the current DFS path; an
//! edge into an `InProgress` node closes a cycle, which is read straight off
//! the path. Nodes that finish without a back edge are `Done` and never
//! visited again, so a full scan is O(V + E).
//!
//! The search is iterative so that deep reference chains cannot overflow
//! the thread stack.
//!
//! Which cycle is reported when several exist depends only on the order of
//! [`DependencyView::names`] and of each node's dependency set. Callers may
//! rely on "some real cycle is reported" and "no report means acyclic",
//! nothing stronger.

use std::collections::{HashMap, HashSet};

use smallvec::SmallVec;

use crate::error::CycleError;
use crate::graph::DependencyView;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitState {
    InProgress,
    Done,
}

/// A node on the DFS path and how far through its dependencies we are.
struct Frame<'a> {
    name: &'a str,
    next_edge: usize,
}

/// Search the whole graph for a cycle.
pub fn detect_cycle<G: DependencyView + ?Sized>(graph: &G) -> Option<CycleError> {
    let mut search = CycleSearch::new(graph, Stop::FirstCycle);
    graph.names().find_map(|root| search.run_from(root).pop())
}

/// Search for a cycle reachable from any of `roots`.
///
/// When the rest of the graph is known to be acyclic, every new cycle must
/// pass through an edited node, so seeding the search with the edited names
/// finds it without scanning unrelated parts of the graph.
pub fn detect_cycle_from<'a, G, I>(graph: &'a G, roots: I) -> Option<CycleError>
where
    G: DependencyView + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut search = CycleSearch::new(graph, Stop::FirstCycle);
    roots.into_iter().find_map(|root| search.run_from(root).pop())
}

/// Collect one cycle per back edge reachable from `roots`, each distinct
/// cycle (up to rotation) once, in discovery order.
///
/// The walk keeps going after a back edge, so an edit that closes several
/// loops at once reports all of them. Nodes are still finished at most once,
/// which keeps the cost O(V + E); a cycle whose every back edge lies inside
/// an already finished region is represented by the cycle that finished it.
pub fn collect_cycles_from<'a, G, I>(graph: &'a G, roots: I) -> Vec<CycleError>
where
    G: DependencyView + ?Sized,
    I: IntoIterator<Item = &'a str>,
{
    let mut search = CycleSearch::new(graph, Stop::Never);
    let mut seen: HashSet<Vec<String>> = HashSet::new();
    let mut cycles = Vec::new();
    for root in roots {
        for cycle in search.run_from(root) {
            if seen.insert(canonical_cycle(&cycle)) {
                cycles.push(cycle);
            }
        }
    }
    cycles
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stop {
    FirstCycle,
    Never,
}

struct CycleSearch<'a, G: ?Sized> {
    graph: &'a G,
    stop: Stop,
    state: HashMap<&'a str, VisitState>,
}

impl<'a, G: DependencyView + ?Sized> CycleSearch<'a, G> {
    fn new(graph: &'a G, stop: Stop) -> Self {
        Self {
            graph,
            stop,
            state: HashMap::with_capacity(graph.len()),
        }
    }

    /// Walk from `root`, returning the cycles closed along the way.
    fn run_from(&mut self, root: &'a str) -> Vec<CycleError> {
        let mut found = Vec::new();
        if self.state.contains_key(root) || !self.graph.contains(root) {
            return found;
        }

        let mut path: SmallVec<[Frame<'a>; 16]> = SmallVec::new();
        self.state.insert(root, VisitState::InProgress);
        path.push(Frame {
            name: root,
            next_edge: 0,
        });

        while let Some(frame) = path.last_mut() {
            let next = self
                .graph
                .dependencies(frame.name)
                .and_then(|deps| deps.get_index(frame.next_edge))
                .map(String::as_str);

            let Some(next) = next else {
                self.state.insert(frame.name, VisitState::Done);
                path.pop();
                continue;
            };
            frame.next_edge += 1;

            match self.state.get(next) {
                Some(VisitState::Done) => {}
                Some(VisitState::InProgress) => {
                    found.push(close_cycle(&path, next));
                    if self.stop == Stop::FirstCycle {
                        return found;
                    }
                }
                None => {
                    // Dangling edges are the builder's concern, not ours.
                    if !self.graph.contains(next) {
                        continue;
                    }
                    self.state.insert(next, VisitState::InProgress);
                    path.push(Frame {
                        name: next,
                        next_edge: 0,
                    });
                }
            }
        }

        found
    }
}

fn close_cycle(path: &[Frame<'_>], entry: &str) -> CycleError {
    let start = path.iter().position(|f| f.name == entry).unwrap_or(0);
    let mut cycle: Vec<String> = path[start..].iter().map(|f| f.name.to_string()).collect();
    cycle.push(entry.to_string());
    CycleError { path: cycle }
}

/// Rotate a cycle path so it starts at its smallest name.
///
/// Two reports of the same cycle entered at different nodes normalise to the
/// same path, which is what deduplication keys on.
pub fn canonical_cycle(cycle: &CycleError) -> Vec<String> {
    let members = cycle.members();
    let Some(start) = members
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(i, _)| i)
    else {
        return Vec::new();
    };
    let mut rotated: Vec<String> = members[start..]
        .iter()
        .chain(members[..start].iter())
        .cloned()
        .collect();
    rotated.push(members[start].clone());
    rotated
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{Overlay, TokenGraph};
    use crate::token::Token;
    use indexmap::IndexSet;

    fn graph(tokens: &[(&str, &str)]) -> TokenGraph {
        let tokens: Vec<Token> = tokens.iter().map(|(n, v)| Token::new(*n, *v, "")).collect();
        TokenGraph::build(&tokens).unwrap()
    }

    fn set(names: &[&str]) -> IndexSet<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn acyclic_graph_reports_nothing() {
        let g = graph(&[("a", "1"), ("b", "{a}"), ("c", "{a} {b}"), ("d", "{c} {a}")]);
        assert!(detect_cycle(&g).is_none());
    }

    #[test]
    fn diamond_is_not_a_cycle() {
        let g = graph(&[("top", "{l} {r}"), ("l", "{base}"), ("r", "{base}"), ("base", "0")]);
        assert!(detect_cycle(&g).is_none());
    }

    #[test]
    fn finds_cycle_in_overlay() {
        let g = graph(&[("p", "{q}"), ("q", "5"), ("x", "{p}")]);
        let mut overlay = Overlay::new(&g);
        overlay.set_dependencies("q", set(&["x"]), "{x}");

        let cycle = detect_cycle(&overlay).unwrap();
        assert_eq!(cycle.path, vec!["p", "q", "x", "p"]);
    }

    #[test]
    fn seeded_search_starts_at_roots() {
        let g = graph(&[("p", "{q}"), ("q", "5"), ("x", "{p}")]);
        let mut overlay = Overlay::new(&g);
        overlay.set_dependencies("q", set(&["x"]), "{x}");

        let cycle = detect_cycle_from(&overlay, ["q"]).unwrap();
        assert_eq!(cycle.path, vec!["q", "x", "p", "q"]);
        assert!(detect_cycle_from(&g, ["q", "x"]).is_none());
    }

    #[test]
    fn self_loop_in_overlay() {
        let g = graph(&[("a", "1")]);
        let mut overlay = Overlay::new(&g);
        overlay.set_dependencies("a", set(&["a"]), "{a}");
        assert_eq!(detect_cycle(&overlay).unwrap().path, vec!["a", "a"]);
    }

    #[test]
    fn deep_chain_does_not_overflow() {
        let mut tokens = vec![Token::new("t0", "0", "")];
        for i in 1..20_000 {
            tokens.push(Token::new(format!("t{i}"), format!("{{t{}}}", i - 1), ""));
        }
        let g = TokenGraph::build(&tokens).unwrap();
        assert!(detect_cycle(&g).is_none());
    }

    #[test]
    fn collects_every_loop_closed_by_one_edit() {
        let g = graph(&[("x", "1"), ("a", "{x}"), ("b", "{x}")]);
        let mut overlay = Overlay::new(&g);
        overlay.set_dependencies("x", set(&["a", "b"]), "{a} {b}");

        let paths: Vec<Vec<String>> = collect_cycles_from(&overlay, ["x"])
            .into_iter()
            .map(|c| c.path)
            .collect();
        assert_eq!(paths, vec![vec!["x", "a", "x"], vec!["x", "b", "x"]]);

        // The first-cycle search still stops early.
        assert_eq!(detect_cycle_from(&overlay, ["x"]).unwrap().path, vec!["x", "a", "x"]);
    }

    #[test]
    fn collected_cycles_are_deduplicated_across_roots() {
        let g = graph(&[("a", "1"), ("b", "{a}")]);
        let mut overlay = Overlay::new(&g);
        overlay.set_dependencies("a", set(&["b"]), "{b}");

        let cycles = collect_cycles_from(&overlay, ["a", "b"]);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].path, vec!["a", "b", "a"]);
        assert!(collect_cycles_from(&g, ["a", "b"]).is_empty());
    }

    #[test]
    fn canonical_rotation() {
        let a = CycleError {
            path: vec!["q".into(), "x".into(), "p".into(), "q".into()],
        };
        let b = CycleError {
            path: vec!["p".into(), "q".into(), "x".into(), "p".into()],
        };
        assert_eq!(canonical_cycle(&a), vec!["p", "q", "x", "p"]);
        assert_eq!(canonical_cycle(&a), canonical_cycle(&b));
    }
}
