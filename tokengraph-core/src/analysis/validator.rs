//! Change Validator
//!
//! Answers "what happens if these tokens get these values?" without touching
//! the live graph. Proposed values are parsed, applied to a copy-on-write
//! [`Overlay`], and the overlay is checked for new cycles and measured for
//! downstream impact. The overlay is dropped when validation returns.
//!
//! Validation never fails. Problems are reported in the returned
//! [`ValidationResult`] alongside the impact figures, so a caller can show
//! why a rejected change was risky.

use std::collections::HashSet;

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, warn};

use super::cascade::{cascade_all, Direction};
use super::cycle::collect_cycles_from;
use crate::error::{ParseError, UnknownReferenceError};
use crate::graph::{DependencyView, Overlay, TokenGraph};
use crate::reference::parse_references;
use crate::token::ProposedChange;

/// Outcome of validating a batch of proposed changes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    /// True when the batch introduces no cycle, no unknown reference and no
    /// parse error.
    pub valid: bool,

    /// Each distinct cycle the batch would create, as a closed name path.
    pub introduced_cycles: Vec<Vec<String>>,

    /// References to names that neither exist nor are introduced by the batch.
    pub unknown_references: Vec<UnknownReferenceError>,

    /// Proposed values that could not be parsed.
    pub parse_errors: Vec<ParseError>,

    /// Names changed more than once in the batch; the last value was used.
    pub duplicate_changes: Vec<String>,

    /// Changed names that do not exist in the live graph.
    pub new_tokens: Vec<String>,

    /// Size of the union of downstream closures of all changed tokens.
    pub impacted_count: usize,

    /// Deepest hop count reached by any of those closures.
    pub max_impact_depth: usize,
}

/// Validate `changes` against `graph` without modifying it.
pub fn validate(graph: &TokenGraph, changes: &[ProposedChange]) -> ValidationResult {
    // Last write wins for repeated names.
    let mut batch: IndexMap<&str, &ProposedChange> = IndexMap::with_capacity(changes.len());
    let mut duplicate_changes = Vec::new();
    for change in changes {
        if batch.insert(change.name.as_str(), change).is_some()
            && !duplicate_changes.contains(&change.name)
        {
            duplicate_changes.push(change.name.clone());
        }
    }

    let mut overlay = Overlay::new(graph);
    let mut new_tokens = Vec::new();
    for &name in batch.keys() {
        if !graph.contains(name) {
            overlay.add_token(name, "", "");
            new_tokens.push(name.to_string());
        }
    }

    let mut unknown_references = Vec::new();
    let mut parse_errors = Vec::new();
    for (&name, change) in &batch {
        let references = match parse_references(name, &change.new_raw_value) {
            Ok(references) => references,
            Err(err) => {
                // Keep the previous edges; the change cannot be applied.
                parse_errors.push(err);
                continue;
            }
        };

        let mut known = IndexSet::with_capacity(references.len());
        for reference in references {
            if overlay.contains(&reference) {
                known.insert(reference);
            } else {
                unknown_references.push(UnknownReferenceError {
                    token: name.to_string(),
                    missing_ref: reference,
                });
            }
        }
        overlay.set_dependencies(name, known, &change.new_raw_value);
    }

    let introduced_cycles: Vec<Vec<String>> =
        collect_cycles_from(&overlay, batch.keys().copied())
            .into_iter()
            .map(|cycle| cycle.path)
            .collect();

    let mut impacted: HashSet<&str> = HashSet::new();
    let mut max_impact_depth: usize = 0;
    for &name in batch.keys() {
        if let Ok(result) = cascade_all(&overlay, name, Direction::Downstream) {
            max_impact_depth = max_impact_depth.max(result.max_depth());
            for reached in result.names() {
                if let Some(node) = overlay.node(reached) {
                    impacted.insert(node.name());
                }
            }
        }
    }

    let valid = introduced_cycles.is_empty()
        && unknown_references.is_empty()
        && parse_errors.is_empty();

    let result = ValidationResult {
        valid,
        introduced_cycles,
        unknown_references,
        parse_errors,
        duplicate_changes,
        new_tokens,
        impacted_count: impacted.len(),
        max_impact_depth,
    };

    if valid {
        debug!(
            changes = batch.len(),
            patched = overlay.patched_len(),
            impacted = result.impacted_count,
            "validated token changes"
        );
    } else {
        warn!(
            changes = batch.len(),
            cycles = result.introduced_cycles.len(),
            unknown = result.unknown_references.len(),
            parse_errors = result.parse_errors.len(),
            impacted = result.impacted_count,
            "token changes rejected"
        );
    }

    result
}
