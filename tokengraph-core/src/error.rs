//! Error Types
//!
//! Every failure the engine can report is a typed value carrying the names
//! and paths involved, so presentation layers can render their own messages
//! without parsing strings.
//!
//! # Taxonomy
//!
//! - [`ParseError`]: malformed reference syntax in a raw value
//! - [`DuplicateTokenError`]: two snapshot records share a name
//! - [`UnknownReferenceError`]: a value references a name that is not a token
//! - [`CycleError`]: a directed cycle, as an ordered name path
//! - [`NotFoundError`]: a query named a token absent from the graph
//!
//! Build-time problems are batched into [`BuildError::Rejected`]; a cycle
//! found after a clean parse pass is reported alone as [`BuildError::Cycle`].

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// What was wrong with a reference placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseErrorKind {
    /// `{` with no matching `}`.
    Unterminated,
    /// `{` opened inside a reference that is still open.
    Nested,
    /// `{}` or a placeholder containing only whitespace.
    Empty,
    /// `}` with no open reference.
    UnmatchedClose,
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ParseErrorKind::Unterminated => "unterminated reference",
            ParseErrorKind::Nested => "nested reference",
            ParseErrorKind::Empty => "empty reference",
            ParseErrorKind::UnmatchedClose => "unmatched closing brace",
        };
        f.write_str(text)
    }
}

/// A raw value contained malformed placeholder syntax.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize)]
#[error("{kind} in token `{token}` at byte {offset}: `{fragment}`")]
pub struct ParseError {
    /// The token whose value was being parsed.
    pub token: String,
    /// The offending slice of the raw value.
    pub fragment: String,
    /// Byte offset of the fragment within the raw value.
    pub offset: usize,
    pub kind: ParseErrorKind,
}

/// The snapshot contained the same token name more than once.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize)]
#[error("duplicate token `{name}` (records {first_index} and {duplicate_index})")]
pub struct DuplicateTokenError {
    pub name: String,
    /// Snapshot position of the record that was kept.
    pub first_index: usize,
    /// Snapshot position of the rejected record.
    pub duplicate_index: usize,
}

/// A token references a name that no token carries.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize)]
#[error("token `{token}` references unknown token `{missing_ref}`")]
#[serde(rename_all = "camelCase")]
pub struct UnknownReferenceError {
    pub token: String,
    pub missing_ref: String,
}

/// A directed dependency cycle.
///
/// The path starts and ends with the same name, e.g. `["a", "b", "a"]`
/// means `a` depends on `b` and `b` depends on `a`. A self-reference is the
/// two element path `["a", "a"]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize)]
#[error("dependency cycle: {}", .path.join(" -> "))]
pub struct CycleError {
    pub path: Vec<String>,
}

impl CycleError {
    /// The distinct members of the cycle, without the closing repeat.
    pub fn members(&self) -> &[String] {
        match self.path.split_last() {
            Some((_, rest)) if !rest.is_empty() => rest,
            _ => &self.path,
        }
    }
}

/// A query named a token that is not in the graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Error, Serialize)]
#[error("token `{name}` not found")]
pub struct NotFoundError {
    pub name: String,
}

/// One problem found while checking a token snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SnapshotError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Duplicate(#[from] DuplicateTokenError),

    #[error(transparent)]
    UnknownReference(#[from] UnknownReferenceError),
}

/// A snapshot could not be turned into a graph.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    /// Every parse, duplicate and dangling-reference problem in the snapshot.
    #[error("token snapshot rejected with {} problem(s)", .0.len())]
    Rejected(Vec<SnapshotError>),

    /// The snapshot was otherwise well formed but contains a cycle.
    #[error(transparent)]
    Cycle(#[from] CycleError),
}

impl BuildError {
    /// All snapshot problems, empty for a cycle rejection.
    pub fn problems(&self) -> &[SnapshotError] {
        match self {
            BuildError::Rejected(problems) => problems,
            BuildError::Cycle(_) => &[],
        }
    }
}

/// An evaluation order could not be produced.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScheduleError {
    #[error(transparent)]
    NotFound(#[from] NotFoundError),

    #[error(transparent)]
    Cycle(#[from] CycleError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_error_renders_path() {
        let err = CycleError {
            path: vec!["a".into(), "b".into(), "a".into()],
        };
        assert_eq!(err.to_string(), "dependency cycle: a -> b -> a");
        assert_eq!(err.members(), ["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn self_loop_members() {
        let err = CycleError {
            path: vec!["a".into(), "a".into()],
        };
        assert_eq!(err.members(), ["a".to_string()]);
    }

    #[test]
    fn build_error_exposes_problems() {
        let err = BuildError::Rejected(vec![UnknownReferenceError {
            token: "x".into(),
            missing_ref: "missing".into(),
        }
        .into()]);
        assert_eq!(err.problems().len(), 1);
        assert_eq!(err.to_string(), "token snapshot rejected with 1 problem(s)");
    }
}
