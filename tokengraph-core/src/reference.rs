//! Reference Parser
//!
//! Extracts the names of other tokens referenced by a raw value expression.
//!
//! # Syntax
//!
//! A reference is a token name wrapped in braces: `{color.blue.500}`.
//! References may be embedded anywhere in an expression, e.g.
//! `calc({space.base} * 2)` or `{font.size} / {font.scale}`.
//! Whitespace just inside the braces is ignored.
//!
//! Brace placement is strict. An unterminated `{`, a `{` inside an open
//! reference, an empty `{}` and a stray `}` are all reported as
//! [`ParseError`]s rather than being skipped.

use indexmap::IndexSet;

use crate::error::{ParseError, ParseErrorKind};

const OPEN: char = '{';
const CLOSE: char = '}';

/// Parse the set of token names referenced by `raw_value`.
///
/// `token` names the token whose value is being parsed and is only used to
/// label errors. Names are returned in order of first appearance, without
/// duplicates.
pub fn parse_references(token: &str, raw_value: &str) -> Result<IndexSet<String>, ParseError> {
    let mut references = IndexSet::new();
    // Byte offset of the currently open `{`, if any.
    let mut open_at: Option<usize> = None;

    for (offset, ch) in raw_value.char_indices() {
        match (ch, open_at) {
            (OPEN, None) => open_at = Some(offset),
            (OPEN, Some(start)) => {
                return Err(error(token, raw_value, start, offset + 1, ParseErrorKind::Nested));
            }
            (CLOSE, Some(start)) => {
                let name = raw_value[start + 1..offset].trim();
                if name.is_empty() {
                    return Err(error(token, raw_value, start, offset + 1, ParseErrorKind::Empty));
                }
                references.insert(name.to_string());
                open_at = None;
            }
            (CLOSE, None) => {
                return Err(error(
                    token,
                    raw_value,
                    offset,
                    offset + 1,
                    ParseErrorKind::UnmatchedClose,
                ));
            }
            _ => {}
        }
    }

    if let Some(start) = open_at {
        return Err(error(
            token,
            raw_value,
            start,
            raw_value.len(),
            ParseErrorKind::Unterminated,
        ));
    }

    Ok(references)
}

fn error(
    token: &str,
    raw_value: &str,
    start: usize,
    end: usize,
    kind: ParseErrorKind,
) -> ParseError {
    ParseError {
        token: token.to_string(),
        fragment: raw_value[start..end].to_string(),
        offset: start,
        kind,
    }
}
