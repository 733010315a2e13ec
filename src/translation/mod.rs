use std::borrow::Cow;

mod scanner;

use scanner::{
    BLOCK_COMMENT_CLOSE, BLOCK_COMMENT_OPEN, LINE_COMMENT, State, continues_identifier, pair_at,
    scan_ordinal,
};

use crate::error::FirebirdDbError;
use crate::types::RowValues;

/// The only parameter marker the native Firebird client understands.
pub const NATIVE_PLACEHOLDER: char = '?';

/// A parameter marker found in SQL text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// Framework-style numbered marker: `$N` (or `?N`).
    Numbered(usize),
    /// Bare sequential marker: `?`.
    Sequential,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placeholder {
    start: usize,
    end: usize,
    marker: Marker,
}

/// Locate every placeholder outside quoted strings, quoted identifiers and comments.
fn find_placeholders(sql: &str) -> Vec<Placeholder> {
    let bytes = sql.as_bytes();
    let mut found = Vec::new();
    let mut state = State::Normal;
    let mut idx = 0;

    while idx < bytes.len() {
        let b = bytes[idx];
        state = match state {
            State::Normal if b == b'\'' => State::SingleQuoted,
            State::Normal if b == b'"' => State::DoubleQuoted,
            State::Normal if pair_at(bytes, idx, LINE_COMMENT) => {
                idx += 1;
                State::LineComment
            }
            State::Normal if pair_at(bytes, idx, BLOCK_COMMENT_OPEN) => {
                idx += 1;
                State::BlockComment
            }
            State::Normal => {
                let numbered = (b == b'$' && !continues_identifier(bytes, idx)) || b == b'?';
                match scan_ordinal(bytes, idx + 1).filter(|_| numbered) {
                    Some((end, n)) => {
                        found.push(Placeholder {
                            start: idx,
                            end,
                            marker: Marker::Numbered(n),
                        });
                        idx = end - 1;
                    }
                    None if b == b'?' => found.push(Placeholder {
                        start: idx,
                        end: idx + 1,
                        marker: Marker::Sequential,
                    }),
                    None => {}
                }
                State::Normal
            }
            // a doubled quote is an escaped quote and keeps the literal open
            State::SingleQuoted | State::DoubleQuoted => {
                let quote = if state == State::SingleQuoted { b'\'' } else { b'"' };
                if b != quote {
                    state
                } else if bytes.get(idx + 1) == Some(&quote) {
                    idx += 1;
                    state
                } else {
                    State::Normal
                }
            }
            State::LineComment if b == b'\n' => State::Normal,
            State::BlockComment if pair_at(bytes, idx, BLOCK_COMMENT_CLOSE) => {
                idx += 1;
                State::Normal
            }
            State::LineComment | State::BlockComment => state,
        };
        idx += 1;
    }

    found
}

/// Rewrite numbered placeholders (`$1`, `?2`, ...) into the driver's sequential `?`.
///
/// Numbering must run 1..N without gaps, duplicates or reordering, because the native
/// client binds strictly by position. The number of markers must also equal
/// `param_count`. Returns a borrowed `Cow` when the text is already in native form.
///
/// # Errors
/// Returns [`FirebirdDbError::PlaceholderError`] naming the offending marker.
pub fn renumber_placeholders(
    sql: &str,
    param_count: usize,
) -> Result<Cow<'_, str>, FirebirdDbError> {
    let placeholders = find_placeholders(sql);

    for (ordinal, placeholder) in placeholders.iter().enumerate() {
        let expected = ordinal + 1;
        if let Marker::Numbered(n) = placeholder.marker {
            if n < expected {
                return Err(FirebirdDbError::PlaceholderError(format!(
                    "placeholder ${n} is duplicated or out of order; expected ${expected}"
                )));
            }
            if n > expected {
                return Err(FirebirdDbError::PlaceholderError(format!(
                    "placeholder ${n} leaves a gap; expected ${expected}"
                )));
            }
        }
    }

    if placeholders.len() != param_count {
        return Err(FirebirdDbError::PlaceholderError(format!(
            "statement has {} placeholders but {param_count} parameters were supplied",
            placeholders.len()
        )));
    }

    if placeholders
        .iter()
        .all(|p| p.marker == Marker::Sequential)
    {
        return Ok(Cow::Borrowed(sql));
    }

    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for placeholder in &placeholders {
        out.push_str(&sql[last..placeholder.start]);
        out.push(NATIVE_PLACEHOLDER);
        last = placeholder.end;
    }
    out.push_str(&sql[last..]);
    Ok(Cow::Owned(out))
}

/// Number of placeholders in `sql`, ignoring literals and comments.
#[must_use]
pub fn count_placeholders(sql: &str) -> usize {
    find_placeholders(sql).len()
}

/// Inline parameter values into SQL text for log output.
///
/// Strings are quoted, other values stringified, and markers without a matching
/// parameter render as `null`. This text is for diagnostics only and is never sent to
/// the driver.
#[must_use]
pub fn inline_parameters(sql: &str, params: &[RowValues]) -> String {
    let mut out = String::with_capacity(sql.len());
    let mut last = 0;
    for (ordinal, placeholder) in find_placeholders(sql).iter().enumerate() {
        let index = match placeholder.marker {
            Marker::Numbered(n) => n.checked_sub(1),
            Marker::Sequential => Some(ordinal),
        };
        out.push_str(&sql[last..placeholder.start]);
        match index.and_then(|i| params.get(i)) {
            Some(value) => out.push_str(&value.to_log_literal()),
            None => out.push_str("null"),
        }
        last = placeholder.end;
    }
    out.push_str(&sql[last..]);
    out
}
