/// Lexical context while walking SQL text byte by byte.
#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    LineComment,
    BlockComment,
}

pub(super) const LINE_COMMENT: &[u8; 2] = b"--";
pub(super) const BLOCK_COMMENT_OPEN: &[u8; 2] = b"/*";
pub(super) const BLOCK_COMMENT_CLOSE: &[u8; 2] = b"*/";

pub(super) fn pair_at(bytes: &[u8], idx: usize, pair: &[u8; 2]) -> bool {
    bytes.get(idx..idx + 2) == Some(pair.as_slice())
}

/// Digits starting at `start`: the index just past them and their value.
///
/// Values too large for `usize` saturate; they can never match a real ordinal.
pub(super) fn scan_ordinal(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let len = bytes
        .get(start..)?
        .iter()
        .take_while(|b| b.is_ascii_digit())
        .count();
    if len == 0 {
        return None;
    }
    let value = bytes[start..start + len].iter().fold(0usize, |acc, b| {
        acc.saturating_mul(10).saturating_add(usize::from(b - b'0'))
    });
    Some((start + len, value))
}

/// `$` is a legal identifier character in Firebird (`RDB$RELATIONS`), so `$N` only
/// starts a placeholder when it does not continue an identifier.
pub(super) fn continues_identifier(bytes: &[u8], idx: usize) -> bool {
    idx.checked_sub(1)
        .and_then(|prev| bytes.get(prev))
        .is_some_and(|b| b.is_ascii_alphanumeric() || *b == b'_' || *b == b'$')
}
