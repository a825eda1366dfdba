//! Wildcard pattern relations over attribute values in standard form
//!
//! The standard form quotes every non-alphanumeric character with a
//! backslash and reserves unquoted `?` (zero or one character) and `*`
//! (any sequence) as the only metacharacters. The comparison here is the
//! attribute-value relation of the 2.3 name-matching algorithm: the
//! source acts as the pattern, the target as the concrete value, and
//! unquoted wildcards are legal only at the ends of the source.

use serde::{Deserialize, Serialize};

/// Set relation between a source and a target attribute value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Relation {
    /// The source describes a strictly larger value set than the target
    Superset,
    /// The source describes a strictly smaller value set than the target
    Subset,
    Equal,
    Disjoint,
    /// The target carries unquoted wildcards; the relation is undefined
    Undefined,
}

/// True if the string contains an unquoted `*` or `?`
pub fn has_unquoted_wildcard(s: &str) -> bool {
    for needle in ['*', '?'] {
        if let Some(idx) = s.find(needle) {
            if idx == 0 || s.as_bytes()[idx - 1] != b'\\' {
                return true;
            }
        }
    }
    false
}

/// True if an even number of backslashes immediately precedes byte `idx`,
/// meaning the character at `idx` is itself unquoted
pub fn is_unquoted_at(s: &str, idx: usize) -> bool {
    let bytes = s.as_bytes();
    let mut count = 0;
    let mut i = idx;
    while i > 0 && bytes[i - 1] == b'\\' {
        i -= 1;
        count += 1;
    }
    count % 2 == 0
}

/// Compare a source pattern to a target value, both in standard form.
///
/// Unquoted special characters appear only at the beginning and/or the
/// end of the source: a single `*` or a run of `?`. The body between
/// them must occur in the target at a position the wildcards can absorb,
/// where quoting backslashes in the target do not count as characters.
///
/// Returns `Relation::Superset` or `Relation::Disjoint`.
pub fn compare_strings(source: &str, target: &str) -> Relation {
    let bytes = source.as_bytes();
    let mut start = 0usize;
    let mut end = bytes.len();

    // -1 encodes a leading/trailing `*`; >= 0 counts `?` characters
    let mut begins: isize = 0;
    let mut ends: isize = 0;

    if source.starts_with('*') {
        start = 1;
        begins = -1;
    } else {
        while start < bytes.len() && bytes[start] == b'?' {
            start += 1;
            begins += 1;
        }
    }

    // The trailing scan runs over the full source; a single `*` or `?`
    // source counts as both a leading and a trailing wildcard and leaves
    // an empty body.
    if !bytes.is_empty() && bytes[end - 1] == b'*' && is_unquoted_at(source, end - 1) {
        end -= 1;
        ends = -1;
    } else {
        while end > 0 && bytes[end - 1] == b'?' && is_unquoted_at(source, end - 1) {
            end -= 1;
            ends += 1;
        }
    }

    let body = if start < end { &source[start..end] } else { "" };
    let target_len = target.len() as isize;

    let mut search_from = 0usize;
    let mut leftover = target_len;

    while leftover > 0 {
        if search_from > target.len() {
            break;
        }
        let index = match target[search_from..].find(body) {
            Some(rel) => search_from + rel,
            None => break,
        };
        search_from = index + 1;

        let quotes_before = target[..index].matches('\\').count() as isize;
        if index > 0 && begins != -1 && begins < index as isize - quotes_before {
            break;
        }

        let tail = target.get(index + 1..).unwrap_or("");
        let quotes_after = tail.matches('\\').count() as isize;
        leftover = target_len - index as isize - quotes_after - body.len() as isize;
        if leftover > 0 && ends != -1 && leftover > ends {
            continue;
        }

        return Relation::Superset;
    }

    Relation::Disjoint
}
