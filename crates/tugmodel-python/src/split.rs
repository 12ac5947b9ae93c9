// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Depth-aware text splitting.
//!
//! Every helper here walks text with a [`Nesting`] so separators inside
//! brackets or strings are never split on. "Top level" means outside every
//! bracket and string.
//!
//! The atom helpers implement separator recovery. An *atom* is a maximal
//! run of top-level non-whitespace text, where bracketed and quoted groups
//! belong to the atom they start in. [`split_adjacent`] groups atoms back
//! into items, joining across operators and keywords so that `a + b` stays
//! one item while `1 2` (a missing comma) becomes two.

use std::ops::Range;

use crate::scanner::Nesting;

/// Keywords that continue an expression across whitespace.
const CONNECTOR_KEYWORDS: &[&str] = &[
    "if", "else", "and", "or", "not", "in", "is", "lambda", "for", "await", "async",
];

/// Chars that continue an expression when they end an atom.
const TRAILING_CONNECTORS: &[char] = &[
    '=', ':', '+', '-', '*', '/', '%', '|', '&', '^', '<', '>', '.', '@', '~', '!', ',',
];

/// Chars that continue an expression when they start an atom. `*` is
/// absent so `*args` after a missing comma starts a new item.
const LEADING_CONNECTORS: &[char] = &[
    '=', ':', '+', '-', '/', '%', '|', '&', '^', '<', '>', '.', '@', '!', ',', ')', ']', '}',
];

/// Walk `text`, calling `visit(index, len, char, top_level)` once per
/// lexical unit (see [`Nesting::step`]). `top_level` reflects the state
/// *before* the unit, so an opening bracket or quote at depth zero is
/// reported as top level and its closer is not.
pub fn walk(text: &str, mut visit: impl FnMut(usize, usize, char, bool)) {
    let mut nesting = Nesting::new();
    let mut i = 0;
    while i < text.len() {
        let Some(c) = text[i..].chars().next() else {
            break;
        };
        let top = nesting.is_top_level();
        let len = nesting.step(&text[i..]);
        visit(i, len, c, top);
        i += len;
    }
}

/// Byte offsets of top-level chars matching `pred`.
pub fn top_level_positions(text: &str, pred: impl Fn(char) -> bool) -> Vec<usize> {
    let mut positions = Vec::new();
    walk(text, |i, _, c, top| {
        if top && pred(c) {
            positions.push(i);
        }
    });
    positions
}

/// Byte offset of the first top-level char matching `pred`.
pub fn find_top_level(text: &str, pred: impl Fn(char) -> bool) -> Option<usize> {
    top_level_positions(text, pred).into_iter().next()
}

/// True if `sep` occurs at top level.
pub fn has_top_level(text: &str, sep: char) -> bool {
    find_top_level(text, |c| c == sep).is_some()
}

/// Split at top-level `sep`. Pieces are trimmed; empty pieces are kept so
/// callers can tell `a,,b` and a trailing comma apart.
pub fn split_top_level(text: &str, sep: char) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut start = 0;
    for pos in top_level_positions(text, |c| c == sep) {
        pieces.push(text[start..pos].trim());
        start = pos + sep.len_utf8();
    }
    pieces.push(text[start..].trim());
    pieces
}

/// Split at top-level commas, dropping the empty piece after a trailing
/// comma and any empty pieces from doubled commas.
pub fn split_items(text: &str) -> Vec<&str> {
    split_top_level(text, ',')
        .into_iter()
        .filter(|piece| !piece.is_empty())
        .collect()
}

/// Byte offset just past the bracket group or string that starts `text`.
///
/// Returns `None` if the group never closes.
pub fn group_end(text: &str) -> Option<usize> {
    let mut nesting = Nesting::new();
    let mut i = 0;
    while i < text.len() {
        i += nesting.step(&text[i..]);
        if nesting.is_top_level() {
            return Some(i);
        }
    }
    None
}

/// If `text` is wrapped in `open` and its matching closer, return the
/// inner text.
///
/// `(1)+(2)` is not wrapped: its first `(` closes before the end.
pub fn enclosed_by(text: &str, open: char, close: char) -> Option<&str> {
    if !text.starts_with(open) || !text.ends_with(close) || text.len() < 2 {
        return None;
    }
    (group_end(text)? == text.len())
        .then(|| &text[open.len_utf8()..text.len() - close.len_utf8()])
}

/// Strip a leading keyword followed by a non-identifier char.
///
/// `strip_keyword("class Foo:", "class")` is `Some("Foo:")`, while
/// `strip_keyword("classify()", "class")` is `None`.
pub fn strip_keyword<'a>(text: &'a str, keyword: &str) -> Option<&'a str> {
    let rest = text.strip_prefix(keyword)?;
    match rest.chars().next() {
        None => Some(rest),
        Some(c) if c.is_alphanumeric() || c == '_' => None,
        Some(_) => Some(rest.trim_start()),
    }
}

// ============================================================================
// Assignment Operators
// ============================================================================

/// A top-level `=` found by [`find_assignment`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AssignOp {
    /// Byte offset of the `=`.
    pub pos: usize,
    /// Byte offset where the operator starts (before `+` in `+=`).
    pub op_start: usize,
    /// True for augmented forms like `+=` and `//=`.
    pub augmented: bool,
}

/// Find the first top-level assignment `=`, skipping `==`, `!=`, `<=`,
/// `>=` and the walrus `:=`.
pub fn find_assignment(text: &str) -> Option<AssignOp> {
    let bytes = text.as_bytes();
    let positions = top_level_positions(text, |c| c == '=');
    let mut skip_next = None;
    for pos in positions {
        if skip_next == Some(pos) {
            continue;
        }
        if bytes.get(pos + 1) == Some(&b'=') {
            skip_next = Some(pos + 1);
            continue;
        }
        let prev = pos.checked_sub(1).map(|p| bytes[p]);
        let prev2 = pos.checked_sub(2).map(|p| bytes[p]);
        match prev {
            Some(b'>') | Some(b'<') => {
                // `>>=` and `<<=` are augmented; `>=` and `<=` compare.
                if prev2 == prev {
                    return Some(AssignOp {
                        pos,
                        op_start: pos - 2,
                        augmented: true,
                    });
                }
                continue;
            }
            Some(b'!') | Some(b':') | Some(b'=') => continue,
            Some(b'+') | Some(b'-') | Some(b'%') | Some(b'&') | Some(b'|') | Some(b'^')
            | Some(b'@') => {
                return Some(AssignOp {
                    pos,
                    op_start: pos - 1,
                    augmented: true,
                })
            }
            Some(b'*') | Some(b'/') => {
                let op_start = if prev2 == prev { pos - 2 } else { pos - 1 };
                return Some(AssignOp {
                    pos,
                    op_start,
                    augmented: true,
                });
            }
            _ => {
                return Some(AssignOp {
                    pos,
                    op_start: pos,
                    augmented: false,
                })
            }
        }
    }
    None
}

// ============================================================================
// Names and Literals
// ============================================================================

/// True if `text` is a single Python identifier.
pub fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(c) if c.is_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_alphanumeric() || c == '_')
}

/// True if `text` is one or more identifiers joined by dots, allowing
/// whitespace around the dots.
pub fn is_dotted_name(text: &str) -> bool {
    !text.is_empty() && text.split('.').all(|segment| is_identifier(segment.trim()))
}

/// Split a dotted name into trimmed segments.
pub fn dotted_segments(text: &str) -> Vec<String> {
    text.split('.').map(|s| s.trim().to_string()).collect()
}

/// Length of a string-literal prefix (`r`, `b`, `u`, `f` and pairs) if
/// `text` starts with one followed by a quote.
pub fn string_prefix_len(text: &str) -> Option<usize> {
    let quote_at = text.find(['\'', '"'])?;
    let prefix = &text[..quote_at];
    let valid = prefix.len() <= 2
        && prefix
            .chars()
            .all(|c| matches!(c.to_ascii_lowercase(), 'r' | 'b' | 'u' | 'f'));
    valid.then_some(quote_at)
}

/// True if `text` is exactly one string literal, prefix included.
pub fn is_single_string(text: &str) -> bool {
    let Some(prefix) = string_prefix_len(text) else {
        return false;
    };
    let body = &text[prefix..];
    let mut nesting = Nesting::new();
    let first = nesting.step(body);
    if first == 0 {
        return false;
    }
    let mut i = first;
    while i < body.len() {
        i += nesting.step(&body[i..]);
        if !nesting.in_string() {
            return i == body.len();
        }
    }
    false
}

// ============================================================================
// Atoms and Separator Recovery
// ============================================================================

/// Byte ranges of the top-level atoms of `text`.
pub fn atom_spans(text: &str) -> Vec<Range<usize>> {
    let mut spans = Vec::new();
    let mut current: Option<Range<usize>> = None;
    walk(text, |i, len, c, top| {
        if top && c.is_whitespace() {
            if let Some(span) = current.take() {
                spans.push(span);
            }
        } else {
            match current.as_mut() {
                Some(span) => span.end = i + len,
                None => current = Some(i..i + len),
            }
        }
    });
    if let Some(span) = current {
        spans.push(span);
    }
    spans
}

/// The top-level atoms of `text`.
pub fn atoms(text: &str) -> Vec<&str> {
    atom_spans(text).into_iter().map(|r| &text[r]).collect()
}

fn is_connector_keyword(atom: &str) -> bool {
    CONNECTOR_KEYWORDS.contains(&atom)
}

fn continues(previous: &str, next: &str) -> bool {
    if is_connector_keyword(previous) || is_connector_keyword(next) {
        return true;
    }
    if previous.ends_with(TRAILING_CONNECTORS) || next.starts_with(LEADING_CONNECTORS) {
        return true;
    }
    // Implicit string concatenation: 'a' 'b'
    is_single_string(previous) && is_single_string(next)
}

/// Group the atoms of `text` into items, splitting only where two atoms sit
/// next to each other with nothing joining them.
///
/// A result longer than one means the text was missing a separator.
pub fn split_adjacent(text: &str) -> Vec<&str> {
    let spans = atom_spans(text);
    let mut groups: Vec<Range<usize>> = Vec::new();
    let mut last_atom: Option<Range<usize>> = None;
    for span in spans {
        let joins = match (&last_atom, groups.last()) {
            (Some(prev), Some(_)) => continues(&text[prev.clone()], &text[span.clone()]),
            _ => false,
        };
        if joins {
            if let Some(group) = groups.last_mut() {
                group.end = span.end;
            }
        } else {
            groups.push(span.clone());
        }
        last_atom = Some(span);
    }
    groups.into_iter().map(|r| &text[r]).collect()
}

/// One `key: value` pair split out of a dict entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DictEntry<'a> {
    pub key: &'a str,
    pub value: &'a str,
}

/// Split one comma-delimited dict piece into entries.
///
/// Normally the piece holds a single `key: value`. When entries were
/// written without a comma (`'a': 1 'b': 2`) there are several top-level
/// colons; the text between two colons is split so its last item becomes
/// the next key. Colons that end a `lambda` parameter list belong to the
/// value. Returns the entries and whether recovery was needed.
pub fn split_dict_entries(piece: &str) -> (Vec<DictEntry<'_>>, bool) {
    let colons = entry_colons(piece);
    let Some(&first) = colons.first() else {
        return (Vec::new(), false);
    };
    if colons.len() == 1 {
        let entry = DictEntry {
            key: piece[..first].trim(),
            value: piece[first + 1..].trim(),
        };
        return (vec![entry], false);
    }

    let mut entries = Vec::new();
    let mut key = piece[..first].trim();
    for window in colons.windows(2) {
        let middle = &piece[window[0] + 1..window[1]];
        let spans = atom_spans(middle);
        let groups = split_adjacent(middle);
        // The next key is the last item, or at least the last atom.
        let split_at = if groups.len() >= 2 {
            groups.last().and_then(|g| middle.rfind(g))
        } else if spans.len() >= 2 {
            spans.last().map(|r| r.start)
        } else {
            None
        };
        let Some(split_at) = split_at else {
            // No way to separate value from next key; keep the first pair
            // whole and let classification report what it can.
            let entry = DictEntry {
                key: piece[..first].trim(),
                value: piece[first + 1..].trim(),
            };
            return (vec![entry], false);
        };
        entries.push(DictEntry {
            key,
            value: middle[..split_at].trim(),
        });
        key = middle[split_at..].trim();
    }
    let last_colon = colons[colons.len() - 1];
    entries.push(DictEntry {
        key,
        value: piece[last_colon + 1..].trim(),
    });
    (entries, true)
}

/// Top-level colons of `piece`, minus those closing a `lambda` header.
fn entry_colons(piece: &str) -> Vec<usize> {
    let mut colons = Vec::new();
    let mut open_lambdas = 0;
    let mut start = 0;
    for colon in top_level_positions(piece, |c| c == ':') {
        open_lambdas += atoms(&piece[start..colon])
            .iter()
            .filter(|atom| **atom == "lambda")
            .count();
        if open_lambdas > 0 {
            open_lambdas -= 1;
        } else {
            colons.push(colon);
        }
        start = colon + 1;
    }
    colons
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_ignores_nested_separators() {
        assert_eq!(
            split_top_level("1, (2, 3), [4, 5], {'a': 6}, 'x,y'", ','),
            vec!["1", "(2, 3)", "[4, 5]", "{'a': 6}", "'x,y'"]
        );
        assert_eq!(split_top_level("1,", ','), vec!["1", ""]);
        assert_eq!(split_items("1,,2,"), vec!["1", "2"]);
        assert_eq!(split_items(""), Vec::<&str>::new());
    }

    #[test]
    fn enclosed_by_requires_matching_outer_pair() {
        assert_eq!(enclosed_by("(1, 2)", '(', ')'), Some("1, 2"));
        assert_eq!(enclosed_by("()", '(', ')'), Some(""));
        assert_eq!(enclosed_by("(1)+(2)", '(', ')'), None);
        assert_eq!(enclosed_by("[(1, ']')]", '[', ']'), Some("(1, ']')"));
        assert_eq!(enclosed_by("[1, 2", '[', ']'), None);
    }

    #[test]
    fn group_end_and_keywords() {
        assert_eq!(group_end("(a, (b)) rest"), Some(8));
        assert_eq!(group_end("'x' + y"), Some(3));
        assert_eq!(group_end("(unclosed"), None);
        assert_eq!(strip_keyword("class Foo:", "class"), Some("Foo:"));
        assert_eq!(strip_keyword("classify()", "class"), None);
        assert_eq!(strip_keyword("pass", "pass"), Some(""));
    }

    #[test]
    fn find_assignment_skips_comparisons() {
        let op = find_assignment("x = 1").unwrap();
        assert_eq!((op.pos, op.augmented), (2, false));

        assert_eq!(find_assignment("x == 1"), None);
        assert_eq!(find_assignment("a <= b"), None);
        assert_eq!(find_assignment("(y := 3)"), None);
        assert_eq!(find_assignment("f(a=1)"), None);
        assert_eq!(find_assignment("d['k'] != v"), None);

        let op = find_assignment("x == 1 or y = 2").unwrap();
        assert_eq!(op.pos, 12);

        let op = find_assignment("total += 1").unwrap();
        assert!(op.augmented);
        assert_eq!(op.op_start, 6);

        let op = find_assignment("n //= 2").unwrap();
        assert!(op.augmented);
        assert_eq!(op.op_start, 2);

        let op = find_assignment("bits >>= 1").unwrap();
        assert!(op.augmented);
    }

    #[test]
    fn identifiers_and_dotted_names() {
        assert!(is_identifier("_private1"));
        assert!(!is_identifier("1abc"));
        assert!(!is_identifier("a.b"));
        assert!(is_dotted_name("os.path.join"));
        assert!(is_dotted_name("self . x"));
        assert!(!is_dotted_name("a..b"));
        assert_eq!(dotted_segments("a . b.c"), vec!["a", "b", "c"]);
    }

    #[test]
    fn string_literal_detection() {
        assert!(is_single_string("'abc'"));
        assert!(is_single_string("r'\\d+'"));
        assert!(is_single_string("b\"bytes\""));
        assert!(is_single_string("'''tri'ple'''"));
        assert!(!is_single_string("'a' 'b'"));
        assert!(!is_single_string("'a' + x"));
        assert!(!is_single_string("xyz'a'"));
    }

    #[test]
    fn atoms_keep_groups_together() {
        assert_eq!(
            atoms("a = f(1, 2)  'x y'  [3 4]"),
            vec!["a", "=", "f(1, 2)", "'x y'", "[3 4]"]
        );
    }

    #[test]
    fn split_adjacent_recovers_missing_separators() {
        assert_eq!(split_adjacent("1 2"), vec!["1", "2"]);
        assert_eq!(split_adjacent("a=1 b=2"), vec!["a=1", "b=2"]);
        assert_eq!(split_adjacent("a = 1 b = 2"), vec!["a = 1", "b = 2"]);
        assert_eq!(split_adjacent("x *args"), vec!["x", "*args"]);
        // Expressions stay whole.
        assert_eq!(split_adjacent("a + b"), vec!["a + b"]);
        assert_eq!(split_adjacent("x if y else z"), vec!["x if y else z"]);
        assert_eq!(split_adjacent("value: int = 3"), vec!["value: int = 3"]);
        assert_eq!(split_adjacent("'a' 'b'"), vec!["'a' 'b'"]);
        assert_eq!(split_adjacent("single"), vec!["single"]);
    }

    #[test]
    fn dict_entries_without_commas_are_recovered() {
        let (entries, recovered) = split_dict_entries("'a': 1");
        assert!(!recovered);
        assert_eq!(entries, vec![DictEntry { key: "'a'", value: "1" }]);

        let (entries, recovered) = split_dict_entries("'a': 1 'b': {'c': 2}");
        assert!(recovered);
        assert_eq!(
            entries,
            vec![
                DictEntry { key: "'a'", value: "1" },
                DictEntry {
                    key: "'b'",
                    value: "{'c': 2}"
                },
            ]
        );

        // Adjacent strings still split when a key has to be found.
        let (entries, recovered) = split_dict_entries("'a': 'x' 'b': 2");
        assert!(recovered);
        assert_eq!(entries[0], DictEntry { key: "'a'", value: "'x'" });
        assert_eq!(entries[1], DictEntry { key: "'b'", value: "2" });
    }

    #[test]
    fn lambda_colons_stay_in_the_value() {
        let (entries, recovered) = split_dict_entries("'f': lambda x: x");
        assert!(!recovered);
        assert_eq!(
            entries,
            vec![DictEntry {
                key: "'f'",
                value: "lambda x: x"
            }]
        );

        let (entries, recovered) = split_dict_entries("'g': lambda: 0");
        assert!(!recovered);
        assert_eq!(entries[0].value, "lambda: 0");
    }
}
