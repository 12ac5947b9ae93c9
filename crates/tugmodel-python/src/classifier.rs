// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Literal classification for assignment values and parameter defaults.
//!
//! The classifier maps expression text to a [`RawValue`]: the final
//! [`TypedValue`] shape for literals and containers, with identifier
//! references left unresolved. References are resolved once the whole unit
//! has been walked (see [`crate::resolver`]), so a value may point at a
//! class defined further down the file.
//!
//! # Dispatch Order
//!
//! 1. Bare top-level comma list → tuple (`x = 1, 2`)
//! 2. `True` / `False` / `None`
//! 3. Integer: optional sign, digits
//! 4. Float: optional sign, digits with exactly one decimal point
//! 5. String literal(s), prefixes allowed, adjacent literals concatenated
//! 6. `[...]` list, `{...}` dict, `(...)` tuple (a single parenthesized
//!    expression too)
//! 7. Dotted name with optional call arguments → reference
//! 8. Anything else → [`TypedValue::Unrecognized`]
//!
//! Containers whose elements are missing a separating comma are recovered
//! with [`split_adjacent`] / [`split_dict_entries`] and reported as
//! missing-separator diagnostics.

use tracing::trace;
use tugmodel_core::{DiagnosticKind, Diagnostics, TypedValue};

use crate::split::{
    atoms, dotted_segments, enclosed_by, find_assignment, find_top_level, has_top_level,
    is_dotted_name, is_identifier, is_single_string, split_adjacent, split_dict_entries,
    split_items, string_prefix_len,
};

/// Nesting depth past which classification gives up.
const MAX_DEPTH: usize = 256;

/// A classified value whose references are not yet resolved.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// A scalar, an empty container, `None`, or an unrecognized span.
    Literal(TypedValue),
    List(Vec<RawValue>),
    Dict(Vec<(RawValue, RawValue)>),
    Tuple(Vec<RawValue>),
    /// A dotted name, optionally called with arguments.
    Reference {
        path: Vec<String>,
        args: Option<Vec<RawValue>>,
    },
}

impl RawValue {
    fn unrecognized(text: &str) -> Self {
        RawValue::Literal(TypedValue::Unrecognized(text.to_string()))
    }
}

/// Classifies expression text found on one source line.
pub struct Classifier<'d> {
    line: usize,
    diagnostics: &'d mut Diagnostics,
}

impl<'d> Classifier<'d> {
    /// Create a classifier reporting diagnostics against `line`.
    pub fn new(line: usize, diagnostics: &'d mut Diagnostics) -> Self {
        Self { line, diagnostics }
    }

    /// Classify `text`.
    pub fn classify(&mut self, text: &str) -> RawValue {
        self.classify_at(text, 0)
    }

    fn classify_at(&mut self, text: &str, depth: usize) -> RawValue {
        let text = text.trim();
        if depth > MAX_DEPTH {
            self.report(
                DiagnosticKind::UnclassifiableLiteral,
                format!("nesting deeper than {MAX_DEPTH} levels"),
            );
            return RawValue::unrecognized(text);
        }
        if text.is_empty() {
            self.report(DiagnosticKind::UnclassifiableLiteral, "empty expression");
            return RawValue::unrecognized(text);
        }

        if has_top_level(text, ',') {
            return RawValue::Tuple(self.classify_items(text, depth, "tuple"));
        }

        match text {
            "True" => return RawValue::Literal(TypedValue::Bool(true)),
            "False" => return RawValue::Literal(TypedValue::Bool(false)),
            "None" => return RawValue::Literal(TypedValue::NoneValue),
            _ => {}
        }

        if let Some(value) = self.number(text) {
            return RawValue::Literal(value);
        }
        if let Some(s) = string_value(text) {
            return RawValue::Literal(TypedValue::String(s));
        }

        if let Some(inner) = enclosed_by(text, '[', ']') {
            if is_comprehension(inner) {
                return self.comprehension(text);
            }
            if inner.trim().is_empty() {
                return RawValue::Literal(TypedValue::EmptyList);
            }
            return RawValue::List(self.classify_items(inner, depth, "list"));
        }
        if let Some(inner) = enclosed_by(text, '{', '}') {
            if is_comprehension(inner) {
                return self.comprehension(text);
            }
            return self.dict(text, inner, depth);
        }
        if let Some(inner) = enclosed_by(text, '(', ')') {
            if is_comprehension(inner) {
                return self.comprehension(text);
            }
            if inner.trim().is_empty() {
                return RawValue::Literal(TypedValue::EmptyTuple);
            }
            return RawValue::Tuple(self.classify_items(inner, depth, "tuple"));
        }

        if let Some(reference) = self.reference(text, depth) {
            return reference;
        }

        self.report(
            DiagnosticKind::UnclassifiableLiteral,
            format!("unrecognized expression `{text}`"),
        );
        RawValue::unrecognized(text)
    }

    fn comprehension(&mut self, text: &str) -> RawValue {
        self.report(
            DiagnosticKind::UnclassifiableLiteral,
            format!("comprehension `{text}` is not a literal"),
        );
        RawValue::unrecognized(text)
    }

    fn report(&mut self, kind: DiagnosticKind, message: impl Into<String>) {
        let message = message.into();
        trace!(line = self.line, %kind, %message, "classifier");
        self.diagnostics.push(self.line, kind, message);
    }

    /// Integer or float literal, sign preserved.
    fn number(&mut self, text: &str) -> Option<TypedValue> {
        let (negative, body) = match text.as_bytes().first() {
            Some(b'-') => (true, text[1..].trim_start()),
            Some(b'+') => (false, text[1..].trim_start()),
            _ => (false, text),
        };
        if body.is_empty() || !body.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        if !body.chars().all(|c| c.is_ascii_digit() || c == '.' || c == '_') {
            return None;
        }
        if body.starts_with('_') || body.ends_with('_') {
            return None;
        }
        let digits: String = body.chars().filter(|&c| c != '_').collect();
        let sign = if negative { "-" } else { "" };
        match digits.matches('.').count() {
            0 => match format!("{sign}{digits}").parse::<i64>() {
                Ok(n) => Some(TypedValue::Int(n)),
                Err(_) => {
                    self.report(
                        DiagnosticKind::UnclassifiableLiteral,
                        format!("integer literal `{text}` out of range"),
                    );
                    Some(TypedValue::Unrecognized(text.to_string()))
                }
            },
            1 => format!("{sign}{digits}")
                .parse::<f64>()
                .ok()
                .map(TypedValue::Float),
            _ => None,
        }
    }

    fn dict(&mut self, text: &str, inner: &str, depth: usize) -> RawValue {
        if inner.trim().is_empty() {
            return RawValue::Literal(TypedValue::EmptyDict);
        }
        if find_top_level(inner, |c| c == ':').is_none() {
            self.report(
                DiagnosticKind::UnclassifiableLiteral,
                format!("set literal `{text}` is not a supported value"),
            );
            return RawValue::unrecognized(text);
        }

        let mut entries = Vec::new();
        for piece in split_items(inner) {
            if piece.starts_with("**") {
                self.report(
                    DiagnosticKind::UnclassifiableLiteral,
                    format!("dict unpacking `{piece}` skipped"),
                );
                continue;
            }
            let (pairs, recovered) = split_dict_entries(piece);
            if pairs.is_empty() {
                self.report(
                    DiagnosticKind::MissingSeparator,
                    format!("dict entry `{piece}` has no ':'"),
                );
                continue;
            }
            if recovered {
                let keys: Vec<&str> = pairs.iter().map(|p| p.key).collect();
                self.report(
                    DiagnosticKind::MissingSeparator,
                    format!("missing ',' between dict entries {}", keys.join(", ")),
                );
            }
            for pair in pairs {
                let key = self.classify_at(pair.key, depth + 1);
                let value = self.classify_at(pair.value, depth + 1);
                entries.push((key, value));
            }
        }
        RawValue::Dict(entries)
    }

    /// Classify comma-separated items, recovering missing commas.
    fn classify_items(&mut self, text: &str, depth: usize, container: &str) -> Vec<RawValue> {
        let mut items = Vec::new();
        for piece in split_items(text) {
            let parts = split_adjacent(piece);
            if parts.len() > 1 {
                self.report(
                    DiagnosticKind::MissingSeparator,
                    format!(
                        "missing ',' between {container} elements `{}`",
                        parts.join("`, `")
                    ),
                );
            }
            for part in parts {
                items.push(self.classify_at(part, depth + 1));
            }
        }
        items
    }

    /// Dotted name, optionally followed by a call argument list.
    fn reference(&mut self, text: &str, depth: usize) -> Option<RawValue> {
        let (head, args) = match find_top_level(text, |c| c == '(') {
            Some(open) => {
                let inner = enclosed_by(&text[open..], '(', ')')?;
                (text[..open].trim(), Some(inner))
            }
            None => (text, None),
        };
        if !is_dotted_name(head) {
            return None;
        }
        let path = dotted_segments(head);
        let args = args.map(|inner| self.call_args(inner, depth));
        Some(RawValue::Reference { path, args })
    }

    /// Call arguments; keyword arguments contribute their value.
    fn call_args(&mut self, inner: &str, depth: usize) -> Vec<RawValue> {
        let mut args = Vec::new();
        for piece in split_items(inner) {
            let parts = split_adjacent(piece);
            if parts.len() > 1 {
                self.report(
                    DiagnosticKind::MissingSeparator,
                    format!("missing ',' between call arguments `{}`", parts.join("`, `")),
                );
            }
            for part in parts {
                let value = match find_assignment(part) {
                    Some(op) if !op.augmented && is_identifier(part[..op.pos].trim()) => {
                        &part[op.pos + 1..]
                    }
                    _ => part,
                };
                args.push(self.classify_at(value, depth + 1));
            }
        }
        args
    }
}

fn is_comprehension(inner: &str) -> bool {
    atoms(inner).contains(&"for")
}

/// Classify `text` found on `line`, recording diagnostics.
pub fn classify(text: &str, line: usize, diagnostics: &mut Diagnostics) -> RawValue {
    Classifier::new(line, diagnostics).classify(text)
}

/// Contents of one string literal with its prefix and quotes removed.
fn string_contents(literal: &str) -> Option<&str> {
    let prefix = string_prefix_len(literal)?;
    let body = &literal[prefix..];
    for delimiter in ["'''", "\"\"\"", "'", "\""] {
        if body.len() >= 2 * delimiter.len()
            && body.starts_with(delimiter)
            && body.ends_with(delimiter)
        {
            return Some(&body[delimiter.len()..body.len() - delimiter.len()]);
        }
    }
    None
}

/// The value of a string literal or of adjacent literals concatenated.
///
/// Escape sequences are left as written.
pub fn string_value(text: &str) -> Option<String> {
    if is_single_string(text) {
        return string_contents(text).map(str::to_string);
    }
    let parts = atoms(text);
    if parts.len() < 2 || !parts.iter().all(|a| is_single_string(a)) {
        return None;
    }
    let mut value = String::new();
    for atom in parts {
        value.push_str(string_contents(atom)?);
    }
    Some(value)
}
