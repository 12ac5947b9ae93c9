//! Non-fatal diagnostics raised while extracting a unit.
//!
//! Extraction never fails on malformed source. Anything it had to skip or
//! guess at is reported here instead, tagged with the originating line.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Category of a [`Diagnostic`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Brackets or quotes still open at end of input, or the line-join
    /// bound was hit.
    UnresolvedNesting,
    /// A parameter list had entries without a separating comma and was
    /// split at whitespace.
    AmbiguousParameterSplit,
    /// A statement that looked like a header or assignment but could not
    /// be parsed as one.
    UnrecognizedStatement,
    /// Container elements or dict entries without a separating comma.
    MissingSeparator,
    /// An expression matching none of the classifiable literal forms.
    UnclassifiableLiteral,
    /// A class name defined twice in one unit; the later one is kept.
    DuplicateClass,
}

impl DiagnosticKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticKind::UnresolvedNesting => "unresolved-nesting",
            DiagnosticKind::AmbiguousParameterSplit => "ambiguous-parameter-split",
            DiagnosticKind::UnrecognizedStatement => "unrecognized-statement",
            DiagnosticKind::MissingSeparator => "missing-separator",
            DiagnosticKind::UnclassifiableLiteral => "unclassifiable-literal",
            DiagnosticKind::DuplicateClass => "duplicate-class",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An informational message about a recovered irregularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    /// 1-based source line the problem originates from.
    pub line: usize,
    pub kind: DiagnosticKind,
    pub message: String,
}

impl Diagnostic {
    pub fn new(line: usize, kind: DiagnosticKind, message: impl Into<String>) -> Self {
        Self {
            line,
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}: {}", self.line, self.kind, self.message)
    }
}

/// Ordered collector for diagnostics.
///
/// Shared by every pipeline stage of one unit. Emission order is kept, which
/// is deterministic because each stage walks the source top to bottom.
#[derive(Debug, Default, Clone)]
pub struct Diagnostics {
    items: Vec<Diagnostic>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, line: usize, kind: DiagnosticKind, message: impl Into<String>) {
        self.items.push(Diagnostic::new(line, kind, message));
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.items.iter()
    }

    /// Count of diagnostics of one kind.
    pub fn count(&self, kind: DiagnosticKind) -> usize {
        self.items.iter().filter(|d| d.kind == kind).count()
    }

    /// Consume the collector, returning diagnostics sorted by line.
    ///
    /// The sort is stable, so diagnostics on the same line keep their
    /// emission order.
    pub fn into_sorted(mut self) -> Vec<Diagnostic> {
        self.items.sort_by_key(|d| d.line);
        self.items
    }
}
