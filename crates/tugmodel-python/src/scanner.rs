// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tolerant line scanner for Python source.
//!
//! The scanner turns raw text into [`LogicalLine`]s: one per statement,
//! after joining physical lines that leave a bracket, a triple-quoted string
//! or a backslash continuation open. It never rejects input. Nesting that is
//! still open when the join bound or end of input is reached closes the
//! logical line as-is and records an unresolved-nesting diagnostic.
//!
//! # What is Tracked?
//!
//! - **Brackets**: three independent counters for `()`, `[]` and `{}`
//! - **Strings**: single, double and triple quotes, with backslash escapes
//! - **Comments**: `#` outside strings ends the physical line's code; a run
//!   of comment-only lines is kept on the logical line that follows it
//! - **Indentation**: leading whitespace width of the first physical line
//!
//! [`Nesting`] is also the building block of the depth-aware splitting
//! helpers in [`crate::split`].

use std::sync::LazyLock;

use regex::Regex;
use tracing::trace;
use tugmodel_core::{DiagnosticKind, Diagnostics, ExtractConfig};

/// PEP 263 encoding declaration, recognized on the first two lines only.
static CODING_DECL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[ \t\x0c]*#.*?coding[:=][ \t]*([-\w.]+)").unwrap());

// ============================================================================
// Nesting State
// ============================================================================

/// String delimiter currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    Single,
    Double,
    TripleSingle,
    TripleDouble,
}

impl Quote {
    /// The text that closes this string.
    pub fn delimiter(&self) -> &'static str {
        match self {
            Quote::Single => "'",
            Quote::Double => "\"",
            Quote::TripleSingle => "'''",
            Quote::TripleDouble => "\"\"\"",
        }
    }

    /// True for the quote kinds that may span physical lines.
    pub fn is_triple(&self) -> bool {
        matches!(self, Quote::TripleSingle | Quote::TripleDouble)
    }
}

/// Bracket and quote state while walking text left to right.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Nesting {
    pub paren: u32,
    pub bracket: u32,
    pub brace: u32,
    pub quote: Option<Quote>,
}

impl Nesting {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total bracket depth across all three kinds.
    pub fn depth(&self) -> u32 {
        self.paren + self.bracket + self.brace
    }

    pub fn in_string(&self) -> bool {
        self.quote.is_some()
    }

    /// Outside every bracket and string.
    pub fn is_top_level(&self) -> bool {
        self.depth() == 0 && self.quote.is_none()
    }

    /// Consume one lexical unit from the front of `rest` and return its byte
    /// length.
    ///
    /// A unit is a single char, an escape pair inside a string, or a quote
    /// delimiter. Closing brackets with no matching opener are ignored so
    /// stray punctuation cannot drive a counter negative.
    pub fn step(&mut self, rest: &str) -> usize {
        let mut chars = rest.chars();
        let Some(c) = chars.next() else {
            return 0;
        };
        let len = c.len_utf8();

        if let Some(quote) = self.quote {
            if c == '\\' {
                return len + chars.next().map_or(0, char::len_utf8);
            }
            if rest.starts_with(quote.delimiter()) {
                self.quote = None;
                return quote.delimiter().len();
            }
            return len;
        }

        match c {
            '(' => self.paren += 1,
            ')' => self.paren = self.paren.saturating_sub(1),
            '[' => self.bracket += 1,
            ']' => self.bracket = self.bracket.saturating_sub(1),
            '{' => self.brace += 1,
            '}' => self.brace = self.brace.saturating_sub(1),
            '\'' | '"' => {
                let quote = if rest.starts_with("'''") {
                    Quote::TripleSingle
                } else if rest.starts_with("\"\"\"") {
                    Quote::TripleDouble
                } else if c == '\'' {
                    Quote::Single
                } else {
                    Quote::Double
                };
                self.quote = Some(quote);
                return quote.delimiter().len();
            }
            _ => {}
        }
        len
    }

    /// Feed one physical line and return the byte length of its code
    /// portion, i.e. everything before a `#` comment outside strings.
    fn feed_physical(&mut self, line: &str) -> usize {
        let mut i = 0;
        while i < line.len() {
            if self.quote.is_none() && line[i..].starts_with('#') {
                return i;
            }
            i += self.step(&line[i..]);
        }
        line.len()
    }
}

// ============================================================================
// Logical Lines
// ============================================================================

/// One statement's text after joining continued physical lines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogicalLine {
    /// 1-based number of the first physical line.
    pub line: usize,
    /// 1-based number of the last physical line joined in.
    pub end_line: usize,
    /// Indentation width of the first physical line.
    pub indent: usize,
    /// Statement text: comments removed, each physical piece trimmed,
    /// pieces joined with `\n`.
    pub text: String,
    /// False if brackets or quotes were still open when the line closed.
    pub balanced: bool,
    /// Text of the comment-only lines directly above, `#` removed. A blank
    /// line in between breaks the run.
    pub comments: Vec<String>,
}

/// Output of [`scan`].
#[derive(Debug, Clone, Default)]
pub struct ScanResult {
    pub lines: Vec<LogicalLine>,
    /// Encoding named by a leading `coding:` declaration.
    pub encoding: Option<String>,
}

/// Measure the indentation width of a physical line.
///
/// Tabs advance to the next multiple of `tab_width`; a form feed resets the
/// count, as CPython's tokenizer does. A zero `tab_width` counts as one.
pub fn indent_width(line: &str, tab_width: usize) -> usize {
    let tab_width = tab_width.max(1);
    let mut width = 0;
    for c in line.chars() {
        match c {
            ' ' => width += 1,
            '\t' => width = (width / tab_width + 1) * tab_width,
            '\x0c' => width = 0,
            _ => break,
        }
    }
    width
}

/// Return the encoding named by a PEP 263 declaration on `line`, if any.
pub fn encoding_declaration(line: &str) -> Option<String> {
    CODING_DECL
        .captures(line)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

struct Pending {
    line: usize,
    indent: usize,
    text: String,
    joins: usize,
    comments: Vec<String>,
}

impl Pending {
    fn close(self, end_line: usize, balanced: bool) -> LogicalLine {
        LogicalLine {
            line: self.line,
            end_line,
            indent: self.indent,
            text: self.text,
            balanced,
            comments: self.comments,
        }
    }
}

fn open_nesting_description(nesting: &Nesting) -> String {
    let mut open = Vec::new();
    if nesting.paren > 0 {
        open.push(format!("{} '('", nesting.paren));
    }
    if nesting.bracket > 0 {
        open.push(format!("{} '['", nesting.bracket));
    }
    if nesting.brace > 0 {
        open.push(format!("{} '{{'", nesting.brace));
    }
    if let Some(quote) = nesting.quote {
        open.push(format!("string opened with {}", quote.delimiter()));
    }
    open.join(", ")
}

/// Scan `source` into logical lines.
///
/// Blank and comment-only lines produce nothing. An encoding declaration on
/// the first or second line is recorded on the result and otherwise skipped.
pub fn scan(source: &str, config: &ExtractConfig, diagnostics: &mut Diagnostics) -> ScanResult {
    let mut result = ScanResult::default();
    let mut nesting = Nesting::new();
    let mut pending: Option<Pending> = None;
    let mut comments: Vec<String> = Vec::new();
    let mut last_line = 0;

    for (index, raw) in source.lines().enumerate() {
        let number = index + 1;
        last_line = number;

        if pending.is_none() && number <= 2 && result.encoding.is_none() {
            if let Some(encoding) = encoding_declaration(raw) {
                trace!(line = number, %encoding, "encoding declaration");
                result.encoding = Some(encoding);
                continue;
            }
        }

        let code_len = nesting.feed_physical(raw);
        let mut code = raw[..code_len].trim();

        // A non-triple string cannot cross a line break unless escaped.
        if let Some(quote) = nesting.quote {
            if !quote.is_triple() && !code.ends_with('\\') {
                diagnostics.push(
                    number,
                    DiagnosticKind::UnresolvedNesting,
                    format!("unterminated string opened with {}", quote.delimiter()),
                );
                nesting.quote = None;
            }
        }

        let backslash = nesting.quote.is_none() && code.ends_with('\\');
        if backslash {
            code = code[..code.len() - 1].trim_end();
        }

        match pending.as_mut() {
            None => {
                if code.is_empty() && !backslash && nesting.is_top_level() {
                    match raw.trim_start().strip_prefix('#') {
                        Some(comment) if number > 1 || !comment.starts_with('!') => {
                            comments.push(comment.trim().to_string())
                        }
                        Some(_) => {}
                        None => comments.clear(),
                    }
                    continue;
                }
                pending = Some(Pending {
                    line: number,
                    indent: indent_width(raw, config.tab_width),
                    text: code.to_string(),
                    joins: 0,
                    comments: std::mem::take(&mut comments),
                });
            }
            Some(p) => {
                p.text.push('\n');
                p.text.push_str(code);
                p.joins += 1;
            }
        }

        let continued = backslash || !nesting.is_top_level();
        if !continued {
            if let Some(p) = pending.take() {
                result.lines.push(p.close(number, true));
            }
            continue;
        }

        let joins = pending.as_ref().map_or(0, |p| p.joins);
        if joins >= config.max_line_joins {
            diagnostics.push(
                number,
                DiagnosticKind::UnresolvedNesting,
                format!(
                    "line join limit of {} reached with {} still open",
                    config.max_line_joins,
                    open_nesting_description(&nesting)
                ),
            );
            nesting = Nesting::new();
            if let Some(p) = pending.take() {
                result.lines.push(p.close(number, false));
            }
        }
    }

    if let Some(p) = pending.take() {
        let open = open_nesting_description(&nesting);
        let message = if open.is_empty() {
            "line continuation at end of input".to_string()
        } else {
            format!("end of input with {open} still open")
        };
        diagnostics.push(p.line, DiagnosticKind::UnresolvedNesting, message);
        result.lines.push(p.close(last_line, false));
    }

    result
}
