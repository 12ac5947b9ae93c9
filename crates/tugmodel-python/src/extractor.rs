// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Statement extraction: logical lines to structural events.
//!
//! The extractor keeps a stack of open headers keyed by indentation. A line
//! belongs to a header only when it is indented further than the header, so
//! before a line is examined every frame at or beyond its indentation is
//! closed. No dedent tokens are needed, and inconsistent indentation simply
//! closes scopes early instead of failing.
//!
//! Frames come in four kinds:
//!
//! - **Class**: direct assignments become class attributes
//! - **Method**: only the constructor's self-assignments matter
//! - **Opaque**: bodies of functions outside a class, or nested in a
//!   method, skipped wholesale
//! - **Block**: control flow (`if`, `for`, `with`, `try`, ...), transparent
//!   to the scope that encloses it
//!
//! Nothing here fails: a line that fits no pattern becomes
//! [`Event::Ignored`], with an unrecognized-statement diagnostic when it
//! does not even look like a Python statement.

use std::fmt;

use serde::Serialize;
use tracing::{debug, trace};
use tugmodel_core::{DiagnosticKind, Diagnostics, ExtractConfig, ParameterKind};

use crate::classifier::string_value;
use crate::scanner::LogicalLine;
use crate::split::{
    find_assignment, find_top_level, group_end, is_dotted_name, is_identifier, split_adjacent,
    split_items, split_top_level, strip_keyword, AssignOp,
};

/// Keywords that open a control-flow block.
const BLOCK_KEYWORDS: &[&str] = &[
    "if", "elif", "else", "for", "while", "with", "try", "except", "finally", "match", "case",
    "async",
];

/// Block keywords that may stand alone before the colon.
const BARE_BLOCK_KEYWORDS: &[&str] = &["else", "try", "finally", "except"];

/// Keywords that start a simple statement with no structural meaning.
const SIMPLE_KEYWORDS: &[&str] = &[
    "pass", "return", "import", "from", "raise", "assert", "del", "global", "nonlocal", "yield",
    "break", "continue", "await", "print", "exec",
];

// ============================================================================
// Events
// ============================================================================

/// A parameter as written in a `def` header, default left unclassified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RawParameter {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    /// Default value expression text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

/// Why a statement produced no structural event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IgnoreReason {
    /// Bare call, including calls to other methods.
    Call,
    /// `pass`, `return`, `import` and friends.
    SimpleStatement,
    /// An expression evaluated for effect.
    Expression,
    /// A control-flow block header.
    ControlFlow,
    /// `name: T` with no value.
    AnnotationOnly,
    /// `x += 1` and the other augmented forms.
    AugmentedAssignment,
    /// Tuple unpacking, subscripts, or deeper attribute chains.
    UnsupportedTarget,
    /// A plain local variable inside the constructor.
    LocalAssignment,
    /// An assignment inside a method other than the constructor.
    OutsideConstructor,
    /// A module-level function definition.
    FunctionOutsideClass,
    /// A `def` or `class` nested inside a method or function.
    NestedInFunction,
    /// A line inside a skipped function body.
    FunctionBody,
    /// A decorator that does not decorate a method.
    Decorator,
    /// A `class` or `def` header that could not be parsed.
    MalformedHeader,
    /// Text that is not recognizable as any statement.
    Unrecognized,
}

impl IgnoreReason {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            IgnoreReason::Call => "call",
            IgnoreReason::SimpleStatement => "simple-statement",
            IgnoreReason::Expression => "expression",
            IgnoreReason::ControlFlow => "control-flow",
            IgnoreReason::AnnotationOnly => "annotation-only",
            IgnoreReason::AugmentedAssignment => "augmented-assignment",
            IgnoreReason::UnsupportedTarget => "unsupported-target",
            IgnoreReason::LocalAssignment => "local-assignment",
            IgnoreReason::OutsideConstructor => "outside-constructor",
            IgnoreReason::FunctionOutsideClass => "function-outside-class",
            IgnoreReason::NestedInFunction => "nested-in-function",
            IgnoreReason::FunctionBody => "function-body",
            IgnoreReason::Decorator => "decorator",
            IgnoreReason::MalformedHeader => "malformed-header",
            IgnoreReason::Unrecognized => "unrecognized",
        }
    }
}

impl fmt::Display for IgnoreReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Structural events in source order.
///
/// Value texts are raw; classification happens when the events are
/// assembled into a model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Event {
    ClassStart {
        /// Qualified name (`Outer.Inner` for nested classes).
        name: String,
        bases: Vec<String>,
        /// `#` comment block above the header or its decorators.
        comment: Option<String>,
        line: usize,
    },
    ClassEnd {
        name: String,
    },
    MethodStart {
        name: String,
        parameters: Vec<RawParameter>,
        /// Decorators applied to this method, in source order.
        decorators: Vec<String>,
        is_async: bool,
        comment: Option<String>,
        line: usize,
    },
    MethodEnd {
        name: String,
        /// Body text, see [`render_body`].
        source: String,
    },
    ClassLevelAssignment {
        name: String,
        annotation: Option<String>,
        value: String,
        line: usize,
    },
    SelfAssignment {
        name: String,
        annotation: Option<String>,
        value: String,
        line: usize,
    },
    ModuleAssignment {
        name: String,
        value: String,
        line: usize,
    },
    Decorator {
        name: String,
        line: usize,
    },
    Docstring {
        text: String,
        line: usize,
    },
    Ignored {
        reason: IgnoreReason,
        line: usize,
    },
}

// ============================================================================
// Frames
// ============================================================================

#[derive(Debug)]
enum FrameKind {
    Class {
        name: String,
    },
    Method {
        name: String,
        is_constructor: bool,
        self_name: Option<String>,
        /// Body lines with their indentation.
        body: Vec<(usize, String)>,
    },
    Opaque,
    Block,
}

#[derive(Debug)]
struct Frame {
    kind: FrameKind,
    indent: usize,
    /// Set once the first statement of the body has been seen.
    body_seen: bool,
}

/// The scope a statement lands in: the innermost frame that is not a block.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Scope {
    Module,
    Class(String),
    Method {
        is_constructor: bool,
        self_name: Option<String>,
    },
    Opaque,
}

// ============================================================================
// Extractor
// ============================================================================

/// Turns logical lines into [`Event`]s.
pub struct Extractor<'c> {
    config: &'c ExtractConfig,
    frames: Vec<Frame>,
    /// Decorators seen since the last statement, waiting for a `def`.
    decorators: Vec<String>,
    /// Comment lines above the current logical line.
    comments: Vec<String>,
    /// Comments gathered over a run of decorators, waiting for a header.
    header_comments: Vec<String>,
    events: Vec<Event>,
}

impl<'c> Extractor<'c> {
    pub fn new(config: &'c ExtractConfig) -> Self {
        Self {
            config,
            frames: Vec::new(),
            decorators: Vec::new(),
            comments: Vec::new(),
            header_comments: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Extract all events from `lines` in one pass.
    pub fn run(
        lines: &[LogicalLine],
        config: &ExtractConfig,
        diagnostics: &mut Diagnostics,
    ) -> Vec<Event> {
        let mut extractor = Extractor::new(config);
        for line in lines {
            extractor.process(line, diagnostics);
        }
        extractor.finish()
    }

    /// Process one logical line.
    pub fn process(&mut self, line: &LogicalLine, diagnostics: &mut Diagnostics) {
        self.close_frames(line.indent);
        self.record_body(line.indent, &line.text);
        self.comments.clone_from(&line.comments);
        self.statement(&line.text, line.indent, line.line, diagnostics);
    }

    /// Close every open scope and return the events.
    pub fn finish(mut self) -> Vec<Event> {
        self.close_frames(0);
        self.events
    }

    fn close_frames(&mut self, indent: usize) {
        while self.frames.last().is_some_and(|f| f.indent >= indent) {
            let Some(frame) = self.frames.pop() else {
                break;
            };
            match frame.kind {
                FrameKind::Class { name } => self.events.push(Event::ClassEnd { name }),
                FrameKind::Method { name, body, .. } => self.events.push(Event::MethodEnd {
                    name,
                    source: render_body(&body),
                }),
                FrameKind::Opaque | FrameKind::Block => {}
            }
        }
    }

    /// Append a line to the body of the open method, if any.
    fn record_body(&mut self, indent: usize, text: &str) {
        for frame in self.frames.iter_mut().rev() {
            if let FrameKind::Method { body, .. } = &mut frame.kind {
                body.push((indent, text.to_string()));
                return;
            }
        }
    }

    /// Drop decorators and comments that no header claimed.
    fn clear_pending(&mut self) {
        self.decorators.clear();
        self.header_comments.clear();
    }

    /// The comment block for a header on the current line.
    fn take_comment(&mut self) -> Option<String> {
        let mut lines = std::mem::take(&mut self.header_comments);
        lines.append(&mut self.comments);
        (!lines.is_empty()).then(|| lines.join("\n"))
    }

    fn push_frame(&mut self, kind: FrameKind, indent: usize) {
        self.frames.push(Frame {
            kind,
            indent,
            body_seen: false,
        });
    }

    fn scope(&self) -> Scope {
        for frame in self.frames.iter().rev() {
            match &frame.kind {
                FrameKind::Block => continue,
                FrameKind::Class { name } => return Scope::Class(name.clone()),
                FrameKind::Method {
                    is_constructor,
                    self_name,
                    ..
                } => {
                    return Scope::Method {
                        is_constructor: *is_constructor,
                        self_name: self_name.clone(),
                    }
                }
                FrameKind::Opaque => return Scope::Opaque,
            }
        }
        Scope::Module
    }

    /// True if this is the first statement directly inside a class or
    /// method body. Marks the body as seen.
    fn first_in_body(&mut self) -> bool {
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };
        let first = !frame.body_seen
            && matches!(frame.kind, FrameKind::Class { .. } | FrameKind::Method { .. });
        frame.body_seen = true;
        first
    }

    fn ignore(&mut self, reason: IgnoreReason, line: usize) {
        trace!(line, %reason, "ignored");
        self.events.push(Event::Ignored { reason, line });
    }

    fn statement(&mut self, text: &str, indent: usize, line: usize, diagnostics: &mut Diagnostics) {
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.scope() == Scope::Opaque {
            self.ignore(IgnoreReason::FunctionBody, line);
            return;
        }

        if let Some(rest) = text.strip_prefix('@') {
            self.first_in_body();
            self.header_comments.append(&mut self.comments);
            self.decorator(rest, line);
            return;
        }
        if let Some(rest) = strip_keyword(text, "class") {
            self.first_in_body();
            self.class_header(text, rest, indent, line, diagnostics);
            return;
        }
        if let Some(rest) = strip_keyword(text, "def") {
            self.first_in_body();
            self.def_header(text, rest, false, indent, line, diagnostics);
            return;
        }
        if let Some(rest) = strip_keyword(text, "async").and_then(|r| strip_keyword(r, "def")) {
            self.first_in_body();
            self.def_header(text, rest, true, indent, line, diagnostics);
            return;
        }
        if let Some(body) = block_header(text) {
            self.first_in_body();
            self.clear_pending();
            self.ignore(IgnoreReason::ControlFlow, line);
            self.push_frame(FrameKind::Block, indent);
            if !body.is_empty() {
                self.statement(body, indent + 1, line, diagnostics);
            }
            return;
        }

        let pieces = split_top_level(text, ';');
        if pieces.len() > 1 {
            for piece in pieces {
                self.statement(piece, indent, line, diagnostics);
            }
            return;
        }

        let first = self.first_in_body();
        self.clear_pending();
        let scope = self.scope();

        if let Some(doc) = string_value(text) {
            if first && matches!(scope, Scope::Class(_) | Scope::Method { .. }) {
                self.events.push(Event::Docstring {
                    text: doc.trim().to_string(),
                    line,
                });
            } else {
                self.ignore(IgnoreReason::Expression, line);
            }
            return;
        }

        if let Some(op) = find_assignment(text) {
            self.assignment(text, op, &scope, line);
            return;
        }

        self.other(text, line, diagnostics);
    }

    fn decorator(&mut self, rest: &str, line: usize) {
        let name_end = rest.find('(').unwrap_or(rest.len());
        let name = squash(&rest[..name_end]);
        if matches!(self.scope(), Scope::Class(_)) {
            self.decorators.push(name.clone());
            self.events.push(Event::Decorator { name, line });
        } else {
            self.ignore(IgnoreReason::Decorator, line);
        }
    }

    fn malformed(
        &mut self,
        keyword: &str,
        text: &str,
        indent: usize,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) {
        diagnostics.push(
            line,
            DiagnosticKind::UnrecognizedStatement,
            format!("malformed {keyword} header `{}`", squash(text)),
        );
        self.clear_pending();
        self.ignore(IgnoreReason::MalformedHeader, line);
        // Whatever is indented under the broken header is skipped with it.
        self.push_frame(FrameKind::Opaque, indent);
    }

    fn class_header(
        &mut self,
        text: &str,
        rest: &str,
        indent: usize,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) {
        let Some(header) = parse_header(rest) else {
            self.malformed("class", text, indent, line, diagnostics);
            return;
        };
        let comment = self.take_comment();
        self.decorators.clear();

        let name = match self.scope() {
            Scope::Module => header.name.to_string(),
            Scope::Class(outer) => format!("{outer}.{}", header.name),
            Scope::Method { .. } | Scope::Opaque => {
                self.ignore(IgnoreReason::NestedInFunction, line);
                self.push_frame(FrameKind::Opaque, indent);
                return;
            }
        };
        let bases = header
            .args
            .map(|args| split_items(args).into_iter().map(squash).collect())
            .unwrap_or_default();

        debug!(class = %name, line, "class");
        self.events.push(Event::ClassStart {
            name: name.clone(),
            bases,
            comment,
            line,
        });
        self.push_frame(FrameKind::Class { name }, indent);
        if !header.body.is_empty() {
            self.statement(header.body, indent + 1, line, diagnostics);
        }
    }

    fn def_header(
        &mut self,
        text: &str,
        rest: &str,
        is_async: bool,
        indent: usize,
        line: usize,
        diagnostics: &mut Diagnostics,
    ) {
        let header = match parse_header(rest) {
            Some(header) if header.args.is_some() => header,
            _ => {
                self.malformed("def", text, indent, line, diagnostics);
                return;
            }
        };
        let decorators = std::mem::take(&mut self.decorators);
        let comment = self.take_comment();

        let class = match self.scope() {
            Scope::Class(class) => class,
            Scope::Module => {
                self.ignore(IgnoreReason::FunctionOutsideClass, line);
                self.push_frame(FrameKind::Opaque, indent);
                return;
            }
            Scope::Method { .. } | Scope::Opaque => {
                self.ignore(IgnoreReason::NestedInFunction, line);
                self.push_frame(FrameKind::Opaque, indent);
                return;
            }
        };

        let parameters = parse_parameters(header.args.unwrap_or_default(), line, diagnostics);
        let is_static = decorators.iter().any(|d| d == "staticmethod");
        let self_name = parameters
            .first()
            .filter(|p| {
                !is_static && p.kind == ParameterKind::Regular && self.config.is_self_name(&p.name)
            })
            .map(|p| p.name.clone());
        let is_constructor = header.name == self.config.constructor_name;

        debug!(class = %class, method = header.name, line, "def");
        self.events.push(Event::MethodStart {
            name: header.name.to_string(),
            parameters,
            decorators,
            is_async,
            comment,
            line,
        });
        self.push_frame(
            FrameKind::Method {
                name: header.name.to_string(),
                is_constructor,
                self_name,
                body: Vec::new(),
            },
            indent,
        );
        if !header.body.is_empty() {
            self.record_body(indent + 1, header.body);
            self.statement(header.body, indent + 1, line, diagnostics);
        }
    }

    fn assignment(&mut self, text: &str, op: AssignOp, scope: &Scope, line: usize) {
        if op.augmented {
            self.ignore(IgnoreReason::AugmentedAssignment, line);
            return;
        }

        let mut targets = vec![text[..op.pos].trim()];
        let mut value = text[op.pos + 1..].trim();
        while let Some(next) = find_assignment(value) {
            let candidate = value[..next.pos].trim();
            if next.augmented || !is_dotted_name(split_annotation(candidate).0) {
                break;
            }
            targets.push(candidate);
            value = value[next.pos + 1..].trim();
        }

        for target in targets {
            self.bind(target, value, scope, line);
        }
    }

    fn bind(&mut self, target: &str, value: &str, scope: &Scope, line: usize) {
        let (target, annotation) = split_annotation(target);
        let name = target.to_string();
        let value = value.to_string();
        let event = match scope {
            Scope::Module if is_identifier(target) => Event::ModuleAssignment { name, value, line },
            Scope::Class(_) if is_identifier(target) => Event::ClassLevelAssignment {
                name,
                annotation,
                value,
                line,
            },
            Scope::Method {
                is_constructor: true,
                self_name,
            } => match self_attribute(target, self_name.as_deref()) {
                Some(attribute) => Event::SelfAssignment {
                    name: attribute.to_string(),
                    annotation,
                    value,
                    line,
                },
                None if is_identifier(target) => {
                    return self.ignore(IgnoreReason::LocalAssignment, line)
                }
                None => return self.ignore(IgnoreReason::UnsupportedTarget, line),
            },
            Scope::Method { .. } => return self.ignore(IgnoreReason::OutsideConstructor, line),
            Scope::Opaque => return self.ignore(IgnoreReason::FunctionBody, line),
            Scope::Module | Scope::Class(_) => {
                return self.ignore(IgnoreReason::UnsupportedTarget, line)
            }
        };
        self.events.push(event);
    }

    /// A statement that is neither a header nor an assignment.
    fn other(&mut self, text: &str, line: usize, diagnostics: &mut Diagnostics) {
        let first_word = text
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()
            .unwrap_or_default();
        if SIMPLE_KEYWORDS.contains(&first_word) {
            self.ignore(IgnoreReason::SimpleStatement, line);
            return;
        }

        let (head, _) = split_annotation(text);
        if head != text && is_identifier(head) {
            self.ignore(IgnoreReason::AnnotationOnly, line);
            return;
        }

        if is_call(text) {
            self.ignore(IgnoreReason::Call, line);
        } else if split_adjacent(text).len() == 1 {
            self.ignore(IgnoreReason::Expression, line);
        } else {
            diagnostics.push(
                line,
                DiagnosticKind::UnrecognizedStatement,
                format!("unrecognized statement `{}`", squash(text)),
            );
            self.ignore(IgnoreReason::Unrecognized, line);
        }
    }
}

// ============================================================================
// Header Parsing
// ============================================================================

/// A parsed `class` or `def` header.
struct Header<'a> {
    name: &'a str,
    /// Text inside the parentheses, if present.
    args: Option<&'a str>,
    /// Inline body after the colon, possibly empty.
    body: &'a str,
}

/// Parse `Name[generics](args) -> ret: body` following a header keyword.
fn parse_header(rest: &str) -> Option<Header<'_>> {
    let name_end = rest
        .find(|c: char| !(c.is_alphanumeric() || c == '_'))
        .unwrap_or(rest.len());
    let name = &rest[..name_end];
    if !is_identifier(name) {
        return None;
    }

    let mut tail = rest[name_end..].trim_start();
    if tail.starts_with('[') {
        tail = tail[group_end(tail)?..].trim_start();
    }
    let mut args = None;
    if tail.starts_with('(') {
        let end = group_end(tail)?;
        args = Some(&tail[1..end - 1]);
        tail = tail[end..].trim_start();
    }
    if tail.starts_with("->") {
        tail = &tail[find_top_level(tail, |c| c == ':')?..];
    }
    let body = tail.strip_prefix(':')?.trim();
    Some(Header { name, args, body })
}

/// If `text` opens a control-flow block, return its inline body.
fn block_header(text: &str) -> Option<&str> {
    let keyword = BLOCK_KEYWORDS
        .iter()
        .find(|keyword| strip_keyword(text, keyword).is_some())?;
    let colon = find_top_level(text, |c| c == ':')?;
    // `match = 1` and `case: int = 0` assign to soft keywords.
    let condition = text[keyword.len()..colon].trim();
    if condition.is_empty() && !BARE_BLOCK_KEYWORDS.contains(keyword) {
        return None;
    }
    if find_assignment(&text[..colon]).is_some() {
        return None;
    }
    Some(text[colon + 1..].trim())
}

/// Split `name: T` into the name and the annotation text.
fn split_annotation(target: &str) -> (&str, Option<String>) {
    match find_top_level(target, |c| c == ':') {
        Some(colon) => (target[..colon].trim(), Some(squash(&target[colon + 1..]))),
        None => (target.trim(), None),
    }
}

/// The attribute name in `self.name`, for the constructor's self name.
fn self_attribute<'a>(target: &'a str, self_name: Option<&str>) -> Option<&'a str> {
    let (root, attribute) = target.split_once('.')?;
    (Some(root.trim()) == self_name && is_identifier(attribute.trim())).then(|| attribute.trim())
}

/// A bare call statement such as `self.setup()` or `super().__init__(x)`.
fn is_call(text: &str) -> bool {
    let Some(open) = find_top_level(text, |c| c == '(') else {
        return false;
    };
    text.ends_with(')') && is_dotted_name(text[..open].trim())
}

/// Rejoin method body lines, indented relative to the shallowest one.
fn render_body(body: &[(usize, String)]) -> String {
    let base = body.iter().map(|(indent, _)| *indent).min().unwrap_or(0);
    body.iter()
        .map(|(indent, text)| {
            let pad = " ".repeat(indent - base);
            format!("{pad}{text}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Collapse runs of whitespace, including joined line breaks, to one space.
fn squash(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ============================================================================
// Parameters
// ============================================================================

/// Split a parameter list best-effort.
///
/// Items are split at top-level commas. An item holding several
/// `name[=value]` tokens side by side (`a=1 b=2`) is split at the
/// whitespace between them and reported. The `*` and `/` markers are
/// dropped; anything else unparseable is reported and skipped.
pub fn parse_parameters(
    inner: &str,
    line: usize,
    diagnostics: &mut Diagnostics,
) -> Vec<RawParameter> {
    let mut parameters = Vec::new();
    for piece in split_items(inner) {
        let parts = split_adjacent(piece);
        if parts.len() > 1 {
            diagnostics.push(
                line,
                DiagnosticKind::AmbiguousParameterSplit,
                format!("parameters split at whitespace: `{}`", parts.join("`, `")),
            );
        }
        for part in parts {
            if part == "*" || part == "/" {
                continue;
            }
            match parse_parameter(part) {
                Some(parameter) => parameters.push(parameter),
                None => diagnostics.push(
                    line,
                    DiagnosticKind::UnrecognizedStatement,
                    format!("unrecognized parameter `{}`", squash(part)),
                ),
            }
        }
    }
    parameters
}

fn parse_parameter(text: &str) -> Option<RawParameter> {
    let (kind, rest) = if let Some(rest) = text.strip_prefix("**") {
        (ParameterKind::KwArgs, rest)
    } else if let Some(rest) = text.strip_prefix('*') {
        (ParameterKind::VarArgs, rest)
    } else {
        (ParameterKind::Regular, text)
    };

    let (target, default) = match find_assignment(rest) {
        Some(op) if !op.augmented => (&rest[..op.pos], Some(rest[op.pos + 1..].trim())),
        _ => (rest, None),
    };
    let (name, annotation) = split_annotation(target);
    if !is_identifier(name) {
        return None;
    }
    Some(RawParameter {
        name: name.to_string(),
        kind,
        annotation,
        default: default.filter(|d| !d.is_empty()).map(str::to_string),
    })
}
