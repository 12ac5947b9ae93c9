//! Structural class model produced by extraction.
//!
//! These types are the output contract of the extraction pipeline: one
//! [`UnitModel`] per compilation unit, holding the [`ClassDescriptor`]s
//! found in source order plus the non-fatal diagnostics raised on the way.
//!
//! All types are serializable so callers can persist the model in whatever
//! format their downstream builder expects.
//!
//! ## Duplicate Names
//!
//! Attribute and parameter lists keep every occurrence in source order.
//! Lookup helpers such as [`ClassDescriptor::instance_attribute`] return the
//! *last* occurrence, so a later assignment wins for lookup while listing
//! still shows the full history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::diagnostic::Diagnostic;

// ============================================================================
// Typed Values
// ============================================================================

/// The classified type of a literal or reference expression.
///
/// Containers classify their elements recursively, so nesting depth is
/// unbounded. Empty containers have dedicated variants because downstream
/// consumers treat "empty list" differently from "list of unknown element
/// type".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TypedValue {
    /// `True` or `False`.
    Bool(bool),
    /// Integer literal, sign preserved.
    Int(i64),
    /// Float literal (a decimal point was present), sign preserved.
    Float(f64),
    /// String literal with quotes stripped. Escapes are left as written.
    String(String),
    /// The `None` literal.
    NoneValue,
    /// `[]`
    EmptyList,
    /// Non-empty list, elements in source order.
    List(Vec<TypedValue>),
    /// `{}`
    EmptyDict,
    /// Non-empty dict, entries in source order.
    Dict(Vec<(TypedValue, TypedValue)>),
    /// `()`
    EmptyTuple,
    /// Non-empty tuple, elements in source order.
    Tuple(Vec<TypedValue>),
    /// Reference to a class defined in the same unit.
    ///
    /// `args` is `Some` when the expression was a constructor call, and
    /// `None` when the reference was reached through a binding or a bare
    /// class name.
    ObjectReference {
        class: String,
        args: Option<Vec<TypedValue>>,
    },
    /// Dotted path whose root is not defined in the unit.
    ExternalReference(Vec<String>),
    /// Expression matching none of the recognized forms, kept verbatim.
    Unrecognized(String),
}

impl TypedValue {
    /// Build an [`TypedValue::ObjectReference`] for a constructor call.
    pub fn object_call(class: impl Into<String>, args: Vec<TypedValue>) -> Self {
        TypedValue::ObjectReference {
            class: class.into(),
            args: Some(args),
        }
    }

    /// Build an [`TypedValue::ObjectReference`] reached without a call.
    pub fn object_ref(class: impl Into<String>) -> Self {
        TypedValue::ObjectReference {
            class: class.into(),
            args: None,
        }
    }

    /// Build an [`TypedValue::ExternalReference`] from dotted segments.
    pub fn external<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypedValue::ExternalReference(segments.into_iter().map(Into::into).collect())
    }

    /// Returns the type name a UML builder assigns to an attribute holding
    /// this value.
    ///
    /// References use the class name or dotted path as their type; `None`
    /// and unrecognized expressions fall back to `object`.
    pub fn type_name(&self) -> String {
        match self {
            TypedValue::Bool(_) => "bool".to_string(),
            TypedValue::Int(_) => "int".to_string(),
            TypedValue::Float(_) => "float".to_string(),
            TypedValue::String(_) => "string".to_string(),
            TypedValue::EmptyList | TypedValue::List(_) => "list".to_string(),
            TypedValue::EmptyDict | TypedValue::Dict(_) => "dict".to_string(),
            TypedValue::EmptyTuple | TypedValue::Tuple(_) => "tuple".to_string(),
            TypedValue::ObjectReference { class, .. } => class.clone(),
            TypedValue::ExternalReference(path) => path.join("."),
            TypedValue::NoneValue | TypedValue::Unrecognized(_) => "object".to_string(),
        }
    }

    /// True for the container variants, empty or not.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            TypedValue::EmptyList
                | TypedValue::List(_)
                | TypedValue::EmptyDict
                | TypedValue::Dict(_)
                | TypedValue::EmptyTuple
                | TypedValue::Tuple(_)
        )
    }

    /// True if this value, or any value nested inside it, is unrecognized.
    pub fn contains_unrecognized(&self) -> bool {
        match self {
            TypedValue::Unrecognized(_) => true,
            TypedValue::List(items) | TypedValue::Tuple(items) => {
                items.iter().any(TypedValue::contains_unrecognized)
            }
            TypedValue::Dict(entries) => entries
                .iter()
                .any(|(k, v)| k.contains_unrecognized() || v.contains_unrecognized()),
            TypedValue::ObjectReference {
                args: Some(args), ..
            } => args.iter().any(TypedValue::contains_unrecognized),
            _ => false,
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, items: &[TypedValue]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

/// Renders the value back as a Python-style initializer, the form a UML
/// builder stores as an attribute's initial value.
impl fmt::Display for TypedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypedValue::Bool(true) => write!(f, "True"),
            TypedValue::Bool(false) => write!(f, "False"),
            TypedValue::Int(n) => write!(f, "{n}"),
            TypedValue::Float(x) if x.is_finite() && x.fract() == 0.0 => write!(f, "{x:.1}"),
            TypedValue::Float(x) => write!(f, "{x}"),
            TypedValue::String(s) => write!(f, "'{s}'"),
            TypedValue::NoneValue => write!(f, "None"),
            TypedValue::EmptyList => write!(f, "[]"),
            TypedValue::List(items) => {
                write!(f, "[")?;
                write_joined(f, items)?;
                write!(f, "]")
            }
            TypedValue::EmptyDict => write!(f, "{{}}"),
            TypedValue::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                write!(f, "}}")
            }
            TypedValue::EmptyTuple => write!(f, "()"),
            TypedValue::Tuple(items) => {
                write!(f, "(")?;
                write_joined(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            TypedValue::ObjectReference { class, args: None } => write!(f, "{class}"),
            TypedValue::ObjectReference {
                class,
                args: Some(args),
            } => {
                write!(f, "{class}(")?;
                write_joined(f, args)?;
                write!(f, ")")
            }
            TypedValue::ExternalReference(path) => write!(f, "{}", path.join(".")),
            TypedValue::Unrecognized(raw) => write!(f, "{raw}"),
        }
    }
}

// ============================================================================
// Visibility
// ============================================================================

/// Member visibility inferred from Python naming conventions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// No leading underscore, or a dunder name like `__init__`.
    #[default]
    Public,
    /// Single leading underscore (`_name`).
    Protected,
    /// Double leading underscore without trailing dunder (`__name`).
    Private,
}

impl Visibility {
    /// Infer visibility from a member name.
    ///
    /// ```
    /// use tugmodel_core::model::Visibility;
    ///
    /// assert_eq!(Visibility::from_name("value"), Visibility::Public);
    /// assert_eq!(Visibility::from_name("_cache"), Visibility::Protected);
    /// assert_eq!(Visibility::from_name("__secret"), Visibility::Private);
    /// assert_eq!(Visibility::from_name("__init__"), Visibility::Public);
    /// ```
    pub fn from_name(name: &str) -> Self {
        if name.starts_with("__") {
            if name.len() > 4 && name.ends_with("__") {
                Visibility::Public
            } else {
                Visibility::Private
            }
        } else if name.starts_with('_') {
            Visibility::Protected
        } else {
            Visibility::Public
        }
    }

    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Public => "public",
            Visibility::Protected => "protected",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// A named attribute and the classified value it was assigned.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attribute {
    pub name: String,
    pub value: TypedValue,
    /// Raw annotation text for `name: T = value` forms.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    pub visibility: Visibility,
    /// 1-based line of the assignment.
    pub line: usize,
}

/// Attribute assigned directly in a class body.
pub type ClassAttribute = Attribute;

/// Attribute assigned through the self reference inside the constructor.
pub type InstanceAttribute = Attribute;

// ============================================================================
// Methods and Parameters
// ============================================================================

/// Parameter kind classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    /// Standard named parameter.
    #[default]
    Regular,
    /// Variadic positional parameter (`*args`).
    VarArgs,
    /// Variadic keyword parameter (`**kwargs`).
    KwArgs,
}

impl ParameterKind {
    /// Returns the string representation used in output.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterKind::Regular => "regular",
            ParameterKind::VarArgs => "var_args",
            ParameterKind::KwArgs => "kwargs",
        }
    }
}

impl fmt::Display for ParameterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single parameter of a method signature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    pub kind: ParameterKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<TypedValue>,
}

impl ParameterDescriptor {
    /// A regular parameter with no annotation or default.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ParameterKind::Regular,
            annotation: None,
            default: None,
        }
    }

    #[must_use]
    pub fn with_default(mut self, default: TypedValue) -> Self {
        self.default = Some(default);
        self
    }
}

/// A method recorded from a `def` header inside a class body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    /// Parameters in declaration order, without the implicit self/cls
    /// parameter.
    pub parameters: Vec<ParameterDescriptor>,
    pub visibility: Visibility,
    /// Decorator names in source order, without the `@`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    pub is_static: bool,
    pub is_class_method: bool,
    pub is_constructor: bool,
    /// Docstring, or the `#` comment block directly above the header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// Body statements, one per logical line, indented relative to the
    /// first body line.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub source: String,
    /// 1-based line of the `def` header.
    pub line: usize,
}

impl MethodDescriptor {
    /// Look up a parameter by name. With duplicate names, the last wins.
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().rev().find(|p| p.name == name)
    }

    /// Parameter names in declaration order.
    pub fn parameter_names(&self) -> Vec<&str> {
        self.parameters.iter().map(|p| p.name.as_str()).collect()
    }
}

// ============================================================================
// Classes
// ============================================================================

/// A class definition and everything collected from its body.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    /// Class name; nested classes use a dotted qualified name.
    pub name: String,
    /// Base class expressions from the header, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bases: Vec<String>,
    pub class_attributes: Vec<ClassAttribute>,
    pub instance_attributes: Vec<InstanceAttribute>,
    pub methods: Vec<MethodDescriptor>,
    /// Docstring, or the `#` comment block directly above the header.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub doc: Option<String>,
    /// 1-based line of the `class` header.
    pub line: usize,
}

impl ClassDescriptor {
    /// An empty descriptor for a class header seen at `line`.
    pub fn new(name: impl Into<String>, line: usize) -> Self {
        Self {
            name: name.into(),
            bases: Vec::new(),
            class_attributes: Vec::new(),
            instance_attributes: Vec::new(),
            methods: Vec::new(),
            doc: None,
            line,
        }
    }

    /// Look up a class attribute by name. With duplicates, the last wins.
    pub fn class_attribute(&self, name: &str) -> Option<&ClassAttribute> {
        self.class_attributes.iter().rev().find(|a| a.name == name)
    }

    /// Look up an instance attribute by name. With duplicates, the last wins.
    pub fn instance_attribute(&self, name: &str) -> Option<&InstanceAttribute> {
        self.instance_attributes.iter().rev().find(|a| a.name == name)
    }

    /// Look up a method by name. With duplicates, the last wins.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.iter().rev().find(|m| m.name == name)
    }

    /// The constructor method, if the class defines one.
    pub fn constructor(&self) -> Option<&MethodDescriptor> {
        self.methods.iter().rev().find(|m| m.is_constructor)
    }
}

// ============================================================================
// Unit Model
// ============================================================================

/// Extraction result for one compilation unit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitModel {
    /// Caller-supplied unit identifier.
    pub unit: String,
    /// Encoding named by a leading `coding:` declaration, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,
    pub classes: Vec<ClassDescriptor>,
    pub diagnostics: Vec<Diagnostic>,
}

impl UnitModel {
    /// Look up a class by (qualified) name.
    pub fn class(&self, name: &str) -> Option<&ClassDescriptor> {
        self.classes.iter().find(|c| c.name == name)
    }

    /// Class names in source order.
    pub fn class_names(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.name.as_str()).collect()
    }
}
