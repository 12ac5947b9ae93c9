//! tugmodel: tolerant structural class extraction.
//!
//! Recovers a class model (classes, class and instance attributes with
//! typed values, method signatures with defaults) from Python source that
//! may not be fully well-formed. Malformed input degrades to a partial
//! model plus line-numbered diagnostics; it never aborts extraction.
//!
//! ```
//! use tugmodel::{extract_unit, ExtractConfig, TypedValue};
//!
//! let source = "class Point:\n    origin = (0, 0)\n";
//! let model = extract_unit("point.py", source, &ExtractConfig::default());
//! let point = model.class("Point").unwrap();
//! assert_eq!(
//!     point.class_attribute("origin").unwrap().value,
//!     TypedValue::Tuple(vec![TypedValue::Int(0), TypedValue::Int(0)])
//! );
//! ```

// Core infrastructure - re-exported from tugmodel-core
pub use tugmodel_core::config;
pub use tugmodel_core::diagnostic;
pub use tugmodel_core::error;
pub use tugmodel_core::model;

pub use tugmodel_core::{
    Attribute, ClassAttribute, ClassDescriptor, Diagnostic, DiagnosticKind, Diagnostics,
    ExtractConfig, InstanceAttribute, MethodDescriptor, ModelError, ParameterDescriptor,
    ParameterKind, TypedValue, UnitModel, Visibility,
};

// Language front end
pub use tugmodel_python as python;
pub use tugmodel_python::{extract_unit, extract_unit_cancellable};

pub mod batch;

pub use batch::{extract_units, extract_units_cancellable, SourceUnit};
