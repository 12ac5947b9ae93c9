//! Core infrastructure for tugmodel.
//!
//! This crate provides the language-agnostic pieces of structural
//! extraction:
//! - The class model (classes, attributes, methods, typed values)
//! - Non-fatal diagnostics
//! - Extraction configuration
//! - Error types

pub mod config;
pub mod diagnostic;
pub mod error;
pub mod model;

pub use config::ExtractConfig;
pub use diagnostic::{Diagnostic, DiagnosticKind, Diagnostics};
pub use error::ModelError;
pub use model::{
    Attribute, ClassAttribute, ClassDescriptor, InstanceAttribute, MethodDescriptor,
    ParameterDescriptor, ParameterKind, TypedValue, UnitModel, Visibility,
};
