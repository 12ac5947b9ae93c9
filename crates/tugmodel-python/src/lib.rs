// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Tolerant structural extraction for Python source.
//!
//! This crate reads Python text that may be slightly malformed and recovers
//! its class structure without a full parser. The pipeline is:
//! - [`scanner`]: physical lines to logical lines
//! - [`extractor`]: logical lines to structural events
//! - [`classifier`]: value text to typed values with unresolved references
//! - [`resolver`]: references to object or external references
//! - [`assembler`]: events to class descriptors
//!
//! [`extract_unit`] runs all of it for one compilation unit.

pub mod assembler;
pub mod classifier;
pub mod extractor;
pub mod resolver;
pub mod scanner;
pub mod split;
pub mod unit;

pub use classifier::{classify, RawValue};
pub use extractor::{Event, Extractor, IgnoreReason, RawParameter};
pub use scanner::{scan, LogicalLine, ScanResult};
pub use unit::{extract_unit, extract_unit_cancellable};
