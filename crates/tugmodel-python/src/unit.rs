// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Per-unit extraction driver.
//!
//! Runs scanner, extractor and assembler over one compilation unit and
//! packages the result with its sorted diagnostics. Units share nothing, so
//! any number of them may be extracted concurrently.

use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, debug_span, warn};
use tugmodel_core::{Diagnostics, ExtractConfig, ModelError, UnitModel};

use crate::assembler::Assembler;
use crate::extractor::{Event, Extractor};
use crate::scanner::scan;

/// Extract the class model of one unit.
///
/// Never fails: malformed input yields a partial model plus diagnostics.
///
/// ```
/// use tugmodel_core::{ExtractConfig, TypedValue};
/// use tugmodel_python::extract_unit;
///
/// let source = "class A:\n    def __init__(self):\n        self.n = -3\n";
/// let model = extract_unit("a.py", source, &ExtractConfig::default());
/// let class = model.class("A").unwrap();
/// assert_eq!(class.instance_attribute("n").unwrap().value, TypedValue::Int(-3));
/// ```
pub fn extract_unit(unit: &str, source: &str, config: &ExtractConfig) -> UnitModel {
    let _span = debug_span!("extract_unit", unit).entered();
    let mut diagnostics = Diagnostics::new();
    let scanned = scan(source, config, &mut diagnostics);
    let events = Extractor::run(&scanned.lines, config, &mut diagnostics);
    build_model(unit, scanned.encoding, events, config, diagnostics)
}

/// Like [`extract_unit`], checking `cancel` before each logical line.
///
/// A cancelled unit returns [`ModelError::Cancelled`] and its partial
/// result is discarded.
pub fn extract_unit_cancellable(
    unit: &str,
    source: &str,
    config: &ExtractConfig,
    cancel: &AtomicBool,
) -> Result<UnitModel, ModelError> {
    extract_until(unit, source, config, || cancel.load(Ordering::Relaxed))
}

/// Extraction polling `is_cancelled` once up front and again before each
/// logical line.
fn extract_until(
    unit: &str,
    source: &str,
    config: &ExtractConfig,
    mut is_cancelled: impl FnMut() -> bool,
) -> Result<UnitModel, ModelError> {
    let _span = debug_span!("extract_unit", unit).entered();
    let cancelled = || ModelError::Cancelled {
        unit: unit.to_string(),
    };
    if is_cancelled() {
        return Err(cancelled());
    }

    let mut diagnostics = Diagnostics::new();
    let scanned = scan(source, config, &mut diagnostics);
    let mut extractor = Extractor::new(config);
    for line in &scanned.lines {
        if is_cancelled() {
            debug!(line = line.line, "cancelled");
            return Err(cancelled());
        }
        extractor.process(line, &mut diagnostics);
    }
    let events = extractor.finish();
    Ok(build_model(unit, scanned.encoding, events, config, diagnostics))
}

fn build_model(
    unit: &str,
    encoding: Option<String>,
    events: Vec<Event>,
    config: &ExtractConfig,
    mut diagnostics: Diagnostics,
) -> UnitModel {
    let mut assembler = Assembler::new(config);
    for event in events {
        assembler.fold(event, &mut diagnostics);
    }
    let classes = assembler.finish();

    let diagnostics = diagnostics.into_sorted();
    for diagnostic in &diagnostics {
        warn!(
            unit,
            line = diagnostic.line,
            kind = %diagnostic.kind,
            "{}",
            diagnostic.message
        );
    }
    debug!(
        classes = classes.len(),
        diagnostics = diagnostics.len(),
        "unit extracted"
    );

    UnitModel {
        unit: unit.to_string(),
        encoding,
        classes,
        diagnostics,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_before_start() {
        let cancel = AtomicBool::new(true);
        let config = ExtractConfig::default();
        let err =
            extract_unit_cancellable("a.py", "class A:\n    pass\n", &config, &cancel).unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "extraction of unit 'a.py' was cancelled");
    }

    #[test]
    fn cancelled_between_lines() {
        let source = "class A:\n    x = 1\n    y = 2\n";
        let cancel = AtomicBool::new(false);
        let mut polls = 0;
        let result = extract_until("a.py", source, &ExtractConfig::default(), || {
            polls += 1;
            // The third poll comes right before line 2.
            if polls == 3 {
                cancel.store(true, Ordering::Relaxed);
            }
            cancel.load(Ordering::Relaxed)
        });
        let err = result.unwrap_err();
        assert!(err.is_cancelled());
        assert_eq!(polls, 3);
    }

    #[test]
    fn uncancelled_matches_plain_extraction() {
        let source = "class A:\n    x = [1, 2]\n    def __init__(self):\n        self.y = A()\n";
        let config = ExtractConfig::default();
        let cancel = AtomicBool::new(false);
        let plain = extract_unit("a.py", source, &config);
        let checked = extract_unit_cancellable("a.py", source, &config, &cancel).unwrap();
        assert_eq!(plain, checked);
    }

    #[test]
    fn encoding_and_sorted_diagnostics() {
        let source = "# -*- coding: latin-1 -*-\nclass A:\n    b = {'k': 1 'j': 2}\n    a = [1 2]\n";
        let model = extract_unit("enc.py", source, &ExtractConfig::default());
        assert_eq!(model.encoding.as_deref(), Some("latin-1"));
        let lines: Vec<usize> = model.diagnostics.iter().map(|d| d.line).collect();
        assert_eq!(lines, vec![3, 4]);
    }
}
