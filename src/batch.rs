//! Parallel extraction over many compilation units.
//!
//! Units share no state, so each one is extracted on its own rayon worker
//! and the results are collected back in input order. One malformed unit
//! never affects another: extraction itself cannot fail, and cancellation
//! only discards the units it interrupts.

use std::sync::atomic::AtomicBool;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug_span;
use tugmodel_core::{ExtractConfig, ModelError, UnitModel};
use tugmodel_python::{extract_unit, extract_unit_cancellable};

/// One compilation unit supplied by the caller: an identifier plus its
/// fully materialized source text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceUnit {
    pub name: String,
    pub source: String,
}

impl SourceUnit {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Extract every unit in parallel. Output order matches input order.
pub fn extract_units(units: &[SourceUnit], config: &ExtractConfig) -> Vec<UnitModel> {
    let _span = debug_span!("extract_units", units = units.len()).entered();
    units
        .par_iter()
        .map(|unit| extract_unit(&unit.name, &unit.source, config))
        .collect()
}

/// Extract every unit in parallel, stopping early once `cancel` is set.
///
/// Each slot holds either the unit's model or [`ModelError::Cancelled`].
/// Units that finished before cancellation keep their results.
pub fn extract_units_cancellable(
    units: &[SourceUnit],
    config: &ExtractConfig,
    cancel: &AtomicBool,
) -> Vec<Result<UnitModel, ModelError>> {
    let _span = debug_span!("extract_units", units = units.len()).entered();
    units
        .par_iter()
        .map(|unit| extract_unit_cancellable(&unit.name, &unit.source, config, cancel))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_batch() {
        assert!(extract_units(&[], &ExtractConfig::default()).is_empty());
    }

    #[test]
    fn source_unit_from_json() {
        let unit: SourceUnit =
            serde_json::from_str(r#"{"name": "m.py", "source": "class M: pass"}"#).unwrap();
        assert_eq!(unit, SourceUnit::new("m.py", "class M: pass"));
    }
}
