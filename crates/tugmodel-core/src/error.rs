//! Error types for tugmodel.
//!
//! Malformed source is never an error: extraction recovers and reports
//! [`Diagnostic`](crate::diagnostic::Diagnostic)s instead. `ModelError`
//! covers the failures that exist outside the extraction pass itself:
//! invalid configuration and cancellation.

use thiserror::Error;

/// Unified error type for tugmodel.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Configuration text could not be parsed.
    #[error("failed to parse config: {message}")]
    ConfigParse { message: String },

    /// Configuration parsed but holds an unusable value.
    #[error("invalid config value for '{field}': {reason}")]
    InvalidConfig { field: String, reason: String },

    /// Extraction of a unit was cancelled; its partial result is discarded.
    #[error("extraction of unit '{unit}' was cancelled")]
    Cancelled { unit: String },
}

impl ModelError {
    /// Create an invalid-config error.
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ModelError::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True if this error is a cancellation rather than a failure.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, ModelError::Cancelled { .. })
    }
}

impl From<toml::de::Error> for ModelError {
    fn from(err: toml::de::Error) -> Self {
        ModelError::ConfigParse {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        let err = ModelError::invalid_config("max_line_joins", "must be at least 1");
        assert_eq!(
            err.to_string(),
            "invalid config value for 'max_line_joins': must be at least 1"
        );
        let err = ModelError::Cancelled {
            unit: "shapes.py".into(),
        };
        assert!(err.is_cancelled());
        assert_eq!(err.to_string(), "extraction of unit 'shapes.py' was cancelled");
    }
}
