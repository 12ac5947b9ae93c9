//! Extraction configuration.
//!
//! Defaults match Python conventions. A config can be built in code with
//! the `with_*` builders, or parsed from TOML:
//!
//! ```
//! use tugmodel_core::config::ExtractConfig;
//!
//! let config = ExtractConfig::from_toml_str("max_line_joins = 16").unwrap();
//! assert_eq!(config.max_line_joins, 16);
//! assert_eq!(config.constructor_name, "__init__");
//! ```

use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Knobs for one extraction pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractConfig {
    /// Reserved name of the constructor method whose self-assignments
    /// become instance attributes.
    #[serde(default = "default_constructor_name")]
    pub constructor_name: String,

    /// Names treated as the implicit first parameter of a method.
    #[serde(default = "default_self_names")]
    pub self_names: Vec<String>,

    /// Maximum number of physical lines joined onto one logical line while
    /// brackets or quotes stay open.
    #[serde(default = "default_max_line_joins")]
    pub max_line_joins: usize,

    /// Column width of a tab when measuring indentation.
    #[serde(default = "default_tab_width")]
    pub tab_width: usize,

    /// Infer member visibility from leading underscores.
    #[serde(default = "default_infer_visibility")]
    pub infer_visibility: bool,
}

fn default_constructor_name() -> String {
    "__init__".to_string()
}

fn default_self_names() -> Vec<String> {
    vec!["self".to_string(), "cls".to_string()]
}

fn default_max_line_joins() -> usize {
    64
}

fn default_tab_width() -> usize {
    8
}

fn default_infer_visibility() -> bool {
    true
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            constructor_name: default_constructor_name(),
            self_names: default_self_names(),
            max_line_joins: default_max_line_joins(),
            tab_width: default_tab_width(),
            infer_visibility: default_infer_visibility(),
        }
    }
}

impl ExtractConfig {
    /// Parse and validate a config from TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self, ModelError> {
        let config: ExtractConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot drive extraction.
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.constructor_name.trim().is_empty() {
            return Err(ModelError::invalid_config(
                "constructor_name",
                "must not be empty",
            ));
        }
        if self.max_line_joins == 0 {
            return Err(ModelError::invalid_config(
                "max_line_joins",
                "must be at least 1",
            ));
        }
        if self.tab_width == 0 {
            return Err(ModelError::invalid_config("tab_width", "must be at least 1"));
        }
        Ok(())
    }

    /// True if `name` is one of the implicit self/cls parameter names.
    pub fn is_self_name(&self, name: &str) -> bool {
        self.self_names.iter().any(|s| s == name)
    }

    #[must_use]
    pub fn with_constructor_name(mut self, name: impl Into<String>) -> Self {
        self.constructor_name = name.into();
        self
    }

    #[must_use]
    pub fn with_max_line_joins(mut self, joins: usize) -> Self {
        self.max_line_joins = joins;
        self
    }

    #[must_use]
    pub fn with_tab_width(mut self, width: usize) -> Self {
        self.tab_width = width;
        self
    }

    #[must_use]
    pub fn with_infer_visibility(mut self, infer: bool) -> Self {
        self.infer_visibility = infer;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_toml_gives_defaults() {
        let config = ExtractConfig::from_toml_str("").unwrap();
        assert_eq!(config, ExtractConfig::default());
        assert!(config.is_self_name("self"));
        assert!(config.is_self_name("cls"));
        assert!(!config.is_self_name("this"));
    }

    #[test]
    fn toml_overrides() {
        let config = ExtractConfig::from_toml_str(
            r#"
constructor_name = "setup"
self_names = ["this"]
tab_width = 4
infer_visibility = false
"#,
        )
        .unwrap();
        assert_eq!(config.constructor_name, "setup");
        assert_eq!(config.self_names, vec!["this".to_string()]);
        assert_eq!(config.tab_width, 4);
        assert!(!config.infer_visibility);
        assert_eq!(config.max_line_joins, 64);
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = ExtractConfig::from_toml_str("max_line_joins = 0").unwrap_err();
        assert!(matches!(err, ModelError::InvalidConfig { ref field, .. } if field == "max_line_joins"));

        let err = ExtractConfig::from_toml_str("tab_width = \"wide\"").unwrap_err();
        assert!(matches!(err, ModelError::ConfigParse { .. }));
    }

    #[test]
    fn builders() {
        let config = ExtractConfig::default()
            .with_constructor_name("__new__")
            .with_max_line_joins(3)
            .with_tab_width(4)
            .with_infer_visibility(false);
        assert_eq!(config.constructor_name, "__new__");
        assert_eq!(config.max_line_joins, 3);
        assert_eq!(config.tab_width, 4);
        assert!(!config.infer_visibility);
        assert!(config.validate().is_ok());
    }
}
