//! Runtime options
//!
//! Loaded from TOML (`gdbind.toml`) or built in code. Every field has a
//! default, so an empty file is valid.
//!
//! ```toml
//! expose_private_methods = false
//! unknown_class_fallback = "root"
//! strict_object_args = true
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::InitError;

/// What to do with a native object whose class is not in the database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnknownClassPolicy {
    /// Wrap it as an instance of the root class
    #[default]
    Root,
    /// Fail with `BindError::UnknownClass`
    Error,
}

/// Binding behavior switches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeOptions {
    /// Bind methods whose names start with `_`
    pub expose_private_methods: bool,

    /// Handling of runtime classes missing from the database
    pub unknown_class_fallback: UnknownClassPolicy,

    /// Object arguments must be instances of the declared parameter class
    pub strict_object_args: bool,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            expose_private_methods: false,
            unknown_class_fallback: UnknownClassPolicy::Root,
            strict_object_args: true,
        }
    }
}

impl RuntimeOptions {
    /// Parse from TOML
    pub fn from_toml_str(s: &str) -> Result<Self, InitError> {
        Ok(toml::from_str(s)?)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, InitError> {
        let content = std::fs::read_to_string(path).map_err(InitError::OptionsIo)?;
        Self::from_toml_str(&content)
    }

    /// Serialize to TOML
    pub fn to_toml_string(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }
}
