//! Process environment snapshot
//!
//! Resolution reads environment variables through an `Environment` value
//! captured once at startup, so callers and tests can supply their own.

use std::collections::HashMap;

/// Well-known ESP-IDF install root variable
pub const IDF_PATH: &str = "IDF_PATH";
/// Espressif tools directory variable
pub const IDF_TOOLS_PATH: &str = "IDF_TOOLS_PATH";
/// Python virtual environment created by the IDF installer
pub const IDF_PYTHON_ENV_PATH: &str = "IDF_PYTHON_ENV_PATH";

/// Immutable view of environment variables
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Environment {
    vars: HashMap<String, String>,
}

impl Environment {
    /// Snapshot the current process environment
    ///
    /// Variables whose name or value is not valid Unicode are skipped.
    pub fn capture() -> Self {
        let vars = std::env::vars_os()
            .filter_map(|(k, v)| Some((k.into_string().ok()?, v.into_string().ok()?)))
            .collect();
        Self { vars }
    }

    /// Empty environment
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build an environment from key/value pairs
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Add or replace a variable
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Value of `key`, if set to something other than whitespace
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .get(key)
            .map(String::as_str)
            .filter(|v| !v.trim().is_empty())
    }
}
