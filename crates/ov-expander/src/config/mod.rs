//! Expander configuration
//!
//! The grouping and exclusion policies are plain lists of names so they can
//! be tuned for a particular object model without touching the expander.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use ov_core::SUMMARY_BUDGET;

/// Errors that can occur while loading a configuration file
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Config parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Policy lists used by the lazy expander
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpanderConfig {
    /// Summary display budget in characters
    pub summary_budget: usize,

    /// Reserved attribute names rendered under "Internals +"
    pub internals: Vec<String>,

    /// Type names that identify module/namespace objects
    pub module_types: Vec<String>,

    /// Type names of functions, methods and native callables
    pub function_types: Vec<String>,

    /// Name prefixes that mark accessor functions (`get_x`, `set_x`)
    pub accessor_prefixes: Vec<String>,

    /// Sized iterables that are displayed atomically
    pub atomic_types: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for ExpanderConfig {
    fn default() -> Self {
        Self {
            summary_budget: SUMMARY_BUDGET,
            internals: strings(&[
                "__builtins__",
                "__cached__",
                "__dict__",
                "__doc__",
                "__file__",
                "__gtype__",
                "__info__",
                "__module__",
                "__name__",
                "__package__",
                "__version__",
                "__weakref__",
            ]),
            module_types: strings(&["module"]),
            function_types: strings(&[
                "function",
                "builtin_function_or_method",
                "method",
                "staticmethod",
                "classmethod",
            ]),
            accessor_prefixes: strings(&["get", "set", "unset"]),
            atomic_types: strings(&["bytearray", "bytes", "str"]),
        }
    }
}

impl ExpanderConfig {
    /// Load a configuration from a JSON file; missing fields take defaults
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn is_internal(&self, name: &str) -> bool {
        self.internals.iter().any(|n| n == name)
    }

    pub fn is_module_type(&self, type_name: &str) -> bool {
        self.module_types.iter().any(|t| t == type_name)
    }

    pub fn is_function_type(&self, type_name: &str) -> bool {
        self.function_types.iter().any(|t| t == type_name)
    }

    pub fn is_accessor_prefix(&self, prefix: &str) -> bool {
        self.accessor_prefixes.iter().any(|p| p == prefix)
    }

    pub fn is_atomic_type(&self, type_name: &str) -> bool {
        self.atomic_types.iter().any(|t| t == type_name)
    }
}
