#![deny(missing_docs)]

//! # Generation Options

use std::collections::BTreeSet;

/// Verbs never bound to resources by default; preflight is answered by CORS.
pub const DEFAULT_EXCLUDED_METHODS: &[&str] = &["OPTIONS"];

/// Options for one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationConfig {
    /// Upper-case verbs left out of method bindings.
    pub excluded_methods: BTreeSet<String>,
    /// Whether parameter renames are reported as informational anomalies.
    pub report_parameter_aliases: bool,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            excluded_methods: DEFAULT_EXCLUDED_METHODS
                .iter()
                .map(|m| m.to_string())
                .collect(),
            report_parameter_aliases: true,
        }
    }
}

impl GenerationConfig {
    /// Replaces the excluded verbs (case-insensitive).
    pub fn with_excluded_methods<S: AsRef<str>>(mut self, methods: &[S]) -> Self {
        self.excluded_methods = methods
            .iter()
            .map(|m| m.as_ref().trim().to_ascii_uppercase())
            .filter(|m| !m.is_empty())
            .collect();
        self
    }

    /// Whether `method` should be bound.
    pub fn binds(&self, method: &str) -> bool {
        !self.excluded_methods.contains(&method.to_ascii_uppercase())
    }
}
