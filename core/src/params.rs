#![deny(missing_docs)]

//! # Parameter Name Normalization
//!
//! Routes often spell the same path parameter differently (`/todos/{todo_id}`
//! and `/todos/{other_id}/toggle`). A resource tree can only hold one
//! parameter child per parent, so every parent prefix gets one canonical
//! parameter segment: the first one seen.
//!
//! Prefixes are accumulated with canonical names, so a nested parameter's
//! prefix reflects the normalization of its ancestors
//! (`/todos/{todo_id}/comments`, never `/todos/{other_id}/comments`).

use crate::report::Anomaly;
use indexmap::IndexMap;
use serde::Serialize;

/// Prefix used for a parameter in the first segment.
pub const ROOT_PREFIX: &str = "/";

/// Whether a path segment is a `{name}` parameter.
pub fn is_parameter(segment: &str) -> bool {
    segment.len() >= 2 && segment.starts_with('{') && segment.ends_with('}')
}

/// Non-empty segments of a path template.
pub fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

/// Appends `segment` to an accumulated prefix (`""` for the root).
pub(crate) fn join(prefix: &str, segment: &str) -> String {
    format!("{}/{}", prefix, segment)
}

/// Key under which a parameter following `prefix` is recorded.
pub(crate) fn parent_key(prefix: &str) -> &str {
    if prefix.is_empty() {
        ROOT_PREFIX
    } else {
        prefix
    }
}

/// A parameter spelling that lost to the canonical name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParameterAlias {
    /// Parent prefix.
    pub prefix: String,
    /// Winning segment.
    pub canonical: String,
    /// Rewritten segment.
    pub discarded: String,
}

/// Parent prefix -> canonical parameter segment (braces included).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParameterNameMap {
    canonical: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    aliases: Vec<ParameterAlias>,
}

impl ParameterNameMap {
    /// Builds the map over `paths`, first writer wins.
    pub fn build<'a>(paths: impl IntoIterator<Item = &'a str>) -> Self {
        let mut map = Self::default();
        for path in paths {
            map.record(path);
        }
        map
    }

    fn record(&mut self, path: &str) {
        let mut prefix = String::new();
        for segment in segments(path) {
            if !is_parameter(segment) {
                prefix = join(&prefix, segment);
                continue;
            }
            let key = parent_key(&prefix).to_string();
            let chosen = match self.canonical.get(&key) {
                Some(existing) => {
                    if existing != segment {
                        let alias = ParameterAlias {
                            prefix: key.clone(),
                            canonical: existing.clone(),
                            discarded: segment.to_string(),
                        };
                        if !self.aliases.contains(&alias) {
                            self.aliases.push(alias);
                        }
                    }
                    existing.clone()
                }
                None => {
                    self.canonical.insert(key, segment.to_string());
                    segment.to_string()
                }
            };
            prefix = join(&prefix, &chosen);
        }
    }

    /// Canonical segment for a parent prefix.
    pub fn canonical(&self, prefix: &str) -> Option<&str> {
        self.canonical.get(prefix).map(String::as_str)
    }

    /// Canonical segment for `segment` under `prefix`, or `segment` itself
    /// when it is a literal or the prefix is unknown.
    pub fn canonical_segment<'a>(&'a self, prefix: &str, segment: &'a str) -> &'a str {
        if !is_parameter(segment) {
            return segment;
        }
        self.canonical(parent_key(prefix)).unwrap_or(segment)
    }

    /// Rewrites `path` with canonical parameter names.
    pub fn normalize(&self, path: &str) -> String {
        let mut prefix = String::new();
        for segment in segments(path) {
            let chosen = self.canonical_segment(&prefix, segment);
            prefix = join(&prefix, chosen);
        }
        if prefix.is_empty() {
            ROOT_PREFIX.to_string()
        } else {
            prefix
        }
    }

    /// Entries in first-seen order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.canonical
            .iter()
            .map(|(prefix, name)| (prefix.as_str(), name.as_str()))
    }

    /// Number of prefixes.
    pub fn len(&self) -> usize {
        self.canonical.len()
    }

    /// Whether no parameter was seen.
    pub fn is_empty(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Spellings rewritten to a canonical name, first-seen order.
    pub fn aliases(&self) -> &[ParameterAlias] {
        &self.aliases
    }

    /// The aliases as informational anomalies.
    pub fn alias_anomalies(&self) -> Vec<Anomaly> {
        self.aliases
            .iter()
            .map(|alias| Anomaly::AmbiguousParameterName {
                prefix: alias.prefix.clone(),
                canonical: alias.canonical.clone(),
                discarded: alias.discarded.clone(),
            })
            .collect()
    }
}
