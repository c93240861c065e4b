#![deny(missing_docs)]

//! # Anomaly Reporting
//!
//! Non-fatal conditions found during a generation run. The core never prints
//! or aborts on these; every stage returns them next to its output so the
//! caller decides how to surface them.

use derive_more::Display;
use serde::Serialize;

/// Why a route table entry was left out of the extracted routes.
#[derive(Debug, Clone, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// The route declares no path.
    #[display("path is empty")]
    EmptyPath,
    /// The path does not start with `/`.
    #[display("path does not start with '/'")]
    RelativePath,
    /// No HTTP method survived normalization.
    #[display("no HTTP methods declared")]
    NoMethods,
    /// The entry could not be read; carries the parser message.
    #[display("malformed entry: {_0}")]
    Malformed(String),
}

/// Why a `$ref` marker was left in a flattened schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnresolvedCause {
    /// The target is not present in the local definitions.
    #[display("unresolved reference")]
    MissingTarget,
    /// The target is already being expanded on the current path.
    #[display("cyclic reference")]
    Cycle,
}

/// A single non-fatal finding.
#[derive(Debug, Clone, PartialEq, Display, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// A route table entry was excluded from the output.
    #[display("skipped route #{index}{}: {reason}", quoted_name(name))]
    SkippedRoute {
        /// Position of the entry in the route table.
        index: usize,
        /// Declared name of the entry, if any.
        name: Option<String>,
        /// Why it was skipped.
        reason: SkipReason,
    },
    /// A `$ref` was kept as-is in a flattened schema.
    #[display("schema '{schema}': {cause} '{reference}' left in place")]
    UnresolvedReference {
        /// Model whose schema holds the reference.
        schema: String,
        /// The raw reference string.
        reference: String,
        /// Why it could not be inlined.
        cause: UnresolvedCause,
    },
    /// Two routes disagree on a parameter name at the same position.
    #[display("parameter {discarded} under '{prefix}' renamed to {canonical}")]
    AmbiguousParameterName {
        /// Parent prefix of the parameter.
        prefix: String,
        /// The name that won.
        canonical: String,
        /// The name that was rewritten.
        discarded: String,
    },
    /// A second route binds a verb already bound on the same resource.
    #[display("route '{route}': {method} {resource_path} is already bound, binding dropped")]
    DuplicateBinding {
        /// Normalized resource path.
        resource_path: String,
        /// The verb.
        method: String,
        /// Route whose binding was dropped.
        route: String,
    },
    /// A route or model references a model the catalog does not declare.
    #[display("model '{name}' used by '{referenced_by}' is not declared")]
    MissingModel {
        /// Name of the missing model.
        name: String,
        /// Route or model holding the reference.
        referenced_by: String,
    },
    /// A model declaration could not be read and was left out of the catalog.
    #[display("skipped model #{index}{}: {reason}", quoted_name(name))]
    MalformedModel {
        /// Position of the declaration in the model list.
        index: usize,
        /// Declared name, if one could be read.
        name: Option<String>,
        /// Parser message.
        reason: String,
    },
}

fn quoted_name(name: &Option<String>) -> String {
    name.as_ref()
        .map(|n| format!(" '{}'", n))
        .unwrap_or_default()
}

impl Anomaly {
    /// Returns false for findings that are purely informational.
    pub fn is_warning(&self) -> bool {
        !matches!(self, Anomaly::AmbiguousParameterName { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ambiguity_is_informational() {
        let info = Anomaly::AmbiguousParameterName {
            prefix: "/a".into(),
            canonical: "{x}".into(),
            discarded: "{y}".into(),
        };
        assert!(!info.is_warning());
        assert_eq!(info.to_string(), "parameter {y} under '/a' renamed to {x}");

        let skipped = Anomaly::SkippedRoute {
            index: 3,
            name: None,
            reason: SkipReason::NoMethods,
        };
        assert!(skipped.is_warning());
        assert_eq!(skipped.to_string(), "skipped route #3: no HTTP methods declared");
    }

    #[test]
    fn test_display_of_named_and_unresolved_findings() {
        let malformed = Anomaly::SkippedRoute {
            index: 1,
            name: Some("broken".into()),
            reason: SkipReason::Malformed("missing field `path`".into()),
        };
        assert_eq!(
            malformed.to_string(),
            "skipped route #1 'broken': malformed entry: missing field `path`"
        );

        let cycle = Anomaly::UnresolvedReference {
            schema: "Node".into(),
            reference: "#/$defs/Node".into(),
            cause: UnresolvedCause::Cycle,
        };
        assert_eq!(
            cycle.to_string(),
            "schema 'Node': cyclic reference '#/$defs/Node' left in place"
        );

        let model = Anomaly::MalformedModel {
            index: 0,
            name: None,
            reason: "missing field `name`".into(),
        };
        assert!(model.is_warning());
        assert_eq!(model.to_string(), "skipped model #0: missing field `name`");
    }

    #[test]
    fn test_serializes_with_kind_tag() {
        let anomaly = Anomaly::UnresolvedReference {
            schema: "Parent".into(),
            reference: "#/$defs/Ghost".into(),
            cause: UnresolvedCause::MissingTarget,
        };
        let json = serde_json::to_value(&anomaly).unwrap();
        assert_eq!(json["kind"], "unresolved_reference");
        assert_eq!(json["cause"], "missing_target");
    }
}
