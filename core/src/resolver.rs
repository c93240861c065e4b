#![deny(missing_docs)]

//! # Schema Resolver
//!
//! Flattens JSON Schema documents by inlining every `$ref` that points into
//! the accompanying definitions table, recursively, so the output is
//! self-contained.
//!
//! Resolution never fails. A reference whose target is missing, or whose
//! target is already being expanded further up the current path, is left in
//! place and reported as [`Anomaly::UnresolvedReference`].

use crate::report::{Anomaly, UnresolvedCause};
use crate::schema::{export, ModelRegistry};
use indexmap::{IndexMap, IndexSet};
use percent_encoding::percent_decode_str;
use serde_json::{json, Map, Value};

/// Draft used for gateway model envelopes.
pub const GATEWAY_SCHEMA_DRAFT: &str = "http://json-schema.org/draft-04/schema#";

/// Model name -> fully resolved schema, in registry order.
pub type FlattenedSchemas = IndexMap<String, Value>;

/// Output of a resolution pass.
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    /// The resolved document.
    pub schema: Value,
    /// References left in place.
    pub anomalies: Vec<Anomaly>,
}

/// Output of flattening a whole registry.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Flattening {
    /// Flattened schemas keyed by model name.
    pub schemas: FlattenedSchemas,
    /// References left in place, across all models.
    pub anomalies: Vec<Anomaly>,
}

/// Resolves every `$ref` in `document` against `defs`.
///
/// `name` identifies the owning model in reported anomalies.
pub fn resolve(name: &str, document: &Value, defs: &Map<String, Value>) -> Resolved {
    let mut resolver = Resolver {
        owner: name,
        defs,
        expanding: Vec::new(),
        reported: IndexSet::new(),
        anomalies: Vec::new(),
    };
    let schema = resolver.walk(document);
    Resolved {
        schema,
        anomalies: resolver.anomalies,
    }
}

/// Pops the `$defs` table off a raw export, resolves the rest against it and
/// normalizes an implicit object schema to `type: object`.
pub fn flatten(name: &str, export: Value) -> Resolved {
    let Value::Object(map) = export else {
        return Resolved {
            schema: export,
            anomalies: Vec::new(),
        };
    };

    let mut defs = Map::new();
    let mut body = Map::new();
    for (key, value) in map {
        match (key.as_str(), value) {
            ("$defs", Value::Object(table)) => defs = table,
            (_, value) => {
                body.insert(key, value);
            }
        }
    }

    let mut resolved = resolve(name, &Value::Object(body), &defs);
    normalize_object_type(&mut resolved.schema);
    resolved
}

/// Exports and flattens every model of `registry`, in registry order.
///
/// The registry doubles as the catalog for nested lookups, which holds for
/// registries produced by [`crate::collector::collect`].
pub fn flatten_registry(registry: &ModelRegistry) -> Flattening {
    let mut out = Flattening::default();
    for model in registry.iter() {
        let resolved = flatten(&model.name, export(model, registry));
        out.anomalies.extend(resolved.anomalies);
        out.schemas.insert(model.name.clone(), resolved.schema);
    }
    out
}

/// Wraps a flattened schema in the draft-04 envelope gateway model APIs expect.
pub fn gateway_model(schema: &Value) -> Value {
    let mut model = Map::new();
    model.insert("$schema".to_string(), json!(GATEWAY_SCHEMA_DRAFT));
    model.insert("type".to_string(), json!("object"));
    model.insert(
        "properties".to_string(),
        schema
            .get("properties")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new())),
    );
    if let Some(required) = schema.get("required") {
        model.insert("required".to_string(), required.clone());
    }
    if let Some(title) = schema.get("title") {
        model.insert("title".to_string(), title.clone());
    }
    Value::Object(model)
}

/// Extracts the definition name a `$ref` points at (its last pointer segment).
/// e.g. `#/$defs/Child` -> `Child`
pub fn reference_target(reference: &str) -> String {
    let segment = reference.rsplit('/').next().unwrap_or(reference);
    decode_pointer_segment(segment)
}

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

fn normalize_object_type(schema: &mut Value) {
    if let Value::Object(map) = schema {
        if map.contains_key("properties") && !map.contains_key("type") {
            map.insert("type".to_string(), json!("object"));
        }
    }
}

struct Resolver<'a> {
    owner: &'a str,
    defs: &'a Map<String, Value>,
    expanding: Vec<String>,
    reported: IndexSet<(String, bool)>,
    anomalies: Vec<Anomaly>,
}

impl Resolver<'_> {
    fn walk(&mut self, node: &Value) -> Value {
        match node {
            Value::Array(items) => Value::Array(items.iter().map(|item| self.walk(item)).collect()),
            Value::Object(map) => {
                if let Some(reference) = map.get("$ref").and_then(Value::as_str) {
                    return self.inline(reference, node);
                }
                Value::Object(
                    map.iter()
                        .map(|(key, value)| (key.clone(), self.walk(value)))
                        .collect(),
                )
            }
            other => other.clone(),
        }
    }

    fn inline(&mut self, reference: &str, marker: &Value) -> Value {
        let target = reference_target(reference);
        let defs = self.defs;
        let Some(definition) = defs.get(&target) else {
            self.report(reference, UnresolvedCause::MissingTarget);
            return marker.clone();
        };
        if self.expanding.contains(&target) {
            self.report(reference, UnresolvedCause::Cycle);
            return marker.clone();
        }

        self.expanding.push(target);
        let mut resolved = self.walk(definition);
        // Keywords next to the marker (description, default) win over the target's.
        if let (Value::Object(out), Value::Object(siblings)) = (&mut resolved, marker) {
            for (key, value) in siblings.iter().filter(|(key, _)| *key != "$ref") {
                let value = self.walk(value);
                out.insert(key.clone(), value);
            }
        }
        self.expanding.pop();
        resolved
    }

    fn report(&mut self, reference: &str, cause: UnresolvedCause) {
        let key = (reference.to_string(), cause == UnresolvedCause::Cycle);
        if !self.reported.insert(key) {
            return;
        }
        self.anomalies.push(Anomaly::UnresolvedReference {
            schema: self.owner.to_string(),
            reference: reference.to_string(),
            cause,
        });
    }
}
