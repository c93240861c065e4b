#![deny(missing_docs)]

//! # Model Schemas
//!
//! Closed representation of the data models an application declares, the
//! insertion-ordered registry holding them, and the raw JSON Schema export.
//!
//! The export mirrors what model libraries usually emit: the model's own
//! properties at the top level, and every named model or enum it uses placed
//! under `$defs` and referenced as `#/$defs/{name}`. Flattening that export is
//! the job of [`crate::resolver`].

use indexmap::{IndexMap, IndexSet};
use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt::Display;

/// Primitive JSON types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrimitiveType {
    /// A string type.
    String,
    /// An integer type.
    Integer,
    /// A floating point number.
    Number,
    /// A boolean type.
    Boolean,
}

impl PrimitiveType {
    /// JSON Schema `type` keyword value.
    pub fn as_str(&self) -> &'static str {
        match self {
            PrimitiveType::String => "string",
            PrimitiveType::Integer => "integer",
            PrimitiveType::Number => "number",
            PrimitiveType::Boolean => "boolean",
        }
    }
}

impl Display for PrimitiveType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The kind of a field or body type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SchemaKind {
    /// A primitive value, optionally with a format (`uuid`, `date-time`).
    Primitive {
        /// Primitive type.
        #[serde(rename = "type")]
        ty: PrimitiveType,
        /// Format hint.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        format: Option<String>,
    },
    /// A homogeneous list.
    Array {
        /// Element kind.
        items: Box<SchemaKind>,
    },
    /// An anonymous inline object.
    Object {
        /// Inline properties.
        #[serde(default)]
        properties: IndexMap<String, Property>,
        /// Required inline properties.
        #[serde(default)]
        required: IndexSet<String>,
    },
    /// A closed set of literal values.
    Enum {
        /// Named enums are exported as definitions.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        name: Option<String>,
        /// Allowed values.
        values: Vec<Value>,
    },
    /// A reference to a structured model by name.
    Model {
        /// Model name.
        name: String,
    },
    /// A nullable wrapper.
    Optional {
        /// Wrapped kind.
        inner: Box<SchemaKind>,
    },
    /// One of several kinds.
    Union {
        /// Alternatives.
        variants: Vec<SchemaKind>,
    },
}

impl SchemaKind {
    /// Plain string.
    pub fn string() -> Self {
        Self::primitive(PrimitiveType::String)
    }

    /// Primitive without format.
    pub fn primitive(ty: PrimitiveType) -> Self {
        SchemaKind::Primitive { ty, format: None }
    }

    /// Reference to a named model.
    pub fn model(name: impl Into<String>) -> Self {
        SchemaKind::Model { name: name.into() }
    }

    /// List of `items`.
    pub fn array(items: SchemaKind) -> Self {
        SchemaKind::Array {
            items: Box::new(items),
        }
    }

    /// Nullable `inner`.
    pub fn optional(inner: SchemaKind) -> Self {
        SchemaKind::Optional {
            inner: Box::new(inner),
        }
    }

    /// The model this kind binds to directly, looking through a nullable
    /// wrapper. Containers such as arrays do not bind to their element model.
    pub fn direct_model(&self) -> Option<&str> {
        match self {
            SchemaKind::Model { name } => Some(name.as_str()),
            SchemaKind::Optional { inner } => inner.direct_model(),
            _ => None,
        }
    }
}

/// Validation constraints attached to a property.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Constraints {
    /// Human readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    /// Minimum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_length: Option<u64>,
    /// Maximum string length.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_length: Option<u64>,
    /// Inclusive numeric lower bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Inclusive numeric upper bound.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maximum: Option<f64>,
    /// Maximum number of array items.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_items: Option<u64>,
}

/// A single model property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    /// The property kind.
    pub schema: SchemaKind,
    /// Constraints, flattened next to `schema`.
    #[serde(flatten)]
    pub constraints: Constraints,
}

impl Property {
    /// Property without constraints.
    pub fn new(schema: SchemaKind) -> Self {
        Self {
            schema,
            constraints: Constraints::default(),
        }
    }
}

/// A structured data model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelSchema {
    /// Unique model name.
    pub name: String,
    /// Model description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered properties.
    #[serde(default)]
    pub properties: IndexMap<String, Property>,
    /// Required property names.
    #[serde(default)]
    pub required: IndexSet<String>,
}

impl ModelSchema {
    /// Creates a model without properties.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            properties: IndexMap::new(),
            required: IndexSet::new(),
        }
    }

    /// Adds a property without constraints.
    pub fn with_field(self, name: &str, kind: SchemaKind, required: bool) -> Self {
        self.with_property(name, Property::new(kind), required)
    }

    /// Adds a property.
    pub fn with_property(mut self, name: &str, property: Property, required: bool) -> Self {
        self.properties.insert(name.to_string(), property);
        if required {
            self.required.insert(name.to_string());
        }
        self
    }
}

/// Insertion-ordered set of models keyed by name.
///
/// Registration is idempotent: the first model registered under a name stays.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ModelRegistry {
    models: IndexMap<String, ModelSchema>,
}

impl ModelRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a registry, keeping the first model of each name.
    pub fn from_models(models: impl IntoIterator<Item = ModelSchema>) -> Self {
        let mut registry = Self::new();
        for model in models {
            registry.register(model);
        }
        registry
    }

    /// Registers a model. Returns false if the name was already present.
    pub fn register(&mut self, model: ModelSchema) -> bool {
        if self.models.contains_key(&model.name) {
            return false;
        }
        self.models.insert(model.name.clone(), model);
        true
    }

    /// Whether a model of that name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.models.contains_key(name)
    }

    /// Looks up a model.
    pub fn get(&self, name: &str) -> Option<&ModelSchema> {
        self.models.get(name)
    }

    /// Number of models.
    pub fn len(&self) -> usize {
        self.models.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    /// Model names in registration order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.models.keys().map(String::as_str)
    }

    /// Models in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &ModelSchema> {
        self.models.values()
    }
}

/// Exports `model` as a JSON Schema document with a `$defs` side table.
///
/// Referenced models are looked up in `catalog`; a model missing from it is
/// still referenced, which leaves a dangling `$ref` for the resolver to report.
///
/// Models own the `$defs` key equal to their name. A named enum whose name is
/// taken by a reachable model, or by a different enum, is stored under the
/// first free numbered key (`Status2`, `Status3`, ...) and keeps its title.
pub fn export(model: &ModelSchema, catalog: &ModelRegistry) -> Value {
    let mut exporter = Exporter {
        catalog,
        reserved: reachable_model_names(model, catalog),
        defs: Map::new(),
    };
    let mut root = exporter.model_body(model);
    if !exporter.defs.is_empty() {
        root.insert("$defs".to_string(), Value::Object(exporter.defs));
    }
    Value::Object(root)
}

/// Characters escaped in a URI fragment holding a JSON Pointer.
const FRAGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// `$ref` string pointing at a `$defs` entry.
///
/// The name is pointer-escaped (`~0`, `~1`) and then percent-encoded, the
/// inverse of [`crate::resolver::reference_target`].
pub fn defs_reference(name: &str) -> String {
    let escaped = name.replace('~', "~0").replace('/', "~1");
    format!("#/$defs/{}", utf8_percent_encode(&escaped, FRAGMENT))
}

struct Exporter<'a> {
    catalog: &'a ModelRegistry,
    reserved: IndexSet<String>,
    defs: Map<String, Value>,
}

impl Exporter<'_> {
    fn model_body(&mut self, model: &ModelSchema) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("title".to_string(), json!(model.name));
        if let Some(description) = &model.description {
            body.insert("description".to_string(), json!(description));
        }
        body.insert("type".to_string(), json!("object"));
        body.insert(
            "properties".to_string(),
            Value::Object(self.properties(&model.properties)),
        );
        if !model.required.is_empty() {
            body.insert("required".to_string(), json!(model.required));
        }
        body
    }

    fn properties(&mut self, properties: &IndexMap<String, Property>) -> Map<String, Value> {
        let mut out = Map::new();
        for (name, property) in properties {
            let mut node = self.kind(&property.schema);
            apply_constraints(&mut node, &property.constraints);
            out.insert(name.clone(), node);
        }
        out
    }

    fn kind(&mut self, kind: &SchemaKind) -> Value {
        match kind {
            SchemaKind::Primitive { ty, format } => {
                let mut node = json!({ "type": ty.as_str() });
                if let Some(format) = format {
                    node["format"] = json!(format);
                }
                node
            }
            SchemaKind::Array { items } => json!({ "type": "array", "items": self.kind(items) }),
            SchemaKind::Object {
                properties,
                required,
            } => {
                let mut node = json!({
                    "type": "object",
                    "properties": Value::Object(self.properties(properties)),
                });
                if !required.is_empty() {
                    node["required"] = json!(required);
                }
                node
            }
            SchemaKind::Enum {
                name: Some(name),
                values,
            } => {
                let key = self.define_enum(name, values);
                json!({ "$ref": defs_reference(&key) })
            }
            SchemaKind::Enum { name: None, values } => enum_body(values),
            SchemaKind::Model { name } => {
                self.define_model(name);
                json!({ "$ref": defs_reference(name) })
            }
            SchemaKind::Optional { inner } => {
                json!({ "anyOf": [self.kind(inner), { "type": "null" }] })
            }
            SchemaKind::Union { variants } => {
                let variants: Vec<Value> = variants.iter().map(|v| self.kind(v)).collect();
                json!({ "anyOf": variants })
            }
        }
    }

    fn define_enum(&mut self, name: &str, values: &[Value]) -> String {
        let mut body = enum_body(values);
        body["title"] = json!(name);

        let mut key = name.to_string();
        let mut suffix = 1;
        loop {
            let taken = match self.defs.get(&key) {
                Some(existing) if *existing == body => return key,
                Some(_) => true,
                None => self.reserved.contains(&key),
            };
            if !taken {
                self.defs.insert(key.clone(), body);
                return key;
            }
            suffix += 1;
            key = format!("{}{}", name, suffix);
        }
    }

    fn define_model(&mut self, name: &str) {
        if self.defs.contains_key(name) {
            return;
        }
        let catalog = self.catalog;
        let Some(model) = catalog.get(name) else {
            return;
        };
        // Placeholder first so self references stop here.
        self.defs.insert(name.to_string(), Value::Null);
        let body = self.model_body(model);
        self.defs.insert(name.to_string(), Value::Object(body));
    }
}

/// Names of every model `model` reaches, itself included, whether or not the
/// catalog declares them.
fn reachable_model_names(model: &ModelSchema, catalog: &ModelRegistry) -> IndexSet<String> {
    let mut names = IndexSet::new();
    names.insert(model.name.clone());
    let mut pending: Vec<&ModelSchema> = vec![model];
    while let Some(current) = pending.pop() {
        let mut found = Vec::new();
        for property in current.properties.values() {
            referenced_models(&property.schema, &mut found);
        }
        for name in found {
            if names.insert(name.to_string()) {
                if let Some(next) = catalog.get(name) {
                    pending.push(next);
                }
            }
        }
    }
    names
}

fn referenced_models<'k>(kind: &'k SchemaKind, out: &mut Vec<&'k str>) {
    match kind {
        SchemaKind::Model { name } => out.push(name),
        SchemaKind::Array { items } => referenced_models(items, out),
        SchemaKind::Optional { inner } => referenced_models(inner, out),
        SchemaKind::Union { variants } => {
            for variant in variants {
                referenced_models(variant, out);
            }
        }
        SchemaKind::Object { properties, .. } => {
            for property in properties.values() {
                referenced_models(&property.schema, out);
            }
        }
        SchemaKind::Primitive { .. } | SchemaKind::Enum { .. } => {}
    }
}

fn enum_body(values: &[Value]) -> Value {
    let mut node = json!({ "enum": values });
    if !values.is_empty() && values.iter().all(Value::is_string) {
        node["type"] = json!("string");
    } else if !values.is_empty() && values.iter().all(|v| v.is_i64() || v.is_u64()) {
        node["type"] = json!("integer");
    }
    node
}

fn apply_constraints(node: &mut Value, constraints: &Constraints) {
    let Some(map) = node.as_object_mut() else {
        return;
    };
    if let Some(description) = &constraints.description {
        map.insert("description".to_string(), json!(description));
    }
    if let Some(default) = &constraints.default {
        map.insert("default".to_string(), default.clone());
    }
    if let Some(v) = constraints.min_length {
        map.insert("minLength".to_string(), json!(v));
    }
    if let Some(v) = constraints.max_length {
        map.insert("maxLength".to_string(), json!(v));
    }
    if let Some(v) = constraints.minimum {
        map.insert("minimum".to_string(), numeric_bound(v));
    }
    if let Some(v) = constraints.maximum {
        map.insert("maximum".to_string(), numeric_bound(v));
    }
    if let Some(v) = constraints.max_items {
        map.insert("maxItems".to_string(), json!(v));
    }
}

/// Whole bounds are written as integers (`0`, not `0.0`).
fn numeric_bound(v: f64) -> Value {
    if v.fract() == 0.0 && v.abs() < i64::MAX as f64 {
        json!(v as i64)
    } else {
        json!(v)
    }
}
