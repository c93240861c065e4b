#![deny(missing_docs)]

//! # Route Manifest
//!
//! The declared route table and model catalog of an application. The manifest
//! replaces run-time reflection over a web framework: the application (or its
//! build) writes its routes and models down once, and generation reads them.
//!
//! ```yaml
//! title: Todo API
//! routes:
//!   - type: http
//!     path: /todos/{todo_id}
//!     methods: [GET]
//!     name: get_todo
//!     response: {kind: model, name: TodoResponse}
//!     tags: [todos]
//!   - type: mount
//!     path: /static
//! models:
//!   - name: TodoResponse
//!     properties:
//!       id: {schema: {kind: primitive, type: string}}
//! ```

use crate::error::{AppError, AppResult};
use crate::schema::{ModelRegistry, ModelSchema, SchemaKind};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// An application's declared routes and models.
///
/// Only the overall shape is strict. Each route entry and each model is parsed
/// on its own, so one malformed item is kept aside instead of failing the
/// whole manifest.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(from = "RawManifest")]
pub struct AppManifest {
    /// Application title.
    pub title: Option<String>,
    /// Application description.
    pub description: Option<String>,
    /// The route table. Absent (as opposed to empty) is a fatal input error.
    pub routes: Option<Vec<RouteEntry>>,
    /// Declared data models that parsed.
    pub models: Vec<ModelSchema>,
    /// Model declarations that did not parse, in declaration order.
    pub rejected_models: Vec<RejectedModel>,
}

#[derive(Deserialize)]
struct RawManifest {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    routes: Option<Vec<RouteEntry>>,
    #[serde(default)]
    models: Vec<Value>,
}

impl From<RawManifest> for AppManifest {
    fn from(raw: RawManifest) -> Self {
        let mut models = Vec::new();
        let mut rejected_models = Vec::new();
        for (index, value) in raw.models.into_iter().enumerate() {
            let name = declared_name(&value);
            match serde_json::from_value::<ModelSchema>(value) {
                Ok(model) => models.push(model),
                Err(e) => rejected_models.push(RejectedModel {
                    index,
                    name,
                    reason: e.to_string(),
                }),
            }
        }
        Self {
            title: raw.title,
            description: raw.description,
            routes: raw.routes,
            models,
            rejected_models,
        }
    }
}

/// A model declaration left out of the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedModel {
    /// Position in the `models` list.
    pub index: usize,
    /// Declared name, when one could be read.
    pub name: Option<String>,
    /// Parser message.
    pub reason: String,
}

impl AppManifest {
    /// Parses a manifest from YAML.
    pub fn from_yaml(yaml: &str) -> AppResult<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| AppError::Manifest(format!("Failed to parse manifest YAML: {}", e)))
    }

    /// Parses a manifest from JSON.
    pub fn from_json(json: &str) -> AppResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| AppError::Manifest(format!("Failed to parse manifest JSON: {}", e)))
    }

    /// Declared models as a catalog (first declaration of a name wins).
    pub fn catalog(&self) -> ModelRegistry {
        ModelRegistry::from_models(self.models.iter().cloned())
    }
}

fn declared_name(value: &Value) -> Option<String> {
    value.get("name").and_then(Value::as_str).map(str::to_string)
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteEntry {
    /// An HTTP endpoint.
    Http(HttpRoute),
    /// A mounted sub-application.
    Mount {
        /// Mount point.
        path: String,
        /// Mount name.
        name: Option<String>,
    },
    /// A websocket endpoint.
    Websocket {
        /// Endpoint path.
        path: String,
        /// Endpoint name.
        name: Option<String>,
    },
    /// An entry type this crate does not bind, e.g. `static`.
    Other {
        /// The declared `type`.
        kind: String,
    },
    /// An entry that could not be read as an HTTP route.
    Malformed {
        /// Declared name, when one could be read.
        name: Option<String>,
        /// Parser message.
        reason: String,
    },
}

#[derive(Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum KnownEntry {
    Http(HttpRoute),
    Mount {
        path: String,
        #[serde(default)]
        name: Option<String>,
    },
    Websocket {
        path: String,
        #[serde(default)]
        name: Option<String>,
    },
}

impl From<KnownEntry> for RouteEntry {
    fn from(entry: KnownEntry) -> Self {
        match entry {
            KnownEntry::Http(route) => RouteEntry::Http(route),
            KnownEntry::Mount { path, name } => RouteEntry::Mount { path, name },
            KnownEntry::Websocket { path, name } => RouteEntry::Websocket { path, name },
        }
    }
}

impl RouteEntry {
    /// Reads one route table entry.
    ///
    /// Unknown entry types become [`RouteEntry::Other`]. An HTTP entry, or an
    /// entry without a `type`, that does not parse becomes
    /// [`RouteEntry::Malformed`]; a broken non-HTTP entry is kept as `Other`.
    pub fn from_value(value: Value) -> Self {
        let name = declared_name(&value);
        let kind = match value.get("type") {
            Some(Value::String(kind)) => kind.clone(),
            Some(_) => {
                return RouteEntry::Malformed {
                    name,
                    reason: "entry type is not a string".to_string(),
                }
            }
            None => {
                return RouteEntry::Malformed {
                    name,
                    reason: "entry has no type".to_string(),
                }
            }
        };
        if !matches!(kind.as_str(), "http" | "mount" | "websocket") {
            return RouteEntry::Other { kind };
        }
        match serde_json::from_value::<KnownEntry>(value) {
            Ok(entry) => entry.into(),
            Err(e) if kind == "http" => RouteEntry::Malformed {
                name,
                reason: e.to_string(),
            },
            Err(_) => RouteEntry::Other { kind },
        }
    }
}

impl<'de> Deserialize<'de> for RouteEntry {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Value::deserialize(deserializer).map(RouteEntry::from_value)
    }
}

/// A declared HTTP route, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HttpRoute {
    /// Path template, e.g. `/todos/{todo_id}`.
    #[serde(default)]
    pub path: String,
    /// HTTP verbs, any case.
    #[serde(default)]
    pub methods: Vec<String>,
    /// Handler name.
    #[serde(default)]
    pub name: Option<String>,
    /// Short summary.
    #[serde(default)]
    pub summary: Option<String>,
    /// Declared request body type.
    #[serde(default)]
    pub request: Option<SchemaKind>,
    /// Declared response type.
    #[serde(default)]
    pub response: Option<SchemaKind>,
    /// Grouping tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl HttpRoute {
    /// Route with a path and methods only.
    pub fn new(path: &str, methods: &[&str]) -> Self {
        Self {
            path: path.to_string(),
            methods: methods.iter().map(|m| m.to_string()).collect(),
            ..Self::default()
        }
    }
}
