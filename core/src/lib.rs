#![deny(missing_docs)]

//! # apigw Core
//!
//! Turns an application's declared route table and data models into what an
//! API gateway description needs: a deduplicated tree of resource nodes,
//! self-contained model schemas, and per-route method bindings.

/// Shared error types.
pub mod error;

/// Non-fatal findings.
pub mod report;

/// Generation options.
pub mod config;

/// Declared route table and model catalog.
pub mod manifest;

/// Model representation, registry and JSON Schema export.
pub mod schema;

/// Route extraction.
pub mod routes;

/// Model collection.
pub mod collector;

/// Schema flattening.
pub mod resolver;

/// Canonical path parameter names.
pub mod params;

/// Resource tree building.
pub mod tree;

/// One generation run.
pub mod pipeline;

pub use config::GenerationConfig;
pub use error::{AppError, AppResult};
pub use manifest::{AppManifest, HttpRoute, RejectedModel, RouteEntry};
pub use params::ParameterNameMap;
pub use pipeline::{generate, Generation, MethodBinding};
pub use report::Anomaly;
pub use resolver::{flatten, flatten_registry, resolve, FlattenedSchemas};
pub use routes::{extract, RouteDescriptor};
pub use schema::{ModelRegistry, ModelSchema, Property, SchemaKind};
pub use tree::{NodeId, ResourceNode, ResourceTree};
