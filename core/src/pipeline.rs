#![deny(missing_docs)]

//! # Generation Pipeline
//!
//! One generation run: route table and model catalog in, resource tree,
//! flattened schemas and per-route method bindings out.
//!
//! Every mutable structure is created inside [`generate`] and owned by the
//! returned [`Generation`]; nothing is shared between runs.

use crate::collector::collect;
use crate::config::GenerationConfig;
use crate::error::{AppError, AppResult};
use crate::manifest::AppManifest;
use crate::params::ParameterNameMap;
use crate::report::Anomaly;
use crate::resolver::{flatten_registry, gateway_model, FlattenedSchemas};
use crate::routes::{extract, RouteDescriptor};
use crate::schema::ModelRegistry;
use crate::tree::{NodeId, ResourceTree};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// One HTTP verb of one route bound to a resource node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodBinding {
    /// Node the verb is attached to.
    pub node: NodeId,
    /// Normalized path of that node.
    pub resource_path: String,
    /// Upper-case verb.
    pub method: String,
    /// Route name.
    pub route: String,
    /// Request model, if the body is a structured model.
    pub request_schema: Option<String>,
    /// Response model, if the response is a structured model.
    pub response_schema: Option<String>,
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct Generation {
    /// Application title from the manifest.
    pub title: Option<String>,
    /// Extracted routes, declaration order.
    pub routes: Vec<RouteDescriptor>,
    /// Models reachable from the routes.
    pub registry: ModelRegistry,
    /// Flattened schema per collected model.
    pub schemas: FlattenedSchemas,
    /// Canonical parameter names.
    pub parameter_names: ParameterNameMap,
    /// The shared resource tree.
    pub tree: ResourceTree,
    /// Verb bindings, route order.
    pub bindings: Vec<MethodBinding>,
    /// Non-fatal findings, stage order.
    pub anomalies: Vec<Anomaly>,
}

/// Runs one generation over `manifest`.
///
/// Fails only when the manifest has no route table; every per-route and
/// per-schema problem ends up in [`Generation::anomalies`].
pub fn generate(manifest: &AppManifest, config: &GenerationConfig) -> AppResult<Generation> {
    let table = manifest
        .routes
        .as_deref()
        .ok_or(AppError::MissingRouteTable)?;

    let mut anomalies = Vec::new();

    // 1. Routes
    let extraction = extract(table);
    anomalies.extend(extraction.anomalies);
    let routes = extraction.routes;

    // 2. Models and their flattened schemas
    anomalies.extend(manifest.rejected_models.iter().map(|rejected| {
        Anomaly::MalformedModel {
            index: rejected.index,
            name: rejected.name.clone(),
            reason: rejected.reason.clone(),
        }
    }));
    let collection = collect(&routes, &manifest.catalog());
    anomalies.extend(collection.anomalies);
    let flattening = flatten_registry(&collection.registry);
    anomalies.extend(flattening.anomalies);

    // 3. Canonical parameter names
    let parameter_names = ParameterNameMap::build(routes.iter().map(|r| r.path.as_str()));
    if config.report_parameter_aliases {
        anomalies.extend(parameter_names.alias_anomalies());
    }

    // 4. Resources and bindings
    let mut tree = ResourceTree::new();
    let mut bindings = Vec::new();
    for route in &routes {
        let node = tree.resolve(&route.path, &parameter_names);
        let resource_path = tree.full_path(node);
        for method in route.methods.iter().filter(|m| config.binds(m)) {
            if !tree.attach_method(node, method) {
                anomalies.push(Anomaly::DuplicateBinding {
                    resource_path: resource_path.clone(),
                    method: method.clone(),
                    route: route.name.clone(),
                });
                continue;
            }
            bindings.push(MethodBinding {
                node,
                resource_path: resource_path.clone(),
                method: method.clone(),
                route: route.name.clone(),
                request_schema: route.request_schema_ref().map(str::to_string),
                response_schema: route.response_schema_ref().map(str::to_string),
            });
        }
    }

    Ok(Generation {
        title: manifest.title.clone(),
        routes,
        registry: collection.registry,
        schemas: flattening.schemas,
        parameter_names,
        tree,
        bindings,
        anomalies,
    })
}

impl Generation {
    /// Findings that should be surfaced as warnings.
    pub fn warnings(&self) -> impl Iterator<Item = &Anomaly> {
        self.anomalies.iter().filter(|a| a.is_warning())
    }

    /// The document handed to an infrastructure emitter.
    pub fn to_document(&self) -> Value {
        let routes: Vec<_> = self.routes.iter().map(|r| r.summary_view()).collect();
        let gateway_models: Map<String, Value> = self
            .schemas
            .iter()
            .map(|(name, schema)| (name.clone(), gateway_model(schema)))
            .collect();

        json!({
            "title": self.title,
            "routes": routes,
            "resources": {
                "tree": self.tree.to_json(),
                "created": self.tree.created(),
            },
            "parameters": self.parameter_names,
            "schemas": self.schemas,
            "gateway_models": gateway_models,
            "bindings": self.bindings,
            "anomalies": self.anomalies,
        })
    }
}
