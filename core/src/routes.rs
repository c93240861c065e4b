#![deny(missing_docs)]

//! # Route Extraction
//!
//! Turns the declared route table into normalized [`RouteDescriptor`]s, in
//! declaration order. Non-HTTP entries are skipped silently; HTTP entries that
//! are malformed or cannot be bound to a resource are skipped and reported.

use crate::manifest::{HttpRoute, RouteEntry};
use crate::report::{Anomaly, SkipReason};
use crate::schema::SchemaKind;
use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use std::collections::BTreeSet;

/// A normalized HTTP endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct RouteDescriptor {
    /// Path template, always starting with `/`.
    pub path: String,
    /// Upper-case, deduplicated HTTP verbs.
    pub methods: BTreeSet<String>,
    /// Handler name.
    pub name: String,
    /// Summary, falling back to `name`.
    pub summary: String,
    /// Declared request body type.
    pub request: Option<SchemaKind>,
    /// Declared response type.
    pub response: Option<SchemaKind>,
    /// Grouping tags, in declaration order.
    pub tags: Vec<String>,
}

impl RouteDescriptor {
    /// Model bound to the request body, if the body is a structured model.
    pub fn request_schema_ref(&self) -> Option<&str> {
        self.request.as_ref().and_then(SchemaKind::direct_model)
    }

    /// Model bound to the response, if the response is a structured model.
    pub fn response_schema_ref(&self) -> Option<&str> {
        self.response.as_ref().and_then(SchemaKind::direct_model)
    }

    /// Plain view of the descriptor.
    pub fn summary_view(&self) -> RouteSummary {
        RouteSummary {
            path: self.path.clone(),
            methods: self.methods.iter().cloned().collect(),
            name: self.name.clone(),
            summary: self.summary.clone(),
            request_model: self.request_schema_ref().map(str::to_string),
            response_model: self.response_schema_ref().map(str::to_string),
            tags: self.tags.clone(),
        }
    }
}

/// Serializable view of a [`RouteDescriptor`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteSummary {
    /// Path template.
    pub path: String,
    /// Sorted verbs.
    pub methods: Vec<String>,
    /// Handler name.
    pub name: String,
    /// Summary.
    pub summary: String,
    /// Request model name.
    pub request_model: Option<String>,
    /// Response model name.
    pub response_model: Option<String>,
    /// Tags.
    pub tags: Vec<String>,
}

/// Output of [`extract`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extraction {
    /// Descriptors in declaration order.
    pub routes: Vec<RouteDescriptor>,
    /// Skipped entries.
    pub anomalies: Vec<Anomaly>,
}

/// Extracts route descriptors from a route table.
pub fn extract(table: &[RouteEntry]) -> Extraction {
    let mut out = Extraction::default();
    for (index, entry) in table.iter().enumerate() {
        let route = match entry {
            RouteEntry::Http(route) => route,
            RouteEntry::Malformed { name, reason } => {
                out.anomalies.push(Anomaly::SkippedRoute {
                    index,
                    name: name.clone(),
                    reason: SkipReason::Malformed(reason.clone()),
                });
                continue;
            }
            RouteEntry::Mount { .. } | RouteEntry::Websocket { .. } | RouteEntry::Other { .. } => {
                continue
            }
        };
        match describe(route) {
            Ok(descriptor) => out.routes.push(descriptor),
            Err(reason) => out.anomalies.push(Anomaly::SkippedRoute {
                index,
                name: route.name.clone(),
                reason,
            }),
        }
    }
    out
}

fn describe(route: &HttpRoute) -> Result<RouteDescriptor, SkipReason> {
    let path = route.path.trim();
    if path.is_empty() {
        return Err(SkipReason::EmptyPath);
    }
    if !path.starts_with('/') {
        return Err(SkipReason::RelativePath);
    }

    let methods: BTreeSet<String> = route
        .methods
        .iter()
        .map(|m| m.trim().to_ascii_uppercase())
        .filter(|m| !m.is_empty())
        .collect();
    let Some(first_method) = methods.iter().next() else {
        return Err(SkipReason::NoMethods);
    };

    let name = route
        .name
        .clone()
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| default_route_name(first_method, path));
    let summary = route
        .summary
        .clone()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| name.clone());

    Ok(RouteDescriptor {
        path: path.to_string(),
        methods,
        name,
        summary,
        request: route.request.clone(),
        response: route.response.clone(),
        tags: route.tags.clone(),
    })
}

/// Derives a handler name from verb and path.
/// e.g. `GET /todos/{todo_id}` -> `get_todos_todo_id`
fn default_route_name(method: &str, path: &str) -> String {
    let mut name = method.to_ascii_lowercase();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        name.push('_');
        for c in segment.chars() {
            match c {
                '{' | '}' => {}
                c if c.is_ascii_alphanumeric() => name.push(c.to_ascii_lowercase()),
                _ => name.push('_'),
            }
        }
    }
    name
}

/// Groups routes by tag. A route with several tags appears in each group.
pub fn routes_by_tag(routes: &[RouteDescriptor]) -> IndexMap<&str, Vec<&RouteDescriptor>> {
    let mut groups: IndexMap<&str, Vec<&RouteDescriptor>> = IndexMap::new();
    for route in routes {
        for tag in &route.tags {
            groups.entry(tag.as_str()).or_default().push(route);
        }
    }
    groups
}

/// Unique paths, first-seen order.
pub fn gateway_paths(routes: &[RouteDescriptor]) -> Vec<&str> {
    let paths: IndexSet<&str> = routes.iter().map(|r| r.path.as_str()).collect();
    paths.into_iter().collect()
}

/// All routes declared on exactly `path`.
pub fn routes_for_path<'a>(routes: &'a [RouteDescriptor], path: &str) -> Vec<&'a RouteDescriptor> {
    routes.iter().filter(|r| r.path == path).collect()
}
