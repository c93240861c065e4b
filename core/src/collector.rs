#![deny(missing_docs)]

//! # Model Collection
//!
//! Discovers every model a set of routes uses, directly or nested inside
//! other models and containers, and registers each once.
//!
//! Membership is checked before descending into a model, so self-referential
//! and mutually-referential models terminate without special casing.

use crate::report::Anomaly;
use crate::routes::RouteDescriptor;
use crate::schema::{ModelRegistry, SchemaKind};
use indexmap::IndexSet;

/// Output of [`collect`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Collection {
    /// Models in first-discovered order.
    pub registry: ModelRegistry,
    /// References to models the catalog does not declare.
    pub anomalies: Vec<Anomaly>,
}

/// Collects the models reachable from the request and response types of
/// `routes`, looking each model up in `catalog`.
pub fn collect(routes: &[RouteDescriptor], catalog: &ModelRegistry) -> Collection {
    let mut collector = Collector {
        catalog,
        registry: ModelRegistry::new(),
        missing: IndexSet::new(),
        anomalies: Vec::new(),
    };
    for route in routes {
        for kind in [&route.request, &route.response].into_iter().flatten() {
            collector.visit(kind, &route.name);
        }
    }
    Collection {
        registry: collector.registry,
        anomalies: collector.anomalies,
    }
}

struct Collector<'a> {
    catalog: &'a ModelRegistry,
    registry: ModelRegistry,
    missing: IndexSet<String>,
    anomalies: Vec<Anomaly>,
}

impl Collector<'_> {
    fn visit(&mut self, kind: &SchemaKind, referenced_by: &str) {
        match kind {
            SchemaKind::Model { name } => self.visit_model(name, referenced_by),
            SchemaKind::Array { items } => self.visit(items, referenced_by),
            SchemaKind::Optional { inner } => self.visit(inner, referenced_by),
            SchemaKind::Union { variants } => {
                for variant in variants {
                    self.visit(variant, referenced_by);
                }
            }
            SchemaKind::Object { properties, .. } => {
                for property in properties.values() {
                    self.visit(&property.schema, referenced_by);
                }
            }
            SchemaKind::Primitive { .. } | SchemaKind::Enum { .. } => {}
        }
    }

    fn visit_model(&mut self, name: &str, referenced_by: &str) {
        if self.registry.contains(name) {
            return;
        }
        let catalog = self.catalog;
        let Some(model) = catalog.get(name) else {
            if self.missing.insert(name.to_string()) {
                self.anomalies.push(Anomaly::MissingModel {
                    name: name.to_string(),
                    referenced_by: referenced_by.to_string(),
                });
            }
            return;
        };

        self.registry.register(model.clone());
        for property in model.properties.values() {
            self.visit(&property.schema, &model.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ModelSchema;
    use std::collections::BTreeSet;

    fn route(name: &str, request: Option<SchemaKind>, response: Option<SchemaKind>) -> RouteDescriptor {
        RouteDescriptor {
            path: "/r".into(),
            methods: BTreeSet::from(["GET".to_string()]),
            name: name.into(),
            summary: name.into(),
            request,
            response,
            tags: Vec::new(),
        }
    }

    #[test]
    fn test_self_reference_terminates_with_single_entry() {
        let a = ModelSchema::new("A").with_field("me", SchemaKind::model("A"), false);
        let catalog = ModelRegistry::from_models([a]);

        let collection = collect(&[route("get_a", None, Some(SchemaKind::model("A")))], &catalog);
        assert_eq!(collection.registry.names().collect::<Vec<_>>(), vec!["A"]);
        assert!(collection.anomalies.is_empty());
    }

    #[test]
    fn test_mutual_references_and_containers() {
        let a = ModelSchema::new("A")
            .with_field("bs", SchemaKind::array(SchemaKind::model("B")), true);
        let b = ModelSchema::new("B")
            .with_field("back", SchemaKind::optional(SchemaKind::model("A")), false)
            .with_field(
                "either",
                SchemaKind::Union {
                    variants: vec![SchemaKind::model("C"), SchemaKind::string()],
                },
                false,
            );
        let c = ModelSchema::new("C");
        let unused = ModelSchema::new("Unused");
        let catalog = ModelRegistry::from_models([unused, c, b, a]);

        let collection = collect(&[route("get_a", None, Some(SchemaKind::model("A")))], &catalog);
        assert_eq!(
            collection.registry.names().collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
    }

    #[test]
    fn test_request_models_are_walked_too() {
        let create = ModelSchema::new("TodoCreate").with_field(
            "meta",
            SchemaKind::Object {
                properties: [(
                    "owner".to_string(),
                    crate::schema::Property::new(SchemaKind::model("Owner")),
                )]
                .into_iter()
                .collect(),
                required: Default::default(),
            },
            false,
        );
        let owner = ModelSchema::new("Owner");
        let catalog = ModelRegistry::from_models([create, owner]);

        let collection = collect(
            &[route("create", Some(SchemaKind::model("TodoCreate")), None)],
            &catalog,
        );
        assert_eq!(
            collection.registry.names().collect::<Vec<_>>(),
            vec!["TodoCreate", "Owner"]
        );
    }

    #[test]
    fn test_missing_model_reported_once() {
        let collection = collect(
            &[
                route("one", None, Some(SchemaKind::model("Ghost"))),
                route("two", Some(SchemaKind::model("Ghost")), None),
            ],
            &ModelRegistry::new(),
        );
        assert!(collection.registry.is_empty());
        assert_eq!(
            collection.anomalies,
            vec![Anomaly::MissingModel {
                name: "Ghost".into(),
                referenced_by: "one".into()
            }]
        );
    }
}
