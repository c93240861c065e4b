#![deny(missing_docs)]

//! # Resource Tree
//!
//! One node per path segment, shared by every route passing through it.
//! Nodes live in an arena owned by [`ResourceTree`] and are addressed by
//! [`NodeId`], so "the same node" means "the same id": a method attached
//! through one route's lookup is visible through every other lookup reaching
//! that node.
//!
//! The tree also owns the table of created nodes keyed by normalized full
//! path. It is the memo for lookups and the identity table handed to the
//! emitter.

use crate::params::{is_parameter, join, segments, ParameterNameMap, ROOT_PREFIX};
use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeSet;

/// Handle to a node of a [`ResourceTree`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct NodeId(usize);

impl NodeId {
    /// Arena index.
    pub fn index(self) -> usize {
        self.0
    }
}

/// A single path segment in the tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNode {
    /// Literal segment or canonical `{parameter}`; `/` for the root.
    pub segment: String,
    /// Parent node, `None` for the root.
    pub parent: Option<NodeId>,
    /// Children keyed by segment.
    pub children: IndexMap<String, NodeId>,
    /// HTTP verbs bound to this node.
    pub methods: BTreeSet<String>,
}

impl ResourceNode {
    fn new(segment: &str, parent: Option<NodeId>) -> Self {
        Self {
            segment: segment.to_string(),
            parent,
            children: IndexMap::new(),
            methods: BTreeSet::new(),
        }
    }

    /// Whether the segment is a path parameter.
    pub fn is_parameter(&self) -> bool {
        is_parameter(&self.segment)
    }
}

/// Arena of resource nodes plus the created-resources table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceTree {
    nodes: Vec<ResourceNode>,
    created: IndexMap<String, NodeId>,
}

impl Default for ResourceTree {
    fn default() -> Self {
        Self::new()
    }
}

impl ResourceTree {
    /// Tree holding only the root.
    pub fn new() -> Self {
        let mut created = IndexMap::new();
        created.insert(ROOT_PREFIX.to_string(), NodeId(0));
        Self {
            nodes: vec![ResourceNode::new(ROOT_PREFIX, None)],
            created,
        }
    }

    /// The root node.
    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    /// Returns the node for `path`, creating missing segments.
    ///
    /// Parameter segments are replaced by the canonical name for their
    /// accumulated parent prefix before lookup, so paths that differ only in
    /// parameter spelling resolve to the same node.
    pub fn resolve(&mut self, path: &str, names: &ParameterNameMap) -> NodeId {
        if let Some(id) = self.created.get(path) {
            return *id;
        }

        let mut current = self.root();
        let mut prefix = String::new();
        for segment in segments(path) {
            let chosen = names.canonical_segment(&prefix, segment).to_string();
            prefix = join(&prefix, &chosen);

            current = match self.created.get(&prefix) {
                Some(id) => *id,
                None => {
                    let id = self.add_child(current, &chosen);
                    self.created.insert(prefix.clone(), id);
                    id
                }
            };
        }
        current
    }

    fn add_child(&mut self, parent: NodeId, segment: &str) -> NodeId {
        if let Some(existing) = self.nodes[parent.0].children.get(segment) {
            return *existing;
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(ResourceNode::new(segment, Some(parent)));
        self.nodes[parent.0].children.insert(segment.to_string(), id);
        id
    }

    /// Binds an HTTP verb to a node. Returns false if already bound or the
    /// id belongs to another tree.
    pub fn attach_method(&mut self, node: NodeId, method: &str) -> bool {
        match self.nodes.get_mut(node.0) {
            Some(n) => n.methods.insert(method.to_ascii_uppercase()),
            None => false,
        }
    }

    /// Looks up a node.
    pub fn node(&self, id: NodeId) -> Option<&ResourceNode> {
        self.nodes.get(id.0)
    }

    /// Children of a node in creation order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes
            .get(id.0)
            .into_iter()
            .flat_map(|n| n.children.values().copied())
    }

    /// Normalized full path of a node.
    pub fn full_path(&self, id: NodeId) -> String {
        let mut parts = Vec::new();
        let mut cursor = self.node(id);
        while let Some(node) = cursor {
            let Some(parent) = node.parent else {
                break;
            };
            parts.push(node.segment.as_str());
            cursor = self.node(parent);
        }
        if parts.is_empty() {
            return ROOT_PREFIX.to_string();
        }
        parts.reverse();
        format!("/{}", parts.join("/"))
    }

    /// Normalized full path -> node, in creation order (root first).
    pub fn created(&self) -> &IndexMap<String, NodeId> {
        &self.created
    }

    /// Number of nodes, root included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always false: the root exists from construction.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nested JSON rendering rooted at `/`.
    pub fn to_json(&self) -> Value {
        self.node_json(self.root())
    }

    fn node_json(&self, id: NodeId) -> Value {
        let Some(node) = self.node(id) else {
            return Value::Null;
        };
        let children: Vec<Value> = self.children(id).map(|c| self.node_json(c)).collect();
        json!({
            "id": id,
            "segment": node.segment,
            "path": self.full_path(id),
            "methods": node.methods,
            "children": children,
        })
    }
}
