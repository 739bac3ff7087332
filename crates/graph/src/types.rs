use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Which of the four symbol graphs an instance represents
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GraphKind {
    Inheritance,
    Dependency,
    MethodCall,
    Mixin,
}

impl GraphKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inheritance => "inheritance",
            Self::Dependency => "dependency",
            Self::MethodCall => "method_call",
            Self::Mixin => "mixin",
        }
    }
}

impl fmt::Display for GraphKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Symbol type carried by a graph node
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolType {
    Class,
    Module,
    Method,
}

/// Edge relationship types
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RelationshipType {
    /// Class -> superclass
    Inherits,
    /// Class -> class it depends on
    Uses,
    /// Caller method -> callee method
    Calls,
    /// Class -> included module
    Include,
    /// Class -> extending module
    Extend,
    /// Class -> prepended module
    Prepend,
}

impl RelationshipType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Inherits => "inherits",
            Self::Uses => "uses",
            Self::Calls => "calls",
            Self::Include => "include",
            Self::Extend => "extend",
            Self::Prepend => "prepend",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Node payload: the symbol a node stands for
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphNode {
    /// Fully qualified name. Overloads and class/module namesakes share one name.
    pub name: String,
    pub symbol_type: SymbolType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub symbol_id: Option<String>,
}

impl GraphNode {
    #[must_use]
    pub fn new(name: impl Into<String>, symbol_type: SymbolType) -> Self {
        Self {
            name: name.into(),
            symbol_type,
            symbol_id: None,
        }
    }

    #[must_use]
    pub fn with_symbol_id(mut self, symbol_id: impl Into<String>) -> Self {
        self.symbol_id = Some(symbol_id.into());
        self
    }

    /// Identity within a graph: the symbol id when known, otherwise the name
    #[must_use]
    pub fn key(&self) -> &str {
        self.symbol_id.as_deref().unwrap_or(&self.name)
    }
}

/// Edge payload
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    pub relationship: RelationshipType,
    pub weight: f32,
}

impl GraphEdge {
    #[must_use]
    pub const fn new(relationship: RelationshipType) -> Self {
        Self {
            relationship,
            weight: 1.0,
        }
    }

    #[must_use]
    pub const fn weighted(relationship: RelationshipType, weight: f32) -> Self {
        Self {
            relationship,
            weight,
        }
    }
}

/// Edge with both endpoints resolved to names, as exposed to callers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeRecord {
    pub from: String,
    pub to: String,
    pub relationship: RelationshipType,
    pub weight: f32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_id: Option<String>,
}

/// Sorted, self-contained view of a graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSnapshot {
    pub kind: GraphKind,
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<EdgeRecord>,
}

/// Directed graph of named symbols with typed, weighted edges.
///
/// Nodes carrying a symbol id are identified by it, so two symbols with one fqname (method
/// overloads, a class and a module namesake) stay separate nodes.
#[derive(Debug, Clone)]
pub struct CodeGraph {
    pub(crate) kind: GraphKind,
    pub(crate) graph: DiGraph<GraphNode, GraphEdge>,
    pub(crate) by_id: BTreeMap<String, NodeIndex>,
    /// Nodes per name, ordered by node key
    pub(crate) by_name: BTreeMap<String, Vec<NodeIndex>>,
}

impl CodeGraph {
    #[must_use]
    pub fn new(kind: GraphKind) -> Self {
        Self {
            kind,
            graph: DiGraph::new(),
            by_id: BTreeMap::new(),
            by_name: BTreeMap::new(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> GraphKind {
        self.kind
    }

    /// Add a node, or return the index of the node it duplicates.
    ///
    /// A node with a symbol id duplicates the node with that id. A node without one duplicates
    /// any node of the same name. An id-carrying insertion also claims a same-named node that
    /// has no id yet; it never replaces an existing payload otherwise.
    pub fn add_node(&mut self, node: GraphNode) -> NodeIndex {
        let Some(symbol_id) = node.symbol_id.clone() else {
            if let Some(idx) = self.find_node(&node.name) {
                return idx;
            }
            return self.insert_node(node);
        };

        if let Some(&idx) = self.by_id.get(&symbol_id) {
            return idx;
        }

        let anonymous = self.nodes_named(&node.name).into_iter().find(|&idx| {
            self.graph
                .node_weight(idx)
                .is_some_and(|existing| existing.symbol_id.is_none())
        });
        if let Some(idx) = anonymous {
            if let Some(existing) = self.graph.node_weight_mut(idx) {
                existing.symbol_id = Some(symbol_id.clone());
            }
            self.by_id.insert(symbol_id, idx);
            self.sort_named(&node.name);
            return idx;
        }

        self.insert_node(node)
    }

    fn insert_node(&mut self, node: GraphNode) -> NodeIndex {
        let name = node.name.clone();
        let symbol_id = node.symbol_id.clone();
        let idx = self.graph.add_node(node);
        if let Some(symbol_id) = symbol_id {
            self.by_id.insert(symbol_id, idx);
        }
        self.by_name.entry(name.clone()).or_default().push(idx);
        self.sort_named(&name);
        idx
    }

    fn sort_named(&mut self, name: &str) {
        let graph = &self.graph;
        if let Some(nodes) = self.by_name.get_mut(name) {
            nodes.sort_by(|a, b| {
                let key = |idx: &NodeIndex| graph.node_weight(*idx).map(GraphNode::key);
                key(a).cmp(&key(b))
            });
        }
    }

    /// Add a typed edge. Returns `false` when an edge with the same endpoints and relationship
    /// already exists; the existing edge is left untouched.
    pub fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: GraphEdge) -> bool {
        let duplicate = self
            .graph
            .edges_connecting(from, to)
            .any(|existing| existing.weight().relationship == edge.relationship);
        if duplicate {
            return false;
        }
        self.graph.add_edge(from, to, edge);
        true
    }

    /// First node with this name, in key order
    #[must_use]
    pub fn find_node(&self, name: &str) -> Option<NodeIndex> {
        self.by_name.get(name).and_then(|nodes| nodes.first().copied())
    }

    /// Every node with this name, in key order
    #[must_use]
    pub fn nodes_named(&self, name: &str) -> Vec<NodeIndex> {
        self.by_name.get(name).cloned().unwrap_or_default()
    }

    #[must_use]
    pub fn find_node_by_id(&self, symbol_id: &str) -> Option<NodeIndex> {
        self.by_id.get(symbol_id).copied()
    }

    #[must_use]
    pub fn get_node(&self, idx: NodeIndex) -> Option<&GraphNode> {
        self.graph.node_weight(idx)
    }

    #[must_use]
    pub fn node_name(&self, idx: NodeIndex) -> Option<&str> {
        self.get_node(idx).map(|node| node.name.as_str())
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Nodes in (name, key) order
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &GraphNode)> + '_ {
        self.by_name
            .values()
            .flatten()
            .filter_map(|&idx| self.graph.node_weight(idx).map(|node| (idx, node)))
    }
}
