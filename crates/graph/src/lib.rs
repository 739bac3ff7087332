//! # Context Graph
//!
//! Typed directed graphs over resolved symbols.
//!
//! ## Features
//!
//! - **Idempotent construction** - nodes are keyed by symbol id, named by fully qualified name
//! - **Cycle detection** - three-color DFS returning every cyclic sequence
//! - **Depth computation** - distance of each class from its inheritance root
//! - **Bounded traversal** - "everything within N hops" in either direction
//!
//! ## Architecture
//!
//! ```text
//! Resolved symbols
//!     │
//!     ├──> inheritance graph   (class -> superclass, `inherits`)
//!     ├──> dependency graph    (class -> used class, `uses`)
//!     ├──> method-call graph   (caller -> callee, `calls`, weight = frequency)
//!     └──> mixin graph         (class -> module, `include` / `extend` / `prepend`)
//! ```
//!
//! Every query that returns a collection orders it by node name and then node key, so results never depend on
//! the order in which nodes or edges were inserted.

mod error;
mod graph;
mod types;

pub use error::{GraphError, Result};
pub use petgraph::graph::NodeIndex;
pub use petgraph::Direction;
pub use types::{
    CodeGraph, EdgeRecord, GraphEdge, GraphKind, GraphNode, GraphSnapshot, RelationshipType,
    SymbolType,
};
