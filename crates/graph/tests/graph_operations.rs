//! Tests for CodeGraph operations

use context_graph::{
    CodeGraph, Direction, GraphEdge, GraphError, GraphKind, GraphNode, RelationshipType,
    SymbolType,
};
use pretty_assertions::assert_eq;

fn make_node(name: &str) -> GraphNode {
    GraphNode::new(name, SymbolType::Class).with_symbol_id(format!("id-{name}"))
}

fn make_edge(rel: RelationshipType) -> GraphEdge {
    GraphEdge::new(rel)
}

fn chain(kind: GraphKind, rel: RelationshipType, pairs: &[(&str, &str)]) -> CodeGraph {
    let mut graph = CodeGraph::new(kind);
    for (from, to) in pairs {
        let a = graph.add_node(make_node(from));
        let b = graph.add_node(make_node(to));
        graph.add_edge(a, b, make_edge(rel));
    }
    graph
}

#[test]
fn test_add_node_is_idempotent() {
    let mut graph = CodeGraph::new(GraphKind::Inheritance);

    let first = graph.add_node(GraphNode::new("User", SymbolType::Class));
    let second = graph.add_node(make_node("User"));

    assert_eq!(first, second);
    assert_eq!(graph.node_count(), 1);
    // A later insertion fills a missing symbol id
    assert_eq!(
        graph.get_node(first).and_then(|n| n.symbol_id.as_deref()),
        Some("id-User")
    );
}

#[test]
fn test_namesakes_with_distinct_ids_stay_separate() {
    let mut graph = CodeGraph::new(GraphKind::MethodCall);

    let method =
        |name: &str, id: &str| GraphNode::new(name, SymbolType::Method).with_symbol_id(id);

    let unary = graph.add_node(method("User#find", "m-1"));
    let variadic = graph.add_node(method("User#find", "m-2"));
    let load = graph.add_node(method("User#load", "m-3"));
    graph.add_edge(load, unary, make_edge(RelationshipType::Calls));
    graph.add_edge(load, variadic, make_edge(RelationshipType::Calls));

    assert_ne!(unary, variadic);
    assert_eq!(graph.node_count(), 3);
    assert_eq!(graph.nodes_named("User#find"), vec![unary, variadic]);
    assert_eq!(graph.find_node_by_id("m-2"), Some(variadic));
    assert_eq!(graph.add_node(method("User#find", "m-2")), variadic);

    let targets: Vec<_> = graph
        .edges()
        .into_iter()
        .map(|e| (e.to, e.to_id))
        .collect();
    assert_eq!(
        targets,
        vec![
            ("User#find".to_string(), Some("m-1".to_string())),
            ("User#find".to_string(), Some("m-2".to_string())),
        ]
    );
}

#[test]
fn test_duplicate_edge_is_ignored() {
    let mut graph = CodeGraph::new(GraphKind::Dependency);

    let a = graph.add_node(make_node("A"));
    let b = graph.add_node(make_node("B"));

    assert!(graph.add_edge(a, b, make_edge(RelationshipType::Uses)));
    assert!(!graph.add_edge(a, b, make_edge(RelationshipType::Uses)));
    assert_eq!(graph.edge_count(), 1);
}

#[test]
fn test_mixin_edges_keep_their_type() {
    let mut graph = CodeGraph::new(GraphKind::Mixin);

    let c = graph.add_node(make_node("C"));
    let m = graph.add_node(GraphNode::new("M", SymbolType::Module));

    graph.add_edge(c, m, make_edge(RelationshipType::Include));
    graph.add_edge(c, m, make_edge(RelationshipType::Extend));

    assert_eq!(graph.edge_count(), 2);
    assert_eq!(
        graph.get_nodes_by_relationship(c, RelationshipType::Extend),
        vec![m]
    );
    assert!(graph
        .get_nodes_by_relationship(c, RelationshipType::Prepend)
        .is_empty());
}

#[test]
fn test_neighbors_are_sorted_by_name() {
    let mut graph = CodeGraph::new(GraphKind::Dependency);

    let root = graph.add_node(make_node("Root"));
    let zeta = graph.add_node(make_node("Zeta"));
    let alpha = graph.add_node(make_node("Alpha"));
    graph.add_edge(root, zeta, make_edge(RelationshipType::Uses));
    graph.add_edge(root, alpha, make_edge(RelationshipType::Uses));

    assert_eq!(graph.neighbors(root, Direction::Outgoing), vec![alpha, zeta]);
    assert_eq!(graph.neighbors(alpha, Direction::Incoming), vec![root]);
}

#[test]
fn test_reachable_within_depth_1() {
    // A -> B -> C
    let graph = chain(
        GraphKind::Dependency,
        RelationshipType::Uses,
        &[("A", "B"), ("B", "C")],
    );

    let related = graph
        .reachable_within("A", 1, Direction::Outgoing)
        .unwrap();
    assert_eq!(related, vec![("B".to_string(), 1)]);
}

#[test]
fn test_reachable_within_depth_2_reverse() {
    // A -> B -> C ; dependents of C
    let graph = chain(
        GraphKind::Dependency,
        RelationshipType::Uses,
        &[("A", "B"), ("B", "C")],
    );

    let dependents = graph
        .reachable_within("C", 2, Direction::Incoming)
        .unwrap();
    assert_eq!(
        dependents,
        vec![("A".to_string(), 2), ("B".to_string(), 1)]
    );
}

#[test]
fn test_reachable_within_unknown_node() {
    let graph = CodeGraph::new(GraphKind::Dependency);

    let err = graph
        .reachable_within("Missing", 2, Direction::Incoming)
        .unwrap_err();
    assert_eq!(err, GraphError::NodeNotFound("Missing".to_string()));
}

#[test]
fn test_reachable_within_terminates_on_cycle() {
    let graph = chain(
        GraphKind::Dependency,
        RelationshipType::Uses,
        &[("A", "B"), ("B", "A")],
    );

    let reached = graph
        .reachable_within("A", 100, Direction::Outgoing)
        .unwrap();
    assert_eq!(reached, vec![("B".to_string(), 1)]);
}

#[test]
fn test_find_path() {
    // A -> B -> C
    let graph = chain(
        GraphKind::MethodCall,
        RelationshipType::Calls,
        &[("A", "B"), ("B", "C")],
    );

    let path = graph.find_path_by_name("A", "C").unwrap();
    assert_eq!(
        path,
        Some(vec!["A".to_string(), "B".to_string(), "C".to_string()])
    );

    // No path C -> A (directed graph)
    assert_eq!(graph.find_path_by_name("C", "A").unwrap(), None);
}

#[test]
fn test_find_cycles_three_nodes() {
    let graph = chain(
        GraphKind::Dependency,
        RelationshipType::Uses,
        &[("B", "C"), ("C", "A"), ("A", "B"), ("C", "D")],
    );

    let cycles = graph.find_cycles();
    assert_eq!(
        cycles,
        vec![vec!["A".to_string(), "B".to_string(), "C".to_string()]]
    );
}

#[test]
fn test_find_cycles_on_acyclic_graph() {
    let graph = chain(
        GraphKind::Dependency,
        RelationshipType::Uses,
        &[("A", "B"), ("A", "C"), ("B", "C")],
    );

    assert!(graph.find_cycles().is_empty());
}

#[test]
fn test_find_cycles_reports_disjoint_cycles() {
    let graph = chain(
        GraphKind::Dependency,
        RelationshipType::Uses,
        &[("A", "B"), ("B", "A"), ("X", "Y"), ("Y", "X")],
    );

    let cycles = graph.find_cycles();
    assert_eq!(cycles.len(), 2);
    assert_eq!(cycles[0], vec!["A".to_string(), "B".to_string()]);
    assert_eq!(cycles[1], vec!["X".to_string(), "Y".to_string()]);
}

#[test]
fn test_calculate_depths() {
    // Admin < User < ApplicationRecord ; Post < ApplicationRecord
    let graph = chain(
        GraphKind::Inheritance,
        RelationshipType::Inherits,
        &[
            ("Admin", "User"),
            ("User", "ApplicationRecord"),
            ("Post", "ApplicationRecord"),
        ],
    );

    let depths = graph.calculate_depths();
    assert_eq!(depths.get("ApplicationRecord"), Some(&0));
    assert_eq!(depths.get("User"), Some(&1));
    assert_eq!(depths.get("Post"), Some(&1));
    assert_eq!(depths.get("Admin"), Some(&2));
}

#[test]
fn test_calculate_depths_skips_cycles() {
    // A <-> B, C -> A ; Root stands alone
    let mut graph = chain(
        GraphKind::Inheritance,
        RelationshipType::Inherits,
        &[("A", "B"), ("B", "A"), ("C", "A")],
    );
    graph.add_node(make_node("Root"));

    let depths = graph.calculate_depths();
    assert_eq!(depths.len(), 1);
    assert_eq!(depths.get("Root"), Some(&0));
}

#[test]
fn test_edges_are_ordered_independent_of_insertion() {
    let forward = chain(
        GraphKind::Dependency,
        RelationshipType::Uses,
        &[("A", "B"), ("B", "C"), ("A", "C")],
    );
    let backward = chain(
        GraphKind::Dependency,
        RelationshipType::Uses,
        &[("A", "C"), ("B", "C"), ("A", "B")],
    );

    assert_eq!(forward.snapshot(), backward.snapshot());
    assert_eq!(
        serde_json::to_string(&forward).unwrap(),
        serde_json::to_string(&backward).unwrap()
    );
}

#[test]
fn test_weighted_call_edges() {
    let mut graph = CodeGraph::new(GraphKind::MethodCall);

    let caller = graph.add_node(GraphNode::new("User#save", SymbolType::Method));
    let callee = graph.add_node(GraphNode::new("User#valid?", SymbolType::Method));
    graph.add_edge(
        caller,
        callee,
        GraphEdge::weighted(RelationshipType::Calls, 3.0),
    );

    let edges = graph.edges();
    assert_eq!(edges.len(), 1);
    assert_eq!(edges[0].weight, 3.0);
    assert_eq!(edges[0].from, "User#save");
    assert_eq!(edges[0].to, "User#valid?");
}
