use crate::error::{GraphError, Result};
use crate::types::{CodeGraph, EdgeRecord, GraphSnapshot, RelationshipType};
use petgraph::algo::astar;
use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::{Serialize, Serializer};
use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    White,
    Gray,
    Black,
}

impl CodeGraph {
    /// Neighbors in the given direction, deduplicated and ordered by name, then key
    #[must_use]
    pub fn neighbors(&self, node: NodeIndex, direction: Direction) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self.graph.neighbors_directed(node, direction).collect();
        self.sort_by_name(&mut out);
        out.dedup();
        out
    }

    /// Find all nodes reached through outgoing edges of one relationship type
    #[must_use]
    pub fn get_nodes_by_relationship(
        &self,
        node: NodeIndex,
        rel_type: RelationshipType,
    ) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges(node)
            .filter(|e| e.weight().relationship == rel_type)
            .map(|e| e.target())
            .collect();
        self.sort_by_name(&mut out);
        out.dedup();
        out
    }

    /// Find all nodes that reach `node` through edges of one relationship type
    #[must_use]
    pub fn get_sources_by_relationship(
        &self,
        node: NodeIndex,
        rel_type: RelationshipType,
    ) -> Vec<NodeIndex> {
        let mut out: Vec<NodeIndex> = self
            .graph
            .edges_directed(node, Direction::Incoming)
            .filter(|e| e.weight().relationship == rel_type)
            .map(|e| e.source())
            .collect();
        self.sort_by_name(&mut out);
        out.dedup();
        out
    }

    /// Breadth-first search bounded by `max_depth` hops.
    ///
    /// Returns every node other than `start` reachable within the bound, with its shortest
    /// distance, ordered by name.
    #[must_use]
    pub fn nodes_within(
        &self,
        start: NodeIndex,
        max_depth: usize,
        direction: Direction,
    ) -> Vec<(NodeIndex, usize)> {
        let mut visited = HashSet::from([start]);
        let mut queue = VecDeque::from([(start, 0usize)]);
        let mut result = Vec::new();

        while let Some((current, depth)) = queue.pop_front() {
            if current != start {
                result.push((current, depth));
            }
            if depth >= max_depth {
                continue;
            }
            for next in self.neighbors(current, direction) {
                if visited.insert(next) {
                    queue.push_back((next, depth + 1));
                }
            }
        }

        result.sort_by(|a, b| self.order_of(a.0).cmp(&self.order_of(b.0)));
        result
    }

    /// Name-based form of [`CodeGraph::nodes_within`]
    pub fn reachable_within(
        &self,
        name: &str,
        max_depth: usize,
        direction: Direction,
    ) -> Result<Vec<(String, usize)>> {
        let start = self
            .find_node(name)
            .ok_or_else(|| GraphError::NodeNotFound(name.to_string()))?;

        Ok(self
            .nodes_within(start, max_depth, direction)
            .into_iter()
            .map(|(idx, depth)| (self.name_of(idx).to_string(), depth))
            .collect())
    }

    /// Find shortest weighted path between two nodes
    #[must_use]
    pub fn find_path(&self, from: NodeIndex, to: NodeIndex) -> Option<Vec<NodeIndex>> {
        let result = astar(
            &self.graph,
            from,
            |n| n == to,
            |e| f64::from(e.weight().weight.max(0.0)),
            |_| 0.0,
        );

        result.map(|(_cost, path)| path)
    }

    /// Name-based form of [`CodeGraph::find_path`]
    pub fn find_path_by_name(&self, from: &str, to: &str) -> Result<Option<Vec<String>>> {
        let start = self
            .find_node(from)
            .ok_or_else(|| GraphError::NodeNotFound(from.to_string()))?;
        let goal = self
            .find_node(to)
            .ok_or_else(|| GraphError::NodeNotFound(to.to_string()))?;

        Ok(self.find_path(start, goal).map(|path| {
            path.into_iter()
                .map(|idx| self.name_of(idx).to_string())
                .collect()
        }))
    }

    /// Depth of every node from the root of its inheritance tree.
    ///
    /// Roots are nodes without an outgoing `Inherits` edge. Depth is the hop count from the
    /// nearest root along reversed `Inherits` edges. Nodes that no root reaches (members of a
    /// cycle and everything hanging off one) get no entry.
    #[must_use]
    pub fn calculate_depths(&self) -> BTreeMap<String, usize> {
        let mut depths: BTreeMap<String, usize> = BTreeMap::new();

        let roots: Vec<NodeIndex> = self
            .nodes()
            .map(|(idx, _)| idx)
            .filter(|&idx| {
                !self
                    .graph
                    .edges(idx)
                    .any(|e| e.weight().relationship == RelationshipType::Inherits)
            })
            .collect();

        for root in roots {
            let mut queue = VecDeque::from([(root, 0usize)]);
            let mut seen = HashSet::from([root]);

            while let Some((current, depth)) = queue.pop_front() {
                let name = self.name_of(current).to_string();
                let best = depths.entry(name).or_insert(depth);
                if *best < depth {
                    continue;
                }
                *best = depth;

                for child in self.get_sources_by_relationship(current, RelationshipType::Inherits)
                {
                    if seen.insert(child) {
                        queue.push_back((child, depth + 1));
                    }
                }
            }
        }

        depths
    }

    /// Detect cycles with an iterative three-color depth-first search.
    ///
    /// Every back edge yields one cycle: the gray path from the re-entered node to the current
    /// node. Cycles are rotated to start at their smallest name and deduplicated, so the result
    /// depends only on graph content.
    #[must_use]
    pub fn find_cycles(&self) -> Vec<Vec<String>> {
        let mut marks: HashMap<NodeIndex, Mark> = HashMap::new();
        let mut found: BTreeSet<Vec<String>> = BTreeSet::new();

        let order: Vec<NodeIndex> = self.nodes().map(|(idx, _)| idx).collect();
        for root in order {
            if marks.get(&root).copied().unwrap_or(Mark::White) != Mark::White {
                continue;
            }

            marks.insert(root, Mark::Gray);
            let mut stack: Vec<(NodeIndex, Vec<NodeIndex>, usize)> =
                vec![(root, self.neighbors(root, Direction::Outgoing), 0)];

            while let Some((node, successors, cursor)) = stack.last_mut() {
                let node = *node;
                if *cursor >= successors.len() {
                    marks.insert(node, Mark::Black);
                    stack.pop();
                    continue;
                }

                let next = successors[*cursor];
                *cursor += 1;

                match marks.get(&next).copied().unwrap_or(Mark::White) {
                    Mark::White => {
                        marks.insert(next, Mark::Gray);
                        let next_successors = self.neighbors(next, Direction::Outgoing);
                        stack.push((next, next_successors, 0));
                    }
                    Mark::Gray => {
                        if let Some(start) = stack.iter().position(|(n, _, _)| *n == next) {
                            let cycle: Vec<String> = stack[start..]
                                .iter()
                                .map(|(n, _, _)| self.name_of(*n).to_string())
                                .collect();
                            found.insert(canonical_rotation(cycle));
                        }
                    }
                    Mark::Black => {}
                }
            }
        }

        if !found.is_empty() {
            log::debug!("{} graph: {} cycle(s) detected", self.kind, found.len());
        }
        found.into_iter().collect()
    }

    /// Every edge with named endpoints, ordered by (from, to, relationship) and then endpoint ids
    #[must_use]
    pub fn edges(&self) -> Vec<EdgeRecord> {
        let mut edges: Vec<EdgeRecord> = self
            .graph
            .edge_references()
            .map(|e| EdgeRecord {
                from: self.name_of(e.source()).to_string(),
                to: self.name_of(e.target()).to_string(),
                relationship: e.weight().relationship,
                weight: e.weight().weight,
                from_id: self.id_of(e.source()),
                to_id: self.id_of(e.target()),
            })
            .collect();
        edges.sort_by(|a, b| {
            a.from
                .cmp(&b.from)
                .then_with(|| a.to.cmp(&b.to))
                .then_with(|| a.relationship.cmp(&b.relationship))
                .then_with(|| a.from_id.cmp(&b.from_id))
                .then_with(|| a.to_id.cmp(&b.to_id))
        });
        edges
    }

    /// Sorted, self-contained copy of the graph
    #[must_use]
    pub fn snapshot(&self) -> GraphSnapshot {
        GraphSnapshot {
            kind: self.kind,
            nodes: self.nodes().map(|(_, node)| node.clone()).collect(),
            edges: self.edges(),
        }
    }

    fn name_of(&self, idx: NodeIndex) -> &str {
        self.node_name(idx).unwrap_or_default()
    }

    fn id_of(&self, idx: NodeIndex) -> Option<String> {
        self.get_node(idx).and_then(|node| node.symbol_id.clone())
    }

    fn order_of(&self, idx: NodeIndex) -> (&str, &str) {
        self.get_node(idx)
            .map_or(("", ""), |node| (node.name.as_str(), node.key()))
    }

    fn sort_by_name(&self, nodes: &mut [NodeIndex]) {
        nodes.sort_by(|a, b| self.order_of(*a).cmp(&self.order_of(*b)));
    }
}

impl PartialEq for CodeGraph {
    fn eq(&self, other: &Self) -> bool {
        self.snapshot() == other.snapshot()
    }
}

impl Serialize for CodeGraph {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.snapshot().serialize(serializer)
    }
}

fn canonical_rotation(mut cycle: Vec<String>) -> Vec<String> {
    if let Some(min_pos) = cycle
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.cmp(b.1))
        .map(|(pos, _)| pos)
    {
        cycle.rotate_left(min_pos);
    }
    cycle
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{GraphEdge, GraphKind, GraphNode, SymbolType};
    use pretty_assertions::assert_eq;

    fn class(name: &str) -> GraphNode {
        GraphNode::new(name, SymbolType::Class)
    }

    #[test]
    fn canonical_rotation_starts_at_smallest() {
        let rotated = canonical_rotation(vec!["C".into(), "A".into(), "B".into()]);
        assert_eq!(rotated, vec!["A", "B", "C"]);
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let mut graph = CodeGraph::new(GraphKind::Dependency);
        let a = graph.add_node(class("A"));
        graph.add_edge(a, a, GraphEdge::new(RelationshipType::Uses));

        assert_eq!(graph.find_cycles(), vec![vec!["A".to_string()]]);
    }

    #[test]
    fn nodes_within_reports_shortest_distance() {
        let mut graph = CodeGraph::new(GraphKind::Dependency);
        let a = graph.add_node(class("A"));
        let b = graph.add_node(class("B"));
        let c = graph.add_node(class("C"));
        graph.add_edge(a, b, GraphEdge::new(RelationshipType::Uses));
        graph.add_edge(b, c, GraphEdge::new(RelationshipType::Uses));
        graph.add_edge(a, c, GraphEdge::new(RelationshipType::Uses));

        let reached = graph.nodes_within(a, 5, Direction::Outgoing);
        assert_eq!(reached, vec![(b, 1), (c, 1)]);
    }
}
