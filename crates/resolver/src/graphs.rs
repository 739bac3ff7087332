use crate::arena::{ConstantFilter, ResolvedConstant, SymbolArena};
use crate::findings::DetectedCycle;
use crate::identity::SymbolKind;
use crate::model::{MixinRef, MixinType, NormalizedMethod, NormalizedMethodCall};
use context_graph::{
    CodeGraph, GraphEdge, GraphKind, GraphNode, NodeIndex, RelationshipType, SymbolType,
};
use serde::Serialize;
use std::collections::BTreeMap;

/// The four graphs derived from one resolved symbol set
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GraphSet {
    pub inheritance: CodeGraph,
    pub dependency: CodeGraph,
    pub method_call: CodeGraph,
    pub mixin: CodeGraph,
}

impl Default for GraphSet {
    fn default() -> Self {
        Self {
            inheritance: CodeGraph::new(GraphKind::Inheritance),
            dependency: CodeGraph::new(GraphKind::Dependency),
            method_call: CodeGraph::new(GraphKind::MethodCall),
            mixin: CodeGraph::new(GraphKind::Mixin),
        }
    }
}

const fn symbol_type(kind: SymbolKind) -> SymbolType {
    match kind {
        SymbolKind::Module => SymbolType::Module,
        SymbolKind::Method | SymbolKind::MethodCall => SymbolType::Method,
        SymbolKind::Class | SymbolKind::Mixin => SymbolType::Class,
    }
}

const fn mixin_relationship(mixin_type: MixinType) -> RelationshipType {
    match mixin_type {
        MixinType::Include => RelationshipType::Include,
        MixinType::Extend => RelationshipType::Extend,
        MixinType::Prepend => RelationshipType::Prepend,
    }
}

fn container_node(graph: &mut CodeGraph, resolved: &ResolvedConstant) -> NodeIndex {
    graph.add_node(
        GraphNode::new(&resolved.fqname, symbol_type(resolved.kind))
            .with_symbol_id(&resolved.symbol_id),
    )
}

/// Every class and module with its own identity, so namesakes stay apart
fn containers(
    arena: &SymbolArena,
) -> impl Iterator<Item = (ResolvedConstant, &[String], &[MixinRef])> + '_ {
    let classes = arena.classes.values().map(|c| {
        let resolved = ResolvedConstant {
            symbol_id: c.symbol_id.clone(),
            fqname: c.fqname.clone(),
            kind: SymbolKind::Class,
        };
        (resolved, c.dependencies.as_slice(), c.mixins.as_slice())
    });
    let modules = arena.modules.values().map(|m| {
        let resolved = ResolvedConstant {
            symbol_id: m.symbol_id.clone(),
            fqname: m.fqname.clone(),
            kind: SymbolKind::Module,
        };
        (resolved, m.dependencies.as_slice(), m.mixins.as_slice())
    });
    classes.chain(modules)
}

/// The class or module owning a method, by owner id when the method carries one
fn owner_of(arena: &SymbolArena, method: &NormalizedMethod) -> Option<ResolvedConstant> {
    let by_id = method.owner_id.as_ref().and_then(|id| {
        let kind = if arena.classes.contains_key(id) {
            SymbolKind::Class
        } else if arena.modules.contains_key(id) {
            SymbolKind::Module
        } else {
            return None;
        };
        Some(ResolvedConstant {
            symbol_id: id.clone(),
            fqname: method.owner.clone(),
            kind,
        })
    });
    by_id.or_else(|| arena.container(&method.owner))
}

impl GraphSet {
    /// Build every graph. References that did not resolve add no edge.
    #[must_use]
    pub fn build(arena: &SymbolArena, calls: &[NormalizedMethodCall]) -> Self {
        let mut graphs = Self::default();
        graphs.build_inheritance(arena);
        graphs.build_dependency(arena, calls);
        graphs.build_method_call(arena, calls);
        graphs.build_mixin(arena);

        log::debug!(
            "Built graphs: inheritance {}/{}, dependency {}/{}, method_call {}/{}, mixin {}/{} (nodes/edges)",
            graphs.inheritance.node_count(),
            graphs.inheritance.edge_count(),
            graphs.dependency.node_count(),
            graphs.dependency.edge_count(),
            graphs.method_call.node_count(),
            graphs.method_call.edge_count(),
            graphs.mixin.node_count(),
            graphs.mixin.edge_count(),
        );
        graphs
    }

    fn build_inheritance(&mut self, arena: &SymbolArena) {
        let graph = &mut self.inheritance;
        for class in arena.classes.values() {
            let from = graph.add_node(
                GraphNode::new(&class.fqname, SymbolType::Class).with_symbol_id(&class.symbol_id),
            );
            let Some(parent) = class.superclass_id.as_ref().and_then(|id| arena.classes.get(id))
            else {
                continue;
            };
            let to = graph.add_node(
                GraphNode::new(&parent.fqname, SymbolType::Class).with_symbol_id(&parent.symbol_id),
            );
            graph.add_edge(from, to, GraphEdge::new(RelationshipType::Inherits));
        }
    }

    fn build_dependency(&mut self, arena: &SymbolArena, calls: &[NormalizedMethodCall]) {
        let graph = &mut self.dependency;

        for (container, dependencies, _) in containers(arena) {
            let from = container_node(graph, &container);
            for dependency in dependencies {
                let Some(target) = arena.resolve_constant(
                    dependency,
                    Some(container.fqname.as_str()),
                    ConstantFilter::Any,
                ) else {
                    continue;
                };
                let to = container_node(graph, &target);
                graph.add_edge(from, to, GraphEdge::new(RelationshipType::Uses));
            }
        }

        // Calls across owners are dependencies too
        for call in calls {
            let caller = call.caller_id.as_ref().and_then(|id| arena.methods.get(id));
            let callee = call.callee_id.as_ref().and_then(|id| arena.methods.get(id));
            let (Some(caller), Some(callee)) = (caller, callee) else {
                continue;
            };
            let (Some(from), Some(to)) = (owner_of(arena, caller), owner_of(arena, callee)) else {
                continue;
            };
            if from.symbol_id == to.symbol_id {
                continue;
            }
            let from = container_node(graph, &from);
            let to = container_node(graph, &to);
            graph.add_edge(from, to, GraphEdge::new(RelationshipType::Uses));
        }
    }

    fn build_method_call(&mut self, arena: &SymbolArena, calls: &[NormalizedMethodCall]) {
        let graph = &mut self.method_call;
        for method in arena.methods.values() {
            graph.add_node(
                GraphNode::new(&method.fqname, SymbolType::Method).with_symbol_id(&method.symbol_id),
            );
        }

        // Call sites that differ only in receiver share one edge weighted by total frequency
        let mut frequency: BTreeMap<(&str, &str), u64> = BTreeMap::new();
        for call in calls {
            if let (Some(caller), Some(callee)) = (&call.caller_id, &call.callee_id) {
                *frequency
                    .entry((caller.as_str(), callee.as_str()))
                    .or_default() += u64::from(call.count);
            }
        }

        for ((caller_id, callee_id), count) in frequency {
            let endpoints = graph
                .find_node_by_id(caller_id)
                .zip(graph.find_node_by_id(callee_id));
            let Some((from, to)) = endpoints else {
                continue;
            };
            #[allow(clippy::cast_precision_loss)]
            let weight = count as f32;
            graph.add_edge(from, to, GraphEdge::weighted(RelationshipType::Calls, weight));
        }
    }

    fn build_mixin(&mut self, arena: &SymbolArena) {
        let graph = &mut self.mixin;
        for (container, _, mixins) in containers(arena) {
            for mixin in mixins {
                let Some(module) = mixin.module_id.as_ref().and_then(|id| arena.modules.get(id))
                else {
                    continue;
                };
                let from = container_node(graph, &container);
                let to = graph.add_node(
                    GraphNode::new(&module.fqname, SymbolType::Module)
                        .with_symbol_id(&module.symbol_id),
                );
                graph.add_edge(from, to, GraphEdge::new(mixin_relationship(mixin.mixin_type)));
            }
        }
        for module in arena.modules.values() {
            graph.add_node(
                GraphNode::new(&module.fqname, SymbolType::Module).with_symbol_id(&module.symbol_id),
            );
        }
    }

    /// Cycles in the dependency, inheritance and mixin graphs, sorted
    #[must_use]
    pub fn detect_cycles(&self) -> Vec<DetectedCycle> {
        let mut cycles: Vec<DetectedCycle> = [&self.dependency, &self.inheritance, &self.mixin]
            .into_iter()
            .flat_map(|graph| {
                graph.find_cycles().into_iter().map(|members| DetectedCycle {
                    graph: graph.kind(),
                    members,
                })
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Distance of every class from its inheritance root
    #[must_use]
    pub fn depths(&self) -> BTreeMap<String, usize> {
        self.inheritance.calculate_depths()
    }
}
