use crate::error::{ResolverError, Result};
use crate::identity::SymbolKind;
use crate::model::{
    MixinType, NormalizedClass, NormalizedMethod, NormalizedMethodCall, NormalizedModule, Scope,
    SymbolRef,
};
use crate::pipeline::ResolutionResult;
use context_graph::{CodeGraph, Direction, NodeIndex};
use nucleo_matcher::pattern::{CaseMatching, Normalization, Pattern};
use nucleo_matcher::{Matcher, Utf32String};
use serde::Serialize;

/// How a search term matched a symbol
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    /// Name or fqname equals the term, ignoring ASCII case
    Exact,
    /// Fqname contains the term, ignoring ASCII case
    Substring,
    Fuzzy,
}

impl MatchKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exact => "exact",
            Self::Substring => "substring",
            Self::Fuzzy => "fuzzy",
        }
    }
}

impl std::fmt::Display for MatchKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One search result. Hits rank by match kind and fuzzy score before fqname and symbol id,
/// unlike the other queries, which order by fqname alone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
    pub symbol_id: String,
    pub kind: SymbolKind,
    pub fqname: String,
    pub name: String,
    pub match_kind: MatchKind,
    pub score: u32,
}

/// Read-only queries over one [`ResolutionResult`].
///
/// Every collection comes back in content order (fqname, then symbol id) so answers do not
/// depend on input order.
pub struct SymbolQuery<'a> {
    result: &'a ResolutionResult,
    limit: usize,
}

fn find_sorted<'a, T>(
    items: &'a [T],
    fqname: &str,
    symbol_id: &str,
    key: impl Fn(&T) -> (&str, &str),
) -> Option<&'a T> {
    items
        .binary_search_by(|item| key(item).cmp(&(fqname, symbol_id)))
        .ok()
        .map(|pos| &items[pos])
}

impl<'a> SymbolQuery<'a> {
    #[must_use]
    pub fn new(result: &'a ResolutionResult, limit: usize) -> Self {
        Self { result, limit }
    }

    #[must_use]
    pub fn by_id(&self, symbol_id: &str) -> Option<SymbolRef<'a>> {
        let entry = self.result.index.get(symbol_id)?;
        let (fqname, id) = (entry.fqname.as_str(), entry.symbol_id.as_str());
        match entry.kind {
            SymbolKind::Class => find_sorted(&self.result.classes, fqname, id, |c| {
                (c.fqname.as_str(), c.symbol_id.as_str())
            })
            .map(SymbolRef::Class),
            SymbolKind::Module => find_sorted(&self.result.modules, fqname, id, |m| {
                (m.fqname.as_str(), m.symbol_id.as_str())
            })
            .map(SymbolRef::Module),
            SymbolKind::Method => find_sorted(&self.result.methods, fqname, id, |m| {
                (m.fqname.as_str(), m.symbol_id.as_str())
            })
            .map(SymbolRef::Method),
            SymbolKind::MethodCall | SymbolKind::Mixin => None,
        }
    }

    /// Preferred symbol for an fqname: class, then module, then method
    #[must_use]
    pub fn by_fqname(&self, fqname: &str) -> Option<SymbolRef<'a>> {
        let id = self.result.index.id_for_fqname(fqname)?;
        self.by_id(id)
    }

    #[must_use]
    pub fn class(&self, fqname: &str) -> Option<&'a NormalizedClass> {
        self.result.index.entries_for_fqname(fqname).find_map(|entry| {
            match self.by_id(&entry.symbol_id)? {
                SymbolRef::Class(class) => Some(class),
                _ => None,
            }
        })
    }

    #[must_use]
    pub fn module(&self, fqname: &str) -> Option<&'a NormalizedModule> {
        self.result.index.entries_for_fqname(fqname).find_map(|entry| {
            match self.by_id(&entry.symbol_id)? {
                SymbolRef::Module(module) => Some(module),
                _ => None,
            }
        })
    }

    /// Every method sharing an fqname; overloads differ by arity
    #[must_use]
    pub fn methods(&self, fqname: &str) -> Vec<&'a NormalizedMethod> {
        let methods = &self.result.methods;
        let start = methods.partition_point(|m| m.fqname.as_str() < fqname);
        methods[start..]
            .iter()
            .take_while(|m| m.fqname == fqname)
            .collect()
    }

    /// Search with the configured result limit
    #[must_use]
    pub fn search(&self, term: &str) -> Vec<SearchHit> {
        self.search_with_limit(term, self.limit)
    }

    /// Rank symbols against a term.
    ///
    /// Exact matches come first, then substring matches, then fuzzy matches by score. Ties
    /// are broken by fqname and symbol id.
    #[must_use]
    pub fn search_with_limit(&self, term: &str, limit: usize) -> Vec<SearchHit> {
        let term = term.trim();
        if term.is_empty() || limit == 0 {
            return Vec::new();
        }

        let pattern = Pattern::parse(term, CaseMatching::Smart, Normalization::Smart);
        let mut matcher = Matcher::new(nucleo_matcher::Config::DEFAULT);
        let lowered = term.to_ascii_lowercase();

        let mut hits: Vec<SearchHit> = self
            .result
            .index
            .entries()
            .filter_map(|entry| {
                let haystack = Utf32String::from(entry.fqname.as_str());
                let fuzzy = pattern.score(haystack.slice(..), &mut matcher);

                let match_kind = if entry.name.eq_ignore_ascii_case(term)
                    || entry.fqname.eq_ignore_ascii_case(term)
                {
                    MatchKind::Exact
                } else if entry.fqname.to_ascii_lowercase().contains(&lowered) {
                    MatchKind::Substring
                } else if fuzzy.is_some() {
                    MatchKind::Fuzzy
                } else {
                    return None;
                };

                Some(SearchHit {
                    symbol_id: entry.symbol_id.clone(),
                    kind: entry.kind,
                    fqname: entry.fqname.clone(),
                    name: entry.name.clone(),
                    match_kind,
                    score: fuzzy.unwrap_or(0),
                })
            })
            .collect();

        hits.sort_by(|a, b| {
            a.match_kind
                .cmp(&b.match_kind)
                .then_with(|| b.score.cmp(&a.score))
                .then_with(|| a.fqname.cmp(&b.fqname))
                .then_with(|| a.symbol_id.cmp(&b.symbol_id))
        });
        hits.truncate(limit);
        hits
    }

    /// Graph node of the preferred symbol for an fqname that has one: class, then module,
    /// then method, then lowest id
    fn graph_node(&self, graph: &CodeGraph, fqname: &str) -> Option<NodeIndex> {
        self.result
            .index
            .entries_for_fqname(fqname)
            .filter_map(|entry| {
                graph
                    .find_node_by_id(&entry.symbol_id)
                    .map(|idx| ((entry.kind, &entry.symbol_id), idx))
            })
            .min_by(|a, b| a.0.cmp(&b.0))
            .map(|(_, idx)| idx)
    }

    fn within(
        &self,
        graph: &CodeGraph,
        fqname: &str,
        hops: usize,
        direction: Direction,
    ) -> Result<Vec<(String, usize)>> {
        let Some(start) = self.graph_node(graph, fqname) else {
            return if self.result.index.contains_fqname(fqname) {
                Ok(Vec::new())
            } else {
                Err(ResolverError::SymbolNotFound(fqname.to_string()))
            };
        };
        Ok(graph
            .nodes_within(start, hops, direction)
            .into_iter()
            .filter_map(|(idx, distance)| Some((graph.node_name(idx)?.to_string(), distance)))
            .collect())
    }

    /// Classes and modules that depend on `fqname` within `hops` edges, with their distance
    pub fn dependents_within(&self, fqname: &str, hops: usize) -> Result<Vec<(String, usize)>> {
        self.within(&self.result.graphs.dependency, fqname, hops, Direction::Incoming)
    }

    /// Classes and modules `fqname` depends on within `hops` edges
    pub fn dependencies_within(&self, fqname: &str, hops: usize) -> Result<Vec<(String, usize)>> {
        self.within(&self.result.graphs.dependency, fqname, hops, Direction::Outgoing)
    }

    /// Shortest dependency path between two containers
    pub fn dependency_path(&self, from: &str, to: &str) -> Result<Option<Vec<String>>> {
        for name in [from, to] {
            if !self.result.index.contains_fqname(name) {
                return Err(ResolverError::SymbolNotFound(name.to_string()));
            }
        }
        let graph = &self.result.graphs.dependency;
        let (Some(start), Some(goal)) = (self.graph_node(graph, from), self.graph_node(graph, to))
        else {
            return Ok(None);
        };
        Ok(graph.find_path(start, goal).map(|path| {
            path.into_iter()
                .filter_map(|idx| graph.node_name(idx).map(str::to_string))
                .collect()
        }))
    }

    /// Direct subclasses
    #[must_use]
    pub fn subclasses_of(&self, fqname: &str) -> Vec<&'a NormalizedClass> {
        let Some(parent) = self.class(fqname) else {
            return Vec::new();
        };
        self.result
            .classes
            .iter()
            .filter(|c| c.superclass_id.as_deref() == Some(parent.symbol_id.as_str()))
            .collect()
    }

    /// Ancestors nearest first, excluding the class itself
    #[must_use]
    pub fn ancestors_of(&self, fqname: &str) -> Vec<&'a NormalizedClass> {
        let Some(class) = self.class(fqname) else {
            return Vec::new();
        };
        class
            .inheritance_chain
            .iter()
            .skip(1)
            .filter_map(|ancestor| self.class(ancestor))
            .collect()
    }

    #[must_use]
    pub fn depth_of(&self, fqname: &str) -> Option<usize> {
        self.result.depths.get(fqname).copied()
    }

    /// Call sites that resolved to a method with this fqname
    #[must_use]
    pub fn callers_of(&self, method_fqname: &str) -> Vec<&'a NormalizedMethodCall> {
        self.result
            .method_calls
            .iter()
            .filter(|call| call.callee_fqname.as_deref() == Some(method_fqname))
            .collect()
    }

    /// Call sites made from inside a method
    #[must_use]
    pub fn callees_of(&self, method_fqname: &str) -> Vec<&'a NormalizedMethodCall> {
        self.result
            .method_calls
            .iter()
            .filter(|call| call.caller.as_deref() == Some(method_fqname))
            .collect()
    }

    /// Methods callable on a class at the given scope, own, inherited and mixed in
    #[must_use]
    pub fn available_methods(&self, class_fqname: &str, scope: Scope) -> Vec<&'a NormalizedMethod> {
        let Some(class) = self.class(class_fqname) else {
            return Vec::new();
        };
        let ids = match scope {
            Scope::Instance => &class.available_instance_methods,
            Scope::Class => &class.available_class_methods,
        };
        let mut methods: Vec<&NormalizedMethod> = ids
            .iter()
            .filter_map(|id| match self.by_id(id)? {
                SymbolRef::Method(method) => Some(method),
                _ => None,
            })
            .collect();
        methods.sort_by(|a, b| (&a.fqname, &a.symbol_id).cmp(&(&b.fqname, &b.symbol_id)));
        methods
    }

    /// Classes and modules that mix in a module, with how they do it
    #[must_use]
    pub fn includers_of(&self, module_fqname: &str) -> Vec<(String, MixinType)> {
        let Some(module) = self.module(module_fqname) else {
            return Vec::new();
        };
        let mixes_in = |mixins: &'a [crate::model::MixinRef]| {
            mixins
                .iter()
                .filter(|m| m.module_id.as_deref() == Some(module.symbol_id.as_str()))
                .map(|m| m.mixin_type)
        };

        let mut out: Vec<(String, MixinType)> = self
            .result
            .classes
            .iter()
            .flat_map(|c| mixes_in(&c.mixins).map(|t| (c.fqname.clone(), t)))
            .chain(
                self.result
                    .modules
                    .iter()
                    .flat_map(|m| mixes_in(&m.mixins).map(|t| (m.fqname.clone(), t))),
            )
            .collect();
        out.sort();
        out.dedup();
        out
    }
}
