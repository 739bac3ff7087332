use crate::identity::{SymbolId, SymbolKind};
use crate::model::{NormalizedClass, NormalizedMethod, NormalizedModule};
use crate::processors::common::{parent_segment, strip_root};
use std::collections::{BTreeMap, BTreeSet};

/// Which constant kinds a lookup may match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantFilter {
    ClassOnly,
    ModuleOnly,
    /// Classes are preferred over modules at the same candidate name
    Any,
}

/// A constant reference resolved to a symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConstant {
    pub symbol_id: SymbolId,
    pub fqname: String,
    pub kind: SymbolKind,
}

/// Flat store of every deduplicated symbol, keyed by `symbol_id`.
///
/// Relationships between symbols are held as IDs or fqnames, never as references into the
/// arena.
#[derive(Debug, Default)]
pub struct SymbolArena {
    pub classes: BTreeMap<SymbolId, NormalizedClass>,
    pub modules: BTreeMap<SymbolId, NormalizedModule>,
    pub methods: BTreeMap<SymbolId, NormalizedMethod>,
    class_by_fqname: BTreeMap<String, SymbolId>,
    module_by_fqname: BTreeMap<String, SymbolId>,
    methods_by_fqname: BTreeMap<String, BTreeSet<SymbolId>>,
}

impl SymbolArena {
    #[must_use]
    pub fn new(
        classes: Vec<NormalizedClass>,
        modules: Vec<NormalizedModule>,
        methods: Vec<NormalizedMethod>,
    ) -> Self {
        let mut arena = Self::default();
        for class in classes {
            arena
                .class_by_fqname
                .insert(class.fqname.clone(), class.symbol_id.clone());
            arena.classes.insert(class.symbol_id.clone(), class);
        }
        for module in modules {
            arena
                .module_by_fqname
                .insert(module.fqname.clone(), module.symbol_id.clone());
            arena.modules.insert(module.symbol_id.clone(), module);
        }
        for method in methods {
            arena
                .methods_by_fqname
                .entry(method.fqname.clone())
                .or_default()
                .insert(method.symbol_id.clone());
            arena.methods.insert(method.symbol_id.clone(), method);
        }
        arena
    }

    #[must_use]
    pub fn class_id(&self, fqname: &str) -> Option<&SymbolId> {
        self.class_by_fqname.get(fqname)
    }

    #[must_use]
    pub fn module_id(&self, fqname: &str) -> Option<&SymbolId> {
        self.module_by_fqname.get(fqname)
    }

    #[must_use]
    pub fn class_by_fqname(&self, fqname: &str) -> Option<&NormalizedClass> {
        self.class_id(fqname).and_then(|id| self.classes.get(id))
    }

    #[must_use]
    pub fn module_by_fqname(&self, fqname: &str) -> Option<&NormalizedModule> {
        self.module_id(fqname).and_then(|id| self.modules.get(id))
    }

    /// Methods sharing an fqname (they differ in arity), lowest ID first
    pub fn methods_named(&self, fqname: &str) -> impl Iterator<Item = &NormalizedMethod> + '_ {
        self.methods_by_fqname
            .get(fqname)
            .into_iter()
            .flatten()
            .filter_map(|id| self.methods.get(id))
    }

    /// Class or module with exactly this fqname
    #[must_use]
    pub fn container(&self, fqname: &str) -> Option<ResolvedConstant> {
        self.exact(fqname, ConstantFilter::Any)
    }

    fn exact(&self, fqname: &str, filter: ConstantFilter) -> Option<ResolvedConstant> {
        let class = || {
            self.class_id(fqname).map(|id| ResolvedConstant {
                symbol_id: id.clone(),
                fqname: fqname.to_string(),
                kind: SymbolKind::Class,
            })
        };
        let module = || {
            self.module_id(fqname).map(|id| ResolvedConstant {
                symbol_id: id.clone(),
                fqname: fqname.to_string(),
                kind: SymbolKind::Module,
            })
        };
        match filter {
            ConstantFilter::ClassOnly => class(),
            ConstantFilter::ModuleOnly => module(),
            ConstantFilter::Any => class().or_else(module),
        }
    }

    /// Lexical constant lookup.
    ///
    /// `name` is tried inside `scope`, then inside each enclosing scope, then at the top level:
    /// `X` referenced from `A::B` tries `A::B::X`, `A::X`, `X`. A name starting with `::` is
    /// only looked up at the top level.
    #[must_use]
    pub fn resolve_constant(
        &self,
        name: &str,
        scope: Option<&str>,
        filter: ConstantFilter,
    ) -> Option<ResolvedConstant> {
        self.lookup(name, scope, filter, None)
    }

    /// Superclass lookup from the scope enclosing `class_fqname`.
    ///
    /// A scoped candidate naming the class itself is skipped, so `Admin::Base < Base` finds a
    /// top-level `Base`. A literal self reference still resolves to the class.
    #[must_use]
    pub fn resolve_superclass(&self, name: &str, class_fqname: &str) -> Option<ResolvedConstant> {
        self.lookup(
            name,
            parent_segment(class_fqname),
            ConstantFilter::ClassOnly,
            Some(class_fqname),
        )
    }

    fn lookup(
        &self,
        name: &str,
        scope: Option<&str>,
        filter: ConstantFilter,
        skip_scoped: Option<&str>,
    ) -> Option<ResolvedConstant> {
        let name = name.trim();
        if name.starts_with("::") {
            return self.exact(strip_root(name), filter);
        }
        let name = strip_root(name);
        if name.is_empty() {
            return None;
        }

        let mut current = scope.map(strip_root).filter(|s| !s.is_empty());
        while let Some(ns) = current {
            let candidate = format!("{ns}::{name}");
            if skip_scoped != Some(candidate.as_str()) {
                if let Some(found) = self.exact(&candidate, filter) {
                    return Some(found);
                }
            }
            current = parent_segment(ns);
        }
        self.exact(name, filter)
    }
}
