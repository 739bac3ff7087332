use crate::identity::{SymbolId, SymbolKind};
use crate::model::{NormalizedClass, NormalizedMethod, NormalizedModule};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexEntry {
    pub symbol_id: SymbolId,
    pub kind: SymbolKind,
    pub fqname: String,
    pub name: String,
}

/// Lookup of final symbols by ID and by fqname.
///
/// Scoped to one build: [`SymbolIndex::rebuild`] clears everything before repopulating.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SymbolIndex {
    by_id: BTreeMap<SymbolId, IndexEntry>,
    by_fqname: BTreeMap<String, BTreeSet<SymbolId>>,
}

impl SymbolIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.by_id.clear();
        self.by_fqname.clear();
    }

    pub fn rebuild<'a>(
        &mut self,
        classes: impl IntoIterator<Item = &'a NormalizedClass>,
        modules: impl IntoIterator<Item = &'a NormalizedModule>,
        methods: impl IntoIterator<Item = &'a NormalizedMethod>,
    ) {
        self.clear();
        for class in classes {
            self.insert(SymbolKind::Class, &class.symbol_id, &class.fqname, &class.name);
        }
        for module in modules {
            self.insert(SymbolKind::Module, &module.symbol_id, &module.fqname, &module.name);
        }
        for method in methods {
            self.insert(SymbolKind::Method, &method.symbol_id, &method.fqname, &method.name);
        }
        log::debug!("Indexed {} symbol(s)", self.by_id.len());
    }

    fn insert(&mut self, kind: SymbolKind, symbol_id: &str, fqname: &str, name: &str) {
        self.by_id.insert(
            symbol_id.to_string(),
            IndexEntry {
                symbol_id: symbol_id.to_string(),
                kind,
                fqname: fqname.to_string(),
                name: name.to_string(),
            },
        );
        self.by_fqname
            .entry(fqname.to_string())
            .or_default()
            .insert(symbol_id.to_string());
    }

    #[must_use]
    pub fn get(&self, symbol_id: &str) -> Option<&IndexEntry> {
        self.by_id.get(symbol_id)
    }

    #[must_use]
    pub fn contains_fqname(&self, fqname: &str) -> bool {
        self.by_fqname.contains_key(fqname)
    }

    /// Every entry sharing an fqname, in ID order
    pub fn entries_for_fqname<'a>(&'a self, fqname: &str) -> impl Iterator<Item = &'a IndexEntry> {
        self.by_fqname
            .get(fqname)
            .into_iter()
            .flatten()
            .filter_map(|id| self.by_id.get(id))
    }

    /// Preferred symbol for an fqname: class, then module, then method, then lowest ID
    #[must_use]
    pub fn id_for_fqname(&self, fqname: &str) -> Option<&SymbolId> {
        self.entries_for_fqname(fqname)
            .min_by(|a, b| (a.kind, &a.symbol_id).cmp(&(b.kind, &b.symbol_id)))
            .map(|entry| &entry.symbol_id)
    }

    /// Entries in ID order
    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.by_id.values()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.by_id.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_id.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::test_arena;
    use context_protocol::{RawClassRecord, RawMethodRecord, RawModuleRecord, RawSymbolBatch};
    use pretty_assertions::assert_eq;
    use std::iter::empty;

    #[test]
    fn class_is_preferred_for_shared_fqname() {
        let arena = test_arena(&RawSymbolBatch {
            classes: vec![RawClassRecord::named("Shared")],
            modules: vec![RawModuleRecord::named("Shared")],
            methods: vec![RawMethodRecord::new("run", "Shared")],
            ..RawSymbolBatch::default()
        });

        let mut index = SymbolIndex::new();
        index.rebuild(
            arena.classes.values(),
            arena.modules.values(),
            arena.methods.values(),
        );

        assert_eq!(index.len(), 3);
        assert_eq!(index.entries_for_fqname("Shared").count(), 2);
        let preferred = index.id_for_fqname("Shared").unwrap();
        assert_eq!(index.get(preferred).unwrap().kind, SymbolKind::Class);
        assert!(index.contains_fqname("Shared#run"));
        assert!(!index.contains_fqname("Other"));
    }

    #[test]
    fn rebuild_starts_from_scratch() {
        let arena = test_arena(&RawSymbolBatch {
            classes: vec![RawClassRecord::named("User")],
            ..RawSymbolBatch::default()
        });
        let mut index = SymbolIndex::new();
        index.rebuild(arena.classes.values(), empty(), empty());
        index.rebuild(empty(), empty(), empty());
        assert!(index.is_empty());
        assert!(!index.contains_fqname("User"));
    }
}
