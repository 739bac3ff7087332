//! Relationship resolvers run over the deduplicated symbol arena.
//!
//! Order matters: namespaces, then inheritance chains, then mixin attachment, then method
//! ownership and inherited availability, then mixin propagation, then calls.

mod calls;
mod cross_reference;
mod inheritance;
mod mixin_method;
mod namespace;

pub use calls::resolve_calls;
pub use cross_reference::resolve_cross_references;
pub use inheritance::resolve_inheritance;
pub use mixin_method::{attach_mixins, resolve_mixin_methods};
pub use namespace::resolve_namespaces;

#[cfg(test)]
use crate::{arena::SymbolArena, model::MixinRelation};

#[cfg(test)]
pub(crate) fn test_arena_with_mixins(
    batch: &context_protocol::RawSymbolBatch,
) -> (SymbolArena, Vec<MixinRelation>) {
    let config = crate::config::ResolverConfig::default();
    let processed = crate::processors::process_all(batch, &config);
    let classes = crate::dedup::deduplicate(&config, processed.classes).records;
    let modules = crate::dedup::deduplicate(&config, processed.modules).records;
    let methods = crate::dedup::deduplicate(&config, processed.methods).records;
    let mixins = crate::dedup::deduplicate(&config, processed.mixins).records;
    (SymbolArena::new(classes, modules, methods), mixins)
}

#[cfg(test)]
pub(crate) fn test_arena(batch: &context_protocol::RawSymbolBatch) -> SymbolArena {
    test_arena_with_mixins(batch).0
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_protocol::{RawClassRecord, RawModuleRecord, RawSymbolBatch};
    use pretty_assertions::assert_eq;

    #[test]
    fn namespace_children_prefer_class_parents() {
        let mut arena = test_arena(&RawSymbolBatch {
            classes: vec![
                RawClassRecord::named("Billing"),
                RawClassRecord::named("Billing::Invoice"),
                RawClassRecord::named("Orphan::Thing"),
            ],
            modules: vec![
                RawModuleRecord::named("Billing"),
                RawModuleRecord::named("Billing::Helpers"),
            ],
            ..RawSymbolBatch::default()
        });

        assert_eq!(resolve_namespaces(&mut arena), 2);

        let parent = arena.class_by_fqname("Billing").unwrap();
        assert_eq!(parent.children.len(), 2);
        assert!(arena.module_by_fqname("Billing").unwrap().children.is_empty());

        let invoice = arena.class_by_fqname("Billing::Invoice").unwrap();
        assert_eq!(invoice.namespace_id.as_ref(), Some(&parent.symbol_id));
        assert_eq!(arena.class_by_fqname("Orphan::Thing").unwrap().namespace_id, None);
    }
}
