use crate::arena::SymbolArena;
use crate::identity::SymbolId;
use std::collections::{BTreeMap, HashSet};

struct Chain {
    fqnames: Vec<String>,
    circular: bool,
}

/// Resolve superclass references, then walk them into inheritance chains.
///
/// A walk that re-enters a class it has already visited stops there and flags the class as
/// circular. Returns the number of circular classes.
pub fn resolve_inheritance(arena: &mut SymbolArena) -> usize {
    let superclass_ids: Vec<(SymbolId, Option<SymbolId>)> = arena
        .classes
        .values()
        .map(|class| {
            let resolved = class
                .superclass
                .as_deref()
                .and_then(|name| arena.resolve_superclass(name, &class.fqname));
            (class.symbol_id.clone(), resolved.map(|c| c.symbol_id))
        })
        .collect();
    for (id, superclass_id) in superclass_ids {
        if let Some(class) = arena.classes.get_mut(&id) {
            class.superclass_id = superclass_id;
        }
    }

    let chains: BTreeMap<SymbolId, Chain> = arena
        .classes
        .keys()
        .map(|id| (id.clone(), walk(arena, id)))
        .collect();

    let mut circular = 0;
    for (id, chain) in chains {
        if let Some(class) = arena.classes.get_mut(&id) {
            if chain.circular {
                circular += 1;
                log::warn!("Circular inheritance through {}", class.fqname);
            }
            class.inheritance_chain = chain.fqnames;
            class.circular_inheritance = chain.circular;
        }
    }
    circular
}

fn walk(arena: &SymbolArena, start: &SymbolId) -> Chain {
    let mut visited: HashSet<&str> = HashSet::new();
    let mut fqnames = Vec::new();
    let mut current = arena.classes.get(start);

    while let Some(class) = current {
        if !visited.insert(class.symbol_id.as_str()) {
            return Chain {
                fqnames,
                circular: true,
            };
        }
        fqnames.push(class.fqname.clone());
        current = class
            .superclass_id
            .as_ref()
            .and_then(|id| arena.classes.get(id));
    }

    Chain {
        fqnames,
        circular: false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolvers::test_arena;
    use context_protocol::{RawClassRecord, RawSymbolBatch};
    use pretty_assertions::assert_eq;

    fn batch(classes: Vec<RawClassRecord>) -> RawSymbolBatch {
        RawSymbolBatch {
            classes,
            ..RawSymbolBatch::default()
        }
    }

    #[test]
    fn chain_starts_with_the_class_and_ends_at_root() {
        let mut arena = test_arena(&batch(vec![
            RawClassRecord::named("Admin").superclass("User"),
            RawClassRecord::named("User").superclass("Base"),
            RawClassRecord::named("Base"),
        ]));
        assert_eq!(resolve_inheritance(&mut arena), 0);

        let admin = arena.class_by_fqname("Admin").unwrap();
        assert_eq!(admin.inheritance_chain, vec!["Admin", "User", "Base"]);
        assert!(!admin.circular_inheritance);
        assert_eq!(
            admin.superclass_id.as_deref(),
            arena.class_id("User").map(String::as_str)
        );
    }

    #[test]
    fn two_class_cycle_terminates_and_is_flagged() {
        let mut arena = test_arena(&batch(vec![
            RawClassRecord::named("A").superclass("B"),
            RawClassRecord::named("B").superclass("A"),
        ]));
        assert_eq!(resolve_inheritance(&mut arena), 2);

        let a = arena.class_by_fqname("A").unwrap();
        assert_eq!(a.inheritance_chain, vec!["A", "B"]);
        assert!(a.circular_inheritance);
    }

    #[test]
    fn self_inheritance_is_circular() {
        let mut arena = test_arena(&batch(vec![RawClassRecord::named("Loop").superclass("Loop")]));
        assert_eq!(resolve_inheritance(&mut arena), 1);
        assert_eq!(
            arena.class_by_fqname("Loop").unwrap().inheritance_chain,
            vec!["Loop"]
        );
    }

    #[test]
    fn unknown_superclass_ends_the_chain() {
        let mut arena = test_arena(&batch(vec![
            RawClassRecord::named("User").superclass("ActiveRecord::Base")
        ]));
        resolve_inheritance(&mut arena);
        let user = arena.class_by_fqname("User").unwrap();
        assert_eq!(user.inheritance_chain, vec!["User"]);
        assert_eq!(user.superclass_id, None);
    }

    #[test]
    fn namesake_superclass_is_not_a_cycle() {
        let mut arena = test_arena(&batch(vec![
            RawClassRecord::named("Admin::Base").superclass("Base"),
            RawClassRecord::named("Base"),
        ]));
        assert_eq!(resolve_inheritance(&mut arena), 0);
        assert_eq!(
            arena.class_by_fqname("Admin::Base").unwrap().inheritance_chain,
            vec!["Admin::Base", "Base"]
        );
    }

    #[test]
    fn superclass_resolves_lexically() {
        let mut arena = test_arena(&batch(vec![
            RawClassRecord::named("Admin::User").superclass("Base"),
            RawClassRecord::named("Admin::Base"),
            RawClassRecord::named("Base"),
        ]));
        resolve_inheritance(&mut arena);
        let user = arena.class_by_fqname("Admin::User").unwrap();
        assert_eq!(user.inheritance_chain, vec!["Admin::User", "Admin::Base"]);
    }
}
