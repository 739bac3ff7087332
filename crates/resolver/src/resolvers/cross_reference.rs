use crate::arena::SymbolArena;
use crate::identity::{SymbolId, SymbolKind};
use crate::model::Scope;
use std::collections::BTreeSet;

/// Attach methods to their owners, then make them available along inheritance chains.
///
/// Returns the number of methods whose owner is unknown.
pub fn resolve_cross_references(arena: &mut SymbolArena) -> usize {
    let mut orphans = 0;
    let owners: Vec<(SymbolId, Option<(SymbolId, SymbolKind)>, Scope)> = arena
        .methods
        .values()
        .map(|m| {
            let owner = arena
                .container(&m.owner)
                .map(|owner| (owner.symbol_id, owner.kind));
            (m.symbol_id.clone(), owner, m.scope)
        })
        .collect();

    for (method_id, owner, scope) in owners {
        let Some((owner_id, owner_kind)) = owner else {
            orphans += 1;
            continue;
        };
        let lists = match owner_kind {
            SymbolKind::Class => arena
                .classes
                .get_mut(&owner_id)
                .map(|c| (&mut c.instance_methods, &mut c.class_methods)),
            _ => arena
                .modules
                .get_mut(&owner_id)
                .map(|m| (&mut m.instance_methods, &mut m.class_methods)),
        };
        if let Some((instance, class)) = lists {
            match scope {
                Scope::Instance => instance.insert(method_id.clone()),
                Scope::Class => class.insert(method_id.clone()),
            };
        }
        if let Some(method) = arena.methods.get_mut(&method_id) {
            method.owner_id = Some(owner_id);
        }
    }

    // Availability along each class's own inheritance chain
    let mut grants: Vec<(SymbolId, BTreeSet<SymbolId>, BTreeSet<SymbolId>)> = Vec::new();
    for class in arena.classes.values() {
        let mut instance = BTreeSet::new();
        let mut class_level = BTreeSet::new();
        for ancestor in &class.inheritance_chain {
            if let Some(ancestor) = arena.class_by_fqname(ancestor) {
                instance.extend(ancestor.instance_methods.iter().cloned());
                class_level.extend(ancestor.class_methods.iter().cloned());
            }
        }
        grants.push((class.symbol_id.clone(), instance, class_level));
    }
    for (class_id, instance, class_level) in grants {
        grant(arena, &class_id, Scope::Instance, &instance);
        grant(arena, &class_id, Scope::Class, &class_level);
    }

    if orphans > 0 {
        log::debug!("{orphans} method(s) have no known owner");
    }
    orphans
}

/// Make `methods` available on a class at `scope`, recording the class on each method
pub(crate) fn grant(
    arena: &mut SymbolArena,
    class_id: &SymbolId,
    scope: Scope,
    methods: &BTreeSet<SymbolId>,
) {
    let Some(class) = arena.classes.get_mut(class_id) else {
        return;
    };
    let target = match scope {
        Scope::Instance => &mut class.available_instance_methods,
        Scope::Class => &mut class.available_class_methods,
    };
    target.extend(methods.iter().cloned());
    let fqname = class.fqname.clone();

    for id in methods {
        if let Some(method) = arena.methods.get_mut(id) {
            method.available_in.insert(fqname.clone());
        }
    }
}
