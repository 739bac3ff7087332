use super::cross_reference::grant;
use crate::arena::{ConstantFilter, SymbolArena};
use crate::identity::{SymbolId, SymbolKind};
use crate::model::{MixinRef, MixinRelation, MixinType, Scope};
use std::collections::{BTreeMap, BTreeSet};

/// Record every mixin relation on its target and resolve the mixed-in modules.
///
/// Module names are looked up lexically from inside the target, so `include Helpers` in
/// `Admin::User` finds `Admin::User::Helpers`, then `Admin::Helpers`, then `Helpers`.
pub fn attach_mixins(arena: &mut SymbolArena, relations: &mut [MixinRelation]) {
    for relation in relations.iter_mut() {
        let Some(target) = arena.container(&relation.target) else {
            continue;
        };
        relation.target_id = Some(target.symbol_id.clone());
        relation.module_id = arena
            .resolve_constant(
                &relation.module,
                Some(relation.target.as_str()),
                ConstantFilter::ModuleOnly,
            )
            .map(|m| m.symbol_id);

        let mixins = match target.kind {
            SymbolKind::Class => arena.classes.get_mut(&target.symbol_id).map(|c| &mut c.mixins),
            _ => arena.modules.get_mut(&target.symbol_id).map(|m| &mut m.mixins),
        };
        if let Some(mixins) = mixins {
            let known = mixins
                .iter()
                .any(|m| m.module == relation.module && m.mixin_type == relation.mixin_type);
            if !known {
                mixins.push(MixinRef::new(relation.module.clone(), relation.mixin_type));
                mixins.sort();
            }
        }
    }

    let class_updates: Vec<(SymbolId, Vec<Option<SymbolId>>)> = arena
        .classes
        .values()
        .map(|c| (c.symbol_id.clone(), resolve_modules(arena, &c.fqname, &c.mixins)))
        .collect();
    for (id, module_ids) in class_updates {
        if let Some(class) = arena.classes.get_mut(&id) {
            for (mixin, module_id) in class.mixins.iter_mut().zip(module_ids) {
                mixin.module_id = module_id;
            }
        }
    }

    let module_updates: Vec<(SymbolId, Vec<Option<SymbolId>>)> = arena
        .modules
        .values()
        .map(|m| (m.symbol_id.clone(), resolve_modules(arena, &m.fqname, &m.mixins)))
        .collect();
    for (id, module_ids) in module_updates {
        if let Some(module) = arena.modules.get_mut(&id) {
            for (mixin, module_id) in module.mixins.iter_mut().zip(module_ids) {
                mixin.module_id = module_id;
            }
        }
    }
}

fn resolve_modules(arena: &SymbolArena, target: &str, mixins: &[MixinRef]) -> Vec<Option<SymbolId>> {
    mixins
        .iter()
        .map(|mixin| {
            arena
                .resolve_constant(&mixin.module, Some(target), ConstantFilter::ModuleOnly)
                .map(|m| m.symbol_id)
        })
        .collect()
}

/// Methods a module brings along, including those of modules it includes or prepends
#[derive(Debug, Default, Clone)]
struct Contribution {
    instance: BTreeSet<SymbolId>,
    class: BTreeSet<SymbolId>,
}

fn contribution(arena: &SymbolArena, module_id: &SymbolId) -> Contribution {
    let mut out = Contribution::default();
    let mut visited: BTreeSet<&SymbolId> = BTreeSet::new();
    let mut stack = vec![module_id];

    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        let Some(module) = arena.modules.get(id) else {
            continue;
        };
        out.instance.extend(module.instance_methods.iter().cloned());
        out.class.extend(module.class_methods.iter().cloned());
        for nested in &module.mixins {
            if matches!(nested.mixin_type, MixinType::Include | MixinType::Prepend) {
                if let Some(nested_id) = nested.module_id.as_ref() {
                    stack.push(nested_id);
                }
            }
        }
    }
    out
}

/// Propagate mixed-in module methods to every class whose chain declares the mixin.
///
/// `include` and `prepend` add the module's instance methods to the class's instance methods
/// and its class methods to the class methods. `extend` adds the module's instance methods
/// to the class methods. Returns the number of grants made.
pub fn resolve_mixin_methods(arena: &mut SymbolArena) -> usize {
    let mut cache: BTreeMap<SymbolId, Contribution> = BTreeMap::new();
    let mut grants: Vec<(SymbolId, Scope, BTreeSet<SymbolId>)> = Vec::new();

    for class in arena.classes.values() {
        let mut instance = BTreeSet::new();
        let mut class_level = BTreeSet::new();

        for ancestor in &class.inheritance_chain {
            let Some(ancestor) = arena.class_by_fqname(ancestor) else {
                continue;
            };
            for mixin in &ancestor.mixins {
                let Some(module_id) = mixin.module_id.as_ref() else {
                    continue;
                };
                let contributed = cache
                    .entry(module_id.clone())
                    .or_insert_with(|| contribution(arena, module_id));
                match mixin.mixin_type {
                    MixinType::Include | MixinType::Prepend => {
                        instance.extend(contributed.instance.iter().cloned());
                        class_level.extend(contributed.class.iter().cloned());
                    }
                    MixinType::Extend => {
                        class_level.extend(contributed.instance.iter().cloned());
                    }
                }
            }
        }

        if !instance.is_empty() {
            grants.push((class.symbol_id.clone(), Scope::Instance, instance));
        }
        if !class_level.is_empty() {
            grants.push((class.symbol_id.clone(), Scope::Class, class_level));
        }
    }

    let count = grants.iter().map(|(_, _, methods)| methods.len()).sum();
    for (class_id, scope, methods) in grants {
        grant(arena, &class_id, scope, &methods);
    }
    log::debug!("Propagated {count} mixed-in method(s)");
    count
}
