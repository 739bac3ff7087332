use crate::arena::{ConstantFilter, ResolvedConstant, SymbolArena};
use crate::identity::SymbolKind;
use crate::model::{NormalizedMethod, NormalizedMethodCall, Scope};
use std::collections::BTreeSet;

const SELF_RECEIVER: &str = "self";

/// Owner fqname and scope encoded in a method fqname (`Owner#name` / `Owner.name`)
fn split_method_fqname(fqname: &str) -> Option<(&str, Scope)> {
    if let Some((owner, _)) = fqname.rsplit_once('#') {
        return Some((owner, Scope::Instance));
    }
    fqname
        .rsplit_once('.')
        .map(|(owner, _)| (owner, Scope::Class))
}

fn methods_of<'a>(
    arena: &'a SymbolArena,
    container: &ResolvedConstant,
    scope: Scope,
) -> Option<&'a BTreeSet<String>> {
    match container.kind {
        SymbolKind::Class => arena.classes.get(&container.symbol_id).map(|c| match scope {
            Scope::Instance => &c.available_instance_methods,
            Scope::Class => &c.available_class_methods,
        }),
        _ => arena.modules.get(&container.symbol_id).map(|m| match scope {
            Scope::Instance => &m.instance_methods,
            Scope::Class => &m.class_methods,
        }),
    }
}

/// Best method called `name` on `container`: its own methods before inherited or mixed-in ones
fn pick<'a>(
    arena: &'a SymbolArena,
    container: &ResolvedConstant,
    name: &str,
    scopes: [Scope; 2],
) -> Option<&'a NormalizedMethod> {
    scopes.into_iter().find_map(|scope| {
        methods_of(arena, container, scope)?
            .iter()
            .filter_map(|id| arena.methods.get(id))
            .filter(|m| m.name == name)
            .min_by(|a, b| {
                (a.owner != container.fqname, &a.fqname, &a.symbol_id).cmp(&(
                    b.owner != container.fqname,
                    &b.fqname,
                    &b.symbol_id,
                ))
            })
    })
}

fn resolve_callee<'a>(
    arena: &'a SymbolArena,
    call: &NormalizedMethodCall,
    caller: Option<&NormalizedMethod>,
) -> Option<&'a NormalizedMethod> {
    if call.callee.contains(['#', '.']) {
        if let Some(exact) = arena.methods_named(&call.callee).next() {
            return Some(exact);
        }
    }

    let (owner, caller_scope) = match caller {
        Some(method) => (Some(method.owner.as_str()), method.scope),
        None => call
            .caller
            .as_deref()
            .and_then(split_method_fqname)
            .map_or((None, Scope::Instance), |(owner, scope)| (Some(owner), scope)),
    };

    match call.receiver.as_deref() {
        None | Some(SELF_RECEIVER) => {
            let container = arena.container(owner?)?;
            let other = match caller_scope {
                Scope::Instance => Scope::Class,
                Scope::Class => Scope::Instance,
            };
            pick(arena, &container, &call.callee, [caller_scope, other])
        }
        Some(receiver) => {
            let container = arena.resolve_constant(receiver, owner, ConstantFilter::Any)?;
            pick(
                arena,
                &container,
                &call.callee,
                [Scope::Instance, Scope::Class],
            )
        }
    }
}

/// Link each call to its caller and, where it can be determined, its callee.
///
/// Calls whose callee cannot be determined keep `callee_id = None`. Returns how many.
pub fn resolve_calls(arena: &SymbolArena, calls: &mut [NormalizedMethodCall]) -> usize {
    let mut unresolved = 0;
    for call in calls.iter_mut() {
        let caller = call
            .caller
            .as_deref()
            .and_then(|fqname| arena.methods_named(fqname).next());
        call.caller_id = caller.map(|m| m.symbol_id.clone());

        match resolve_callee(arena, call, caller) {
            Some(callee) => {
                call.callee_id = Some(callee.symbol_id.clone());
                call.callee_fqname = Some(callee.fqname.clone());
            }
            None => {
                call.callee_id = None;
                call.callee_fqname = None;
                unresolved += 1;
            }
        }
    }
    if unresolved > 0 {
        log::debug!("{unresolved} call(s) left unresolved");
    }
    unresolved
}
