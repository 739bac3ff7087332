use crate::arena::SymbolArena;
use crate::identity::{SymbolId, SymbolKind};
use crate::processors::common::parent_segment;

/// Register every class and module under the symbol named by its parent segment.
///
/// Classes are preferred over modules as parents. Parents that do not exist are skipped.
pub fn resolve_namespaces(arena: &mut SymbolArena) -> usize {
    let mut links: Vec<(SymbolId, SymbolKind, SymbolId, SymbolKind)> = Vec::new();

    let children = arena
        .classes
        .values()
        .map(|c| (&c.symbol_id, SymbolKind::Class, &c.fqname))
        .chain(
            arena
                .modules
                .values()
                .map(|m| (&m.symbol_id, SymbolKind::Module, &m.fqname)),
        );
    for (child_id, child_kind, fqname) in children {
        let Some(parent) = parent_segment(fqname).and_then(|p| arena.container(p)) else {
            continue;
        };
        links.push((child_id.clone(), child_kind, parent.symbol_id, parent.kind));
    }

    for (child_id, child_kind, parent_id, parent_kind) in &links {
        match parent_kind {
            SymbolKind::Class => {
                if let Some(parent) = arena.classes.get_mut(parent_id) {
                    parent.children.insert(child_id.clone());
                }
            }
            _ => {
                if let Some(parent) = arena.modules.get_mut(parent_id) {
                    parent.children.insert(child_id.clone());
                }
            }
        }
        match child_kind {
            SymbolKind::Class => {
                if let Some(child) = arena.classes.get_mut(child_id) {
                    child.namespace_id = Some(parent_id.clone());
                }
            }
            _ => {
                if let Some(child) = arena.modules.get_mut(child_id) {
                    child.namespace_id = Some(parent_id.clone());
                }
            }
        }
    }

    log::debug!("Linked {} namespace child(ren)", links.len());
    links.len()
}
