use crate::arena::{ConstantFilter, SymbolArena};
use crate::findings::{DetectedCycle, MissingReference, ReferenceKind, StructuralFinding};
use crate::index::SymbolIndex;
use crate::model::MixinRelation;

/// Every superclass, dependency, mixin module, mixin target or method owner that names a
/// symbol absent from the index. Sorted.
#[must_use]
pub fn detect_missing_references(
    arena: &SymbolArena,
    relations: &[MixinRelation],
    index: &SymbolIndex,
) -> Vec<MissingReference> {
    let mut missing = Vec::new();
    let mut push = |symbol: &str, symbol_id: &str, kind: ReferenceKind, reference: &str| {
        missing.push(MissingReference {
            symbol: symbol.to_string(),
            symbol_id: symbol_id.to_string(),
            kind,
            reference: reference.to_string(),
        });
    };
    let unresolved = |fqname: &str, name: &str| {
        arena
            .resolve_constant(name, Some(fqname), ConstantFilter::Any)
            .is_none()
    };

    for class in arena.classes.values() {
        if let (Some(superclass), None) = (&class.superclass, &class.superclass_id) {
            push(&class.fqname, &class.symbol_id, ReferenceKind::Superclass, superclass);
        }
        for dep in class.dependencies.iter().filter(|d| unresolved(&class.fqname, d)) {
            push(&class.fqname, &class.symbol_id, ReferenceKind::Dependency, dep);
        }
        for mixin in class.mixins.iter().filter(|m| m.module_id.is_none()) {
            push(&class.fqname, &class.symbol_id, ReferenceKind::Mixin, &mixin.module);
        }
    }

    for module in arena.modules.values() {
        for dep in module.dependencies.iter().filter(|d| unresolved(&module.fqname, d)) {
            push(&module.fqname, &module.symbol_id, ReferenceKind::Dependency, dep);
        }
        for mixin in module.mixins.iter().filter(|m| m.module_id.is_none()) {
            push(&module.fqname, &module.symbol_id, ReferenceKind::Mixin, &mixin.module);
        }
    }

    for method in arena.methods.values() {
        if !index.contains_fqname(&method.owner) {
            push(&method.fqname, &method.symbol_id, ReferenceKind::Owner, &method.owner);
        }
    }

    for relation in relations.iter().filter(|r| r.target_id.is_none()) {
        push(
            &relation.module,
            &relation.symbol_id,
            ReferenceKind::MixinTarget,
            &relation.target,
        );
    }

    missing.sort();
    missing.dedup();
    if !missing.is_empty() {
        log::warn!("{} reference(s) point at unknown symbols", missing.len());
    }
    missing
}

/// Missing references and cycles as one sorted list of findings
#[must_use]
pub fn structural_findings(
    missing: &[MissingReference],
    cycles: &[DetectedCycle],
) -> Vec<StructuralFinding> {
    let mut findings: Vec<StructuralFinding> = missing
        .iter()
        .map(StructuralFinding::from)
        .chain(cycles.iter().map(StructuralFinding::from))
        .collect();
    findings.sort();
    findings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::StructuralKind;
    use crate::resolvers::{attach_mixins, resolve_cross_references, resolve_inheritance};
    use context_protocol::{
        RawClassRecord, RawMethodRecord, RawMixinRecord, RawModuleRecord, RawSymbolBatch,
    };
    use pretty_assertions::assert_eq;

    fn missing(batch: &RawSymbolBatch) -> Vec<(String, ReferenceKind, String)> {
        let (mut arena, mut relations) = crate::resolvers::test_arena_with_mixins(batch);
        resolve_inheritance(&mut arena);
        attach_mixins(&mut arena, &mut relations);
        resolve_cross_references(&mut arena);
        let mut index = SymbolIndex::new();
        index.rebuild(
            arena.classes.values(),
            arena.modules.values(),
            arena.methods.values(),
        );
        detect_missing_references(&arena, &relations, &index)
            .into_iter()
            .map(|m| (m.symbol, m.kind, m.reference))
            .collect()
    }

    #[test]
    fn every_reference_kind_is_reported() {
        let found = missing(&RawSymbolBatch {
            classes: vec![RawClassRecord::named("User")
                .superclass("ApplicationRecord")
                .dependency("Mailer")
                .mixin("Trackable", "include")],
            modules: vec![RawModuleRecord::named("Helpers")],
            methods: vec![RawMethodRecord::new("run", "Job")],
            mixins: vec![RawMixinRecord::new("Ghost", "Helpers", "include")],
            ..RawSymbolBatch::default()
        });

        assert_eq!(
            found,
            vec![
                ("Helpers".into(), ReferenceKind::MixinTarget, "Ghost".into()),
                ("Job#run".into(), ReferenceKind::Owner, "Job".into()),
                ("User".into(), ReferenceKind::Superclass, "ApplicationRecord".into()),
                ("User".into(), ReferenceKind::Dependency, "Mailer".into()),
                ("User".into(), ReferenceKind::Mixin, "Trackable".into()),
            ]
        );
    }

    #[test]
    fn resolved_references_are_not_reported() {
        let found = missing(&RawSymbolBatch {
            classes: vec![
                RawClassRecord::named("User")
                    .superclass("Base")
                    .dependency("Mailer"),
                RawClassRecord::named("Base"),
                RawClassRecord::named("Mailer"),
            ],
            methods: vec![RawMethodRecord::new("save", "User")],
            ..RawSymbolBatch::default()
        });
        assert!(found.is_empty());
    }

    #[test]
    fn findings_merge_cycles_and_missing_references() {
        let missing = vec![MissingReference {
            symbol: "User".into(),
            symbol_id: "x".into(),
            kind: ReferenceKind::Superclass,
            reference: "Base".into(),
        }];
        let cycles = vec![DetectedCycle {
            graph: context_graph::GraphKind::Dependency,
            members: vec!["A".into(), "B".into()],
        }];
        let findings = structural_findings(&missing, &cycles);
        assert_eq!(findings.len(), 2);
        assert_eq!(findings[0].kind, StructuralKind::MissingReference);
        assert_eq!(findings[1].kind, StructuralKind::CircularDependency);
    }
}
