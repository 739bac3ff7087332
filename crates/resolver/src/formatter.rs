use crate::arena::SymbolArena;
use crate::findings::ValidationFinding;
use crate::model::{
    MixinRelation, NormalizedClass, NormalizedMethod, NormalizedMethodCall, NormalizedModule,
};

/// Final, content-ordered symbol collections
#[derive(Debug, Default)]
pub struct FormattedSymbols {
    pub classes: Vec<NormalizedClass>,
    pub modules: Vec<NormalizedModule>,
    pub methods: Vec<NormalizedMethod>,
}

/// Imposes a total order on every collection before it leaves the resolver.
///
/// Symbols sort by `(fqname, symbol_id)`, calls by `(caller, callee, receiver, symbol_id)`,
/// mixins by `(target, module, type, symbol_id)`. Validation findings sort by record kind,
/// finding kind, message and then the canonical JSON of the original record.
pub struct OutputFormatter;

impl OutputFormatter {
    #[must_use]
    pub fn symbols(arena: SymbolArena) -> FormattedSymbols {
        let mut classes: Vec<_> = arena.classes.into_values().collect();
        let mut modules: Vec<_> = arena.modules.into_values().collect();
        let mut methods: Vec<_> = arena.methods.into_values().collect();

        for class in &mut classes {
            class.mixins.sort();
            class.dependencies.sort();
        }
        for module in &mut modules {
            module.mixins.sort();
            module.dependencies.sort();
        }

        classes.sort_by(|a, b| (&a.fqname, &a.symbol_id).cmp(&(&b.fqname, &b.symbol_id)));
        modules.sort_by(|a, b| (&a.fqname, &a.symbol_id).cmp(&(&b.fqname, &b.symbol_id)));
        methods.sort_by(|a, b| (&a.fqname, &a.symbol_id).cmp(&(&b.fqname, &b.symbol_id)));

        FormattedSymbols {
            classes,
            modules,
            methods,
        }
    }

    pub fn method_calls(calls: &mut [NormalizedMethodCall]) {
        calls.sort_by(|a, b| {
            (&a.caller, &a.callee, &a.receiver, &a.symbol_id).cmp(&(
                &b.caller,
                &b.callee,
                &b.receiver,
                &b.symbol_id,
            ))
        });
    }

    pub fn mixins(relations: &mut [MixinRelation]) {
        relations.sort_by(|a, b| {
            (&a.target, &a.module, a.mixin_type, &a.symbol_id).cmp(&(
                &b.target,
                &b.module,
                b.mixin_type,
                &b.symbol_id,
            ))
        });
    }

    pub fn validation_findings(findings: &mut Vec<ValidationFinding>) {
        let mut keyed: Vec<(String, ValidationFinding)> = findings
            .drain(..)
            .map(|f| (f.original_record.to_string(), f))
            .collect();
        keyed.sort_by(|(ka, a), (kb, b)| {
            (a.record_kind, a.kind, &a.message, ka).cmp(&(b.record_kind, b.kind, &b.message, kb))
        });
        findings.extend(keyed.into_iter().map(|(_, f)| f));
    }
}
