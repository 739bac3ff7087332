//! Per-kind validation and normalization of raw records.
//!
//! A processor never fails the batch: a record it cannot accept becomes a
//! [`ValidationFinding`] carrying the record as received.

mod class;
pub(crate) mod common;
mod method;
mod method_call;
mod mixin;
mod module;

pub use class::ClassProcessor;
pub use common::{compute_arity, compute_confidence, qualify_name};
pub use method::MethodProcessor;
pub use method_call::MethodCallProcessor;
pub use mixin::MixinProcessor;
pub use module::ModuleProcessor;

use crate::config::ResolverConfig;
use crate::findings::ValidationFinding;
use crate::model::{
    MixinRelation, NormalizedClass, NormalizedMethod, NormalizedMethodCall, NormalizedModule,
};
use common::Rejection;
use context_protocol::{RawSymbolBatch, RecordKind};
use serde::Serialize;

/// Validates and normalizes one raw record kind
pub trait SymbolProcessor {
    type Raw: Serialize;
    type Output;

    const KIND: RecordKind;

    fn process(&self, raw: &Self::Raw) -> Result<Self::Output, Rejection>;

    /// Process every record, diverting rejected ones into `findings`
    fn process_records(
        &self,
        records: &[Self::Raw],
        findings: &mut Vec<ValidationFinding>,
    ) -> Vec<Self::Output> {
        let mut accepted = Vec::with_capacity(records.len());
        for raw in records {
            match self.process(raw) {
                Ok(output) => accepted.push(output),
                Err((kind, message)) => {
                    log::warn!("Skipping {} record: {message}", Self::KIND);
                    let original = serde_json::to_value(raw).unwrap_or_default();
                    findings.push(ValidationFinding::new(kind, Self::KIND, message, original));
                }
            }
        }
        accepted
    }
}

/// Normalized records of one batch, before deduplication
#[derive(Debug, Default)]
pub struct ProcessedBatch {
    pub classes: Vec<NormalizedClass>,
    pub modules: Vec<NormalizedModule>,
    pub methods: Vec<NormalizedMethod>,
    pub method_calls: Vec<NormalizedMethodCall>,
    pub mixins: Vec<MixinRelation>,
    pub findings: Vec<ValidationFinding>,
}

impl ProcessedBatch {
    #[must_use]
    pub fn record_count(&self) -> usize {
        self.classes.len()
            + self.modules.len()
            + self.methods.len()
            + self.method_calls.len()
            + self.mixins.len()
    }
}

/// Run every processor over its record kind.
///
/// Inline mixins declared on class and module records are also emitted as
/// [`MixinRelation`]s, so both declaration forms meet in deduplication.
#[must_use]
pub fn process_all(batch: &RawSymbolBatch, config: &ResolverConfig) -> ProcessedBatch {
    let mut out = ProcessedBatch::default();

    out.classes = ClassProcessor::new(config).process_records(&batch.classes, &mut out.findings);
    out.modules = ModuleProcessor::new(config).process_records(&batch.modules, &mut out.findings);
    out.methods = MethodProcessor::new(config).process_records(&batch.methods, &mut out.findings);
    out.method_calls =
        MethodCallProcessor::new(config).process_records(&batch.method_calls, &mut out.findings);
    out.mixins = MixinProcessor::new(config).process_records(&batch.mixins, &mut out.findings);

    for class in &out.classes {
        out.mixins.extend(mixin::inline_relations(
            &class.fqname,
            &class.mixins,
            class.location.as_ref(),
            &class.provenance,
        ));
    }
    for module in &out.modules {
        out.mixins.extend(mixin::inline_relations(
            &module.fqname,
            &module.mixins,
            module.location.as_ref(),
            &module.provenance,
        ));
    }

    log::debug!(
        "Normalized {} record(s), rejected {}",
        out.record_count(),
        out.findings.len()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::findings::ValidationKind;
    use context_protocol::{RawClassRecord, RawMethodRecord};
    use pretty_assertions::assert_eq;

    #[test]
    fn rejected_records_become_findings() {
        let batch = RawSymbolBatch {
            classes: vec![RawClassRecord::named("User"), RawClassRecord::default()],
            methods: vec![RawMethodRecord {
                name: Some("save".into()),
                ..RawMethodRecord::default()
            }],
            ..RawSymbolBatch::default()
        };

        let processed = process_all(&batch, &ResolverConfig::default());
        assert_eq!(processed.classes.len(), 1);
        assert!(processed.methods.is_empty());

        let kinds: Vec<_> = processed.findings.iter().map(|f| f.kind).collect();
        assert_eq!(
            kinds,
            vec![ValidationKind::MissingName, ValidationKind::MissingOwner]
        );
        assert_eq!(
            processed.findings[1].original_record,
            serde_json::json!({"name": "save"})
        );
    }

    #[test]
    fn inline_mixins_become_relations() {
        let batch = RawSymbolBatch {
            classes: vec![RawClassRecord::named("User").mixin("Comparable", "include")],
            ..RawSymbolBatch::default()
        };

        let processed = process_all(&batch, &ResolverConfig::default());
        assert_eq!(processed.mixins.len(), 1);
        assert_eq!(processed.mixins[0].target, "User");
        assert_eq!(processed.mixins[0].module, "Comparable");
    }
}
