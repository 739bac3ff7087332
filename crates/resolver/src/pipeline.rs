use crate::arena::SymbolArena;
use crate::config::ResolverConfig;
use crate::dedup::deduplicate;
use crate::error::Result;
use crate::findings::{
    DetectedCycle, MissingReference, StructuralFinding, ValidationFinding, ValidationKind,
};
use crate::formatter::OutputFormatter;
use crate::graphs::GraphSet;
use crate::index::SymbolIndex;
use crate::interfaces::Extractor;
use crate::model::{
    MixinRelation, NormalizedClass, NormalizedMethod, NormalizedMethodCall, NormalizedModule,
};
use crate::processors::process_all;
use crate::query::SymbolQuery;
use crate::references::{detect_missing_references, structural_findings};
use crate::resolvers::{
    attach_mixins, resolve_calls, resolve_cross_references, resolve_inheritance,
    resolve_mixin_methods, resolve_namespaces,
};
use context_protocol::{DecodedBatch, RawSymbolBatch};
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Counts describing one build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ResolutionStats {
    pub raw_records: usize,
    pub rejected_records: usize,
    pub merged_duplicates: usize,
    pub classes: usize,
    pub modules: usize,
    pub methods: usize,
    pub method_calls: usize,
    pub mixins: usize,
    pub unresolved_calls: usize,
    pub circular_classes: usize,
    pub missing_references: usize,
    pub cycles: usize,
}

/// Everything one build produces, in content-derived order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    pub classes: Vec<NormalizedClass>,
    pub modules: Vec<NormalizedModule>,
    pub methods: Vec<NormalizedMethod>,
    pub method_calls: Vec<NormalizedMethodCall>,
    pub mixins: Vec<MixinRelation>,
    pub findings: Vec<ValidationFinding>,
    pub structural_findings: Vec<StructuralFinding>,
    pub missing_references: Vec<MissingReference>,
    pub cycles: Vec<DetectedCycle>,
    /// Distance of each class from its inheritance root; classes on a cycle have none
    pub depths: BTreeMap<String, usize>,
    pub index: SymbolIndex,
    pub graphs: GraphSet,
    pub stats: ResolutionStats,
    #[serde(skip)]
    pub(crate) search_limit: usize,
}

impl ResolutionResult {
    /// Query façade over this result
    #[must_use]
    pub fn query(&self) -> SymbolQuery<'_> {
        SymbolQuery::new(self, self.search_limit)
    }

    #[must_use]
    pub fn has_findings(&self) -> bool {
        !self.findings.is_empty() || !self.structural_findings.is_empty()
    }
}

/// Turns raw records into a resolved symbol graph.
///
/// Holds configuration only; every call to [`SymbolResolver::resolve`] builds its index and
/// graphs from scratch.
#[derive(Debug, Clone, Default)]
pub struct SymbolResolver {
    config: ResolverConfig,
}

impl SymbolResolver {
    #[must_use]
    pub fn new(config: ResolverConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub fn config(&self) -> &ResolverConfig {
        &self.config
    }

    /// Decode a JSON container and resolve it.
    ///
    /// Only a container of the wrong shape is an error; records that fail to decode are
    /// reported as `malformed_record` findings.
    pub fn resolve_json(&self, value: &Value) -> Result<ResolutionResult> {
        let decoded = RawSymbolBatch::from_json(value)?;
        Ok(self.resolve_decoded(decoded))
    }

    /// Pull a batch from an extractor and resolve it
    pub fn resolve_from(&self, extractor: &dyn Extractor) -> Result<ResolutionResult> {
        let decoded = extractor.extract()?;
        Ok(self.resolve_decoded(decoded))
    }

    #[must_use]
    pub fn resolve_decoded(&self, decoded: DecodedBatch) -> ResolutionResult {
        let malformed: Vec<ValidationFinding> = decoded
            .rejected
            .into_iter()
            .map(|rejected| {
                ValidationFinding::new(
                    ValidationKind::MalformedRecord,
                    rejected.kind,
                    rejected.error,
                    rejected.original,
                )
            })
            .collect();
        let raw_records = decoded.batch.len() + malformed.len();
        self.run(&decoded.batch, malformed, raw_records)
    }

    #[must_use]
    pub fn resolve(&self, batch: &RawSymbolBatch) -> ResolutionResult {
        self.run(batch, Vec::new(), batch.len())
    }

    fn run(
        &self,
        batch: &RawSymbolBatch,
        mut findings: Vec<ValidationFinding>,
        raw_records: usize,
    ) -> ResolutionResult {
        let config = &self.config;

        // Validate + normalize
        let processed = process_all(batch, config);
        findings.extend(processed.findings);

        // Deduplicate
        let classes = deduplicate(config, processed.classes);
        let modules = deduplicate(config, processed.modules);
        let methods = deduplicate(config, processed.methods);
        let calls = deduplicate(config, processed.method_calls);
        let mixins = deduplicate(config, processed.mixins);
        let merged_duplicates =
            classes.merged + modules.merged + methods.merged + calls.merged + mixins.merged;
        log::debug!("Merged {merged_duplicates} duplicate record(s)");

        // Resolve relationships
        let mut arena = SymbolArena::new(classes.records, modules.records, methods.records);
        let mut relations = mixins.records;
        let mut method_calls = calls.records;
        resolve_namespaces(&mut arena);
        let circular_classes = resolve_inheritance(&mut arena);
        attach_mixins(&mut arena, &mut relations);
        resolve_cross_references(&mut arena);
        resolve_mixin_methods(&mut arena);
        let unresolved_calls = resolve_calls(&arena, &mut method_calls);

        // Index + graphs + structural findings
        let mut index = SymbolIndex::new();
        index.rebuild(
            arena.classes.values(),
            arena.modules.values(),
            arena.methods.values(),
        );
        let graphs = GraphSet::build(&arena, &method_calls);
        let cycles = graphs.detect_cycles();
        let depths = graphs.depths();
        let missing_references = detect_missing_references(&arena, &relations, &index);
        let structural = structural_findings(&missing_references, &cycles);
        if !cycles.is_empty() {
            log::warn!("Detected {} cycle(s)", cycles.len());
        }

        // Format
        let symbols = OutputFormatter::symbols(arena);
        OutputFormatter::method_calls(&mut method_calls);
        OutputFormatter::mixins(&mut relations);
        OutputFormatter::validation_findings(&mut findings);

        let stats = ResolutionStats {
            raw_records,
            rejected_records: findings.len(),
            merged_duplicates,
            classes: symbols.classes.len(),
            modules: symbols.modules.len(),
            methods: symbols.methods.len(),
            method_calls: method_calls.len(),
            mixins: relations.len(),
            unresolved_calls,
            circular_classes,
            missing_references: missing_references.len(),
            cycles: cycles.len(),
        };
        log::info!(
            "Resolved {} classes, {} modules, {} methods, {} calls ({} rejected, {} merged, {} structural findings)",
            stats.classes,
            stats.modules,
            stats.methods,
            stats.method_calls,
            stats.rejected_records,
            stats.merged_duplicates,
            structural.len(),
        );

        ResolutionResult {
            classes: symbols.classes,
            modules: symbols.modules,
            methods: symbols.methods,
            method_calls,
            mixins: relations,
            findings,
            structural_findings: structural,
            missing_references,
            cycles,
            depths,
            index,
            graphs,
            stats,
            search_limit: config.query.search_limit,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_protocol::{RawClassRecord, RawMethodRecord};
    use pretty_assertions::assert_eq;

    #[test]
    fn resolver_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SymbolResolver>();
    }

    #[test]
    fn stats_count_every_stage() {
        let batch = RawSymbolBatch {
            classes: vec![
                RawClassRecord::named("User").source("static"),
                RawClassRecord::named("User").source("runtime"),
                RawClassRecord::default(),
            ],
            methods: vec![RawMethodRecord::new("save", "User")],
            ..RawSymbolBatch::default()
        };

        let result = SymbolResolver::default().resolve(&batch);
        assert_eq!(result.stats.raw_records, 4);
        assert_eq!(result.stats.rejected_records, 1);
        assert_eq!(result.stats.merged_duplicates, 1);
        assert_eq!(result.stats.classes, 1);
        assert_eq!(result.stats.methods, 1);
        assert_eq!(result.index.len(), 2);
    }

    #[test]
    fn malformed_elements_are_findings_not_errors() {
        let value = serde_json::json!({
            "classes": [{"name": "User"}, {"name": 42}],
        });
        let result = SymbolResolver::default().resolve_json(&value).unwrap();
        assert_eq!(result.classes.len(), 1);
        assert_eq!(result.findings.len(), 1);
        assert_eq!(result.findings[0].kind, ValidationKind::MalformedRecord);
        assert_eq!(result.findings[0].original_record, serde_json::json!({"name": 42}));
    }

    #[test]
    fn container_shape_mismatch_is_an_error() {
        let resolver = SymbolResolver::default();
        assert!(resolver.resolve_json(&serde_json::json!([1, 2])).is_err());
        assert!(resolver
            .resolve_json(&serde_json::json!({"classes": {"name": "User"}}))
            .is_err());
    }
}
