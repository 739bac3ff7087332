//! Deduplication and merge of normalized records.
//!
//! Records are grouped by `symbol_id`. Each group is sorted by a total key (source precedence,
//! then confidence, both descending, then the canonical JSON of the record) and folded from the
//! top down, so the merged value never depends on arrival order. Groups are independent and are
//! merged on the rayon pool.

use crate::config::ResolverConfig;
use crate::identity::SymbolId;
use crate::model::{
    MixinRelation, NormalizedClass, NormalizedMethod, NormalizedMethodCall, NormalizedModule,
};
use crate::provenance::{merge_provenance, Provenance};
use rayon::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// A normalized record that can absorb a duplicate of itself
pub trait Mergeable: Clone + Serialize + Send {
    fn symbol_id(&self) -> &str;

    fn provenance(&self) -> &Provenance;

    /// Merge a lower-ranked duplicate into `self`, returning a new record
    #[must_use]
    fn merge_with(&self, lower: &Self) -> Self;
}

/// Union two sorted, de-duplicated lists
fn union_sorted<T: Ord + Clone>(a: &[T], b: &[T]) -> Vec<T> {
    let mut out: Vec<T> = a.iter().chain(b).cloned().collect();
    out.sort();
    out.dedup();
    out
}

impl Mergeable for NormalizedClass {
    fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn merge_with(&self, lower: &Self) -> Self {
        Self {
            superclass: self.superclass.clone().or_else(|| lower.superclass.clone()),
            location: self.location.clone().or_else(|| lower.location.clone()),
            mixins: union_sorted(&self.mixins, &lower.mixins),
            dependencies: union_sorted(&self.dependencies, &lower.dependencies),
            children: self.children.union(&lower.children).cloned().collect(),
            provenance: merge_provenance(&self.provenance, &lower.provenance),
            ..self.clone()
        }
    }
}

impl Mergeable for NormalizedModule {
    fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn merge_with(&self, lower: &Self) -> Self {
        Self {
            location: self.location.clone().or_else(|| lower.location.clone()),
            mixins: union_sorted(&self.mixins, &lower.mixins),
            dependencies: union_sorted(&self.dependencies, &lower.dependencies),
            children: self.children.union(&lower.children).cloned().collect(),
            provenance: merge_provenance(&self.provenance, &lower.provenance),
            ..self.clone()
        }
    }
}

impl Mergeable for NormalizedMethod {
    fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn merge_with(&self, lower: &Self) -> Self {
        Self {
            // Most restrictive wins regardless of precedence
            visibility: self.visibility.most_restrictive(lower.visibility),
            location: self.location.clone().or_else(|| lower.location.clone()),
            available_in: self.available_in.union(&lower.available_in).cloned().collect(),
            provenance: merge_provenance(&self.provenance, &lower.provenance),
            ..self.clone()
        }
    }
}

impl Mergeable for NormalizedMethodCall {
    fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn merge_with(&self, lower: &Self) -> Self {
        Self {
            count: self.count.max(lower.count),
            lines: self.lines.union(&lower.lines).copied().collect(),
            location: self.location.clone().or_else(|| lower.location.clone()),
            provenance: merge_provenance(&self.provenance, &lower.provenance),
            ..self.clone()
        }
    }
}

impl Mergeable for MixinRelation {
    fn symbol_id(&self) -> &str {
        &self.symbol_id
    }

    fn provenance(&self) -> &Provenance {
        &self.provenance
    }

    fn merge_with(&self, lower: &Self) -> Self {
        Self {
            location: self.location.clone().or_else(|| lower.location.clone()),
            provenance: merge_provenance(&self.provenance, &lower.provenance),
            ..self.clone()
        }
    }
}

/// Highest precedence among the sources that reported a record
fn rank(config: &ResolverConfig, provenance: &Provenance) -> u8 {
    provenance
        .sources
        .iter()
        .map(|s| config.precedence_of(s))
        .max()
        .unwrap_or(0)
}

struct Ranked<T> {
    rank: u8,
    confidence: f64,
    canonical: String,
    record: T,
}

fn compare_ranked<T>(a: &Ranked<T>, b: &Ranked<T>) -> Ordering {
    b.rank
        .cmp(&a.rank)
        .then_with(|| b.confidence.total_cmp(&a.confidence))
        .then_with(|| a.canonical.cmp(&b.canonical))
}

/// Fold one group, highest-ranked member first
pub fn merge_group<T: Mergeable>(config: &ResolverConfig, group: Vec<T>) -> Option<T> {
    if group.len() <= 1 {
        return group.into_iter().next();
    }

    let mut ranked: Vec<Ranked<T>> = group
        .into_iter()
        .map(|record| Ranked {
            rank: rank(config, record.provenance()),
            confidence: record.provenance().confidence,
            canonical: serde_json::to_string(&record).unwrap_or_default(),
            record,
        })
        .collect();
    ranked.sort_by(compare_ranked);

    let mut members = ranked.into_iter().map(|r| r.record);
    let first = members.next()?;
    Some(members.fold(first, |acc, lower| acc.merge_with(&lower)))
}

/// Outcome of deduplicating one record kind
#[derive(Debug)]
pub struct Deduplicated<T> {
    /// One record per `symbol_id`, in `symbol_id` order
    pub records: Vec<T>,
    /// How many input records were folded into another
    pub merged: usize,
}

pub fn deduplicate<T: Mergeable>(config: &ResolverConfig, records: Vec<T>) -> Deduplicated<T> {
    let total = records.len();
    let mut groups: BTreeMap<SymbolId, Vec<T>> = BTreeMap::new();
    for record in records {
        groups
            .entry(record.symbol_id().to_string())
            .or_default()
            .push(record);
    }

    let groups: Vec<Vec<T>> = groups.into_values().collect();
    let records: Vec<T> = groups
        .into_par_iter()
        .filter_map(|group| merge_group(config, group))
        .collect();

    Deduplicated {
        merged: total - records.len(),
        records,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Visibility;
    use crate::processors::{ClassProcessor, MethodProcessor, SymbolProcessor};
    use context_protocol::{RawClassRecord, RawMethodRecord};
    use pretty_assertions::assert_eq;

    fn classes(records: &[RawClassRecord]) -> Vec<NormalizedClass> {
        let config = ResolverConfig::default();
        let processor = ClassProcessor::new(&config);
        records.iter().map(|r| processor.process(r).unwrap()).collect()
    }

    #[test]
    fn superclass_comes_from_first_member_that_has_one() {
        let config = ResolverConfig::default();
        let group = classes(&[
            RawClassRecord::named("User").source("static"),
            RawClassRecord::named("User")
                .superclass("ApplicationRecord")
                .source("runtime"),
        ]);

        let merged = merge_group(&config, group).unwrap();
        assert_eq!(merged.superclass.as_deref(), Some("ApplicationRecord"));
        assert_eq!(
            merged.provenance.sources.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["runtime", "static"]
        );
    }

    #[test]
    fn higher_precedence_superclass_wins_conflicts() {
        let config = ResolverConfig::default();
        let group = classes(&[
            RawClassRecord::named("User").superclass("Base").source("yard"),
            RawClassRecord::named("User")
                .superclass("ApplicationRecord")
                .source("rbs"),
        ]);
        let merged = merge_group(&config, group).unwrap();
        assert_eq!(merged.superclass.as_deref(), Some("ApplicationRecord"));
    }

    #[test]
    fn visibility_is_most_restrictive() {
        let config = ResolverConfig::default();
        let processor = MethodProcessor::new(&config);
        let group = vec![
            processor
                .process(
                    &RawMethodRecord::new("token", "User")
                        .visibility("public")
                        .source("static"),
                )
                .unwrap(),
            processor
                .process(
                    &RawMethodRecord::new("token", "User")
                        .visibility("private")
                        .source("yard"),
                )
                .unwrap(),
        ];
        let merged = merge_group(&config, group).unwrap();
        assert_eq!(merged.visibility, Visibility::Private);
    }

    #[test]
    fn merge_does_not_depend_on_order() {
        let config = ResolverConfig::default();
        let forward = classes(&[
            RawClassRecord::named("User").mixin("A", "include").source("yard"),
            RawClassRecord::named("User").mixin("B", "include").source("yard"),
            RawClassRecord::named("User").dependency("Mailer"),
        ]);
        let mut backward = forward.clone();
        backward.reverse();

        let a = merge_group(&config, forward).unwrap();
        let b = merge_group(&config, backward).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.mixins.len(), 2);
        assert_eq!(a.dependencies, vec!["Mailer"]);
    }

    #[test]
    fn deduplicate_keeps_one_record_per_id() {
        let config = ResolverConfig::default();
        let records = classes(&[
            RawClassRecord::named("User").source("static"),
            RawClassRecord::named("Post"),
            RawClassRecord::named("User").source("runtime"),
        ]);

        let deduped = deduplicate(&config, records);
        assert_eq!(deduped.records.len(), 2);
        assert_eq!(deduped.merged, 1);

        let ids: Vec<&str> = deduped.records.iter().map(|r| r.symbol_id.as_str()).collect();
        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(ids, sorted);
    }
}
