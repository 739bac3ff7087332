use super::common::{build_provenance, non_blank, parse_mixin_type, qualify_name, Rejection};
use super::SymbolProcessor;
use crate::config::ResolverConfig;
use crate::findings::ValidationKind;
use crate::identity::generate_mixin_id;
use crate::model::{Location, MixinRef, MixinRelation};
use crate::provenance::Provenance;
use context_protocol::{RawMixinRecord, RecordKind};

pub struct MixinProcessor<'a> {
    config: &'a ResolverConfig,
}

impl<'a> MixinProcessor<'a> {
    #[must_use]
    pub const fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }
}

impl SymbolProcessor for MixinProcessor<'_> {
    type Raw = RawMixinRecord;
    type Output = MixinRelation;

    const KIND: RecordKind = RecordKind::Mixin;

    fn process(&self, raw: &RawMixinRecord) -> Result<MixinRelation, Rejection> {
        let target = non_blank(raw.target.as_deref()).ok_or_else(|| {
            (
                ValidationKind::MissingMixinTarget,
                "mixin without a target".to_string(),
            )
        })?;
        let module = non_blank(raw.module.as_deref()).ok_or_else(|| {
            (
                ValidationKind::MissingMixinModule,
                format!("mixin into '{target}' names no module"),
            )
        })?;
        let mixin_type = parse_mixin_type(raw.mixin_type.as_deref())?;
        let target = qualify_name(target, raw.namespace.as_deref());

        Ok(MixinRelation {
            symbol_id: generate_mixin_id(&target, module, mixin_type.as_str()),
            target,
            module: module.to_string(),
            mixin_type,
            target_id: None,
            module_id: None,
            location: Location::from_raw(raw.location.as_ref()),
            provenance: build_provenance(
                self.config,
                raw.source.as_deref(),
                raw.location.as_ref(),
                true,
                raw.timestamp,
            ),
        })
    }
}

/// Relations for mixins declared inline on a class or module record
pub(crate) fn inline_relations<'a>(
    target: &'a str,
    mixins: &'a [MixinRef],
    location: Option<&'a Location>,
    provenance: &'a Provenance,
) -> impl Iterator<Item = MixinRelation> + 'a {
    mixins.iter().map(move |mixin| MixinRelation {
        symbol_id: generate_mixin_id(target, &mixin.module, mixin.mixin_type.as_str()),
        target: target.to_string(),
        module: mixin.module.clone(),
        mixin_type: mixin.mixin_type,
        target_id: None,
        module_id: None,
        location: location.cloned(),
        provenance: provenance.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::MixinType;
    use pretty_assertions::assert_eq;

    fn process(raw: &RawMixinRecord) -> Result<MixinRelation, Rejection> {
        MixinProcessor::new(&ResolverConfig::default()).process(raw)
    }

    #[test]
    fn type_defaults_to_include() {
        let raw = RawMixinRecord {
            target: Some("User".into()),
            module: Some("Comparable".into()),
            ..RawMixinRecord::default()
        };
        let relation = process(&raw).unwrap();
        assert_eq!(relation.mixin_type, MixinType::Include);
    }

    #[test]
    fn record_and_inline_forms_share_identity() {
        let record = process(&RawMixinRecord::new("User", "Comparable", "extend")).unwrap();
        let inline: Vec<_> = inline_relations(
            "User",
            &[MixinRef::new("Comparable", MixinType::Extend)],
            None,
            &record.provenance,
        )
        .collect();
        assert_eq!(inline[0].symbol_id, record.symbol_id);
    }

    #[test]
    fn missing_parts_are_reported_separately() {
        let no_target = RawMixinRecord {
            module: Some("Comparable".into()),
            ..RawMixinRecord::default()
        };
        assert_eq!(
            process(&no_target).unwrap_err().0,
            ValidationKind::MissingMixinTarget
        );

        let no_module = RawMixinRecord {
            target: Some("User".into()),
            ..RawMixinRecord::default()
        };
        assert_eq!(
            process(&no_module).unwrap_err().0,
            ValidationKind::MissingMixinModule
        );
    }

    #[test]
    fn target_is_qualified_by_namespace() {
        let raw = RawMixinRecord {
            namespace: Some("Admin".into()),
            ..RawMixinRecord::new("User", "Auditable", "prepend")
        };
        let relation = process(&raw).unwrap();
        assert_eq!(relation.target, "Admin::User");
        assert_eq!(relation.mixin_type, MixinType::Prepend);
    }
}
