use super::common::{
    build_provenance, last_segment, non_blank, normalize_dependencies, normalize_mixins,
    parent_segment, qualify_name, strip_root, Rejection,
};
use super::SymbolProcessor;
use crate::config::ResolverConfig;
use crate::findings::ValidationKind;
use crate::identity::generate_class_id;
use crate::model::{Location, NormalizedClass};
use context_protocol::{RawClassRecord, RecordKind};

pub struct ClassProcessor<'a> {
    config: &'a ResolverConfig,
}

impl<'a> ClassProcessor<'a> {
    #[must_use]
    pub const fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }
}

impl SymbolProcessor for ClassProcessor<'_> {
    type Raw = RawClassRecord;
    type Output = NormalizedClass;

    const KIND: RecordKind = RecordKind::Class;

    fn process(&self, raw: &RawClassRecord) -> Result<NormalizedClass, Rejection> {
        let name = non_blank(raw.name.as_deref())
            .ok_or_else(|| (ValidationKind::MissingName, "class without a name".to_string()))?;
        let fqname = qualify_name(name, raw.namespace.as_deref());
        let mixins = normalize_mixins(&raw.mixins)?;

        // Kept as written (minus whitespace); resolved against the class scope later
        let superclass = non_blank(raw.superclass.as_deref())
            .filter(|s| !strip_root(s).is_empty())
            .map(str::to_string);

        Ok(NormalizedClass {
            symbol_id: generate_class_id(&fqname),
            name: last_segment(&fqname).to_string(),
            namespace: parent_segment(&fqname).map(str::to_string),
            namespace_id: None,
            superclass,
            superclass_id: None,
            mixins,
            dependencies: normalize_dependencies(&raw.dependencies),
            location: Location::from_raw(raw.location.as_ref()),
            provenance: build_provenance(
                self.config,
                raw.source.as_deref(),
                raw.location.as_ref(),
                true,
                raw.timestamp,
            ),
            children: Default::default(),
            inheritance_chain: Vec::new(),
            circular_inheritance: false,
            instance_methods: Default::default(),
            class_methods: Default::default(),
            available_instance_methods: Default::default(),
            available_class_methods: Default::default(),
            fqname,
        })
    }
}
