use super::common::{
    build_provenance, last_segment, non_blank, normalize_dependencies, normalize_mixins,
    parent_segment, qualify_name, Rejection,
};
use super::SymbolProcessor;
use crate::config::ResolverConfig;
use crate::findings::ValidationKind;
use crate::identity::generate_module_id;
use crate::model::{Location, NormalizedModule};
use context_protocol::{RawModuleRecord, RecordKind};

pub struct ModuleProcessor<'a> {
    config: &'a ResolverConfig,
}

impl<'a> ModuleProcessor<'a> {
    #[must_use]
    pub const fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }
}

impl SymbolProcessor for ModuleProcessor<'_> {
    type Raw = RawModuleRecord;
    type Output = NormalizedModule;

    const KIND: RecordKind = RecordKind::Module;

    fn process(&self, raw: &RawModuleRecord) -> Result<NormalizedModule, Rejection> {
        let name = non_blank(raw.name.as_deref())
            .ok_or_else(|| (ValidationKind::MissingName, "module without a name".to_string()))?;
        let fqname = qualify_name(name, raw.namespace.as_deref());
        let mixins = normalize_mixins(&raw.mixins)?;

        Ok(NormalizedModule {
            symbol_id: generate_module_id(&fqname),
            name: last_segment(&fqname).to_string(),
            namespace: parent_segment(&fqname).map(str::to_string),
            namespace_id: None,
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
            instance_methods: Default::default(),
            class_methods: Default::default(),
            fqname,
        })
    }
}
