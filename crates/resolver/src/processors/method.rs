use super::common::{build_provenance, compute_arity, non_blank, qualify_name, Rejection};
use super::SymbolProcessor;
use crate::config::ResolverConfig;
use crate::findings::ValidationKind;
use crate::identity::generate_method_id;
use crate::model::{Location, NormalizedMethod, Parameter, ParameterKind, Scope, Visibility};
use context_protocol::{RawMethodRecord, RawParameter, RecordKind};

pub struct MethodProcessor<'a> {
    config: &'a ResolverConfig,
}

impl<'a> MethodProcessor<'a> {
    #[must_use]
    pub const fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }
}

fn parse_scope(value: Option<&str>) -> Result<Scope, Rejection> {
    match non_blank(value) {
        None => Ok(Scope::Instance),
        Some(v) => Scope::parse(v)
            .ok_or_else(|| (ValidationKind::InvalidField, format!("unknown scope '{v}'"))),
    }
}

/// An explicit visibility always wins; otherwise a leading underscore means private
fn parse_visibility(value: Option<&str>, name: &str) -> Result<Visibility, Rejection> {
    match non_blank(value) {
        Some(v) => Visibility::parse(v).ok_or_else(|| {
            (
                ValidationKind::InvalidField,
                format!("unknown visibility '{v}'"),
            )
        }),
        None if name.starts_with('_') => Ok(Visibility::Private),
        None => Ok(Visibility::Public),
    }
}

fn parse_parameters(raw: &[RawParameter]) -> Result<Vec<Parameter>, Rejection> {
    raw.iter()
        .map(|param| {
            let kind = match non_blank(param.kind.as_deref()) {
                None => ParameterKind::Required,
                Some(k) => ParameterKind::parse(k).ok_or_else(|| {
                    (
                        ValidationKind::InvalidField,
                        format!("unknown parameter kind '{k}'"),
                    )
                })?,
            };
            Ok(Parameter {
                name: non_blank(param.name.as_deref()).map(str::to_string),
                kind,
            })
        })
        .collect()
}

impl SymbolProcessor for MethodProcessor<'_> {
    type Raw = RawMethodRecord;
    type Output = NormalizedMethod;

    const KIND: RecordKind = RecordKind::Method;

    fn process(&self, raw: &RawMethodRecord) -> Result<NormalizedMethod, Rejection> {
        let name = non_blank(raw.name.as_deref())
            .ok_or_else(|| (ValidationKind::MissingName, "method without a name".to_string()))?;
        let owner = non_blank(raw.owner.as_deref()).ok_or_else(|| {
            (
                ValidationKind::MissingOwner,
                format!("method '{name}' has no owner"),
            )
        })?;

        let owner = qualify_name(owner, raw.namespace.as_deref());
        let scope = parse_scope(raw.scope.as_deref())?;
        let visibility = parse_visibility(raw.visibility.as_deref(), name)?;

        let (parameters, arity) = match raw.parameters.as_deref() {
            Some(params) => {
                let parameters = parse_parameters(params)?;
                let kinds: Vec<ParameterKind> = parameters.iter().map(|p| p.kind).collect();
                let arity = compute_arity(&kinds);
                (parameters, arity)
            }
            None => (Vec::new(), raw.arity.unwrap_or(0)),
        };

        let fqname = format!("{owner}{}{name}", scope.separator());

        Ok(NormalizedMethod {
            symbol_id: generate_method_id(&fqname, scope.as_str(), arity),
            name: name.to_string(),
            fqname,
            owner,
            owner_id: None,
            scope,
            visibility,
            parameters,
            arity,
            location: Location::from_raw(raw.location.as_ref()),
            provenance: build_provenance(
                self.config,
                raw.source.as_deref(),
                raw.location.as_ref(),
                true,
                raw.timestamp,
            ),
            available_in: Default::default(),
        })
    }
}
