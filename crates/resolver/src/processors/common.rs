use crate::config::ResolverConfig;
use crate::findings::ValidationKind;
use crate::model::{MixinRef, MixinType, ParameterKind};
use crate::provenance::{create_provenance, Provenance};
use context_protocol::{RawLocation, RawMixinRef};

/// Why a processor skipped a record
pub type Rejection = (ValidationKind, String);

const PATH_SEPARATOR: &str = "::";

/// Trimmed, non-empty value of an optional text field
pub(crate) fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

pub(crate) fn strip_root(name: &str) -> &str {
    name.trim().trim_start_matches(PATH_SEPARATOR)
}

/// Fully qualified name for `name` declared inside `namespace`.
///
/// A leading `::` is dropped and a name that already contains `::` is taken as qualified.
#[must_use]
pub fn qualify_name(name: &str, namespace: Option<&str>) -> String {
    let name = strip_root(name);
    if name.contains(PATH_SEPARATOR) {
        return name.to_string();
    }
    match non_blank(namespace).map(strip_root).filter(|ns| !ns.is_empty()) {
        Some(ns) => format!("{ns}{PATH_SEPARATOR}{name}"),
        None => name.to_string(),
    }
}

/// `A::B::C` -> `Some("A::B")`, `C` -> `None`
#[must_use]
pub fn parent_segment(fqname: &str) -> Option<&str> {
    fqname.rsplit_once(PATH_SEPARATOR).map(|(parent, _)| parent)
}

#[must_use]
pub fn last_segment(fqname: &str) -> &str {
    fqname
        .rsplit_once(PATH_SEPARATOR)
        .map_or(fqname, |(_, last)| last)
}

/// Source precedence base score with location bonus and missing-name penalty. Not yet clamped.
#[must_use]
pub fn compute_confidence(
    config: &ResolverConfig,
    source: &str,
    has_location: bool,
    name_present: bool,
) -> f64 {
    let c = &config.confidence;
    let mut score = c.base + c.step * f64::from(config.precedence_of(source));
    if has_location {
        score += c.location_bonus;
    }
    if !name_present {
        score -= c.missing_name_penalty;
    }
    score
}

pub(crate) fn build_provenance(
    config: &ResolverConfig,
    source: Option<&str>,
    location: Option<&RawLocation>,
    name_present: bool,
    timestamp: Option<u64>,
) -> Provenance {
    let source = config.source_or_default(source);
    let has_location = location.is_some_and(RawLocation::is_present);
    let confidence = compute_confidence(config, &source, has_location, name_present);
    create_provenance([source], confidence).with_timestamp(timestamp)
}

pub(crate) fn parse_mixin_type(value: Option<&str>) -> Result<MixinType, Rejection> {
    match non_blank(value) {
        None => Ok(MixinType::Include),
        Some(v) => MixinType::parse(v).ok_or_else(|| {
            (
                ValidationKind::InvalidField,
                format!("unknown mixin type '{v}'"),
            )
        }),
    }
}

/// Inline mixin declarations, sorted and de-duplicated
pub(crate) fn normalize_mixins(raw: &[RawMixinRef]) -> Result<Vec<MixinRef>, Rejection> {
    let mut mixins = Vec::with_capacity(raw.len());
    for mixin in raw {
        let module = non_blank(mixin.module.as_deref()).ok_or_else(|| {
            (
                ValidationKind::MissingMixinModule,
                "inline mixin without a module name".to_string(),
            )
        })?;
        let mixin_type = parse_mixin_type(mixin.mixin_type.as_deref())?;
        mixins.push(MixinRef::new(module, mixin_type));
    }
    mixins.sort();
    mixins.dedup();
    Ok(mixins)
}

pub(crate) fn normalize_dependencies(raw: &[String]) -> Vec<String> {
    let mut deps: Vec<String> = raw
        .iter()
        .map(|d| d.trim())
        .filter(|d| !d.is_empty())
        .map(str::to_string)
        .collect();
    deps.sort();
    deps.dedup();
    deps
}

/// Arity from a parameter-kind sequence.
///
/// Fixed arity is the number of required arguments (all required keywords count as one).
/// Optional or splat parameters make it `-(required + 1)`. Optional keywords only do so when
/// no keyword is required.
#[must_use]
pub fn compute_arity(kinds: &[ParameterKind]) -> i32 {
    let mut required = kinds
        .iter()
        .filter(|k| **k == ParameterKind::Required)
        .count();
    let has_required_keyword = kinds.contains(&ParameterKind::KeywordRequired);
    if has_required_keyword {
        required += 1;
    }
    let variable = kinds
        .iter()
        .any(|k| matches!(k, ParameterKind::Optional | ParameterKind::Rest))
        || (!has_required_keyword
            && kinds
                .iter()
                .any(|k| matches!(k, ParameterKind::Keyword | ParameterKind::KeywordRest)));

    let required = i32::try_from(required).unwrap_or(i32::MAX - 1);
    if variable {
        -(required + 1)
    } else {
        required
    }
}
