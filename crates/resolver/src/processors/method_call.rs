use super::common::{build_provenance, non_blank, strip_root, Rejection};
use super::SymbolProcessor;
use crate::config::ResolverConfig;
use crate::findings::ValidationKind;
use crate::identity::generate_method_call_id;
use crate::model::{Location, NormalizedMethodCall};
use context_protocol::{RawMethodCallRecord, RecordKind};
use std::collections::BTreeSet;

pub struct MethodCallProcessor<'a> {
    config: &'a ResolverConfig,
}

impl<'a> MethodCallProcessor<'a> {
    #[must_use]
    pub const fn new(config: &'a ResolverConfig) -> Self {
        Self { config }
    }
}

impl SymbolProcessor for MethodCallProcessor<'_> {
    type Raw = RawMethodCallRecord;
    type Output = NormalizedMethodCall;

    const KIND: RecordKind = RecordKind::MethodCall;

    fn process(&self, raw: &RawMethodCallRecord) -> Result<NormalizedMethodCall, Rejection> {
        let callee = non_blank(raw.name.as_deref()).ok_or_else(|| {
            (
                ValidationKind::MissingName,
                "method call without a callee name".to_string(),
            )
        })?;
        let caller = non_blank(raw.caller.as_deref())
            .map(strip_root)
            .filter(|c| !c.is_empty())
            .map(str::to_string);
        let receiver = non_blank(raw.receiver.as_deref()).map(str::to_string);

        let lines: BTreeSet<u32> = raw.location.as_ref().and_then(|l| l.line).into_iter().collect();

        // An anonymous call site is trusted less
        let provenance = build_provenance(
            self.config,
            raw.source.as_deref(),
            raw.location.as_ref(),
            caller.is_some(),
            raw.timestamp,
        );

        Ok(NormalizedMethodCall {
            symbol_id: generate_method_call_id(
                caller.as_deref().unwrap_or_default(),
                callee,
                receiver.as_deref(),
            ),
            callee: callee.to_string(),
            caller,
            receiver,
            count: raw.count.unwrap_or(1).max(1),
            lines,
            location: Location::from_raw(raw.location.as_ref()),
            provenance,
            caller_id: None,
            callee_id: None,
            callee_fqname: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use context_protocol::RawLocation;
    use pretty_assertions::assert_eq;

    fn process(raw: &RawMethodCallRecord) -> Result<NormalizedMethodCall, Rejection> {
        MethodCallProcessor::new(&ResolverConfig::default()).process(raw)
    }

    #[test]
    fn count_defaults_to_one_and_is_never_zero() {
        let call = process(&RawMethodCallRecord::new("User#save", "validate")).unwrap();
        assert_eq!(call.count, 1);

        let zero = process(&RawMethodCallRecord::new("User#save", "validate").count(0)).unwrap();
        assert_eq!(zero.count, 1);
    }

    #[test]
    fn receiver_splits_identity() {
        let bare = process(&RawMethodCallRecord::new("User#save", "log")).unwrap();
        let on_logger =
            process(&RawMethodCallRecord::new("User#save", "log").receiver("Logger")).unwrap();
        assert_ne!(bare.symbol_id, on_logger.symbol_id);
        assert_eq!(
            bare.symbol_id,
            generate_method_call_id("User#save", "log", None)
        );
    }

    #[test]
    fn caller_is_optional() {
        let raw = RawMethodCallRecord {
            name: Some("puts".into()),
            location: Some(RawLocation::new("bin/setup", 4)),
            ..RawMethodCallRecord::default()
        };
        let call = process(&raw).unwrap();
        assert_eq!(call.caller, None);
        assert_eq!(call.lines.iter().copied().collect::<Vec<_>>(), vec![4]);

        let named = process(&RawMethodCallRecord {
            caller: Some("Setup.run".into()),
            ..raw
        })
        .unwrap();
        assert!(named.provenance.confidence > call.provenance.confidence);
    }

    #[test]
    fn missing_callee_is_rejected() {
        let raw = RawMethodCallRecord {
            caller: Some("User#save".into()),
            ..RawMethodCallRecord::default()
        };
        let (kind, _) = process(&raw).unwrap_err();
        assert_eq!(kind, ValidationKind::MissingName);
    }
}
