use crate::error::{ProtocolError, Result};
use crate::records::{
    RawClassRecord, RawMethodCallRecord, RawMethodRecord, RawMixinRecord, RawModuleRecord,
    RecordKind,
};
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// All raw records of one build, grouped by kind, in arbitrary order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawSymbolBatch {
    pub classes: Vec<RawClassRecord>,
    pub modules: Vec<RawModuleRecord>,
    pub methods: Vec<RawMethodRecord>,
    #[serde(alias = "calls")]
    pub method_calls: Vec<RawMethodCallRecord>,
    pub mixins: Vec<RawMixinRecord>,
}

/// An element of the container that could not be decoded into its record type
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RejectedRecord {
    pub kind: RecordKind,
    pub error: String,
    pub original: Value,
}

/// Result of decoding a JSON container record by record
#[derive(Debug, Clone, Default)]
pub struct DecodedBatch {
    pub batch: RawSymbolBatch,
    pub rejected: Vec<RejectedRecord>,
}

impl RawSymbolBatch {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Decode a JSON container.
    ///
    /// The container itself must be an object whose per-kind keys (all optional) hold arrays;
    /// anything else is caller misuse and fails. Individual elements that do not decode are
    /// returned as [`RejectedRecord`]s instead of failing the batch.
    pub fn from_json(value: &Value) -> Result<DecodedBatch> {
        let object = value.as_object().ok_or_else(|| {
            ProtocolError::InvalidContainer(format!(
                "expected an object of record arrays, got {}",
                json_type_name(value)
            ))
        })?;

        for key in object.keys() {
            let known = RecordKind::all()
                .iter()
                .any(|kind| kind.container_key() == key)
                || key == "calls";
            if !known {
                log::debug!("Ignoring unknown container key '{key}'");
            }
        }

        let mut decoded = DecodedBatch::default();
        decoded.batch.classes = decode_kind(object, RecordKind::Class, &[], &mut decoded.rejected)?;
        decoded.batch.modules =
            decode_kind(object, RecordKind::Module, &[], &mut decoded.rejected)?;
        decoded.batch.methods =
            decode_kind(object, RecordKind::Method, &[], &mut decoded.rejected)?;
        decoded.batch.method_calls = decode_kind(
            object,
            RecordKind::MethodCall,
            &["calls"],
            &mut decoded.rejected,
        )?;
        decoded.batch.mixins = decode_kind(object, RecordKind::Mixin, &[], &mut decoded.rejected)?;

        if !decoded.rejected.is_empty() {
            log::warn!(
                "Rejected {} undecodable record(s) at the boundary",
                decoded.rejected.len()
            );
        }

        Ok(decoded)
    }

    /// Parse and decode a JSON document
    pub fn from_json_str(input: &str) -> Result<DecodedBatch> {
        let value: Value = serde_json::from_str(input)?;
        Self::from_json(&value)
    }

    /// Append another batch, e.g. the output of a second extraction worker
    pub fn extend(&mut self, other: Self) {
        self.classes.extend(other.classes);
        self.modules.extend(other.modules);
        self.methods.extend(other.methods);
        self.method_calls.extend(other.method_calls);
        self.mixins.extend(other.mixins);
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.len()
            + self.modules.len()
            + self.methods.len()
            + self.method_calls.len()
            + self.mixins.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// JSON schema describing the container accepted by [`RawSymbolBatch::from_json`]
pub fn batch_json_schema() -> Result<Value> {
    let schema = schemars::schema_for!(RawSymbolBatch);
    Ok(serde_json::to_value(schema)?)
}

fn decode_kind<T: DeserializeOwned>(
    object: &serde_json::Map<String, Value>,
    kind: RecordKind,
    aliases: &[&str],
    rejected: &mut Vec<RejectedRecord>,
) -> Result<Vec<T>> {
    let key = kind.container_key();
    let entry = object
        .get(key)
        .map(|value| (key, value))
        .or_else(|| {
            aliases
                .iter()
                .find_map(|alias| object.get(*alias).map(|value| (*alias, value)))
        });

    let Some((key, value)) = entry else {
        return Ok(Vec::new());
    };

    let items = match value {
        Value::Array(items) => items,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(ProtocolError::InvalidContainer(format!(
                "'{key}' must be an array, got {}",
                json_type_name(other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item.clone()) {
            Ok(record) => records.push(record),
            Err(err) => rejected.push(RejectedRecord {
                kind,
                error: err.to_string(),
                original: item.clone(),
            }),
        }
    }
    Ok(records)
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn decodes_each_kind_and_rejects_bad_elements() {
        let input = json!({
            "classes": [{"name": "User", "superclass": null}, 42],
            "methods": [{"name": "save", "owner": "User", "parameters": "nope"}],
            "calls": [{"caller": "User#save", "name": "valid?"}],
        });

        let decoded = RawSymbolBatch::from_json(&input).unwrap();
        assert_eq!(decoded.batch.classes.len(), 1);
        assert_eq!(decoded.batch.methods.len(), 0);
        assert_eq!(decoded.batch.method_calls.len(), 1);
        assert_eq!(decoded.rejected.len(), 2);
        assert_eq!(decoded.rejected[0].kind, RecordKind::Class);
        assert_eq!(decoded.rejected[0].original, json!(42));
        assert_eq!(decoded.rejected[1].kind, RecordKind::Method);
    }

    #[test]
    fn non_object_container_is_an_error() {
        let err = RawSymbolBatch::from_json(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, ProtocolError::InvalidContainer(_)));
    }

    #[test]
    fn non_array_kind_is_an_error() {
        let err = RawSymbolBatch::from_json(&json!({"classes": {"name": "User"}})).unwrap_err();
        assert!(err.to_string().contains("'classes' must be an array"));
    }

    #[test]
    fn empty_object_is_an_empty_batch() {
        let decoded = RawSymbolBatch::from_json(&json!({})).unwrap();
        assert!(decoded.batch.is_empty());
        assert!(decoded.rejected.is_empty());
    }

    #[test]
    fn extend_concatenates_worker_batches() {
        let mut first = RawSymbolBatch::new();
        first.classes.push(RawClassRecord::named("A"));
        let mut second = RawSymbolBatch::new();
        second.classes.push(RawClassRecord::named("B"));
        second.modules.push(RawModuleRecord::named("M"));

        first.extend(second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn schema_mentions_every_container_key() {
        let schema = batch_json_schema().unwrap().to_string();
        for kind in RecordKind::all() {
            assert!(schema.contains(kind.container_key()), "{kind} missing");
        }
    }
}
