use crate::identity::SymbolId;
use context_graph::GraphKind;
use context_protocol::RecordKind;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Why a raw record was skipped
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationKind {
    MissingName,
    MissingOwner,
    MissingMixinTarget,
    MissingMixinModule,
    InvalidField,
    MalformedRecord,
}

impl ValidationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::MissingName => "missing_name",
            Self::MissingOwner => "missing_owner",
            Self::MissingMixinTarget => "missing_mixin_target",
            Self::MissingMixinModule => "missing_mixin_module",
            Self::InvalidField => "invalid_field",
            Self::MalformedRecord => "malformed_record",
        }
    }
}

impl fmt::Display for ValidationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw record that was skipped, kept with the record as received
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationFinding {
    pub kind: ValidationKind,
    pub record_kind: RecordKind,
    pub message: String,
    pub original_record: Value,
}

impl ValidationFinding {
    #[must_use]
    pub fn new(
        kind: ValidationKind,
        record_kind: RecordKind,
        message: impl Into<String>,
        original_record: Value,
    ) -> Self {
        Self {
            kind,
            record_kind,
            message: message.into(),
            original_record,
        }
    }
}

/// What a dangling reference was used as
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReferenceKind {
    Superclass,
    Dependency,
    Mixin,
    MixinTarget,
    Owner,
}

impl ReferenceKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Superclass => "superclass",
            Self::Dependency => "dependency",
            Self::Mixin => "mixin",
            Self::MixinTarget => "mixin_target",
            Self::Owner => "owner",
        }
    }
}

impl fmt::Display for ReferenceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A name referenced by a symbol that matches nothing in the index
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MissingReference {
    /// Fqname of the referencing symbol
    pub symbol: String,
    pub symbol_id: SymbolId,
    pub kind: ReferenceKind,
    /// Name as written in the referencing record
    pub reference: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DetectedCycle {
    pub graph: GraphKind,
    /// Rotated to start at the smallest member
    pub members: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructuralKind {
    MissingReference,
    CircularDependency,
}

/// Non-fatal problem in the relationships between symbols
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct StructuralFinding {
    pub kind: StructuralKind,
    pub symbol: String,
    pub message: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub related: Vec<String>,
}

impl From<&MissingReference> for StructuralFinding {
    fn from(missing: &MissingReference) -> Self {
        Self {
            kind: StructuralKind::MissingReference,
            symbol: missing.symbol.clone(),
            message: format!(
                "{} references unknown {} '{}'",
                missing.symbol, missing.kind, missing.reference
            ),
            related: vec![missing.reference.clone()],
        }
    }
}

impl From<&DetectedCycle> for StructuralFinding {
    fn from(cycle: &DetectedCycle) -> Self {
        let symbol = cycle.members.first().cloned().unwrap_or_default();
        let mut path = cycle.members.join(" -> ");
        if let Some(first) = cycle.members.first() {
            path.push_str(" -> ");
            path.push_str(first);
        }
        Self {
            kind: StructuralKind::CircularDependency,
            symbol,
            message: format!("{} cycle: {path}", cycle.graph),
            related: cycle.members.clone(),
        }
    }
}
