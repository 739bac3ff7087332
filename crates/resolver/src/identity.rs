//! Stable symbol identity.
//!
//! An ID is the SHA-256 digest of `kind, fqname, receiver, arity` joined with the ASCII unit
//! separator, truncated to 16 bytes and hex encoded. The encoding is part of the contract:
//! changing it changes every ID ever emitted.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

pub type SymbolId = String;

const SEPARATOR: u8 = 0x1f;
const ID_BYTES: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SymbolKind {
    Class,
    Module,
    Method,
    MethodCall,
    Mixin,
}

impl SymbolKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Class => "class",
            Self::Module => "module",
            Self::Method => "method",
            Self::MethodCall => "method_call",
            Self::Mixin => "mixin",
        }
    }
}

impl fmt::Display for SymbolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[must_use]
pub fn generate_symbol_id(
    kind: SymbolKind,
    fqname: &str,
    receiver: Option<&str>,
    arity: Option<i32>,
) -> SymbolId {
    let mut hasher = Sha256::new();
    hasher.update(kind.as_str().as_bytes());
    hasher.update([SEPARATOR]);
    hasher.update(fqname.as_bytes());
    hasher.update([SEPARATOR]);
    hasher.update(receiver.unwrap_or_default().as_bytes());
    hasher.update([SEPARATOR]);
    if let Some(arity) = arity {
        hasher.update(arity.to_string().as_bytes());
    }
    hex_encode_lower(&hasher.finalize()[..ID_BYTES])
}

#[must_use]
pub fn generate_class_id(fqname: &str) -> SymbolId {
    generate_symbol_id(SymbolKind::Class, fqname, None, None)
}

#[must_use]
pub fn generate_module_id(fqname: &str) -> SymbolId {
    generate_symbol_id(SymbolKind::Module, fqname, None, None)
}

/// `receiver` is the method scope (`instance` or `class`)
#[must_use]
pub fn generate_method_id(fqname: &str, receiver: &str, arity: i32) -> SymbolId {
    generate_symbol_id(SymbolKind::Method, fqname, Some(receiver), Some(arity))
}

#[must_use]
pub fn generate_method_call_id(caller: &str, callee: &str, receiver: Option<&str>) -> SymbolId {
    let fqname = format!("{caller}->{callee}");
    generate_symbol_id(SymbolKind::MethodCall, &fqname, receiver, None)
}

#[must_use]
pub fn generate_mixin_id(target: &str, module: &str, mixin_type: &str) -> SymbolId {
    let fqname = format!("{target}<{module}");
    generate_symbol_id(SymbolKind::Mixin, &fqname, Some(mixin_type), None)
}

fn hex_encode_lower(bytes: &[u8]) -> String {
    use std::fmt::Write;

    let mut out = String::with_capacity(bytes.len().saturating_mul(2));
    for b in bytes {
        let _ = write!(out, "{b:02x}");
    }
    out
}
