use crate::identity::{SymbolId, SymbolKind};
use crate::provenance::Provenance;
use context_protocol::RawLocation;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Scope {
    Instance,
    Class,
}

impl Scope {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Instance => "instance",
            Self::Class => "class",
        }
    }

    /// Separator between owner and method name in a method fqname
    #[must_use]
    pub const fn separator(self) -> char {
        match self {
            Self::Instance => '#',
            Self::Class => '.',
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "instance" => Some(Self::Instance),
            "class" | "singleton" | "static" => Some(Self::Class),
            _ => None,
        }
    }
}

/// Declaration order is restrictiveness order: `Private` is the most restrictive
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

impl Visibility {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "public" => Some(Self::Public),
            "protected" => Some(Self::Protected),
            "private" => Some(Self::Private),
            _ => None,
        }
    }

    #[must_use]
    pub fn most_restrictive(self, other: Self) -> Self {
        self.max(other)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MixinType {
    Include,
    Extend,
    Prepend,
}

impl MixinType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Include => "include",
            Self::Extend => "extend",
            Self::Prepend => "prepend",
        }
    }

    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "include" => Some(Self::Include),
            "extend" => Some(Self::Extend),
            "prepend" => Some(Self::Prepend),
            _ => None,
        }
    }
}

impl fmt::Display for MixinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterKind {
    Required,
    Optional,
    Rest,
    KeywordRequired,
    Keyword,
    KeywordRest,
    Block,
}

impl ParameterKind {
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "req" | "required" | "positional" => Some(Self::Required),
            "opt" | "optional" => Some(Self::Optional),
            "rest" | "splat" => Some(Self::Rest),
            "keyreq" | "kwreq" | "required_keyword" => Some(Self::KeywordRequired),
            "key" | "kwopt" | "keyword" | "optional_keyword" => Some(Self::Keyword),
            "keyrest" | "kwrest" | "double_splat" => Some(Self::KeywordRest),
            "block" | "blockarg" => Some(Self::Block),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Parameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub kind: ParameterKind,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl Location {
    /// `None` for a missing or blank location
    #[must_use]
    pub fn from_raw(raw: Option<&RawLocation>) -> Option<Self> {
        raw.filter(|loc| loc.is_present()).map(|loc| Self {
            file: loc
                .file
                .as_deref()
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .map(str::to_string),
            line: loc.line,
        })
    }
}

/// A mixin as recorded on its target
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MixinRef {
    /// Module name as written at the mixin site
    pub module: String,
    pub mixin_type: MixinType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<SymbolId>,
}

impl MixinRef {
    #[must_use]
    pub fn new(module: impl Into<String>, mixin_type: MixinType) -> Self {
        Self {
            module: module.into(),
            mixin_type,
            module_id: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedClass {
    pub symbol_id: SymbolId,
    pub name: String,
    pub fqname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<SymbolId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass_id: Option<SymbolId>,
    pub mixins: Vec<MixinRef>,
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub provenance: Provenance,
    pub children: BTreeSet<SymbolId>,
    /// The class itself followed by its resolved ancestors
    pub inheritance_chain: Vec<String>,
    pub circular_inheritance: bool,
    pub instance_methods: BTreeSet<SymbolId>,
    pub class_methods: BTreeSet<SymbolId>,
    pub available_instance_methods: BTreeSet<SymbolId>,
    pub available_class_methods: BTreeSet<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedModule {
    pub symbol_id: SymbolId,
    pub name: String,
    pub fqname: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<SymbolId>,
    pub mixins: Vec<MixinRef>,
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub provenance: Provenance,
    pub children: BTreeSet<SymbolId>,
    pub instance_methods: BTreeSet<SymbolId>,
    pub class_methods: BTreeSet<SymbolId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMethod {
    pub symbol_id: SymbolId,
    pub name: String,
    pub fqname: String,
    /// Fully qualified name of the owning class or module
    pub owner: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<SymbolId>,
    pub scope: Scope,
    pub visibility: Visibility,
    pub parameters: Vec<Parameter>,
    pub arity: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub provenance: Provenance,
    /// Fqnames of the classes in which the method can be invoked
    pub available_in: BTreeSet<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedMethodCall {
    pub symbol_id: SymbolId,
    /// Fqname of the calling method, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    /// Callee method name as written at the call site
    pub callee: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    pub count: u32,
    pub lines: BTreeSet<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub provenance: Provenance,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller_id: Option<SymbolId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callee_id: Option<SymbolId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callee_fqname: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MixinRelation {
    pub symbol_id: SymbolId,
    /// Fqname of the including class or module
    pub target: String,
    pub module: String,
    pub mixin_type: MixinType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target_id: Option<SymbolId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_id: Option<SymbolId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    pub provenance: Provenance,
}

/// Borrowed view of any indexed symbol
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SymbolRef<'a> {
    Class(&'a NormalizedClass),
    Module(&'a NormalizedModule),
    Method(&'a NormalizedMethod),
}

impl<'a> SymbolRef<'a> {
    #[must_use]
    pub fn kind(&self) -> SymbolKind {
        match self {
            Self::Class(_) => SymbolKind::Class,
            Self::Module(_) => SymbolKind::Module,
            Self::Method(_) => SymbolKind::Method,
        }
    }

    #[must_use]
    pub fn symbol_id(&self) -> &'a str {
        match self {
            Self::Class(c) => &c.symbol_id,
            Self::Module(m) => &m.symbol_id,
            Self::Method(m) => &m.symbol_id,
        }
    }

    #[must_use]
    pub fn fqname(&self) -> &'a str {
        match self {
            Self::Class(c) => &c.fqname,
            Self::Module(m) => &m.fqname,
            Self::Method(m) => &m.fqname,
        }
    }

    #[must_use]
    pub fn name(&self) -> &'a str {
        match self {
            Self::Class(c) => &c.name,
            Self::Module(m) => &m.name,
            Self::Method(m) => &m.name,
        }
    }

    #[must_use]
    pub fn provenance(&self) -> &'a Provenance {
        match self {
            Self::Class(c) => &c.provenance,
            Self::Module(m) => &m.provenance,
            Self::Method(m) => &m.provenance,
        }
    }
}
