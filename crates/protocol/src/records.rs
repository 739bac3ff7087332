use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Kind of raw record, used for reporting and for identity namespacing
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    Class,
    Module,
    Method,
    MethodCall,
    Mixin,
}

impl RecordKind {
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

    /// Container key holding records of this kind
    #[must_use]
    pub const fn container_key(self) -> &'static str {
        match self {
            Self::Class => "classes",
            Self::Module => "modules",
            Self::Method => "methods",
            Self::MethodCall => "method_calls",
            Self::Mixin => "mixins",
        }
    }

    #[must_use]
    pub const fn all() -> [Self; 5] {
        [
            Self::Class,
            Self::Module,
            Self::Method,
            Self::MethodCall,
            Self::Mixin,
        ]
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a symbol was observed
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawLocation {
    #[serde(skip_serializing_if = "Option::is_none", alias = "path")]
    pub file: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl RawLocation {
    #[must_use]
    pub fn new(file: impl Into<String>, line: u32) -> Self {
        Self {
            file: Some(file.into()),
            line: Some(line),
        }
    }

    /// A location counts only if it carries a file or a line
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.file.as_deref().is_some_and(|f| !f.trim().is_empty()) || self.line.is_some()
    }
}

/// Inline mixin declaration on a class or module record
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawMixinRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(rename = "type", alias = "kind", skip_serializing_if = "Option::is_none")]
    pub mixin_type: Option<String>,
}

impl RawMixinRef {
    #[must_use]
    pub fn new(module: impl Into<String>, mixin_type: impl Into<String>) -> Self {
        Self {
            module: Some(module.into()),
            mixin_type: Some(mixin_type.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawClassRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "parent")]
    pub superclass: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<RawMixinRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<RawLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl RawClassRecord {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn superclass(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    #[must_use]
    pub fn namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn mixin(mut self, module: impl Into<String>, mixin_type: impl Into<String>) -> Self {
        self.mixins.push(RawMixinRef::new(module, mixin_type));
        self
    }

    #[must_use]
    pub fn dependency(mut self, name: impl Into<String>) -> Self {
        self.dependencies.push(name.into());
        self
    }

    #[must_use]
    pub fn location(mut self, location: RawLocation) -> Self {
        self.location = Some(location);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawModuleRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub mixins: Vec<RawMixinRef>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<RawLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl RawModuleRecord {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn mixin(mut self, module: impl Into<String>, mixin_type: impl Into<String>) -> Self {
        self.mixins.push(RawMixinRef::new(module, mixin_type));
        self
    }
}

/// One declared parameter; only the kind matters for arity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "type")]
    pub kind: Option<String>,
}

impl RawParameter {
    #[must_use]
    pub fn new(name: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            kind: Some(kind.into()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawMethodRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", alias = "class", alias = "owner_name")]
    pub owner: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visibility: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<RawParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<RawLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl RawMethodRecord {
    #[must_use]
    pub fn new(name: impl Into<String>, owner: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            owner: Some(owner.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = Some(scope.into());
        self
    }

    #[must_use]
    pub fn visibility(mut self, visibility: impl Into<String>) -> Self {
        self.visibility = Some(visibility.into());
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    #[must_use]
    pub fn parameter(mut self, name: impl Into<String>, kind: impl Into<String>) -> Self {
        self.parameters
            .get_or_insert_with(Vec::new)
            .push(RawParameter::new(name, kind));
        self
    }

    #[must_use]
    pub fn location(mut self, location: RawLocation) -> Self {
        self.location = Some(location);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawMethodCallRecord {
    /// Callee method name
    #[serde(skip_serializing_if = "Option::is_none", alias = "callee")]
    pub name: Option<String>,
    /// Fully qualified name of the calling method (`Owner#name` / `Owner.name`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caller: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<RawLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl RawMethodCallRecord {
    #[must_use]
    pub fn new(caller: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            caller: Some(caller.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn receiver(mut self, receiver: impl Into<String>) -> Self {
        self.receiver = Some(receiver.into());
        self
    }

    #[must_use]
    pub fn count(mut self, count: u32) -> Self {
        self.count = Some(count);
        self
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct RawMixinRecord {
    #[serde(skip_serializing_if = "Option::is_none", alias = "class")]
    pub target: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module: Option<String>,
    #[serde(rename = "type", alias = "kind", skip_serializing_if = "Option::is_none")]
    pub mixin_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<RawLocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl RawMixinRecord {
    #[must_use]
    pub fn new(
        target: impl Into<String>,
        module: impl Into<String>,
        mixin_type: impl Into<String>,
    ) -> Self {
        Self {
            target: Some(target.into()),
            module: Some(module.into()),
            mixin_type: Some(mixin_type.into()),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}
