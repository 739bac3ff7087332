//! # Context Resolver
//!
//! Reconciles symbol reports from several extractors into one deduplicated, relationship-resolved
//! symbol set with its index and graphs.
//!
//! ## Features
//!
//! - **Deterministic identity** - symbol IDs derive from kind, fqname, receiver and arity only
//! - **Precedence-aware merge** - duplicates fold toward the most trusted source
//! - **Relationship resolution** - namespaces, inheritance chains, mixins, calls
//! - **Availability** - where every method can be invoked, through ancestors and mixins
//! - **Non-fatal findings** - bad records and dangling references are reported, never raised
//!
//! ## Pipeline
//!
//! ```text
//! Extractor(s)
//!     │  raw records (any order)
//!     ▼
//! Processors ──> validation findings
//!     │  normalized records + provenance
//!     ▼
//! Deduplicate (by symbol_id, highest precedence wins)
//!     │
//!     ▼
//! Resolvers: namespaces → inheritance → mixins → methods → mixin methods → calls
//!     │
//!     ├──> SymbolIndex
//!     ├──> GraphSet (inheritance, dependency, method_call, mixin)
//!     └──> structural findings (cycles, missing references)
//!     ▼
//! ResolutionResult ──> SymbolQuery
//! ```
//!
//! ## Example
//!
//! ```
//! use context_protocol::{RawClassRecord, RawMethodRecord, RawSymbolBatch};
//! use context_resolver::SymbolResolver;
//!
//! let batch = RawSymbolBatch {
//!     classes: vec![
//!         RawClassRecord::named("User").source("static"),
//!         RawClassRecord::named("User").superclass("ApplicationRecord").source("runtime"),
//!     ],
//!     methods: vec![RawMethodRecord::new("save", "User")],
//!     ..RawSymbolBatch::default()
//! };
//!
//! let result = SymbolResolver::default().resolve(&batch);
//! assert_eq!(result.classes.len(), 1);
//! assert_eq!(result.classes[0].superclass.as_deref(), Some("ApplicationRecord"));
//! ```

mod arena;
mod config;
mod dedup;
mod error;
mod findings;
mod formatter;
mod graphs;
mod identity;
mod index;
mod interfaces;
mod model;
mod pipeline;
mod processors;
mod provenance;
mod query;
mod references;
mod resolvers;

pub use arena::{ConstantFilter, ResolvedConstant, SymbolArena};
pub use config::{ConfidenceConfig, QueryConfig, ResolverConfig, DEFAULT_PRECEDENCE, DEFAULT_SOURCE};
pub use dedup::{deduplicate, merge_group, Deduplicated, Mergeable};
pub use error::{ResolverError, Result};
pub use findings::{
    DetectedCycle, MissingReference, ReferenceKind, StructuralFinding, StructuralKind,
    ValidationFinding, ValidationKind,
};
pub use formatter::{FormattedSymbols, OutputFormatter};
pub use graphs::GraphSet;
pub use identity::{
    generate_class_id, generate_method_call_id, generate_method_id, generate_mixin_id,
    generate_module_id, generate_symbol_id, SymbolId, SymbolKind,
};
pub use index::{IndexEntry, SymbolIndex};
pub use interfaces::{Emitter, Extractor};
pub use model::{
    Location, MixinRef, MixinRelation, MixinType, NormalizedClass, NormalizedMethod,
    NormalizedMethodCall, NormalizedModule, Parameter, ParameterKind, Scope, SymbolRef,
    Visibility,
};
pub use pipeline::{ResolutionResult, ResolutionStats, SymbolResolver};
pub use processors::{
    compute_arity, compute_confidence, process_all, qualify_name, ClassProcessor,
    MethodCallProcessor, MethodProcessor, MixinProcessor, ModuleProcessor, ProcessedBatch,
    SymbolProcessor,
};
pub use provenance::{clamp_confidence, create_provenance, merge_provenance, Provenance};
pub use query::{MatchKind, SearchHit, SymbolQuery};
pub use references::{detect_missing_references, structural_findings};
pub use resolvers::{
    attach_mixins, resolve_calls, resolve_cross_references, resolve_inheritance,
    resolve_mixin_methods, resolve_namespaces,
};
