//! # Context Protocol
//!
//! Raw symbol records exchanged between extractors and the symbol resolver.
//!
//! Every field of every record is optional at the type level. A record that is missing a
//! required field still decodes and is rejected later by validation, so one bad record never
//! takes down a whole batch.
//!
//! ```text
//! JSON container
//!     │
//!     ├──> RawSymbolBatch::from_json
//!     │      ├─ top-level shape checked (object of arrays)   -> ProtocolError
//!     │      └─ each element decoded on its own               -> RejectedRecord
//!     │
//!     └──> DecodedBatch { batch, rejected }
//! ```

mod batch;
mod error;
mod records;

pub use batch::{batch_json_schema, DecodedBatch, RawSymbolBatch, RejectedRecord};
pub use error::{ProtocolError, Result};
pub use records::{
    RawClassRecord, RawLocation, RawMethodCallRecord, RawMethodRecord, RawMixinRecord,
    RawMixinRef, RawModuleRecord, RawParameter, RecordKind,
};
