//! Seams to the outside: where raw records come from and where results go.

use crate::error::Result;
use crate::pipeline::ResolutionResult;
use context_protocol::{DecodedBatch, RawSymbolBatch};
use serde_json::Value;

/// Produces raw symbol records (a static analyzer, a runtime tracer, a file on disk)
pub trait Extractor {
    /// Short label for logs
    fn name(&self) -> &str;

    /// Decode everything this source has. Malformed elements belong in
    /// [`DecodedBatch::rejected`]; only a container of the wrong shape is an error.
    fn extract(&self) -> Result<DecodedBatch>;
}

/// Consumes a finished build
pub trait Emitter {
    fn emit(&mut self, result: &ResolutionResult) -> Result<()>;
}

impl Extractor for RawSymbolBatch {
    fn name(&self) -> &str {
        "batch"
    }

    fn extract(&self) -> Result<DecodedBatch> {
        Ok(DecodedBatch {
            batch: self.clone(),
            rejected: Vec::new(),
        })
    }
}

impl Extractor for Value {
    fn name(&self) -> &str {
        "json"
    }

    fn extract(&self) -> Result<DecodedBatch> {
        Ok(RawSymbolBatch::from_json(self)?)
    }
}
