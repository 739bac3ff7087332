use context_protocol::{DecodedBatch, RawSymbolBatch};
use context_resolver::{Emitter, Extractor, ResolutionResult};
use std::io::Write;
use std::path::PathBuf;

/// Reads a JSON batch from a file, or from stdin for `-`
pub struct JsonFileExtractor {
    label: String,
    path: Option<PathBuf>,
}

impl JsonFileExtractor {
    pub fn new(input: &str) -> Self {
        let path = (input != "-").then(|| PathBuf::from(input));
        Self {
            label: if path.is_some() { input.to_string() } else { "stdin".to_string() },
            path,
        }
    }
}

impl Extractor for JsonFileExtractor {
    fn name(&self) -> &str {
        &self.label
    }

    fn extract(&self) -> context_resolver::Result<DecodedBatch> {
        let raw = match &self.path {
            Some(path) => std::fs::read_to_string(path)?,
            None => std::io::read_to_string(std::io::stdin())?,
        };
        let decoded = RawSymbolBatch::from_json_str(&raw)?;
        log::debug!(
            "Read {} record(s) from {} ({} malformed)",
            decoded.batch.len(),
            self.label,
            decoded.rejected.len()
        );
        Ok(decoded)
    }
}

/// Writes the full result as JSON
pub struct JsonEmitter<W: Write> {
    writer: W,
    pretty: bool,
}

impl<W: Write> JsonEmitter<W> {
    pub fn new(writer: W, pretty: bool) -> Self {
        Self { writer, pretty }
    }
}

impl<W: Write> Emitter for JsonEmitter<W> {
    fn emit(&mut self, result: &ResolutionResult) -> context_resolver::Result<()> {
        if self.pretty {
            serde_json::to_writer_pretty(&mut self.writer, result)?;
        } else {
            serde_json::to_writer(&mut self.writer, result)?;
        }
        writeln!(self.writer)?;
        Ok(())
    }
}
