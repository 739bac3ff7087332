pub mod domain;
mod io;

pub use domain::CommandAction;

use anyhow::{Context, Result};
use context_resolver::{Emitter, ResolutionResult, ResolverConfig, SymbolResolver};
use domain::{stats_line, SearchOutput};
use io::{JsonEmitter, JsonFileExtractor};
use std::io::Write;

pub struct CommandHandler {
    resolver: SymbolResolver,
}

impl CommandHandler {
    pub fn new(config: ResolverConfig) -> Self {
        Self {
            resolver: SymbolResolver::new(config),
        }
    }

    fn load(&self, input: &str) -> Result<ResolutionResult> {
        let extractor = JsonFileExtractor::new(input);
        self.resolver
            .resolve_from(&extractor)
            .with_context(|| format!("failed to resolve {input}"))
    }

    pub fn execute(&self, action: CommandAction, out: &mut dyn Write) -> Result<()> {
        match action {
            CommandAction::Resolve { input, pretty } => {
                let result = self.load(&input)?;
                JsonEmitter::new(out, pretty).emit(&result)?;
            }
            CommandAction::Summary { input } => {
                let result = self.load(&input)?;
                writeln!(out, "{}", stats_line(&result.stats))?;
                for finding in &result.findings {
                    writeln!(
                        out,
                        "skipped {} ({}): {}",
                        finding.record_kind, finding.kind, finding.message
                    )?;
                }
                for finding in &result.structural_findings {
                    writeln!(out, "warning: {}", finding.message)?;
                }
            }
            CommandAction::Search { term, input, limit } => {
                let result = self.load(&input)?;
                let query = result.query();
                let hits = match limit {
                    Some(limit) => query.search_with_limit(&term, limit),
                    None => query.search(&term),
                };
                serde_json::to_writer_pretty(&mut *out, &SearchOutput { term, hits })?;
                writeln!(out)?;
            }
            CommandAction::Dependents {
                fqname,
                input,
                hops,
            } => {
                let result = self.load(&input)?;
                let dependents = result.query().dependents_within(&fqname, hops)?;
                for (name, distance) in dependents {
                    writeln!(out, "{name}\t{distance}")?;
                }
            }
            CommandAction::Cycles { input } => {
                let result = self.load(&input)?;
                for cycle in &result.cycles {
                    let mut path = cycle.members.clone();
                    if let Some(first) = cycle.members.first() {
                        path.push(first.clone());
                    }
                    writeln!(out, "{}: {}", cycle.graph, path.join(" -> "))?;
                }
            }
            CommandAction::Schema => {
                let schema = context_protocol::batch_json_schema()?;
                serde_json::to_writer_pretty(&mut *out, &schema)?;
                writeln!(out)?;
            }
        }
        Ok(())
    }
}
