use context_resolver::{ResolutionStats, SearchHit};
use serde::Serialize;

/// What the user asked for, decoupled from clap
#[derive(Debug, Clone)]
pub enum CommandAction {
    Resolve {
        input: String,
        pretty: bool,
    },
    Summary {
        input: String,
    },
    Search {
        term: String,
        input: String,
        limit: Option<usize>,
    },
    Dependents {
        fqname: String,
        input: String,
        hops: usize,
    },
    Cycles {
        input: String,
    },
    Schema,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub term: String,
    pub hits: Vec<SearchHit>,
}

/// One-line rendering of build statistics
pub fn stats_line(stats: &ResolutionStats) -> String {
    format!(
        "classes={} modules={} methods={} calls={} mixins={} rejected={} merged={} unresolved_calls={} missing_references={} cycles={}",
        stats.classes,
        stats.modules,
        stats.methods,
        stats.method_calls,
        stats.mixins,
        stats.rejected_records,
        stats.merged_duplicates,
        stats.unresolved_calls,
        stats.missing_references,
        stats.cycles,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn stats_line_lists_every_counter() {
        let stats = ResolutionStats {
            classes: 2,
            cycles: 1,
            ..ResolutionStats::default()
        };
        assert_eq!(
            stats_line(&stats),
            "classes=2 modules=0 methods=0 calls=0 mixins=0 rejected=0 merged=0 unresolved_calls=0 missing_references=0 cycles=1"
        );
    }
}
