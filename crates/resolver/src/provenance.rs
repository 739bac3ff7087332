use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Which sources reported a fact, and how much the fact is trusted
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Provenance {
    pub sources: BTreeSet<String>,
    /// Always within `[0, 1]`
    pub confidence: f64,
    /// Caller-supplied observation time (unix ms); never read from the clock
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<u64>,
}

impl Provenance {
    #[must_use]
    pub fn with_timestamp(mut self, timestamp: Option<u64>) -> Self {
        self.timestamp = timestamp;
        self
    }

    #[must_use]
    pub fn has_source(&self, source: &str) -> bool {
        self.sources.contains(source)
    }
}

#[must_use]
pub fn clamp_confidence(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

#[must_use]
pub fn create_provenance<I, S>(sources: I, confidence: f64) -> Provenance
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    Provenance {
        sources: sources.into_iter().map(Into::into).collect(),
        confidence: clamp_confidence(confidence),
        timestamp: None,
    }
}

/// Union of sources, max confidence, latest timestamp. Inputs are left untouched.
#[must_use]
pub fn merge_provenance(a: &Provenance, b: &Provenance) -> Provenance {
    Provenance {
        sources: a.sources.union(&b.sources).cloned().collect(),
        confidence: clamp_confidence(a.confidence.max(b.confidence)),
        timestamp: a.timestamp.max(b.timestamp),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn confidence_is_clamped() {
        assert_eq!(create_provenance(["static"], 1.7).confidence, 1.0);
        assert_eq!(create_provenance(["static"], -0.2).confidence, 0.0);
        assert_eq!(create_provenance(["static"], f64::NAN).confidence, 0.0);
    }

    #[test]
    fn merge_unions_sources_and_takes_max() {
        let a = create_provenance(["static"], 0.9).with_timestamp(Some(10));
        let b = create_provenance(["runtime", "yard"], 0.95).with_timestamp(Some(5));

        let merged = merge_provenance(&a, &b);
        assert_eq!(
            merged.sources.iter().map(String::as_str).collect::<Vec<_>>(),
            vec!["runtime", "static", "yard"]
        );
        assert_eq!(merged.confidence, 0.95);
        assert_eq!(merged.timestamp, Some(10));

        // inputs untouched
        assert_eq!(a.sources.len(), 1);
        assert_eq!(b.confidence, 0.95);
    }

    #[test]
    fn merge_is_commutative() {
        let a = create_provenance(["rbs"], 0.4);
        let b = create_provenance(["sorbet"], 0.6).with_timestamp(Some(1));
        assert_eq!(merge_provenance(&a, &b), merge_provenance(&b, &a));
    }
}
