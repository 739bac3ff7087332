use crate::error::{ResolverError, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

pub const DEFAULT_SOURCE: &str = "inferred";
pub const DEFAULT_SEARCH_LIMIT: usize = 20;

/// Source precedence, ascending: a higher number wins a conflict
pub const DEFAULT_PRECEDENCE: [(&str, u8); 6] = [
    ("inferred", 1),
    ("yard", 2),
    ("sorbet", 3),
    ("rbs", 4),
    ("runtime", 5),
    ("static", 6),
];

/// Parameters of the per-record confidence score
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceConfig {
    pub base: f64,
    /// Added once per precedence rank of the reporting source
    pub step: f64,
    pub location_bonus: f64,
    pub missing_name_penalty: f64,
}

impl Default for ConfidenceConfig {
    fn default() -> Self {
        Self {
            base: 0.35,
            step: 0.10,
            location_bonus: 0.05,
            missing_name_penalty: 0.25,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub search_limit: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Resolver configuration, loadable from TOML
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolverConfig {
    /// Source attributed to records that do not name one
    pub default_source: String,
    pub precedence: BTreeMap<String, u8>,
    pub confidence: ConfidenceConfig,
    pub query: QueryConfig,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            default_source: DEFAULT_SOURCE.to_string(),
            precedence: DEFAULT_PRECEDENCE
                .iter()
                .map(|(name, rank)| ((*name).to_string(), *rank))
                .collect(),
            confidence: ConfidenceConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl ResolverConfig {
    /// Parse and validate a TOML document. Missing keys keep their defaults.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(input)?;
        config.normalize_sources();
        config.validate()?;
        Ok(config)
    }

    /// Source names compare case-insensitively and are stored lowercase
    fn normalize_sources(&mut self) {
        self.default_source = self.default_source.trim().to_ascii_lowercase();
        self.precedence = std::mem::take(&mut self.precedence)
            .into_iter()
            .map(|(source, rank)| (source.trim().to_ascii_lowercase(), rank))
            .collect();
    }

    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&raw)?;
        log::debug!("Loaded resolver config from {}", path.display());
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let c = &self.confidence;
        for (name, value) in [
            ("confidence.base", c.base),
            ("confidence.step", c.step),
            ("confidence.location_bonus", c.location_bonus),
            ("confidence.missing_name_penalty", c.missing_name_penalty),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ResolverError::Config(format!(
                    "{name} must be a finite, non-negative number (got {value})"
                )));
            }
        }
        if self.default_source.trim().is_empty() {
            return Err(ResolverError::Config(
                "default_source must not be empty".to_string(),
            ));
        }
        if self.query.search_limit == 0 {
            return Err(ResolverError::Config(
                "query.search_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Precedence rank of a source; unknown sources rank 0
    #[must_use]
    pub fn precedence_of(&self, source: &str) -> u8 {
        self.precedence
            .get(source)
            .or_else(|| self.precedence.get(&source.to_ascii_lowercase()))
            .copied()
            .unwrap_or(0)
    }

    /// Source name to record, lowercased, falling back to the default source
    #[must_use]
    pub fn source_or_default(&self, source: Option<&str>) -> String {
        source
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(self.default_source.trim())
            .to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn default_precedence_is_ascending() {
        let config = ResolverConfig::default();
        let ranks: Vec<u8> = ["inferred", "yard", "sorbet", "rbs", "runtime", "static"]
            .iter()
            .map(|s| config.precedence_of(s))
            .collect();
        assert_eq!(ranks, vec![1, 2, 3, 4, 5, 6]);
        assert_eq!(config.precedence_of("telepathy"), 0);
        assert_eq!(config.precedence_of("STATIC"), 6);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = ResolverConfig::from_toml_str(
            r#"
            default_source = "yard"

            [confidence]
            location_bonus = 0.1
            "#,
        )
        .unwrap();

        assert_eq!(config.default_source, "yard");
        assert_eq!(config.confidence.location_bonus, 0.1);
        assert_eq!(config.confidence.base, 0.35);
        assert_eq!(config.precedence_of("static"), 6);
        assert_eq!(config.query.search_limit, DEFAULT_SEARCH_LIMIT);
    }

    #[test]
    fn precedence_table_can_be_overridden() {
        let config = ResolverConfig::from_toml_str(
            r#"
            [precedence]
            runtime = 9
            static = 6
            "#,
        )
        .unwrap();

        assert_eq!(config.precedence_of("runtime"), 9);
        // A table given in full replaces the default one
        assert_eq!(config.precedence_of("yard"), 0);
    }

    #[test]
    fn negative_confidence_parameter_is_rejected() {
        let err = ResolverConfig::from_toml_str("[confidence]\nstep = -0.5\n").unwrap_err();
        assert!(matches!(err, ResolverError::Config(_)));
    }

    #[test]
    fn load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("resolver.toml");
        std::fs::write(&path, "[query]\nsearch_limit = 5\n").unwrap();

        let config = ResolverConfig::load(&path).unwrap();
        assert_eq!(config.query.search_limit, 5);
    }

    #[test]
    fn source_falls_back_to_default() {
        let config = ResolverConfig::default();
        assert_eq!(config.source_or_default(None), "inferred");
        assert_eq!(config.source_or_default(Some("  ")), "inferred");
        assert_eq!(config.source_or_default(Some("Runtime")), "runtime");
    }

    #[test]
    fn source_names_from_toml_are_lowercased() {
        let config = ResolverConfig::from_toml_str(
            r#"
            default_source = " Yard "

            [precedence]
            Runtime = 9
            yard = 2
            "#,
        )
        .unwrap();

        assert_eq!(config.default_source, "yard");
        assert_eq!(config.source_or_default(None), "yard");
        assert_eq!(config.precedence_of("runtime"), 9);
        assert_eq!(config.precedence_of("RUNTIME"), 9);
        assert_eq!(
            config.precedence.keys().collect::<Vec<_>>(),
            vec!["runtime", "yard"]
        );
    }
}
