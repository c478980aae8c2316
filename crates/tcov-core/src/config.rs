//! Engine configuration loaded from TOML.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::classify::{ClassificationThresholds, MatchClassifier};
use crate::compare::{Matcher, DEFAULT_MATCH_THRESHOLD};
use crate::scoring::{ScoringConfigError, ScoringStrategy};

pub const DEFAULT_WEB_BIND: &str = "127.0.0.1:9850";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid scoring strategy: {0}")]
    Scoring(#[from] ScoringConfigError),
}

/// Immutable configuration shared by every analysis call.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub thresholds: ClassificationThresholds,
    pub matching: MatchingConfig,
    pub web: WebConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchingConfig {
    /// Minimum overall score for an existing test case to be reported.
    pub threshold: f64,
    pub strategy: ScoringStrategy,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_MATCH_THRESHOLD,
            strategy: ScoringStrategy::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    pub bind: String,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_WEB_BIND.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn classifier(&self) -> MatchClassifier {
        MatchClassifier::new(self.thresholds)
    }

    pub fn matcher(&self) -> Result<Matcher, ConfigError> {
        Ok(Matcher::new(self.classifier(), self.matching.strategy.clone())?)
    }
}

pub fn parse_engine_config(contents: &str) -> Result<EngineConfig, toml::de::Error> {
    toml::from_str(contents)
}

pub fn load_engine_config(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path_ref = path.as_ref();
    let body = fs::read_to_string(path_ref).map_err(|source| ConfigError::Read {
        path: path_ref.to_path_buf(),
        source,
    })?;
    parse_engine_config(&body).map_err(|source| ConfigError::Parse {
        path: path_ref.to_path_buf(),
        source,
    })
}

/// Like [`load_engine_config`], but a missing file yields the defaults.
pub fn load_engine_config_or_default(path: impl AsRef<Path>) -> Result<EngineConfig, ConfigError> {
    let path_ref = path.as_ref();
    if !path_ref.exists() {
        tracing::debug!(path = %path_ref.display(), "no config file; using defaults");
        return Ok(EngineConfig::default());
    }
    load_engine_config(path_ref)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Attribute;

    fn sample_config() -> &'static str {
        r#"
[thresholds]
exact = 0.95
partial = 0.75
minimal = 0.4

[matching]
threshold = 0.6

[matching.strategy]
kind = "weighted"

[[matching.strategy.weights]]
attribute = "name"
weight = 2.0

[[matching.strategy.weights]]
attribute = "description"
weight = 1.0

[web]
bind = "0.0.0.0:8080"
"#
    }

    fn unique_temp_path(file_name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "{file_name}-{}.toml",
            chrono::Utc::now().timestamp_nanos_opt().unwrap_or_default()
        ))
    }

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_engine_config("").expect("parse empty config");
        assert_eq!(config, EngineConfig::default());
        assert_eq!(config.matching.threshold, 0.7);
        assert_eq!(config.thresholds, ClassificationThresholds::default());
        assert_eq!(config.matching.strategy, ScoringStrategy::FixedAttributes);
        assert_eq!(config.web.bind, "127.0.0.1:9850");
    }

    #[test]
    fn parse_engine_config_reads_every_section() {
        let config = parse_engine_config(sample_config()).expect("parse config");
        assert_eq!(config.thresholds.exact(), 0.95);
        assert_eq!(config.thresholds.minimal(), 0.4);
        assert_eq!(config.matching.threshold, 0.6);
        assert_eq!(
            config.matching.strategy.attributes(),
            vec![Attribute::Name, Attribute::Description]
        );
        assert_eq!(config.web.bind, "0.0.0.0:8080");

        let matcher = config.matcher().expect("build matcher");
        assert_eq!(matcher.classifier().thresholds().partial(), 0.75);
    }

    #[test]
    fn invalid_thresholds_fail_at_parse_time() {
        let err = parse_engine_config("[thresholds]\nexact = 0.5\npartial = 0.7\nminimal = 0.9\n")
            .expect_err("ascending thresholds");
        assert!(err.to_string().contains("strictly descending"));
    }

    #[test]
    fn invalid_weights_fail_when_building_the_matcher() {
        let config = parse_engine_config(
            "[matching.strategy]\nkind = \"weighted\"\nweights = []\n",
        )
        .expect("weights parse");
        let err = config.matcher().expect_err("no positive weight");
        assert!(matches!(
            err,
            ConfigError::Scoring(ScoringConfigError::NoPositiveWeight)
        ));
    }

    #[test]
    fn load_engine_config_classifies_read_and_parse_errors() {
        let missing_path = unique_temp_path("tcov-missing-config");
        let err = load_engine_config(&missing_path).expect_err("missing file should fail");
        assert!(matches!(err, ConfigError::Read { path, .. } if path == missing_path));

        let invalid_path = unique_temp_path("tcov-invalid-config");
        fs::write(&invalid_path, "[thresholds\nexact = ").expect("write invalid config fixture");
        let err = load_engine_config(&invalid_path).expect_err("invalid config should fail");
        assert!(matches!(err, ConfigError::Parse { path, .. } if path == invalid_path));
        let _ = fs::remove_file(invalid_path);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let missing_path = unique_temp_path("tcov-absent-config");
        let config = load_engine_config_or_default(&missing_path).expect("defaults");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let config = parse_engine_config(sample_config()).expect("parse config");
        let rendered = toml::to_string_pretty(&config).expect("serialize config");
        let reparsed = parse_engine_config(&rendered).expect("reparse config");
        assert_eq!(reparsed, config);
    }
}
