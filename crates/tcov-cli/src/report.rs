use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tcov_core::{
    load_engine_config_or_default, CandidateReview, EngineConfig, GapAnalyzer, GapRecommendation,
    OverallCoverage, Validate, ValidationIssue, ValidationLevel,
};
use tcov_source::{load_requirements_or_empty, load_test_cases_or_empty, LoadedCollection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoadErrorReport {
    pub source: PathBuf,
    pub error: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompareReport {
    pub generated_at: DateTime<Utc>,
    pub threshold: f64,
    pub total_new_cases: usize,
    pub matched_cases: usize,
    pub new_cases: usize,
    pub results: Vec<CandidateReview>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub load_errors: Vec<LoadErrorReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GapsReport {
    pub generated_at: DateTime<Utc>,
    pub analysis: OverallCoverage,
    pub recommendations: Vec<GapRecommendation>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub load_errors: Vec<LoadErrorReport>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigCheckReport {
    pub config: PathBuf,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Loads the engine config and refuses to continue on error-level issues.
pub fn load_config(path: &Path) -> Result<EngineConfig> {
    let config = load_engine_config_or_default(path)
        .with_context(|| format!("failed to load config at {}", path.display()))?;

    let mut errors = Vec::new();
    for issue in config.validate() {
        match issue.level {
            ValidationLevel::Error => errors.push(format!("{}: {}", issue.code, issue.message)),
            ValidationLevel::Warning => {
                tracing::warn!(code = issue.code, "{}", issue.message);
            }
        }
    }
    if !errors.is_empty() {
        bail!(
            "config validation failed for {} ({})",
            path.display(),
            errors.join("; ")
        );
    }
    Ok(config)
}

pub fn check_config(path: &Path) -> Result<ConfigCheckReport> {
    let config = load_engine_config_or_default(path)
        .with_context(|| format!("failed to load config at {}", path.display()))?;
    let issues = config.validate();
    let valid = !issues
        .iter()
        .any(|issue| issue.level == ValidationLevel::Error);
    Ok(ConfigCheckReport {
        config: path.to_path_buf(),
        valid,
        issues,
    })
}

pub fn compare_report(
    config: &EngineConfig,
    new_path: &Path,
    existing_path: &Path,
    threshold: Option<f64>,
) -> Result<CompareReport> {
    let threshold = threshold.unwrap_or(config.matching.threshold);
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        bail!("threshold must be within [0, 1], got {threshold}");
    }
    let matcher = config.matcher()?;

    let mut load_errors = Vec::new();
    let new_cases = collect(new_path, load_test_cases_or_empty(new_path), &mut load_errors);
    let existing = collect(
        existing_path,
        load_test_cases_or_empty(existing_path),
        &mut load_errors,
    );

    let results = matcher.review_candidates(&new_cases, &existing, threshold);
    let matched_cases = results
        .iter()
        .filter(|review| !review.matches.is_empty())
        .count();

    Ok(CompareReport {
        generated_at: Utc::now(),
        threshold,
        total_new_cases: results.len(),
        matched_cases,
        new_cases: results.len() - matched_cases,
        results,
        load_errors,
    })
}

pub fn gaps_report(requirements_path: &Path, test_cases_path: &Path) -> GapsReport {
    let mut load_errors = Vec::new();
    let requirements = collect(
        requirements_path,
        load_requirements_or_empty(requirements_path),
        &mut load_errors,
    );
    let test_cases = collect(
        test_cases_path,
        load_test_cases_or_empty(test_cases_path),
        &mut load_errors,
    );

    let analyzer = GapAnalyzer::new(&requirements, &test_cases);
    GapsReport {
        generated_at: Utc::now(),
        analysis: analyzer.analyze_overall_coverage(),
        recommendations: analyzer.generate_gap_recommendations(),
        load_errors,
    }
}

fn collect<T>(
    path: &Path,
    loaded: LoadedCollection<T>,
    load_errors: &mut Vec<LoadErrorReport>,
) -> Vec<T> {
    if let Some(error) = loaded.load_error {
        load_errors.push(LoadErrorReport {
            source: path.to_path_buf(),
            error,
        });
    }
    loaded.records
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tcov_core::{MatchType, RecommendationKind};
    use tempfile::TempDir;

    const LOGIN_CASES: &str = r#"[
        {
            "id": "TC-1",
            "name": "Login with valid credentials",
            "description": "User signs in with a correct password",
            "inputs": "username, password",
            "outputs": "dashboard is shown",
            "requirement_mapping": "REQ-1"
        }
    ]"#;

    fn write(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).expect("write fixture");
        path
    }

    #[test]
    fn compare_report_flags_identical_case() {
        let dir = TempDir::new().expect("tempdir");
        let new_path = write(&dir, "new.json", LOGIN_CASES);
        let existing_path = write(&dir, "existing.json", LOGIN_CASES);

        let report = compare_report(&EngineConfig::default(), &new_path, &existing_path, None)
            .expect("report");

        assert_eq!(report.threshold, 0.7);
        assert_eq!(report.total_new_cases, 1);
        assert_eq!(report.matched_cases, 1);
        assert!(report.load_errors.is_empty());
        let review = &report.results[0];
        assert_eq!(review.matches[0].match_type, MatchType::Exact);
        assert_eq!(
            review.recommendation.recommendation,
            RecommendationKind::SkipDuplicate
        );
    }

    #[test]
    fn compare_report_records_load_failures() {
        let dir = TempDir::new().expect("tempdir");
        let new_path = write(&dir, "new.json", LOGIN_CASES);
        let missing = dir.path().join("missing.json");

        let report =
            compare_report(&EngineConfig::default(), &new_path, &missing, None).expect("report");

        assert_eq!(report.total_new_cases, 1);
        assert_eq!(report.new_cases, 1);
        assert_eq!(report.load_errors.len(), 1);
        assert_eq!(report.load_errors[0].source, missing);

        let rendered = serde_json::to_value(&report).expect("serialize");
        assert!(rendered["load_errors"].is_array());
    }

    #[test]
    fn compare_report_rejects_out_of_range_threshold() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(&dir, "cases.json", LOGIN_CASES);

        let err = compare_report(&EngineConfig::default(), &path, &path, Some(-0.1))
            .expect_err("should fail");
        assert!(err.to_string().contains("threshold must be within [0, 1]"));
    }

    #[test]
    fn gaps_report_covers_keyword_overlap() {
        let dir = TempDir::new().expect("tempdir");
        let requirements = write(
            &dir,
            "reqs.toml",
            "[[requirements]]\nid = \"REQ-1\"\nname = \"login\"\ndescription = \"user authenticate\"\n",
        );
        let cases = write(
            &dir,
            "cases.jsonl",
            "{\"id\": \"TC-1\", \"name\": \"login page\"}\n{\"id\": \"TC-2\", \"name\": \"export\"}\n{\"id\": \"TC-3\", \"name\": \"invoice\"}\n{\"id\": \"TC-4\", \"name\": \"settings\"}\n",
        );

        let report = gaps_report(&requirements, &cases);

        assert!(report.load_errors.is_empty());
        assert_eq!(report.analysis.partially_covered, 1);
        assert_eq!(report.analysis.requirements[0].report.total_coverage, 1);
        assert_eq!(report.analysis.requirements[0].report.coverage_percentage, 25.0);
        assert_eq!(report.recommendations.len(), 1);
    }

    #[test]
    fn gaps_report_without_sources_is_empty_with_errors() {
        let dir = TempDir::new().expect("tempdir");
        let report = gaps_report(
            &dir.path().join("reqs.json"),
            &dir.path().join("cases.json"),
        );

        assert_eq!(report.analysis.total_requirements, 0);
        assert_eq!(report.analysis.overall_coverage_percentage, 0.0);
        assert_eq!(report.load_errors.len(), 2);
    }

    #[test]
    fn missing_config_file_yields_defaults() {
        let dir = TempDir::new().expect("tempdir");
        let config = load_config(&dir.path().join("tcov.toml")).expect("config");
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn config_errors_are_reported_and_refused() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(&dir, "tcov.toml", "[web]\nbind = \"\"\n");

        let report = check_config(&path).expect("check");
        assert!(!report.valid);
        assert!(report
            .issues
            .iter()
            .any(|issue| issue.code == "web.bind.empty"));

        let err = load_config(&path).expect_err("should refuse");
        assert!(err.to_string().contains("web.bind.empty"));
    }

    #[test]
    fn config_warnings_do_not_invalidate() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(&dir, "tcov.toml", "[matching]\nthreshold = 0.3\n");

        let report = check_config(&path).expect("check");
        assert!(report.valid);
        assert_eq!(report.issues.len(), 1);
        assert!(load_config(&path).is_ok());
    }

    #[test]
    fn unparsable_config_is_an_error() {
        let dir = TempDir::new().expect("tempdir");
        let path = write(
            &dir,
            "tcov.toml",
            "[thresholds]\nexact = 0.5\npartial = 0.7\nminimal = 0.9\n",
        );

        assert!(check_config(&path).is_err());
    }
}
