//! Requirement coverage gaps based on keyword overlap.
//!
//! Two percentages appear here and they measure different things:
//!
//! - pair level: share of a requirement's keywords found in one test case;
//! - requirement level: share of the whole repository that touches the
//!   requirement at all.
//!
//! A test case touches a requirement as soon as one keyword overlaps.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::normalize::normalize;
use crate::record::{Attribute, RequirementRecord, TestCaseRecord};

pub const STOPWORDS: [&str; 14] = [
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by",
];

/// Requirement-level coverage below this percentage counts as partial.
pub const PARTIAL_COVERAGE_LIMIT: f64 = 50.0;

/// De-duplicated keywords of `text`, without punctuation or stopwords.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    let stripped = normalize(text)
        .chars()
        .filter(|ch| ch.is_alphanumeric() || *ch == '_' || ch.is_whitespace())
        .collect::<String>();

    stripped
        .split_whitespace()
        .filter(|word| !STOPWORDS.contains(word))
        .map(str::to_string)
        .collect()
}

pub fn requirement_keywords(requirement: &RequirementRecord) -> BTreeSet<String> {
    extract_keywords(&format!("{} {}", requirement.name, requirement.description))
}

pub fn test_case_keywords(test_case: &TestCaseRecord) -> BTreeSet<String> {
    let text = Attribute::ALL
        .into_iter()
        .map(|attribute| test_case.attribute(attribute))
        .collect::<Vec<_>>()
        .join(" ");
    extract_keywords(&text)
}

/// A test case that shares at least one keyword with a requirement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoveringTestCase {
    pub test_case_id: Option<String>,
    pub test_case_name: String,
    /// Pair-level percentage of the requirement's keywords present.
    pub coverage_percentage: f64,
    pub matched_keywords: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageReport {
    pub requirement_id: String,
    pub matching_test_cases: Vec<CoveringTestCase>,
    pub total_coverage: usize,
    /// Requirement-level percentage of the repository touching this requirement.
    pub coverage_percentage: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CoverageStatus {
    Uncovered,
    PartiallyCovered,
    FullyCovered,
}

impl CoverageStatus {
    pub fn of(report: &CoverageReport) -> Self {
        if report.total_coverage == 0 {
            CoverageStatus::Uncovered
        } else if report.coverage_percentage < PARTIAL_COVERAGE_LIMIT {
            CoverageStatus::PartiallyCovered
        } else {
            CoverageStatus::FullyCovered
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CoverageStatus::Uncovered => "uncovered",
            CoverageStatus::PartiallyCovered => "partially_covered",
            CoverageStatus::FullyCovered => "fully_covered",
        }
    }
}

impl std::fmt::Display for CoverageStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementCoverage {
    #[serde(flatten)]
    pub report: CoverageReport,
    pub status: CoverageStatus,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OverallCoverage {
    pub total_requirements: usize,
    pub fully_covered: usize,
    pub partially_covered: usize,
    pub uncovered: usize,
    pub overall_coverage_percentage: f64,
    pub requirements: Vec<RequirementCoverage>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GapRecommendationType {
    CreateNewTestCase,
    EnhanceTestCoverage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GapRecommendation {
    pub requirement_id: String,
    pub recommendation_type: GapRecommendationType,
    pub rationale: String,
    pub severity: Severity,
}

/// Coverage analysis over one requirement set and one test case repository.
#[derive(Debug, Clone)]
pub struct GapAnalyzer<'a> {
    requirements: &'a [RequirementRecord],
    test_cases: &'a [TestCaseRecord],
    test_case_keywords: Vec<BTreeSet<String>>,
}

impl<'a> GapAnalyzer<'a> {
    pub fn new(requirements: &'a [RequirementRecord], test_cases: &'a [TestCaseRecord]) -> Self {
        Self {
            requirements,
            test_cases,
            test_case_keywords: test_cases.iter().map(test_case_keywords).collect(),
        }
    }

    pub fn calculate_requirement_coverage(
        &self,
        requirement: &RequirementRecord,
    ) -> CoverageReport {
        let keywords = requirement_keywords(requirement);

        let mut matching_test_cases = Vec::new();
        for (test_case, case_keywords) in self.test_cases.iter().zip(&self.test_case_keywords) {
            let matched_keywords = keywords
                .intersection(case_keywords)
                .cloned()
                .collect::<Vec<_>>();
            let pair_percentage = if keywords.is_empty() {
                0.0
            } else {
                matched_keywords.len() as f64 / keywords.len() as f64 * 100.0
            };
            if pair_percentage > 0.0 {
                matching_test_cases.push(CoveringTestCase {
                    test_case_id: test_case.id.clone(),
                    test_case_name: test_case.name.clone(),
                    coverage_percentage: pair_percentage,
                    matched_keywords,
                });
            }
        }

        let total_coverage = matching_test_cases.len();
        let coverage_percentage = if self.test_cases.is_empty() {
            0.0
        } else {
            total_coverage as f64 / self.test_cases.len() as f64 * 100.0
        };

        CoverageReport {
            requirement_id: requirement.id.clone(),
            matching_test_cases,
            total_coverage,
            coverage_percentage,
        }
    }

    pub fn analyze_overall_coverage(&self) -> OverallCoverage {
        let mut overall = OverallCoverage {
            total_requirements: self.requirements.len(),
            ..OverallCoverage::default()
        };

        for requirement in self.requirements {
            let report = self.calculate_requirement_coverage(requirement);
            let status = CoverageStatus::of(&report);
            match status {
                CoverageStatus::Uncovered => overall.uncovered += 1,
                CoverageStatus::PartiallyCovered => overall.partially_covered += 1,
                CoverageStatus::FullyCovered => overall.fully_covered += 1,
            }
            overall
                .requirements
                .push(RequirementCoverage { report, status });
        }

        if overall.total_requirements > 0 {
            overall.overall_coverage_percentage =
                overall.fully_covered as f64 / overall.total_requirements as f64 * 100.0;
        }

        tracing::info!(
            requirements = overall.total_requirements,
            test_cases = self.test_cases.len(),
            fully_covered = overall.fully_covered,
            partially_covered = overall.partially_covered,
            uncovered = overall.uncovered,
            "requirement coverage analyzed"
        );
        overall
    }

    pub fn generate_gap_recommendations(&self) -> Vec<GapRecommendation> {
        self.requirements
            .iter()
            .filter_map(|requirement| {
                let report = self.calculate_requirement_coverage(requirement);
                if report.total_coverage < 1 {
                    Some(GapRecommendation {
                        requirement_id: requirement.id.clone(),
                        recommendation_type: GapRecommendationType::CreateNewTestCase,
                        rationale: format!(
                            "requirement '{}' has no test case sharing any of its keywords",
                            requirement.name
                        ),
                        severity: Severity::High,
                    })
                } else if report.coverage_percentage < PARTIAL_COVERAGE_LIMIT {
                    Some(GapRecommendation {
                        requirement_id: requirement.id.clone(),
                        recommendation_type: GapRecommendationType::EnhanceTestCoverage,
                        rationale: format!(
                            "requirement '{}' is touched by only {:.1}% of test cases ({} of {})",
                            requirement.name,
                            report.coverage_percentage,
                            report.total_coverage,
                            self.test_cases.len()
                        ),
                        severity: Severity::Medium,
                    })
                } else {
                    None
                }
            })
            .collect()
    }
}
