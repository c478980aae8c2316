//! Batch comparison of new test cases against an existing repository.

use serde::{Deserialize, Serialize};

use crate::classify::MatchRecommendation;
use crate::compare::{MatchResult, Matcher};
use crate::record::TestCaseRecord;

/// A new test case together with the existing cases it matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateMatches {
    pub test_case: TestCaseRecord,
    pub matches: Vec<MatchResult>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TestCaseCoverage {
    pub total_new_cases: usize,
    /// New cases with at least one qualifying match.
    pub matched_cases: usize,
    /// New cases with no qualifying match.
    pub new_cases: usize,
    /// Matched cases only, in input order.
    pub matches: Vec<CandidateMatches>,
}

/// Per-candidate outcome of a batch review, matched or not.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateReview {
    pub test_case: TestCaseRecord,
    pub matches: Vec<MatchResult>,
    pub recommendation: MatchRecommendation,
}

impl Matcher {
    /// Compares every new case and attaches a recommendation, keeping input order.
    pub fn review_candidates(
        &self,
        new_cases: &[TestCaseRecord],
        existing_cases: &[TestCaseRecord],
        threshold: f64,
    ) -> Vec<CandidateReview> {
        new_cases
            .iter()
            .map(|case| {
                let matches = self.compare(case, existing_cases, threshold);
                let recommendation = self
                    .classifier()
                    .generate_match_recommendations(case, &matches);
                CandidateReview {
                    test_case: case.clone(),
                    matches,
                    recommendation,
                }
            })
            .collect()
    }

    pub fn analyze_test_case_coverage(
        &self,
        new_cases: &[TestCaseRecord],
        existing_cases: &[TestCaseRecord],
        threshold: f64,
    ) -> TestCaseCoverage {
        let mut coverage = TestCaseCoverage {
            total_new_cases: new_cases.len(),
            ..TestCaseCoverage::default()
        };

        for case in new_cases {
            let matches = self.compare(case, existing_cases, threshold);
            if matches.is_empty() {
                coverage.new_cases += 1;
            } else {
                coverage.matched_cases += 1;
                coverage.matches.push(CandidateMatches {
                    test_case: case.clone(),
                    matches,
                });
            }
        }

        tracing::info!(
            total = coverage.total_new_cases,
            matched = coverage.matched_cases,
            new = coverage.new_cases,
            "test case coverage analyzed"
        );
        coverage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::RecommendationKind;

    fn case(id: &str, name: &str, description: &str) -> TestCaseRecord {
        TestCaseRecord::new(name)
            .with_id(id)
            .with_description(description)
    }

    #[test]
    fn tallies_matched_and_new_cases_in_input_order() {
        let existing = vec![
            case("TC-1", "Login succeeds", "valid user logs in"),
            case("TC-2", "Password reset", "user resets a forgotten password"),
        ];
        let new_cases = vec![
            case("N-1", "Password reset", "user resets a forgotten password"),
            case("N-2", "Generate quarterly tax report", "finance exports figures")
                .with_inputs("quarter")
                .with_outputs("csv export"),
            case("N-3", "Login succeeds", "valid user logs in"),
        ];

        let coverage = Matcher::default().analyze_test_case_coverage(&new_cases, &existing, 0.7);

        assert_eq!(coverage.total_new_cases, 3);
        assert_eq!(coverage.matched_cases, 2);
        assert_eq!(coverage.new_cases, 1);
        let matched_ids = coverage
            .matches
            .iter()
            .map(|entry| entry.test_case.id.as_deref().unwrap_or_default())
            .collect::<Vec<_>>();
        assert_eq!(matched_ids, vec!["N-1", "N-3"]);
        assert_eq!(coverage.matches[0].matches[0].existing_id.as_deref(), Some("TC-2"));
    }

    #[test]
    fn review_keeps_unmatched_candidates_with_create_new() {
        let existing = vec![case("TC-2", "Password reset", "user resets a forgotten password")];
        let new_cases = vec![
            case("N-1", "Password reset", "user resets a forgotten password"),
            case("N-2", "Generate quarterly tax report", "finance exports figures")
                .with_inputs("quarter")
                .with_outputs("csv export"),
        ];

        let reviews = Matcher::default().review_candidates(&new_cases, &existing, 0.7);

        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].matches[0].similarity_score, 1.0);
        assert_eq!(
            reviews[0].recommendation.recommendation,
            RecommendationKind::SkipDuplicate
        );
        assert!(reviews[1].matches.is_empty());
        assert_eq!(
            reviews[1].recommendation.recommendation,
            RecommendationKind::CreateNew
        );
    }

    #[test]
    fn empty_inputs_produce_empty_tallies() {
        let coverage = Matcher::default().analyze_test_case_coverage(&[], &[], 0.7);
        assert_eq!(coverage, TestCaseCoverage::default());

        let coverage = Matcher::default().analyze_test_case_coverage(
            &[case("N-1", "anything", "")],
            &[],
            0.7,
        );
        assert_eq!(coverage.matched_cases, 0);
        assert_eq!(coverage.new_cases, 1);
    }
}
