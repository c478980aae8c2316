//! Candidate-versus-repository comparison.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::classify::{MatchClassifier, MatchType};
use crate::normalize::NormalizedRecord;
use crate::record::TestCaseRecord;
use crate::scoring::{AttributeSimilarityMap, ScoringConfigError, ScoringStrategy};

pub const DEFAULT_MATCH_THRESHOLD: f64 = 0.7;

/// One existing test case that qualified against a candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub existing_id: Option<String>,
    pub similarity_score: f64,
    pub match_type: MatchType,
    pub attribute_similarities: AttributeSimilarityMap,
}

/// Scores candidates against existing test cases and classifies the results.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Matcher {
    classifier: MatchClassifier,
    strategy: ScoringStrategy,
}

impl Matcher {
    pub fn new(
        classifier: MatchClassifier,
        strategy: ScoringStrategy,
    ) -> Result<Self, ScoringConfigError> {
        strategy.check()?;
        Ok(Self {
            classifier,
            strategy,
        })
    }

    pub fn classifier(&self) -> &MatchClassifier {
        &self.classifier
    }

    pub fn strategy(&self) -> &ScoringStrategy {
        &self.strategy
    }

    /// Existing test cases scoring at least `threshold` against `candidate`.
    ///
    /// Results are sorted by descending score; equal scores keep the order of
    /// `existing`. An all-empty candidate or an empty repository yields no
    /// results.
    pub fn compare(
        &self,
        candidate: &TestCaseRecord,
        existing: &[TestCaseRecord],
        threshold: f64,
    ) -> Vec<MatchResult> {
        let candidate_fields = NormalizedRecord::from_test_case(candidate);
        if candidate_fields.is_empty() || existing.is_empty() {
            return Vec::new();
        }

        let mut results = existing
            .iter()
            .filter_map(|record| {
                let existing_fields = NormalizedRecord::from_test_case(record);
                let (score, attribute_similarities) =
                    self.score_normalized(&candidate_fields, &existing_fields);
                (score >= threshold).then(|| MatchResult {
                    existing_id: record.id.clone(),
                    similarity_score: score,
                    match_type: self.classifier.classify_score(score),
                    attribute_similarities,
                })
            })
            .collect::<Vec<_>>();

        // `sort_by` is stable, so ties stay in input order.
        results.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(Ordering::Equal)
        });

        tracing::debug!(
            candidate = %candidate.name,
            existing = existing.len(),
            qualified = results.len(),
            threshold,
            "compared candidate against existing test cases"
        );
        results
    }

    /// Overall score and per-attribute scores for a single pair.
    pub fn score_pair(
        &self,
        candidate: &TestCaseRecord,
        existing: &TestCaseRecord,
    ) -> (f64, AttributeSimilarityMap) {
        self.score_normalized(
            &NormalizedRecord::from_test_case(candidate),
            &NormalizedRecord::from_test_case(existing),
        )
    }

    fn score_normalized(
        &self,
        candidate: &NormalizedRecord,
        existing: &NormalizedRecord,
    ) -> (f64, AttributeSimilarityMap) {
        let scores = self.strategy.score_attributes(candidate, existing);
        (self.strategy.aggregate(&scores), scores)
    }
}
