//! Match tiers and the recommendation table built on top of them.
//!
//! A score is classified against an ordered threshold triple, highest tier
//! first, using inclusive `>=` comparisons. Recommendations look only at the
//! single best match of a candidate.

use serde::{Deserialize, Serialize};

use crate::compare::MatchResult;
use crate::record::TestCaseRecord;
use crate::scoring::AttributeSimilarityMap;

pub const DEFAULT_EXACT_THRESHOLD: f64 = 0.9;
pub const DEFAULT_PARTIAL_THRESHOLD: f64 = 0.7;
pub const DEFAULT_MINIMAL_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ThresholdConfigError {
    #[error(
        "classification thresholds must be strictly descending: exact ({exact}) > partial ({partial}) > minimal ({minimal})"
    )]
    NotDescending {
        exact: f64,
        partial: f64,
        minimal: f64,
    },
    #[error("{tier} threshold must be a finite number within [0, 1], got {value}")]
    OutOfRange { tier: MatchType, value: f64 },
}

/// Match tier of a similarity score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchType {
    Exact,
    Partial,
    Minimal,
    NoMatch,
}

impl MatchType {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchType::Exact => "exact",
            MatchType::Partial => "partial",
            MatchType::Minimal => "minimal",
            MatchType::NoMatch => "no_match",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validated `exact > partial > minimal` threshold triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawThresholds", into = "RawThresholds")]
pub struct ClassificationThresholds {
    exact: f64,
    partial: f64,
    minimal: f64,
}

impl ClassificationThresholds {
    pub fn new(exact: f64, partial: f64, minimal: f64) -> Result<Self, ThresholdConfigError> {
        for (tier, value) in [
            (MatchType::Exact, exact),
            (MatchType::Partial, partial),
            (MatchType::Minimal, minimal),
        ] {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(ThresholdConfigError::OutOfRange { tier, value });
            }
        }
        if !(exact > partial && partial > minimal) {
            return Err(ThresholdConfigError::NotDescending {
                exact,
                partial,
                minimal,
            });
        }
        Ok(Self {
            exact,
            partial,
            minimal,
        })
    }

    pub fn exact(&self) -> f64 {
        self.exact
    }

    pub fn partial(&self) -> f64 {
        self.partial
    }

    pub fn minimal(&self) -> f64 {
        self.minimal
    }
}

impl Default for ClassificationThresholds {
    fn default() -> Self {
        Self {
            exact: DEFAULT_EXACT_THRESHOLD,
            partial: DEFAULT_PARTIAL_THRESHOLD,
            minimal: DEFAULT_MINIMAL_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
struct RawThresholds {
    exact: f64,
    partial: f64,
    minimal: f64,
}

impl Default for RawThresholds {
    fn default() -> Self {
        ClassificationThresholds::default().into()
    }
}

impl TryFrom<RawThresholds> for ClassificationThresholds {
    type Error = ThresholdConfigError;

    fn try_from(raw: RawThresholds) -> Result<Self, Self::Error> {
        ClassificationThresholds::new(raw.exact, raw.partial, raw.minimal)
    }
}

impl From<ClassificationThresholds> for RawThresholds {
    fn from(thresholds: ClassificationThresholds) -> Self {
        Self {
            exact: thresholds.exact,
            partial: thresholds.partial,
            minimal: thresholds.minimal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    CreateNew,
    SkipDuplicate,
    ModifyExisting,
    CreateVariation,
}

impl RecommendationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            RecommendationKind::CreateNew => "create_new",
            RecommendationKind::SkipDuplicate => "skip_duplicate",
            RecommendationKind::ModifyExisting => "modify_existing",
            RecommendationKind::CreateVariation => "create_variation",
        }
    }
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecommendation {
    pub recommendation: RecommendationKind,
    pub rationale: String,
    pub action: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub best_match_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similarity_score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_differences: Option<AttributeSimilarityMap>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MatchClassifier {
    thresholds: ClassificationThresholds,
}

impl MatchClassifier {
    pub fn new(thresholds: ClassificationThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> &ClassificationThresholds {
        &self.thresholds
    }

    pub fn classify_score(&self, score: f64) -> MatchType {
        if score >= self.thresholds.exact {
            MatchType::Exact
        } else if score >= self.thresholds.partial {
            MatchType::Partial
        } else if score >= self.thresholds.minimal {
            MatchType::Minimal
        } else {
            MatchType::NoMatch
        }
    }

    pub fn classify_match(&self, result: &MatchResult) -> MatchType {
        self.classify_score(result.similarity_score)
    }

    /// Recommendation for `candidate`, driven by its best match only.
    ///
    /// The best match is the highest-scoring entry; ties go to the earliest
    /// one. `matches` need not be sorted.
    pub fn generate_match_recommendations(
        &self,
        candidate: &TestCaseRecord,
        matches: &[MatchResult],
    ) -> MatchRecommendation {
        let Some(best) = best_match(matches) else {
            return MatchRecommendation {
                recommendation: RecommendationKind::CreateNew,
                rationale: "no similar cases found".to_string(),
                action: "upload as new".to_string(),
                best_match_id: None,
                similarity_score: None,
                attribute_differences: None,
            };
        };

        let tier = self.classify_match(best);
        let existing = best.existing_id.as_deref().unwrap_or("<unidentified>");
        let score = best.similarity_score;
        tracing::debug!(
            candidate = %candidate.name,
            best_match = existing,
            score,
            %tier,
            "deriving match recommendation"
        );

        let (recommendation, rationale, action) = match tier {
            MatchType::Exact => (
                RecommendationKind::SkipDuplicate,
                format!(
                    "'{}' duplicates existing test case {existing} (similarity {score:.2})",
                    candidate.name
                ),
                "do not create; reuse the existing test case".to_string(),
            ),
            MatchType::Partial => (
                RecommendationKind::ModifyExisting,
                format!(
                    "'{}' partially overlaps existing test case {existing} (similarity {score:.2})",
                    candidate.name
                ),
                "review attribute differences and update the existing test case".to_string(),
            ),
            MatchType::Minimal => (
                RecommendationKind::CreateVariation,
                format!(
                    "'{}' is loosely related to existing test case {existing} (similarity {score:.2})",
                    candidate.name
                ),
                format!("upload as a variation referencing {existing}"),
            ),
            MatchType::NoMatch => (
                RecommendationKind::CreateNew,
                format!(
                    "closest existing test case {existing} is too dissimilar (similarity {score:.2})"
                ),
                "upload as new".to_string(),
            ),
        };

        MatchRecommendation {
            recommendation,
            rationale,
            action,
            best_match_id: best.existing_id.clone(),
            similarity_score: Some(score),
            attribute_differences: (tier == MatchType::Partial)
                .then(|| best.attribute_similarities.clone()),
        }
    }
}

fn best_match(matches: &[MatchResult]) -> Option<&MatchResult> {
    matches.iter().fold(None, |best, candidate| match best {
        Some(current) if current.similarity_score >= candidate.similarity_score => Some(current),
        _ => Some(candidate),
    })
}
