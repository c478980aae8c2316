//! Attribute selection and weighting for test case comparison.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::normalize::NormalizedRecord;
use crate::record::Attribute;
use crate::similarity::similarity;

/// Per-attribute similarity of one candidate/existing pair.
pub type AttributeSimilarityMap = BTreeMap<Attribute, f64>;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoringConfigError {
    #[error("weight for attribute `{attribute}` must be a finite, non-negative number, got {weight}")]
    InvalidWeight { attribute: Attribute, weight: f64 },
    #[error("weighted scoring needs at least one attribute with a positive weight")]
    NoPositiveWeight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeWeight {
    pub attribute: Attribute,
    pub weight: f64,
}

/// How attribute scores are selected and combined into one score.
///
/// `FixedAttributes` scores all five attributes and takes the unweighted mean.
/// An attribute that is empty on both sides scores `1.0` and pulls the mean
/// up; that behaviour is kept as-is. `Weighted` restricts scoring to the
/// attributes with a positive weight and takes the weighted mean.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScoringStrategy {
    #[default]
    FixedAttributes,
    Weighted { weights: Vec<AttributeWeight> },
}

impl ScoringStrategy {
    pub fn weighted(weights: Vec<AttributeWeight>) -> Result<Self, ScoringConfigError> {
        let strategy = ScoringStrategy::Weighted { weights };
        strategy.check()?;
        Ok(strategy)
    }

    pub fn check(&self) -> Result<(), ScoringConfigError> {
        let ScoringStrategy::Weighted { weights } = self else {
            return Ok(());
        };

        for entry in weights {
            if !entry.weight.is_finite() || entry.weight < 0.0 {
                return Err(ScoringConfigError::InvalidWeight {
                    attribute: entry.attribute,
                    weight: entry.weight,
                });
            }
        }
        if !weights.iter().any(|entry| entry.weight > 0.0) {
            return Err(ScoringConfigError::NoPositiveWeight);
        }
        Ok(())
    }

    /// Attributes that take part in scoring, in canonical order.
    pub fn attributes(&self) -> Vec<Attribute> {
        match self {
            ScoringStrategy::FixedAttributes => Attribute::ALL.to_vec(),
            ScoringStrategy::Weighted { .. } => {
                self.weight_table().into_keys().collect::<Vec<_>>()
            }
        }
    }

    pub fn score_attributes(
        &self,
        candidate: &NormalizedRecord,
        existing: &NormalizedRecord,
    ) -> AttributeSimilarityMap {
        self.attributes()
            .into_iter()
            .map(|attribute| {
                let score = similarity(candidate.get(attribute), existing.get(attribute));
                (attribute, score)
            })
            .collect()
    }

    pub fn aggregate(&self, scores: &AttributeSimilarityMap) -> f64 {
        match self {
            ScoringStrategy::FixedAttributes => {
                if scores.is_empty() {
                    return 0.0;
                }
                scores.values().sum::<f64>() / scores.len() as f64
            }
            ScoringStrategy::Weighted { .. } => {
                let table = self.weight_table();
                let mut weighted = 0.0;
                let mut total_weight = 0.0;
                for (attribute, weight) in &table {
                    if let Some(score) = scores.get(attribute) {
                        weighted += score * weight;
                        total_weight += weight;
                    }
                }
                if total_weight > 0.0 {
                    weighted / total_weight
                } else {
                    0.0
                }
            }
        }
    }

    // Repeated attributes accumulate their weights.
    fn weight_table(&self) -> BTreeMap<Attribute, f64> {
        let mut table = BTreeMap::new();
        if let ScoringStrategy::Weighted { weights } = self {
            for entry in weights.iter().filter(|entry| entry.weight > 0.0) {
                *table.entry(entry.attribute).or_insert(0.0) += entry.weight;
            }
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::TestCaseRecord;

    fn normalized(record: &TestCaseRecord) -> NormalizedRecord {
        NormalizedRecord::from_test_case(record)
    }

    fn weight(attribute: Attribute, weight: f64) -> AttributeWeight {
        AttributeWeight { attribute, weight }
    }

    #[test]
    fn fixed_strategy_scores_all_five_attributes() {
        let a = normalized(&TestCaseRecord::new("login"));
        let b = normalized(&TestCaseRecord::new("logout"));
        let scores = ScoringStrategy::FixedAttributes.score_attributes(&a, &b);

        assert_eq!(scores.len(), 5);
        assert_eq!(scores[&Attribute::Description], 1.0);
        assert!(scores[&Attribute::Name] < 1.0);
    }

    #[test]
    fn fixed_strategy_mean_is_inflated_by_shared_empty_attributes() {
        let a = normalized(&TestCaseRecord::new("abc"));
        let b = normalized(&TestCaseRecord::new("xyz"));
        let strategy = ScoringStrategy::FixedAttributes;
        let scores = strategy.score_attributes(&a, &b);

        // name scores 0.0, the four empty attributes score 1.0 each
        assert_eq!(strategy.aggregate(&scores), 0.8);
    }

    #[test]
    fn asymmetric_presence_lowers_the_score() {
        let a = normalized(&TestCaseRecord::new("abc").with_description("checks login"));
        let b = normalized(&TestCaseRecord::new("abc"));
        let strategy = ScoringStrategy::FixedAttributes;
        let scores = strategy.score_attributes(&a, &b);

        assert_eq!(scores[&Attribute::Description], 0.0);
        assert_eq!(strategy.aggregate(&scores), 0.8);
    }

    #[test]
    fn weighted_strategy_only_scores_weighted_attributes() {
        let strategy = ScoringStrategy::weighted(vec![
            weight(Attribute::Name, 3.0),
            weight(Attribute::Description, 1.0),
            weight(Attribute::Inputs, 0.0),
        ])
        .expect("valid weights");

        let a = normalized(&TestCaseRecord::new("abc").with_description("same"));
        let b = normalized(&TestCaseRecord::new("xyz").with_description("same"));
        let scores = strategy.score_attributes(&a, &b);

        assert_eq!(
            scores.keys().copied().collect::<Vec<_>>(),
            vec![Attribute::Name, Attribute::Description]
        );
        assert_eq!(strategy.aggregate(&scores), 0.25);
    }

    #[test]
    fn repeated_attributes_accumulate_their_weights() {
        let strategy = ScoringStrategy::weighted(vec![
            weight(Attribute::Name, 1.0),
            weight(Attribute::Name, 1.0),
            weight(Attribute::Description, 2.0),
        ])
        .expect("valid weights");

        let a = normalized(&TestCaseRecord::new("abc").with_description("same"));
        let b = normalized(&TestCaseRecord::new("xyz").with_description("same"));
        let scores = strategy.score_attributes(&a, &b);

        assert_eq!(scores.len(), 2);
        // name and description end up with equal weight: (0.0 + 1.0) / 2
        assert_eq!(strategy.aggregate(&scores), 0.5);
    }

    #[test]
    fn weighted_strategy_rejects_bad_weights() {
        let err = ScoringStrategy::weighted(vec![weight(Attribute::Name, -1.0)])
            .expect_err("negative weight");
        assert!(matches!(
            err,
            ScoringConfigError::InvalidWeight {
                attribute: Attribute::Name,
                ..
            }
        ));

        let err = ScoringStrategy::weighted(vec![weight(Attribute::Outputs, f64::NAN)])
            .expect_err("nan weight");
        assert!(matches!(err, ScoringConfigError::InvalidWeight { .. }));

        let err = ScoringStrategy::weighted(vec![weight(Attribute::Name, 0.0)])
            .expect_err("no positive weight");
        assert_eq!(err, ScoringConfigError::NoPositiveWeight);

        let err = ScoringStrategy::weighted(Vec::new()).expect_err("empty weights");
        assert_eq!(err, ScoringConfigError::NoPositiveWeight);
    }

    #[test]
    fn strategy_deserializes_from_tagged_toml() {
        #[derive(Debug, Deserialize)]
        struct Wrapper {
            strategy: ScoringStrategy,
        }

        let fixed: Wrapper = toml::from_str("[strategy]\nkind = \"fixed_attributes\"\n")
            .expect("parse fixed");
        assert_eq!(fixed.strategy, ScoringStrategy::FixedAttributes);

        let weighted: Wrapper = toml::from_str(
            r#"
[strategy]
kind = "weighted"

[[strategy.weights]]
attribute = "name"
weight = 2.0

[[strategy.weights]]
attribute = "requirement_mapping"
weight = 1.0
"#,
        )
        .expect("parse weighted");
        assert_eq!(
            weighted.strategy.attributes(),
            vec![Attribute::Name, Attribute::RequirementMapping]
        );
    }
}
