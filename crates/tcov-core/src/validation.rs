//! Validation diagnostics for configuration and records.

use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::record::{RequirementRecord, TestCaseRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationLevel {
    Error,
    Warning,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub level: ValidationLevel,
    pub code: &'static str,
    pub message: String,
}

pub trait Validate {
    fn validate(&self) -> Vec<ValidationIssue>;
}

impl Validate for EngineConfig {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        let threshold = self.matching.threshold;
        if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "matching.threshold.out_of_range",
                message: format!("match threshold must be within [0, 1], got {threshold}"),
            });
        } else if threshold < self.thresholds.minimal() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "matching.threshold.below_minimal",
                message: format!(
                    "match threshold {threshold} is below the minimal tier ({}); some reported matches will be classified no_match",
                    self.thresholds.minimal()
                ),
            });
        }

        if let Err(err) = self.matching.strategy.check() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "matching.strategy.invalid",
                message: err.to_string(),
            });
        }

        if self.web.bind.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Error,
                code: "web.bind.empty",
                message: "web bind address must not be empty".to_string(),
            });
        }

        issues
    }
}

impl Validate for TestCaseRecord {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.name.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "test_case.name.empty",
                message: "test case has no name; it scores as an empty attribute".to_string(),
            });
        }

        if self.id.as_deref().map_or(true, |id| id.trim().is_empty()) {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "test_case.id.missing",
                message: format!(
                    "test case '{}' has no id; matches against it cannot be referenced",
                    self.name
                ),
            });
        }

        issues
    }
}

impl Validate for RequirementRecord {
    fn validate(&self) -> Vec<ValidationIssue> {
        let mut issues = Vec::new();

        if self.id.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "requirement.id.empty",
                message: format!("requirement '{}' has no id", self.name),
            });
        }

        if self.name.trim().is_empty() && self.description.trim().is_empty() {
            issues.push(ValidationIssue {
                level: ValidationLevel::Warning,
                code: "requirement.text.empty",
                message: format!(
                    "requirement '{}' has neither name nor description and can never be covered",
                    self.id
                ),
            });
        }

        issues
    }
}
