use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tcov_core::{
    CandidateReview, GapRecommendation, OverallCoverage, RequirementRecord, TestCaseRecord,
};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareRequest {
    #[serde(default)]
    pub new_test_cases: Vec<TestCaseRecord>,
    #[serde(default)]
    pub existing_test_cases: Vec<TestCaseRecord>,
    /// Overrides the configured match threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResponse {
    pub generated_at: DateTime<Utc>,
    pub total_new_cases: usize,
    pub matched_cases: usize,
    pub new_cases: usize,
    pub results: Vec<CandidateReview>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapsRequest {
    #[serde(default)]
    pub requirements: Vec<RequirementRecord>,
    #[serde(default)]
    pub test_cases: Vec<TestCaseRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GapsResponse {
    pub generated_at: DateTime<Utc>,
    pub analysis: OverallCoverage,
    pub recommendations: Vec<GapRecommendation>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
