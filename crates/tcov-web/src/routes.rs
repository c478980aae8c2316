use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use tcov_core::GapAnalyzer;

use crate::error::WebError;
use crate::model::{CompareRequest, CompareResponse, GapsRequest, GapsResponse};
use crate::state::WebState;

pub fn router(state: WebState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/compare", post(compare))
        .route("/api/gaps", post(gaps))
        .with_state(state)
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "ok": true }))
}

async fn compare(
    State(state): State<WebState>,
    payload: Result<Json<CompareRequest>, JsonRejection>,
) -> Result<Json<CompareResponse>, WebError> {
    let Json(request) = payload.map_err(rejection_to_error)?;
    let threshold = request.threshold.unwrap_or_else(|| state.match_threshold());
    if !threshold.is_finite() || !(0.0..=1.0).contains(&threshold) {
        return Err(WebError::BadRequest(format!(
            "threshold must be within [0, 1], got {threshold}"
        )));
    }

    let results = state.matcher().review_candidates(
        &request.new_test_cases,
        &request.existing_test_cases,
        threshold,
    );

    let matched_cases = results.iter().filter(|x| !x.matches.is_empty()).count();
    tracing::info!(
        new = request.new_test_cases.len(),
        existing = request.existing_test_cases.len(),
        matched = matched_cases,
        threshold,
        "compare request served"
    );

    Ok(Json(CompareResponse {
        generated_at: Utc::now(),
        total_new_cases: results.len(),
        matched_cases,
        new_cases: results.len() - matched_cases,
        results,
    }))
}

async fn gaps(
    payload: Result<Json<GapsRequest>, JsonRejection>,
) -> Result<Json<GapsResponse>, WebError> {
    let Json(request) = payload.map_err(rejection_to_error)?;
    let analyzer = GapAnalyzer::new(&request.requirements, &request.test_cases);
    let analysis = analyzer.analyze_overall_coverage();
    let recommendations = analyzer.generate_gap_recommendations();

    Ok(Json(GapsResponse {
        generated_at: Utc::now(),
        analysis,
        recommendations,
    }))
}

fn rejection_to_error(rejection: JsonRejection) -> WebError {
    WebError::BadRequest(rejection.body_text())
}
