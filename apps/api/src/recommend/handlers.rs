use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::models::problem::ProblemSummary;
use crate::recommend::{suggest, DEFAULT_TOP_K};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendRequest {
    pub done: Vec<ProblemSummary>,
    pub all: Vec<ProblemSummary>,
    #[serde(default)]
    pub preferred_tag: Option<String>,
    #[serde(default)]
    pub top_k: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendResponse {
    pub suggestions: Vec<ProblemSummary>,
    pub scorer_backend: String,
}

/// POST /api/recommend
///
/// Body problems use the summary view of `/api/acceptedQuestion`.
pub async fn handle_recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendRequest>,
) -> Result<Json<RecommendResponse>, AppError> {
    let top_k = request.top_k.unwrap_or(DEFAULT_TOP_K);
    if top_k == 0 {
        return Err(AppError::Validation("topK must be at least 1".to_string()));
    }

    let suggestions = suggest(
        state.scorer.as_ref(),
        &request.done,
        &request.all,
        request.preferred_tag.as_deref(),
        top_k,
    )
    .await?;

    Ok(Json(RecommendResponse {
        suggestions,
        scorer_backend: state.scorer.backend().to_string(),
    }))
}
