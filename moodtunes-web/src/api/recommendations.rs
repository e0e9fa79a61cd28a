//! Curated recommendations (classic variant)

use axum::{extract::State, Json};
use moodtunes_common::{MoodSelection, Recommendation};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    pub mood: String,
}

#[derive(Debug, Serialize)]
pub struct RecommendationResponse {
    pub mood: MoodSelection,
    pub recommendations: Vec<Recommendation>,
}

/// POST /api/recommendations
///
/// Sending the same mood again is how the page refreshes.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> ApiResult<Json<RecommendationResponse>> {
    let mood = state
        .moods
        .submit(&request.mood)
        .ok_or_else(|| ApiError::BadRequest("Mood must not be empty".to_string()))?;

    let recommendations = state.recommendations.recommend(&mood).await;
    Ok(Json(RecommendationResponse {
        mood,
        recommendations,
    }))
}
