use std::sync::Arc;

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    models::RecommendationEntry,
    routes::AppState,
    services::ranker,
};

#[derive(Debug, Deserialize)]
pub struct RecommendationRequest {
    /// Free text describing a mood, or a "like X" request
    pub text: String,
}

/// Handler for recommendations endpoint.
///
/// Always answers with a list: upstream failures degrade to fewer (or no)
/// suggestions rather than an error response.
pub async fn recommend(
    State(state): State<AppState>,
    Json(request): Json<RecommendationRequest>,
) -> AppResult<Json<Vec<RecommendationEntry>>> {
    if request.text.trim().is_empty() {
        return Err(AppError::InvalidInput(
            "Recommendation text cannot be empty".to_string(),
        ));
    }

    let entries = ranker::suggest(
        Arc::clone(&state.provider),
        &state.moods,
        &state.lexicon,
        &request.text,
    )
    .await;

    tracing::info!(
        results = entries.len(),
        "Recommendation request completed"
    );

    Ok(Json(entries))
}
