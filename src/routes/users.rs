use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{RadarEntry, ShowId},
    routes::AppState,
    services::radar::refresh_radar,
};

#[derive(Debug, Deserialize)]
pub struct MembershipRequest {
    pub show_id: ShowId,
}

/// Handler for the merged upcoming-release feed
pub async fn radar(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<RadarEntry>>> {
    let feed = refresh_radar(
        &state.radar,
        Arc::clone(&state.provider),
        &state.store,
        user_id,
        &state.locale,
    )
    .await?;

    Ok(Json(feed))
}

pub async fn get_watchlist(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<ShowId>>> {
    Ok(Json(state.store.watchlist(user_id).await?))
}

pub async fn add_to_watchlist(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<MembershipRequest>,
) -> AppResult<StatusCode> {
    state
        .store
        .add_to_watchlist(user_id, request.show_id)
        .await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_from_watchlist(
    State(state): State<AppState>,
    Path((user_id, show_id)): Path<(Uuid, ShowId)>,
) -> AppResult<StatusCode> {
    state.store.remove_from_watchlist(user_id, show_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_favorites(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<ShowId>>> {
    Ok(Json(state.store.favorites(user_id).await?))
}

pub async fn add_favorite(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Json(request): Json<MembershipRequest>,
) -> AppResult<StatusCode> {
    state.store.add_favorite(user_id, request.show_id).await?;
    Ok(StatusCode::CREATED)
}

pub async fn remove_favorite(
    State(state): State<AppState>,
    Path((user_id, show_id)): Path<(Uuid, ShowId)>,
) -> AppResult<StatusCode> {
    state.store.remove_favorite(user_id, show_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
