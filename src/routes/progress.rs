use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{EpisodeId, ProgressSnapshot, ShowId},
    routes::AppState,
    services::{
        normalizer::released_episode_count,
        progress::{compute_bulk_progress, show_progress},
        providers::fetch_shows_batch,
    },
};

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub user_id: Uuid,
}

/// Snapshot rendered when a show's catalog data cannot be resolved:
/// progress shows as 0% / unknown instead of erroring the page.
fn unknown_snapshot(show_id: ShowId) -> ProgressSnapshot {
    ProgressSnapshot {
        show_id,
        watched_count: 0,
        released_total: 1,
        percentage: 0,
        is_complete: false,
    }
}

/// Handler for one show's progress snapshot
pub async fn get_show_progress(
    State(state): State<AppState>,
    Path(show_id): Path<ShowId>,
    Query(params): Query<ProgressQuery>,
) -> AppResult<Json<ProgressSnapshot>> {
    let show = match state.provider.fetch_show(show_id, &state.locale).await {
        Ok(Some(show)) => show,
        Ok(None) => return Ok(Json(unknown_snapshot(show_id))),
        Err(e) => {
            tracing::warn!(error = %e, show_id = show_id, "Show fetch failed for progress");
            return Ok(Json(unknown_snapshot(show_id)));
        }
    };

    let snapshot = show_progress(
        Arc::clone(&state.provider),
        &state.store,
        params.user_id,
        &show,
        &state.locale,
    )
    .await?;

    Ok(Json(snapshot))
}

/// Handler for all of a user's progress snapshots at once.
///
/// Covers every show with watch events plus the watchlist. Detail fetches
/// run as a fan-out; shows whose fetch failed are left out of the response
/// rather than rendered with made-up totals.
pub async fn get_bulk_progress(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> AppResult<Json<Vec<ProgressSnapshot>>> {
    let mut watched_by_show = state.store.watched_rows_by_show(user_id).await?;
    for show_id in state.store.watchlist(user_id).await? {
        watched_by_show.entry(show_id).or_default();
    }

    let show_ids: Vec<ShowId> = watched_by_show.keys().copied().collect();
    let shows = fetch_shows_batch(Arc::clone(&state.provider), show_ids, &state.locale).await;

    let reference = Utc::now().date_naive();
    let released_by_show: HashMap<ShowId, u32> = shows
        .iter()
        .map(|show| (show.id, released_episode_count(show, reference)))
        .collect();

    let mut snapshots: Vec<ProgressSnapshot> =
        compute_bulk_progress(&watched_by_show, &released_by_show)
            .into_values()
            .collect();
    snapshots.sort_by_key(|s| s.show_id);

    Ok(Json(snapshots))
}

#[derive(Debug, Deserialize)]
pub struct MarkWatchedRequest {
    pub user_id: Uuid,
    pub show_id: ShowId,
    pub episode_id: EpisodeId,
}

/// Handler recording a watch event; replays are idempotent
pub async fn mark_watched(
    State(state): State<AppState>,
    Json(request): Json<MarkWatchedRequest>,
) -> AppResult<StatusCode> {
    state
        .store
        .mark_watched(request.user_id, request.show_id, request.episode_id)
        .await?;

    Ok(StatusCode::CREATED)
}

#[derive(Debug, Deserialize)]
pub struct UnmarkWatchedRequest {
    pub user_id: Uuid,
    pub episode_id: EpisodeId,
}

/// Handler removing a watch event
pub async fn unmark_watched(
    State(state): State<AppState>,
    Json(request): Json<UnmarkWatchedRequest>,
) -> AppResult<StatusCode> {
    state
        .store
        .unmark_watched(request.user_id, request.episode_id)
        .await?;

    Ok(StatusCode::NO_CONTENT)
}
