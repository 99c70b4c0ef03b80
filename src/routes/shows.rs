use std::collections::HashSet;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    error::{AppError, AppResult},
    models::{Episode, EpisodeId, Show, ShowId},
    routes::AppState,
    services::progress::is_season_fully_watched,
};

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub query: String,
}

/// Handler for catalog search
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchQuery>,
) -> AppResult<Json<Vec<Show>>> {
    let shows = state.provider.search_shows(&params.query).await?;
    Ok(Json(shows))
}

/// Handler for show detail; locale fallback is resolved by the provider
pub async fn detail(
    State(state): State<AppState>,
    Path(show_id): Path<ShowId>,
) -> AppResult<Json<Show>> {
    let show = state
        .provider
        .fetch_show(show_id, &state.locale)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Show {} not found", show_id)))?;

    Ok(Json(show))
}

#[derive(Debug, Deserialize)]
pub struct SeasonQuery {
    pub user_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct EpisodeView {
    #[serde(flatten)]
    pub episode: Episode,
    pub released: bool,
    pub watched: bool,
}

#[derive(Debug, Serialize)]
pub struct SeasonView {
    pub season_number: u32,
    pub name: String,
    pub air_date: Option<NaiveDate>,
    /// True only when a user was given and every released episode is watched
    pub fully_watched: bool,
    pub episodes: Vec<EpisodeView>,
}

/// Handler for a single episode
pub async fn episode(
    State(state): State<AppState>,
    Path((show_id, season_number, episode_number)): Path<(ShowId, u32, u32)>,
) -> AppResult<Json<Episode>> {
    let episode = state
        .provider
        .fetch_episode(show_id, season_number, episode_number, &state.locale)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Episode {}x{} of show {} not found",
                season_number, episode_number, show_id
            ))
        })?;

    Ok(Json(episode))
}

/// Handler for season detail with per-episode watch flags
pub async fn season(
    State(state): State<AppState>,
    Path((show_id, season_number)): Path<(ShowId, u32)>,
    Query(params): Query<SeasonQuery>,
) -> AppResult<Json<SeasonView>> {
    let season = state
        .provider
        .fetch_season(show_id, season_number, &state.locale)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Season {} of show {} not found",
                season_number, show_id
            ))
        })?;

    let reference = Utc::now().date_naive();

    let watched: HashSet<EpisodeId> = match params.user_id {
        Some(user_id) => state
            .store
            .watched_episode_ids(user_id, show_id)
            .await?
            .into_iter()
            .collect(),
        None => HashSet::new(),
    };

    let episodes = season.episodes.unwrap_or_default();
    let fully_watched =
        params.user_id.is_some() && is_season_fully_watched(&episodes, &watched, reference);

    let episode_views = episodes
        .into_iter()
        .map(|episode| EpisodeView {
            released: episode.is_released(reference),
            watched: watched.contains(&episode.id),
            episode,
        })
        .collect();

    Ok(Json(SeasonView {
        season_number: season.season_number,
        name: season.name,
        air_date: season.air_date,
        fully_watched,
        episodes: episode_views,
    }))
}
