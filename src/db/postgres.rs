use std::collections::HashMap;

use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use uuid::Uuid;

use crate::{
    error::AppResult,
    models::{EpisodeId, ShowId},
};

/// Creates a PostgreSQL connection pool
///
/// Establishes a pool of database connections for efficient reuse.
/// The pool automatically manages connection lifecycle and limits.
pub async fn create_pool(database_url: &str) -> anyhow::Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(pool)
}

/// Persistence collaborator for per-user watch state.
///
/// Owns the watched-episode, watchlist and favorite tables. The aggregation
/// layer only ever consumes id sets and issues insert/delete intents; the
/// schema itself lives in `migrations/`.
#[derive(Clone)]
pub struct WatchStore {
    pool: PgPool,
}

impl WatchStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Records a watch event. At most one row exists per (user, episode);
    /// replays are ignored rather than double-counted.
    pub async fn mark_watched(
        &self,
        user_id: Uuid,
        show_id: ShowId,
        episode_id: EpisodeId,
    ) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO watched_episodes (user_id, show_id, episode_id)
             VALUES ($1, $2, $3)
             ON CONFLICT (user_id, episode_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(show_id as i64)
        .bind(episode_id as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn unmark_watched(&self, user_id: Uuid, episode_id: EpisodeId) -> AppResult<()> {
        sqlx::query("DELETE FROM watched_episodes WHERE user_id = $1 AND episode_id = $2")
            .bind(user_id)
            .bind(episode_id as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Watched-episode ids for one show. The aggregator deduplicates
    /// defensively, so plain rows are returned as-is.
    pub async fn watched_episode_ids(
        &self,
        user_id: Uuid,
        show_id: ShowId,
    ) -> AppResult<Vec<EpisodeId>> {
        let rows = sqlx::query(
            "SELECT episode_id FROM watched_episodes WHERE user_id = $1 AND show_id = $2",
        )
        .bind(user_id)
        .bind(show_id as i64)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<i64, _>("episode_id") as EpisodeId)
            .collect())
    }

    /// All watched rows for a user, grouped by show. Used by the bulk
    /// progress view so a whole profile renders off one query.
    pub async fn watched_rows_by_show(
        &self,
        user_id: Uuid,
    ) -> AppResult<HashMap<ShowId, Vec<EpisodeId>>> {
        let rows =
            sqlx::query("SELECT show_id, episode_id FROM watched_episodes WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        let mut grouped: HashMap<ShowId, Vec<EpisodeId>> = HashMap::new();
        for row in rows {
            let show_id = row.get::<i64, _>("show_id") as ShowId;
            let episode_id = row.get::<i64, _>("episode_id") as EpisodeId;
            grouped.entry(show_id).or_default().push(episode_id);
        }

        Ok(grouped)
    }

    /// Distinct shows the user has at least one watch event for
    pub async fn watched_show_ids(&self, user_id: Uuid) -> AppResult<Vec<ShowId>> {
        let rows =
            sqlx::query("SELECT DISTINCT show_id FROM watched_episodes WHERE user_id = $1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<i64, _>("show_id") as ShowId)
            .collect())
    }

    pub async fn add_to_watchlist(&self, user_id: Uuid, show_id: ShowId) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO watchlist_entries (user_id, show_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, show_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(show_id as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_from_watchlist(&self, user_id: Uuid, show_id: ShowId) -> AppResult<()> {
        sqlx::query("DELETE FROM watchlist_entries WHERE user_id = $1 AND show_id = $2")
            .bind(user_id)
            .bind(show_id as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn watchlist(&self, user_id: Uuid) -> AppResult<Vec<ShowId>> {
        let rows = sqlx::query(
            "SELECT show_id FROM watchlist_entries WHERE user_id = $1 ORDER BY added_at",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<i64, _>("show_id") as ShowId)
            .collect())
    }

    pub async fn add_favorite(&self, user_id: Uuid, show_id: ShowId) -> AppResult<()> {
        sqlx::query(
            "INSERT INTO favorite_shows (user_id, show_id)
             VALUES ($1, $2)
             ON CONFLICT (user_id, show_id) DO NOTHING",
        )
        .bind(user_id)
        .bind(show_id as i64)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    pub async fn remove_favorite(&self, user_id: Uuid, show_id: ShowId) -> AppResult<()> {
        sqlx::query("DELETE FROM favorite_shows WHERE user_id = $1 AND show_id = $2")
            .bind(user_id)
            .bind(show_id as i64)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    pub async fn favorites(&self, user_id: Uuid) -> AppResult<Vec<ShowId>> {
        let rows =
            sqlx::query("SELECT show_id FROM favorite_shows WHERE user_id = $1 ORDER BY added_at")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows
            .into_iter()
            .map(|row| row.get::<i64, _>("show_id") as ShowId)
            .collect())
    }
}
