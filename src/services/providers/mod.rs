use std::sync::Arc;

/// Catalog provider abstraction
///
/// This module decouples the aggregation logic from the metadata source.
/// The provider owns locale-fallback handling and response caching, so the
/// rest of the service only ever sees one normalized Show/Season record.
use crate::{
    error::AppResult,
    models::{Episode, GenreId, Season, Show, ShowId},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for read-only show catalogs
///
/// A `None` return means the catalog does not know the entity; errors mean
/// the fetch itself failed. Callers on aggregation paths are expected to
/// treat both as "no data" rather than propagating a hard failure.
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Fetch a show's detail record, localized with fallback
    async fn fetch_show(&self, id: ShowId, locale: &str) -> AppResult<Option<Show>>;

    /// Fetch one season with its episode list, localized with fallback
    async fn fetch_season(
        &self,
        show_id: ShowId,
        season_number: u32,
        locale: &str,
    ) -> AppResult<Option<Season>>;

    /// Fetch a single episode
    async fn fetch_episode(
        &self,
        show_id: ShowId,
        season_number: u32,
        episode_number: u32,
        locale: &str,
    ) -> AppResult<Option<Episode>>;

    /// Search shows by name
    async fn search_shows(&self, query: &str) -> AppResult<Vec<Show>>;

    /// Catalog-provided "similar to" list for a seed show
    async fn fetch_similar(&self, show_id: ShowId) -> AppResult<Vec<Show>>;

    /// One page of shows for a genre, or the unfiltered trending feed when
    /// no genre is given
    async fn fetch_by_genre(&self, genre: Option<GenreId>, page: u32) -> AppResult<Vec<Show>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Fetches detail records for many shows in parallel.
///
/// Spawns one task per id and joins them all before returning. Fetches
/// that fail or return `None` are dropped from the result, so callers
/// never aggregate over placeholder data.
pub async fn fetch_shows_batch(
    provider: Arc<dyn CatalogProvider>,
    show_ids: Vec<ShowId>,
    locale: &str,
) -> Vec<Show> {
    let mut tasks = Vec::new();

    for show_id in show_ids {
        let provider = Arc::clone(&provider);
        let locale = locale.to_string();
        tasks.push(tokio::spawn(async move {
            provider.fetch_show(show_id, &locale).await
        }));
    }

    let mut shows = Vec::new();
    let mut failures = 0usize;

    for task in tasks {
        match task.await {
            Ok(Ok(Some(show))) => shows.push(show),
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                failures += 1;
                tracing::warn!(error = %e, "Show fetch failed in batch");
            }
            Err(e) => {
                failures += 1;
                tracing::warn!(error = %e, "Show fetch task join error");
            }
        }
    }

    if failures > 0 {
        tracing::warn!(
            success_count = shows.len(),
            failure_count = failures,
            "Partial show batch fetch"
        );
    }

    shows
}
