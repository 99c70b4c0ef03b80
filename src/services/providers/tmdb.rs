/// TMDB catalog provider
///
/// All read paths go through the Redis read-through cache. Localized
/// fetches whose text fields come back empty trigger a second request in
/// the fallback locale, and the two payloads are merged before conversion,
/// so consumers always receive one normalized record.
use std::time::Duration;

use reqwest::{Client as HttpClient, StatusCode};
use serde::de::DeserializeOwned;

use crate::{
    cached,
    config::Config,
    db::{Cache, CacheKey},
    error::{AppError, AppResult},
    models::{
        Episode, GenreId, Season, Show, ShowId, TmdbEpisode, TmdbListResponse, TmdbSeason,
        TmdbShow,
    },
    services::providers::CatalogProvider,
};

const SHOW_CACHE_TTL: u64 = 3600; // 1 hour
const SEASON_CACHE_TTL: u64 = 21600; // 6 hours
const SEARCH_CACHE_TTL: u64 = 3600; // 1 hour
const SIMILAR_CACHE_TTL: u64 = 86400; // 1 day
const DISCOVER_CACHE_TTL: u64 = 1800; // 30 minutes

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
    fallback_locale: String,
    cache: Cache,
}

impl TmdbProvider {
    /// Creates a new TMDB provider. The HTTP client carries the configured
    /// request timeout; a timed-out fetch surfaces as an ordinary fetch
    /// failure to callers.
    pub fn new(cache: Cache, config: &Config) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(Duration::from_secs(config.fetch_timeout_secs))
            .build()?;

        Ok(Self {
            http_client,
            api_key: config.tmdb_api_key.clone(),
            api_url: config.tmdb_api_url.clone(),
            fallback_locale: config.fallback_locale.clone(),
            cache,
        })
    }

    /// Performs a GET against the TMDB API. 404 becomes `Ok(None)`, any
    /// other non-success status becomes a catalog error with the body
    /// attached.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> AppResult<Option<T>> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(query)
            .send()
            .await?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Catalog(format!(
                "TMDB API returned status {}: {}",
                status, body
            )));
        }

        Ok(Some(response.json().await?))
    }

    async fn fetch_raw_show(&self, id: ShowId, locale: &str) -> AppResult<Option<TmdbShow>> {
        self.get_json(&format!("/tv/{}", id), &[("language", locale)])
            .await
    }

    async fn fetch_raw_season(
        &self,
        show_id: ShowId,
        season_number: u32,
        locale: &str,
    ) -> AppResult<Option<TmdbSeason>> {
        self.get_json(
            &format!("/tv/{}/season/{}", show_id, season_number),
            &[("language", locale)],
        )
        .await
    }

    /// Fills empty localized text fields from a fallback-locale payload
    fn merge_localized_show(mut localized: TmdbShow, fallback: TmdbShow) -> TmdbShow {
        if localized.overview.is_empty() {
            localized.overview = fallback.overview;
        }
        if localized.name.is_empty() {
            localized.name = fallback.name;
        }
        localized
    }

    /// Fills empty localized episode text from a fallback-locale payload,
    /// matching episodes by catalog id
    fn merge_localized_season(mut localized: TmdbSeason, fallback: TmdbSeason) -> TmdbSeason {
        for episode in &mut localized.episodes {
            if episode.overview.is_empty() || episode.name.is_empty() {
                if let Some(source) = fallback.episodes.iter().find(|e| e.id == episode.id) {
                    if episode.overview.is_empty() {
                        episode.overview = source.overview.clone();
                    }
                    if episode.name.is_empty() {
                        episode.name = source.name.clone();
                    }
                }
            }
        }
        localized
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn fetch_show(&self, id: ShowId, locale: &str) -> AppResult<Option<Show>> {
        cached!(
            self.cache,
            CacheKey::Show(id, locale.to_string()),
            SHOW_CACHE_TTL,
            async move {
                let Some(mut raw) = self.fetch_raw_show(id, locale).await? else {
                    return Ok(None);
                };

                if raw.overview.is_empty() && locale != self.fallback_locale {
                    if let Some(fallback) =
                        self.fetch_raw_show(id, &self.fallback_locale).await?
                    {
                        raw = Self::merge_localized_show(raw, fallback);
                    }
                }

                tracing::debug!(show_id = id, locale = %locale, "Show fetched from TMDB");

                Ok::<_, AppError>(Some(Show::from(raw)))
            }
        )
    }

    async fn fetch_season(
        &self,
        show_id: ShowId,
        season_number: u32,
        locale: &str,
    ) -> AppResult<Option<Season>> {
        cached!(
            self.cache,
            CacheKey::Season(show_id, season_number, locale.to_string()),
            SEASON_CACHE_TTL,
            async move {
                let Some(mut raw) =
                    self.fetch_raw_season(show_id, season_number, locale).await?
                else {
                    return Ok(None);
                };

                let missing_text = raw
                    .episodes
                    .iter()
                    .any(|e| e.overview.is_empty() || e.name.is_empty());
                if missing_text && locale != self.fallback_locale {
                    if let Some(fallback) = self
                        .fetch_raw_season(show_id, season_number, &self.fallback_locale)
                        .await?
                    {
                        raw = Self::merge_localized_season(raw, fallback);
                    }
                }

                Ok::<_, AppError>(Some(Season::from(raw)))
            }
        )
    }

    async fn fetch_episode(
        &self,
        show_id: ShowId,
        season_number: u32,
        episode_number: u32,
        locale: &str,
    ) -> AppResult<Option<Episode>> {
        let raw: Option<TmdbEpisode> = self
            .get_json(
                &format!(
                    "/tv/{}/season/{}/episode/{}",
                    show_id, season_number, episode_number
                ),
                &[("language", locale)],
            )
            .await?;

        Ok(raw.map(Episode::from))
    }

    async fn search_shows(&self, query: &str) -> AppResult<Vec<Show>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }

        cached!(
            self.cache,
            CacheKey::Search(query.to_string()),
            SEARCH_CACHE_TTL,
            async move {
                let response: Option<TmdbListResponse> =
                    self.get_json("/search/tv", &[("query", query)]).await?;

                let shows: Vec<Show> = response
                    .map(|r| r.results.into_iter().map(Show::from).collect())
                    .unwrap_or_default();

                tracing::info!(
                    query = %query,
                    results = shows.len(),
                    provider = "tmdb",
                    "Show search completed"
                );

                Ok::<_, AppError>(shows)
            }
        )
    }

    async fn fetch_similar(&self, show_id: ShowId) -> AppResult<Vec<Show>> {
        cached!(
            self.cache,
            CacheKey::Similar(show_id),
            SIMILAR_CACHE_TTL,
            async move {
                let response: Option<TmdbListResponse> = self
                    .get_json(&format!("/tv/{}/similar", show_id), &[])
                    .await?;

                let shows: Vec<Show> = response
                    .map(|r| r.results.into_iter().map(Show::from).collect())
                    .unwrap_or_default();

                Ok::<_, AppError>(shows)
            }
        )
    }

    async fn fetch_by_genre(&self, genre: Option<GenreId>, page: u32) -> AppResult<Vec<Show>> {
        let page_param = page.to_string();

        cached!(
            self.cache,
            CacheKey::Discover(genre, page),
            DISCOVER_CACHE_TTL,
            async move {
                let response: Option<TmdbListResponse> = match genre {
                    Some(genre_id) => {
                        let genre_param = genre_id.to_string();
                        self.get_json(
                            "/discover/tv",
                            &[
                                ("with_genres", genre_param.as_str()),
                                ("sort_by", "popularity.desc"),
                                ("page", page_param.as_str()),
                            ],
                        )
                        .await?
                    }
                    None => {
                        self.get_json("/trending/tv/week", &[("page", page_param.as_str())])
                            .await?
                    }
                };

                let shows: Vec<Show> = response
                    .map(|r| r.results.into_iter().map(Show::from).collect())
                    .unwrap_or_default();

                tracing::info!(
                    genre = ?genre,
                    page = page,
                    results = shows.len(),
                    provider = "tmdb",
                    "Discover page fetched"
                );

                Ok::<_, AppError>(shows)
            }
        )
    }

    fn name(&self) -> &'static str {
        "tmdb"
    }
}
