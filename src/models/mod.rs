use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

pub mod progress;
pub mod recommendation;

pub use progress::ProgressSnapshot;
pub use recommendation::{Provenance, RadarEntry, RecommendationEntry, UpcomingShow};

/// Catalog identifier for a show (TMDB TV id)
pub type ShowId = u64;
/// Catalog identifier for an episode, globally unique across shows
pub type EpisodeId = u64;
/// Catalog genre identifier
pub type GenreId = u64;

/// Airing status of a show as reported by the catalog
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ShowStatus {
    Airing,
    Ended,
    Unknown,
}

impl ShowStatus {
    fn from_catalog(raw: &str) -> Self {
        match raw {
            "Returning Series" | "In Production" | "Planned" => ShowStatus::Airing,
            "Ended" | "Canceled" => ShowStatus::Ended,
            _ => ShowStatus::Unknown,
        }
    }
}

/// A TV series from the external catalog.
///
/// Read-only from this service's perspective: locale fallback is already
/// resolved by the provider, so downstream aggregation only ever sees one
/// normalized record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Show {
    pub id: ShowId,
    pub name: String,
    pub original_name: String,
    pub overview: String,
    pub poster_path: Option<String>,
    pub backdrop_path: Option<String>,
    pub first_air_date: Option<NaiveDate>,
    pub vote_average: f32,
    pub status: ShowStatus,
    pub genre_ids: Vec<GenreId>,
    pub origin_country: Vec<String>,
    /// Episode total as reported by the catalog, used as a fallback when
    /// season metadata is missing
    pub number_of_episodes: Option<u32>,
    pub seasons: Vec<Season>,
    pub next_episode_air_date: Option<NaiveDate>,
}

/// A season of a show. Season 0 conventionally holds non-canonical specials.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Season {
    pub season_number: u32,
    pub name: String,
    pub air_date: Option<NaiveDate>,
    pub episode_count: u32,
    /// Episode list, lazily fetched via the season endpoint
    pub episodes: Option<Vec<Episode>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Episode {
    pub id: EpisodeId,
    pub episode_number: u32,
    pub name: String,
    pub overview: String,
    pub air_date: Option<NaiveDate>,
    pub still_path: Option<String>,
    pub runtime: Option<u32>,
}

impl Episode {
    /// An episode is released iff its air date has passed relative to the
    /// evaluation instant. Missing air dates are treated as unreleased.
    pub fn is_released(&self, reference: NaiveDate) -> bool {
        self.air_date.is_some_and(|d| d <= reference)
    }
}

// ============================================================================
// TMDB API Types
// ============================================================================

/// TMDB sends dates as strings and uses "" for unknown dates, so the wire
/// types keep them as strings and parsing happens during conversion.
fn parse_air_date(raw: &Option<String>) -> Option<NaiveDate> {
    raw.as_deref()
        .filter(|s| !s.is_empty())
        .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok())
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbGenre {
    pub id: GenreId,
    #[serde(default)]
    #[allow(dead_code)]
    pub name: String,
}

/// Raw show payload from GET /tv/{id} and list endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbShow {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub original_name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub poster_path: Option<String>,
    #[serde(default)]
    pub backdrop_path: Option<String>,
    #[serde(default)]
    pub first_air_date: Option<String>,
    #[serde(default)]
    pub vote_average: f32,
    #[serde(default)]
    pub status: Option<String>,
    /// Detail responses carry genre objects, list responses carry bare ids
    #[serde(default)]
    pub genres: Vec<TmdbGenre>,
    #[serde(default)]
    pub genre_ids: Vec<GenreId>,
    #[serde(default)]
    pub origin_country: Vec<String>,
    #[serde(default)]
    pub number_of_episodes: Option<u32>,
    #[serde(default)]
    pub seasons: Vec<TmdbSeasonStub>,
    #[serde(default)]
    pub next_episode_to_air: Option<TmdbEpisode>,
}

/// Season summary as embedded in a show detail response
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSeasonStub {
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episode_count: u32,
}

/// Full season payload from GET /tv/{id}/season/{n}
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbSeason {
    #[serde(default)]
    pub season_number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub episodes: Vec<TmdbEpisode>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TmdbEpisode {
    pub id: u64,
    #[serde(default)]
    pub episode_number: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default)]
    pub air_date: Option<String>,
    #[serde(default)]
    pub still_path: Option<String>,
    #[serde(default)]
    pub runtime: Option<u32>,
}

/// Paged list wrapper used by search, discover, trending and similar
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbListResponse {
    #[serde(default)]
    pub results: Vec<TmdbShow>,
}

impl From<TmdbShow> for Show {
    fn from(raw: TmdbShow) -> Self {
        // List endpoints localize poorly; fall back to the original name
        // rather than rendering an empty title.
        let name = if raw.name.is_empty() {
            raw.original_name.clone()
        } else {
            raw.name.clone()
        };

        let genre_ids = if raw.genres.is_empty() {
            raw.genre_ids.clone()
        } else {
            raw.genres.iter().map(|g| g.id).collect()
        };

        let status = raw
            .status
            .as_deref()
            .map(ShowStatus::from_catalog)
            .unwrap_or(ShowStatus::Unknown);

        Show {
            id: raw.id,
            name,
            original_name: raw.original_name,
            overview: raw.overview,
            poster_path: raw.poster_path,
            backdrop_path: raw.backdrop_path,
            first_air_date: parse_air_date(&raw.first_air_date),
            vote_average: raw.vote_average,
            status,
            genre_ids,
            origin_country: raw.origin_country,
            number_of_episodes: raw.number_of_episodes,
            seasons: raw.seasons.into_iter().map(Season::from).collect(),
            next_episode_air_date: raw
                .next_episode_to_air
                .and_then(|e| parse_air_date(&e.air_date)),
        }
    }
}

impl From<TmdbSeasonStub> for Season {
    fn from(raw: TmdbSeasonStub) -> Self {
        Season {
            season_number: raw.season_number,
            name: raw.name,
            air_date: parse_air_date(&raw.air_date),
            episode_count: raw.episode_count,
            episodes: None,
        }
    }
}

impl From<TmdbSeason> for Season {
    fn from(raw: TmdbSeason) -> Self {
        let episode_count = raw.episodes.len() as u32;
        Season {
            season_number: raw.season_number,
            name: raw.name,
            air_date: parse_air_date(&raw.air_date),
            episode_count,
            episodes: Some(raw.episodes.into_iter().map(Episode::from).collect()),
        }
    }
}

impl From<TmdbEpisode> for Episode {
    fn from(raw: TmdbEpisode) -> Self {
        Episode {
            id: raw.id,
            episode_number: raw.episode_number,
            name: raw.name,
            overview: raw.overview,
            air_date: parse_air_date(&raw.air_date),
            still_path: raw.still_path,
            runtime: raw.runtime,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_parse_air_date_empty_string() {
        assert_eq!(parse_air_date(&Some(String::new())), None);
        assert_eq!(parse_air_date(&None), None);
        assert_eq!(
            parse_air_date(&Some("2019-11-20".to_string())),
            Some(date("2019-11-20"))
        );
    }

    #[test]
    fn test_episode_release_state() {
        let episode = Episode {
            id: 1,
            episode_number: 1,
            name: "Pilot".to_string(),
            overview: String::new(),
            air_date: Some(date("2024-03-01")),
            still_path: None,
            runtime: Some(45),
        };

        assert!(episode.is_released(date("2024-03-01")));
        assert!(episode.is_released(date("2024-06-01")));
        assert!(!episode.is_released(date("2024-02-28")));
    }

    #[test]
    fn test_episode_without_air_date_is_unreleased() {
        let episode = Episode {
            id: 2,
            episode_number: 9,
            name: "TBA".to_string(),
            overview: String::new(),
            air_date: None,
            still_path: None,
            runtime: None,
        };

        assert!(!episode.is_released(date("2099-01-01")));
    }

    #[test]
    fn test_tmdb_show_deserialization() {
        let json = r#"{
            "id": 1396,
            "name": "برکینگ بد",
            "original_name": "Breaking Bad",
            "overview": "",
            "poster_path": "/poster.jpg",
            "first_air_date": "2008-01-20",
            "vote_average": 8.9,
            "status": "Ended",
            "genres": [{"id": 18, "name": "Drama"}, {"id": 80, "name": "Crime"}],
            "number_of_episodes": 62,
            "seasons": [
                {"season_number": 0, "name": "Specials", "air_date": "2009-02-17", "episode_count": 10},
                {"season_number": 1, "name": "Season 1", "air_date": "2008-01-20", "episode_count": 7}
            ]
        }"#;

        let raw: TmdbShow = serde_json::from_str(json).unwrap();
        let show = Show::from(raw);

        assert_eq!(show.id, 1396);
        assert_eq!(show.name, "برکینگ بد");
        assert_eq!(show.status, ShowStatus::Ended);
        assert_eq!(show.genre_ids, vec![18, 80]);
        assert_eq!(show.number_of_episodes, Some(62));
        assert_eq!(show.seasons.len(), 2);
        assert_eq!(show.seasons[1].episode_count, 7);
        assert_eq!(show.seasons[1].air_date, Some(date("2008-01-20")));
        assert!(show.seasons[1].episodes.is_none());
    }

    #[test]
    fn test_show_name_falls_back_to_original_name() {
        let raw = TmdbShow {
            id: 100,
            name: String::new(),
            original_name: "Dark".to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            first_air_date: Some(String::new()),
            vote_average: 0.0,
            status: None,
            genres: vec![],
            genre_ids: vec![10765],
            origin_country: vec!["DE".to_string()],
            number_of_episodes: None,
            seasons: vec![],
            next_episode_to_air: None,
        };

        let show = Show::from(raw);
        assert_eq!(show.name, "Dark");
        assert_eq!(show.first_air_date, None);
        assert_eq!(show.status, ShowStatus::Unknown);
        assert_eq!(show.genre_ids, vec![10765]);
    }

    #[test]
    fn test_full_season_conversion_counts_listed_episodes() {
        let json = r#"{
            "season_number": 1,
            "name": "فصل ۱",
            "air_date": "2020-05-01",
            "episodes": [
                {"id": 11, "episode_number": 1, "name": "One", "air_date": "2020-05-01"},
                {"id": 12, "episode_number": 2, "name": "Two", "air_date": ""}
            ]
        }"#;

        let raw: TmdbSeason = serde_json::from_str(json).unwrap();
        let season = Season::from(raw);

        assert_eq!(season.episode_count, 2);
        let episodes = season.episodes.unwrap();
        assert_eq!(episodes[0].air_date, Some(date("2020-05-01")));
        assert_eq!(episodes[1].air_date, None);
    }

    #[test]
    fn test_show_status_from_catalog() {
        assert_eq!(
            ShowStatus::from_catalog("Returning Series"),
            ShowStatus::Airing
        );
        assert_eq!(ShowStatus::from_catalog("Canceled"), ShowStatus::Ended);
        assert_eq!(ShowStatus::from_catalog("Pilot"), ShowStatus::Unknown);
    }
}
