use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Show, ShowId};

/// Why a show ended up in a suggestion or radar feed
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Provenance {
    /// On the user's watchlist or already watched
    Owned,
    /// Globally trending, not tied to the user's taste
    Trending,
    /// Catalog-provided "similar to" a seed show
    Similar,
    /// Matched a mood keyword's genre
    GenreMatch,
}

/// A single ranked suggestion. Created per request and discarded after
/// rendering.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RecommendationEntry {
    pub show: Show,
    pub provenance: Provenance,
    /// Display name of the seed show, set on `Similar` entries so the UI
    /// can attribute the suggestion
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub similar_to: Option<String>,
}

/// Input to the radar merge: a show with a known upcoming episode date
#[derive(Debug, Clone, PartialEq)]
pub struct UpcomingShow {
    pub show_id: ShowId,
    pub name: String,
    pub poster_path: Option<String>,
    pub next_air_date: NaiveDate,
}

/// One row of the merged release calendar
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RadarEntry {
    pub show_id: ShowId,
    pub name: String,
    pub poster_path: Option<String>,
    pub next_air_date: NaiveDate,
    pub provenance: Provenance,
}

impl RadarEntry {
    pub fn from_upcoming(show: UpcomingShow, provenance: Provenance) -> Self {
        Self {
            show_id: show.show_id,
            name: show.name,
            poster_path: show.poster_path,
            next_air_date: show.next_air_date,
            provenance,
        }
    }
}
