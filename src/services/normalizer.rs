use chrono::NaiveDate;

use crate::models::Show;

/// Canonical released-episode count for a show as of `reference`.
///
/// Sums `episode_count` over regular seasons whose air date has passed.
/// Specials (season 0) are excluded from the canonical count; exclusion is
/// keyed on the season number alone, since localized catalogs do not
/// reliably name the season "Specials".
///
/// When the sum is 0 (no season metadata, or every season is still in the
/// future) the show's reported episode total is used instead, and when that
/// is also unset the count floors at 1: "unknown, assume at least one
/// episode", which keeps downstream percentage math away from a zero
/// divisor.
///
/// Pure function of already-fetched data; no I/O.
pub fn released_episode_count(show: &Show, reference: NaiveDate) -> u32 {
    let from_seasons: u32 = show
        .seasons
        .iter()
        .filter(|season| season.season_number > 0)
        .filter(|season| season.air_date.is_some_and(|d| d <= reference))
        .map(|season| season.episode_count)
        .sum();

    if from_seasons > 0 {
        return from_seasons;
    }

    match show.number_of_episodes {
        Some(total) if total > 0 => total,
        _ => 1,
    }
}
