use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use uuid::Uuid;

use crate::{
    db::WatchStore,
    error::AppResult,
    models::{Episode, EpisodeId, ProgressSnapshot, Season, Show, ShowId},
    services::{normalizer::released_episode_count, providers::CatalogProvider},
};

/// Watched-episode input for the aggregator. Two modes are supported:
/// exact, when the released-episode id set is known, and approximate, when
/// only raw watched rows for the show are available.
#[derive(Debug, Clone)]
pub enum WatchedInput<'a> {
    /// Watched ids counted against a known released-episode id set
    Exact {
        watched: &'a [EpisodeId],
        released: &'a HashSet<EpisodeId>,
    },
    /// Raw watched rows when per-episode release status is unavailable;
    /// deduplicated and clamped to the released total
    Approximate(&'a [EpisodeId]),
}

/// Derives a progress snapshot from watched episodes and a released total.
///
/// Deterministic: no hidden state and no time dependence beyond the
/// `released_total` the caller computed against its own reference instant.
/// Duplicate watch rows are deduplicated by episode id before counting, so
/// a replayed insert never double-counts. The percentage rounds
/// half-away-from-zero and is clamped to 0..=100.
pub fn compute_progress(
    show_id: ShowId,
    watched: WatchedInput<'_>,
    released_total: u32,
) -> ProgressSnapshot {
    let released_total = released_total.max(1);

    let watched_count = match watched {
        WatchedInput::Exact { watched, released } => {
            let distinct: HashSet<EpisodeId> = watched.iter().copied().collect();
            distinct.intersection(released).count() as u32
        }
        WatchedInput::Approximate(rows) => {
            let distinct = rows.iter().collect::<HashSet<_>>().len() as u32;
            distinct.min(released_total)
        }
    };

    let percentage = (100.0 * f64::from(watched_count) / f64::from(released_total))
        .round()
        .clamp(0.0, 100.0) as u8;

    ProgressSnapshot {
        show_id,
        watched_count,
        released_total,
        percentage,
        is_complete: percentage >= 100 && released_total > 0,
    }
}

/// Bulk variant over a map of shows; pure fan-out with no cross-show
/// interaction. Produces exactly what the scalar function would per show.
/// Shows whose released total is missing (a failed or filtered-out catalog
/// fetch) are skipped rather than rendered with a misleading zero.
pub fn compute_bulk_progress(
    watched_by_show: &HashMap<ShowId, Vec<EpisodeId>>,
    released_by_show: &HashMap<ShowId, u32>,
) -> HashMap<ShowId, ProgressSnapshot> {
    watched_by_show
        .iter()
        .filter_map(|(show_id, rows)| {
            let released_total = released_by_show.get(show_id)?;
            Some((
                *show_id,
                compute_progress(*show_id, WatchedInput::Approximate(rows), *released_total),
            ))
        })
        .collect()
}

/// True iff every released episode in the season has a watch record.
///
/// A season with zero released episodes is vacuously *not* complete:
/// an un-aired or unloaded season must not show up as trivially done, so
/// callers are expected to have loaded episode metadata before asking.
pub fn is_season_fully_watched(
    episodes: &[Episode],
    watched: &HashSet<EpisodeId>,
    reference: NaiveDate,
) -> bool {
    let released: Vec<&Episode> = episodes
        .iter()
        .filter(|e| e.is_released(reference))
        .collect();

    if released.is_empty() {
        return false;
    }

    released.iter().all(|episode| watched.contains(&episode.id))
}

/// Fetches every regular season of a show concurrently and joins the
/// results. Fetches that fail or return nothing are filtered out before
/// aggregation, never silently coerced into empty seasons.
pub async fn gather_seasons(
    provider: Arc<dyn CatalogProvider>,
    show: &Show,
    locale: &str,
) -> Vec<Season> {
    let mut tasks = Vec::new();

    for season in show.seasons.iter().filter(|s| s.season_number > 0) {
        let provider = Arc::clone(&provider);
        let locale = locale.to_string();
        let show_id = show.id;
        let season_number = season.season_number;

        tasks.push(tokio::spawn(async move {
            provider.fetch_season(show_id, season_number, &locale).await
        }));
    }

    let mut seasons = Vec::new();
    for task in tasks {
        match task.await {
            Ok(Ok(Some(season))) => seasons.push(season),
            Ok(Ok(None)) => {}
            Ok(Err(e)) => {
                tracing::warn!(error = %e, "Season fetch failed, skipping");
            }
            Err(e) => {
                tracing::warn!(error = %e, "Season fetch task join error");
            }
        }
    }

    seasons.sort_by_key(|s| s.season_number);
    seasons
}

/// Full progress snapshot for one (user, show) pair.
///
/// Prefers exact mode: season episode lists are gathered and the watched
/// rows are intersected with the released-episode id set. When no episode
/// metadata could be loaded at all, degrades to approximate mode against
/// the normalized released total so the page still renders.
pub async fn show_progress(
    provider: Arc<dyn CatalogProvider>,
    store: &WatchStore,
    user_id: Uuid,
    show: &Show,
    locale: &str,
) -> AppResult<ProgressSnapshot> {
    let reference = Utc::now().date_naive();
    let released_total = released_episode_count(show, reference);
    let watched_rows = store.watched_episode_ids(user_id, show.id).await?;

    let seasons = gather_seasons(provider, show, locale).await;
    let released_ids: HashSet<EpisodeId> = seasons
        .iter()
        .filter_map(|s| s.episodes.as_ref())
        .flatten()
        .filter(|e| e.is_released(reference))
        .map(|e| e.id)
        .collect();

    let snapshot = if released_ids.is_empty() {
        compute_progress(
            show.id,
            WatchedInput::Approximate(&watched_rows),
            released_total,
        )
    } else {
        compute_progress(
            show.id,
            WatchedInput::Exact {
                watched: &watched_rows,
                released: &released_ids,
            },
            released_total,
        )
    };

    tracing::debug!(
        show_id = show.id,
        watched = snapshot.watched_count,
        released = snapshot.released_total,
        percentage = snapshot.percentage,
        "Progress computed"
    );

    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn episode(id: EpisodeId, air_date: Option<&str>) -> Episode {
        Episode {
            id,
            episode_number: id as u32,
            name: format!("Episode {}", id),
            overview: String::new(),
            air_date: air_date.map(date),
            still_path: None,
            runtime: None,
        }
    }

    #[test]
    fn test_seventy_percent_progress() {
        // Seasons sum to 10 released episodes, 7 watched.
        let watched: Vec<EpisodeId> = (1..=7).collect();
        let released: HashSet<EpisodeId> = (1..=10).collect();

        let snapshot = compute_progress(
            1,
            WatchedInput::Exact {
                watched: &watched,
                released: &released,
            },
            10,
        );

        assert_eq!(snapshot.watched_count, 7);
        assert_eq!(snapshot.released_total, 10);
        assert_eq!(snapshot.percentage, 70);
        assert!(!snapshot.is_complete);
    }

    #[test]
    fn test_complete_show() {
        let watched: Vec<EpisodeId> = (1..=10).collect();
        let released: HashSet<EpisodeId> = (1..=10).collect();

        let snapshot = compute_progress(
            1,
            WatchedInput::Exact {
                watched: &watched,
                released: &released,
            },
            10,
        );

        assert_eq!(snapshot.percentage, 100);
        assert!(snapshot.is_complete);
    }

    #[test]
    fn test_duplicate_watch_rows_are_idempotent() {
        // The same episode reported twice, as after a replayed insert.
        let watched: Vec<EpisodeId> = vec![1, 2, 3, 3, 2, 1];
        let released: HashSet<EpisodeId> = (1..=10).collect();

        let snapshot = compute_progress(
            1,
            WatchedInput::Exact {
                watched: &watched,
                released: &released,
            },
            10,
        );

        assert_eq!(snapshot.watched_count, 3);
        assert_eq!(snapshot.percentage, 30);
    }

    #[test]
    fn test_exact_mode_ignores_unreleased_watch_rows() {
        // A watch row for an episode outside the released set (e.g. a
        // leaked future episode) must not count.
        let watched: Vec<EpisodeId> = vec![1, 2, 99];
        let released: HashSet<EpisodeId> = (1..=10).collect();

        let snapshot = compute_progress(
            1,
            WatchedInput::Exact {
                watched: &watched,
                released: &released,
            },
            10,
        );

        assert_eq!(snapshot.watched_count, 2);
    }

    #[test]
    fn test_approximate_mode_clamps_to_released_total() {
        let watched: Vec<EpisodeId> = (1..=15).collect();

        let snapshot = compute_progress(1, WatchedInput::Approximate(&watched), 10);

        assert_eq!(snapshot.watched_count, 10);
        assert_eq!(snapshot.percentage, 100);
        assert!(snapshot.is_complete);
    }

    #[test]
    fn test_zero_total_floors_at_one() {
        let snapshot = compute_progress(1, WatchedInput::Approximate(&[]), 0);

        assert_eq!(snapshot.released_total, 1);
        assert_eq!(snapshot.percentage, 0);
        assert!(!snapshot.is_complete);
    }

    #[test]
    fn test_rounding_is_half_away_from_zero() {
        let watched: Vec<EpisodeId> = vec![1];
        let released: HashSet<EpisodeId> = (1..=8).collect();

        // 100 * 1 / 8 = 12.5 rounds to 13, not 12.
        let snapshot = compute_progress(
            1,
            WatchedInput::Exact {
                watched: &watched,
                released: &released,
            },
            8,
        );

        assert_eq!(snapshot.percentage, 13);
    }

    #[test]
    fn test_bulk_matches_scalar() {
        let mut watched_by_show = HashMap::new();
        watched_by_show.insert(1u64, vec![10, 11, 11]);
        watched_by_show.insert(2u64, vec![20]);

        let mut released_by_show = HashMap::new();
        released_by_show.insert(1u64, 4);
        released_by_show.insert(2u64, 8);

        let bulk = compute_bulk_progress(&watched_by_show, &released_by_show);

        for (show_id, rows) in &watched_by_show {
            let scalar = compute_progress(
                *show_id,
                WatchedInput::Approximate(rows),
                released_by_show[show_id],
            );
            assert_eq!(bulk[show_id], scalar);
        }
    }

    #[test]
    fn test_bulk_skips_shows_without_released_total() {
        let mut watched_by_show = HashMap::new();
        watched_by_show.insert(1u64, vec![10]);
        watched_by_show.insert(2u64, vec![20]);

        let mut released_by_show = HashMap::new();
        released_by_show.insert(1u64, 4);
        // Show 2's catalog fetch failed; no entry.

        let bulk = compute_bulk_progress(&watched_by_show, &released_by_show);

        assert!(bulk.contains_key(&1));
        assert!(!bulk.contains_key(&2));
    }

    #[test]
    fn test_season_fully_watched() {
        let episodes = vec![
            episode(1, Some("2020-01-01")),
            episode(2, Some("2020-01-08")),
            episode(3, Some("2099-01-01")),
        ];
        let reference = date("2024-06-01");

        let watched: HashSet<EpisodeId> = [1, 2].into_iter().collect();
        assert!(is_season_fully_watched(&episodes, &watched, reference));

        let watched: HashSet<EpisodeId> = [1].into_iter().collect();
        assert!(!is_season_fully_watched(&episodes, &watched, reference));
    }

    #[test]
    fn test_empty_released_set_is_not_complete() {
        let reference = date("2024-06-01");

        // No episodes loaded at all.
        let watched: HashSet<EpisodeId> = [1, 2].into_iter().collect();
        assert!(!is_season_fully_watched(&[], &watched, reference));

        // Episodes loaded but none released yet.
        let episodes = vec![episode(1, Some("2099-01-01")), episode(2, None)];
        assert!(!is_season_fully_watched(&episodes, &watched, reference));
    }
}
