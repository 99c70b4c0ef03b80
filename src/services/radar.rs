use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    db::WatchStore,
    error::AppResult,
    models::{Provenance, RadarEntry, Show, ShowId, UpcomingShow},
    services::providers::{fetch_shows_batch, CatalogProvider},
};

/// Merges owned and trending upcoming shows into one release calendar.
///
/// Owned shows always appear; trending shows are added only when not
/// already owned. The combined list is sorted ascending by next-episode
/// air date with ties broken by input order (owned before trending), so
/// the merge is idempotent and order-stable for identical inputs.
pub fn merge_radar(owned: Vec<UpcomingShow>, trending: Vec<UpcomingShow>) -> Vec<RadarEntry> {
    let owned_ids: HashSet<ShowId> = owned.iter().map(|s| s.show_id).collect();

    let mut entries: Vec<RadarEntry> = owned
        .into_iter()
        .map(|show| RadarEntry::from_upcoming(show, Provenance::Owned))
        .collect();

    entries.extend(
        trending
            .into_iter()
            .filter(|show| !owned_ids.contains(&show.show_id))
            .map(|show| RadarEntry::from_upcoming(show, Provenance::Trending)),
    );

    entries.sort_by_key(|entry| entry.next_air_date);
    entries
}

fn upcoming_of(show: Show) -> Option<UpcomingShow> {
    let next_air_date = show.next_episode_air_date?;
    Some(UpcomingShow {
        show_id: show.id,
        name: show.name,
        poster_path: show.poster_path,
        next_air_date,
    })
}

/// Builds the radar feed for one user: detail records are fetched for
/// owned shows (watchlist plus watched) and for the trending page, shows
/// without a known next episode are dropped, and the rest are merged.
pub async fn assemble_radar(
    provider: Arc<dyn CatalogProvider>,
    store: &WatchStore,
    user_id: Uuid,
    locale: &str,
) -> AppResult<Vec<RadarEntry>> {
    let mut owned_ids = store.watchlist(user_id).await?;
    for show_id in store.watched_show_ids(user_id).await? {
        if !owned_ids.contains(&show_id) {
            owned_ids.push(show_id);
        }
    }

    let owned: Vec<UpcomingShow> =
        fetch_shows_batch(Arc::clone(&provider), owned_ids, locale)
            .await
            .into_iter()
            .filter_map(upcoming_of)
            .collect();

    // Trending list payloads do not carry next-episode dates, so details
    // are fetched per show; failures just shrink the feed.
    let trending_ids: Vec<ShowId> = match provider.fetch_by_genre(None, 1).await {
        Ok(shows) => shows.iter().map(|s| s.id).collect(),
        Err(e) => {
            tracing::warn!(error = %e, "Trending fetch failed, radar shows owned only");
            Vec::new()
        }
    };

    let trending: Vec<UpcomingShow> = fetch_shows_batch(provider, trending_ids, locale)
        .await
        .into_iter()
        .filter_map(upcoming_of)
        .collect();

    Ok(merge_radar(owned, trending))
}

/// Per-user radar slots guarded by a refresh generation.
///
/// Every refresh takes a ticket stamped with the generation current at
/// dispatch time; a completion is applied only while its ticket is still
/// current, so a superseded refresh can never overwrite a newer one no
/// matter how late its fetches resolve.
#[derive(Default)]
pub struct RadarCache {
    slots: RwLock<HashMap<Uuid, RadarSlot>>,
}

#[derive(Default)]
struct RadarSlot {
    generation: u64,
    feed: Option<Vec<RadarEntry>>,
}

/// Ticket identifying one in-flight refresh
#[derive(Debug, Clone, Copy)]
pub struct RefreshTicket {
    user_id: Uuid,
    generation: u64,
}

impl RadarCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts a refresh, superseding any refresh still in flight for the
    /// same user
    pub async fn begin_refresh(&self, user_id: Uuid) -> RefreshTicket {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(user_id).or_default();
        slot.generation += 1;

        RefreshTicket {
            user_id,
            generation: slot.generation,
        }
    }

    /// Applies a completed refresh. Returns false when the ticket was
    /// superseded, in which case the result is discarded.
    pub async fn commit(&self, ticket: RefreshTicket, feed: Vec<RadarEntry>) -> bool {
        let mut slots = self.slots.write().await;
        let slot = slots.entry(ticket.user_id).or_default();

        if slot.generation != ticket.generation {
            tracing::debug!(
                user_id = %ticket.user_id,
                stale = ticket.generation,
                current = slot.generation,
                "Discarding stale radar refresh"
            );
            return false;
        }

        slot.feed = Some(feed);
        true
    }

    pub async fn get(&self, user_id: Uuid) -> Option<Vec<RadarEntry>> {
        self.slots
            .read()
            .await
            .get(&user_id)
            .and_then(|slot| slot.feed.clone())
    }
}

/// Refreshes and returns a user's radar feed. When the refresh was
/// superseded while in flight, the newer committed feed is served instead
/// of the stale assembly.
pub async fn refresh_radar(
    cache: &RadarCache,
    provider: Arc<dyn CatalogProvider>,
    store: &WatchStore,
    user_id: Uuid,
    locale: &str,
) -> AppResult<Vec<RadarEntry>> {
    let ticket = cache.begin_refresh(user_id).await;
    let feed = assemble_radar(provider, store, user_id, locale).await?;

    if cache.commit(ticket, feed.clone()).await {
        Ok(feed)
    } else {
        Ok(cache.get(user_id).await.unwrap_or(feed))
    }
}
