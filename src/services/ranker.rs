use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::thread_rng;

use crate::{
    models::{Provenance, RecommendationEntry, Show},
    services::{
        mood::{MoodTable, SimilarityLexicon},
        providers::CatalogProvider,
    },
};

/// Upper bound on entries returned by any suggestion path
pub const MAX_SUGGESTIONS: usize = 10;

/// Produces a suggestion list for free text.
///
/// A "like X" request takes the similarity path; everything else goes
/// through the mood mapper. Every branch degrades to fewer suggestions on
/// upstream failure, never to an error: the worst case is an empty list.
pub async fn suggest(
    provider: Arc<dyn CatalogProvider>,
    moods: &MoodTable,
    lexicon: &SimilarityLexicon,
    text: &str,
) -> Vec<RecommendationEntry> {
    if let Some(query) = lexicon.resolve_similarity_query(text) {
        if let Some(entries) = suggest_similar(Arc::clone(&provider), &query).await {
            return entries;
        }
        // No usable seed: degrade to the trending feed instead of failing.
        return trending_fallback(provider).await;
    }

    suggest_by_mood(provider, moods, text).await
}

/// Mood/genre strategy: resolve the text to a genre and pull one discover
/// page, shuffled for variety. Unresolved text and failed genre fetches
/// both degrade to the trending feed.
pub async fn suggest_by_mood(
    provider: Arc<dyn CatalogProvider>,
    moods: &MoodTable,
    text: &str,
) -> Vec<RecommendationEntry> {
    let Some(genre_id) = moods.map_text_to_genre(text) else {
        return trending_fallback(provider).await;
    };

    match provider.fetch_by_genre(Some(genre_id), 1).await {
        Ok(shows) => shuffled_entries(shows, Provenance::GenreMatch),
        Err(e) => {
            tracing::warn!(
                error = %e,
                genre_id = genre_id,
                "Genre fetch failed, falling back to trending"
            );
            trending_fallback(provider).await
        }
    }
}

/// Similarity strategy: search the catalog for the extracted query, take
/// the top hit as seed and return its similar shows, attributed to the
/// seed's display name. `None` means no seed could be resolved.
pub async fn suggest_similar(
    provider: Arc<dyn CatalogProvider>,
    query: &str,
) -> Option<Vec<RecommendationEntry>> {
    let hits = match provider.search_shows(query).await {
        Ok(hits) => hits,
        Err(e) => {
            tracing::warn!(error = %e, query = %query, "Seed search failed");
            return None;
        }
    };

    let seed = hits.into_iter().next()?;

    let similar = match provider.fetch_similar(seed.id).await {
        Ok(similar) => similar,
        Err(e) => {
            tracing::warn!(error = %e, seed_id = seed.id, "Similar fetch failed");
            return None;
        }
    };

    tracing::info!(
        seed_id = seed.id,
        seed_name = %seed.name,
        results = similar.len(),
        "Similarity suggestions resolved"
    );

    let entries = similar
        .into_iter()
        .take(MAX_SUGGESTIONS)
        .map(|show| RecommendationEntry {
            show,
            provenance: Provenance::Similar,
            similar_to: Some(seed.name.clone()),
        })
        .collect();

    Some(entries)
}

/// Unfiltered trending feed; a failure here yields an empty list
async fn trending_fallback(provider: Arc<dyn CatalogProvider>) -> Vec<RecommendationEntry> {
    match provider.fetch_by_genre(None, 1).await {
        Ok(shows) => shuffled_entries(shows, Provenance::Trending),
        Err(e) => {
            tracing::warn!(error = %e, "Trending fetch failed, returning no suggestions");
            Vec::new()
        }
    }
}

fn shuffled_entries(mut shows: Vec<Show>, provenance: Provenance) -> Vec<RecommendationEntry> {
    shows.shuffle(&mut thread_rng());
    shows.truncate(MAX_SUGGESTIONS);
    shows
        .into_iter()
        .map(|show| RecommendationEntry {
            show,
            provenance,
            similar_to: None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::ShowStatus;
    use crate::services::providers::MockCatalogProvider;
    use mockall::predicate::eq;

    fn sample_show(id: u64, name: &str) -> Show {
        Show {
            id,
            name: name.to_string(),
            original_name: name.to_string(),
            overview: String::new(),
            poster_path: None,
            backdrop_path: None,
            first_air_date: None,
            vote_average: 7.5,
            status: ShowStatus::Airing,
            genre_ids: vec![],
            origin_country: vec![],
            number_of_episodes: None,
            seasons: vec![],
            next_episode_air_date: None,
        }
    }

    fn sample_shows(count: u64) -> Vec<Show> {
        (1..=count)
            .map(|id| sample_show(id, &format!("Show {}", id)))
            .collect()
    }

    #[tokio::test]
    async fn test_mood_match_returns_genre_tagged_entries() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_by_genre()
            .with(eq(Some(35)), eq(1))
            .returning(|_, _| Ok(sample_shows(15)));

        let provider: Arc<dyn CatalogProvider> = Arc::new(mock);
        let entries =
            suggest_by_mood(provider, &MoodTable::default(), "دیشب کلی خندیدم").await;

        assert_eq!(entries.len(), MAX_SUGGESTIONS);
        assert!(entries
            .iter()
            .all(|e| e.provenance == Provenance::GenreMatch && e.similar_to.is_none()));
    }

    #[tokio::test]
    async fn test_unmatched_mood_falls_back_to_trending() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_by_genre()
            .with(eq(None), eq(1))
            .returning(|_, _| Ok(sample_shows(3)));

        let provider: Arc<dyn CatalogProvider> = Arc::new(mock);
        let entries =
            suggest_by_mood(provider, &MoodTable::default(), "هیچ کلمه آشنایی نیست").await;

        assert_eq!(entries.len(), 3);
        assert!(entries.iter().all(|e| e.provenance == Provenance::Trending));
    }

    #[tokio::test]
    async fn test_genre_fetch_failure_degrades_to_trending() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_by_genre()
            .with(eq(Some(35)), eq(1))
            .returning(|_, _| Err(AppError::Catalog("boom".to_string())));
        mock.expect_fetch_by_genre()
            .with(eq(None), eq(1))
            .returning(|_, _| Ok(sample_shows(2)));

        let provider: Arc<dyn CatalogProvider> = Arc::new(mock);
        let entries = suggest_by_mood(provider, &MoodTable::default(), "کمدی").await;

        assert_eq!(entries.len(), 2);
        assert!(entries.iter().all(|e| e.provenance == Provenance::Trending));
    }

    #[tokio::test]
    async fn test_total_failure_yields_empty_list() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_fetch_by_genre()
            .returning(|_, _| Err(AppError::Catalog("down".to_string())));

        let provider: Arc<dyn CatalogProvider> = Arc::new(mock);
        let entries = suggest_by_mood(provider, &MoodTable::default(), "کمدی").await;

        assert!(entries.is_empty());
    }

    #[tokio::test]
    async fn test_similarity_path_attributes_seed() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_search_shows()
            .with(eq("بریکینگ بد"))
            .returning(|_| Ok(vec![sample_show(1396, "Breaking Bad")]));
        mock.expect_fetch_similar()
            .with(eq(1396))
            .returning(|_| Ok(sample_shows(12)));

        let provider: Arc<dyn CatalogProvider> = Arc::new(mock);
        let entries = suggest(
            provider,
            &MoodTable::default(),
            &SimilarityLexicon::default(),
            "یه سریال شبیه بریکینگ بد معرفی کن",
        )
        .await;

        assert_eq!(entries.len(), MAX_SUGGESTIONS);
        assert!(entries.iter().all(|e| {
            e.provenance == Provenance::Similar
                && e.similar_to.as_deref() == Some("Breaking Bad")
        }));
    }

    #[tokio::test]
    async fn test_similarity_without_seed_falls_back_to_trending() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_search_shows().returning(|_| Ok(vec![]));
        mock.expect_fetch_by_genre()
            .with(eq(None), eq(1))
            .returning(|_, _| Ok(sample_shows(4)));

        let provider: Arc<dyn CatalogProvider> = Arc::new(mock);
        let entries = suggest(
            provider,
            &MoodTable::default(),
            &SimilarityLexicon::default(),
            "یه سریال شبیه ناشناخته",
        )
        .await;

        assert_eq!(entries.len(), 4);
        assert!(entries.iter().all(|e| e.provenance == Provenance::Trending));
    }

    #[tokio::test]
    async fn test_similar_results_keep_catalog_order() {
        let mut mock = MockCatalogProvider::new();
        mock.expect_search_shows()
            .returning(|_| Ok(vec![sample_show(1, "Seed")]));
        mock.expect_fetch_similar()
            .returning(|_| Ok(sample_shows(3)));

        let provider: Arc<dyn CatalogProvider> = Arc::new(mock);
        let entries = suggest_similar(provider, "seed").await.unwrap();

        let ids: Vec<u64> = entries.iter().map(|e| e.show.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }
}
