use crate::models::GenreId;

// TMDB TV genre ids used by the default mood table
pub const GENRE_ACTION_ADVENTURE: GenreId = 10759;
pub const GENRE_ANIMATION: GenreId = 16;
pub const GENRE_COMEDY: GenreId = 35;
pub const GENRE_CRIME: GenreId = 80;
pub const GENRE_DOCUMENTARY: GenreId = 99;
pub const GENRE_DRAMA: GenreId = 18;
pub const GENRE_FAMILY: GenreId = 10751;
pub const GENRE_MYSTERY: GenreId = 9648;
pub const GENRE_SCI_FI_FANTASY: GenreId = 10765;

/// Ordered keyword → genre table for the mood mapper.
///
/// The table is a priority list, not a map: scanning stops at the first
/// keyword contained in the input, so more specific synonyms must be
/// placed before generic ones. Several keywords map to the same genre.
#[derive(Debug, Clone)]
pub struct MoodTable {
    entries: Vec<(String, GenreId)>,
}

impl Default for MoodTable {
    fn default() -> Self {
        // Persian first (the primary audience), Latin synonyms after.
        let entries = [
            ("خندیدم", GENRE_COMEDY),
            ("بخندم", GENRE_COMEDY),
            ("خنده", GENRE_COMEDY),
            ("کمدی", GENRE_COMEDY),
            ("گریه", GENRE_DRAMA),
            ("احساسی", GENRE_DRAMA),
            ("درام", GENRE_DRAMA),
            ("بترسم", GENRE_MYSTERY),
            ("ترسناک", GENRE_MYSTERY),
            ("معمایی", GENRE_MYSTERY),
            ("رازآلود", GENRE_MYSTERY),
            ("هیجان", GENRE_ACTION_ADVENTURE),
            ("اکشن", GENRE_ACTION_ADVENTURE),
            ("ماجراجویی", GENRE_ACTION_ADVENTURE),
            ("علمی تخیلی", GENRE_SCI_FI_FANTASY),
            ("تخیلی", GENRE_SCI_FI_FANTASY),
            ("فانتزی", GENRE_SCI_FI_FANTASY),
            ("جنایی", GENRE_CRIME),
            ("پلیسی", GENRE_CRIME),
            ("مستند", GENRE_DOCUMENTARY),
            ("انیمیشن", GENRE_ANIMATION),
            ("کارتون", GENRE_ANIMATION),
            ("خانوادگی", GENRE_FAMILY),
            ("laugh", GENRE_COMEDY),
            ("funny", GENRE_COMEDY),
            ("comedy", GENRE_COMEDY),
            ("cry", GENRE_DRAMA),
            ("drama", GENRE_DRAMA),
            ("scary", GENRE_MYSTERY),
            ("mystery", GENRE_MYSTERY),
            ("action", GENRE_ACTION_ADVENTURE),
            ("sci-fi", GENRE_SCI_FI_FANTASY),
            ("fantasy", GENRE_SCI_FI_FANTASY),
            ("crime", GENRE_CRIME),
            ("documentary", GENRE_DOCUMENTARY),
            ("animation", GENRE_ANIMATION),
            ("family", GENRE_FAMILY),
        ];

        Self {
            entries: entries
                .into_iter()
                .map(|(keyword, genre)| (keyword.to_string(), genre))
                .collect(),
        }
    }
}

impl MoodTable {
    pub fn new(entries: Vec<(String, GenreId)>) -> Self {
        Self { entries }
    }

    /// Resolves free text to a genre id by scanning the keyword list in
    /// order; the first keyword contained in the text wins. `None` means no
    /// keyword matched and callers should fall back to a trending feed.
    pub fn map_text_to_genre(&self, text: &str) -> Option<GenreId> {
        let text = text.to_lowercase();
        self.entries
            .iter()
            .find(|(keyword, _)| text.contains(keyword.as_str()))
            .map(|(_, genre)| *genre)
    }
}

/// Trigger phrases and stop-words for "like X" similarity requests
#[derive(Debug, Clone)]
pub struct SimilarityLexicon {
    triggers: Vec<String>,
    stop_words: Vec<String>,
}

impl Default for SimilarityLexicon {
    fn default() -> Self {
        Self {
            triggers: ["شبیه", "مثل", "like"]
                .into_iter()
                .map(str::to_string)
                .collect(),
            stop_words: [
                "یه", "یک", "سریال", "فیلم", "معرفی", "کن", "بهم", "به", "من", "برام", "a",
                "series", "show", "something", "recommend", "me",
            ]
            .into_iter()
            .map(str::to_string)
            .collect(),
        }
    }
}

impl SimilarityLexicon {
    pub fn new(triggers: Vec<String>, stop_words: Vec<String>) -> Self {
        Self {
            triggers,
            stop_words,
        }
    }

    /// Extracts a catalog search query from a "like X" request.
    ///
    /// If the text contains a trigger phrase, the trigger and all
    /// stop-words are stripped and the trimmed remainder becomes the
    /// query, provided more than one character survives. Returns `None`
    /// when no trigger is present or too little text remains.
    pub fn resolve_similarity_query(&self, text: &str) -> Option<String> {
        let lowered = text.to_lowercase();
        if !self.triggers.iter().any(|t| lowered.contains(t.as_str())) {
            return None;
        }

        let residue: Vec<&str> = lowered
            .split_whitespace()
            .filter(|token| !self.triggers.iter().any(|t| t == token))
            .filter(|token| !self.stop_words.iter().any(|s| s == token))
            .collect();

        let query = residue.join(" ").trim().to_string();
        if query.chars().count() > 1 {
            Some(query)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_laughing_maps_to_comedy() {
        let table = MoodTable::default();
        assert_eq!(
            table.map_text_to_genre("دیشب خیلی خندیدم، بازم میخوام"),
            Some(GENRE_COMEDY)
        );
    }

    #[test]
    fn test_unmatched_text_returns_none() {
        let table = MoodTable::default();
        assert_eq!(table.map_text_to_genre("یه چیز خوب پیشنهاد بده"), None);
    }

    #[test]
    fn test_first_match_wins() {
        // Both keywords appear; the one earlier in the table decides.
        let table = MoodTable::new(vec![
            ("علمی تخیلی".to_string(), GENRE_SCI_FI_FANTASY),
            ("تخیلی".to_string(), GENRE_ACTION_ADVENTURE),
        ]);

        assert_eq!(
            table.map_text_to_genre("یه سریال علمی تخیلی"),
            Some(GENRE_SCI_FI_FANTASY)
        );
    }

    #[test]
    fn test_latin_keywords_match_case_insensitively() {
        let table = MoodTable::default();
        assert_eq!(
            table.map_text_to_genre("Something FUNNY please"),
            Some(GENRE_COMEDY)
        );
    }

    #[test]
    fn test_similarity_query_extraction() {
        let lexicon = SimilarityLexicon::default();
        assert_eq!(
            lexicon.resolve_similarity_query("یه سریال شبیه بریکینگ بد معرفی کن"),
            Some("بریکینگ بد".to_string())
        );
    }

    #[test]
    fn test_similarity_without_trigger_is_none() {
        let lexicon = SimilarityLexicon::default();
        assert_eq!(
            lexicon.resolve_similarity_query("یه سریال خوب معرفی کن"),
            None
        );
    }

    #[test]
    fn test_similarity_with_empty_residue_is_none() {
        let lexicon = SimilarityLexicon::default();
        assert_eq!(lexicon.resolve_similarity_query("یه سریال شبیه"), None);
    }

    #[test]
    fn test_similarity_single_char_residue_is_none() {
        let lexicon = SimilarityLexicon::default();
        assert_eq!(lexicon.resolve_similarity_query("سریال مثل x"), None);
    }
}
