//! Trending entry types.

use chrono::{DateTime, Utc};
use marquee_catalog::{ImageConfig, MovieId, MovieSummary};
use serde::{Deserialize, Serialize};

/// Movie shown next to a trending term: the top result of its first search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepresentativeMovie {
    /// Catalog id
    pub id: MovieId,
    /// Display title
    pub title: String,
    /// Poster path relative to the image CDN
    pub poster_path: Option<String>,
}

impl RepresentativeMovie {
    /// Poster URL as it is stored with the entry.
    pub fn poster_url(&self, images: &ImageConfig) -> String {
        images.poster_url(self.poster_path.as_deref())
    }
}

impl From<&MovieSummary> for RepresentativeMovie {
    fn from(summary: &MovieSummary) -> Self {
        Self {
            id: summary.id,
            title: summary.title.clone(),
            poster_path: summary.poster_path.clone(),
        }
    }
}

/// Stored hit counter for one search term.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingEntry {
    /// Store-assigned document id
    pub id: String,
    /// Search text exactly as it settled
    pub search_term: String,
    /// Successful searches for the term
    pub count: u64,
    /// Representative movie, kept from the first hit
    pub movie_id: MovieId,
    /// Title of the representative movie
    pub title: String,
    /// Full poster URL of the representative movie
    pub poster_url: String,
    /// Time of the most recent hit, when the store reports it
    pub last_searched: Option<DateTime<Utc>>,
}

/// Orders entries for display: highest count first, ties by recency.
pub fn rank_entries(entries: &mut [TrendingEntry]) {
    entries.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| b.last_searched.cmp(&a.last_searched))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(term: &str, count: u64, seconds: i64) -> TrendingEntry {
        TrendingEntry {
            id: term.to_string(),
            search_term: term.to_string(),
            count,
            movie_id: MovieId(1),
            title: term.to_string(),
            poster_url: String::new(),
            last_searched: DateTime::from_timestamp(seconds, 0),
        }
    }

    #[test]
    fn test_rank_by_count_then_recency() {
        let mut entries = vec![entry("a", 1, 10), entry("b", 5, 1), entry("c", 1, 20)];
        rank_entries(&mut entries);

        let terms: Vec<&str> = entries.iter().map(|e| e.search_term.as_str()).collect();
        assert_eq!(terms, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_representative_from_summary() {
        let summary: MovieSummary = serde_json::from_str(
            r#"{"id": 155, "title": "The Dark Knight", "poster_path": "/tdk.jpg"}"#,
        )
        .unwrap();

        let movie = RepresentativeMovie::from(&summary);
        assert_eq!(movie.id, MovieId(155));
        assert_eq!(
            movie.poster_url(&ImageConfig::new("https://cdn.test/w500", "/none.png")),
            "https://cdn.test/w500/tdk.jpg"
        );
    }
}
