//! Process-local trending store.

use async_trait::async_trait;
use chrono::Utc;
use marquee_catalog::ImageConfig;
use parking_lot::RwLock;
use uuid::Uuid;

use crate::errors::TrendingError;
use crate::store::TrendingStore;
use crate::types::{RepresentativeMovie, TrendingEntry, rank_entries};

/// Trending counters held in memory for the lifetime of the process.
#[derive(Debug, Default)]
pub struct InMemoryTrendingStore {
    entries: RwLock<Vec<TrendingEntry>>,
    images: ImageConfig,
}

impl InMemoryTrendingStore {
    /// Empty store; `images` resolves poster URLs of new entries.
    pub fn new(images: ImageConfig) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            images,
        }
    }

    /// Number of distinct terms recorded.
    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    /// True until the first hit is recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[async_trait]
impl TrendingStore for InMemoryTrendingStore {
    async fn record_hit(
        &self,
        term: &str,
        movie: &RepresentativeMovie,
    ) -> Result<TrendingEntry, TrendingError> {
        let mut entries = self.entries.write();
        let now = Utc::now();

        if let Some(entry) = entries.iter_mut().find(|e| e.search_term == term) {
            entry.count += 1;
            entry.last_searched = Some(now);
            tracing::debug!(term, count = entry.count, "Trending hit counted");
            return Ok(entry.clone());
        }

        let entry = TrendingEntry {
            id: Uuid::new_v4().to_string(),
            search_term: term.to_string(),
            count: 1,
            movie_id: movie.id,
            title: movie.title.clone(),
            poster_url: movie.poster_url(&self.images),
            last_searched: Some(now),
        };
        tracing::debug!(term, id = %entry.id, "Trending entry created");
        entries.push(entry.clone());
        Ok(entry)
    }

    async fn list_top(&self, n: usize) -> Result<Vec<TrendingEntry>, TrendingError> {
        let mut entries = self.entries.read().clone();
        rank_entries(&mut entries);
        entries.truncate(n);
        Ok(entries)
    }
}
