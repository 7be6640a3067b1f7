//! Trending store trait and construction.

use std::sync::Arc;

use async_trait::async_trait;
use marquee_catalog::ImageConfig;
use marquee_core::RuntimeMode;
use marquee_core::config::TrendingConfig;

use crate::appwrite::AppwriteTrendingStore;
use crate::errors::TrendingError;
use crate::memory::InMemoryTrendingStore;
use crate::types::{RepresentativeMovie, TrendingEntry};

/// Hit counters keyed by search term.
#[async_trait]
pub trait TrendingStore: Send + Sync + std::fmt::Debug {
    /// Counts one search of `term`.
    ///
    /// Existing entries get `count + 1`; otherwise a new entry with count 1
    /// is created for `movie`. Returns the entry as stored afterwards.
    ///
    /// # Errors
    /// - `TrendingError::Network` - Store unreachable
    /// - `TrendingError::Status` - Store rejected the lookup or write
    /// - `TrendingError::Parse` - Store response could not be decoded
    async fn record_hit(
        &self,
        term: &str,
        movie: &RepresentativeMovie,
    ) -> Result<TrendingEntry, TrendingError>;

    /// Returns up to `n` entries, highest count first.
    ///
    /// # Errors
    /// - `TrendingError::Network` - Store unreachable
    /// - `TrendingError::Status` - Store rejected the listing
    /// - `TrendingError::Parse` - Store response could not be decoded
    async fn list_top(&self, n: usize) -> Result<Vec<TrendingEntry>, TrendingError>;
}

/// Builds the trending store for the runtime mode.
///
/// Production without complete store settings falls back to a process-local
/// store so searching keeps working.
///
/// # Errors
/// - `TrendingError::Configuration` - Store settings present but unusable
pub fn trending_for_config(
    mode: RuntimeMode,
    config: &TrendingConfig,
    images: ImageConfig,
) -> Result<Arc<dyn TrendingStore>, TrendingError> {
    match mode {
        RuntimeMode::Production if config.is_configured() => {
            Ok(Arc::new(AppwriteTrendingStore::new(config, images)?))
        }
        RuntimeMode::Production => {
            tracing::warn!(
                "Trending store is not configured, counting searches in memory for this run"
            );
            Ok(Arc::new(InMemoryTrendingStore::new(images)))
        }
        RuntimeMode::Development => Ok(Arc::new(InMemoryTrendingStore::new(images))),
    }
}
