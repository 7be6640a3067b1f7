//! Centralized configuration for Marquee.
//!
//! All endpoints, credentials and timing knobs are defined here to avoid
//! hard-coded values scattered throughout the codebase. Credentials are only
//! ever read from the environment.

use std::time::Duration;

use crate::mode::RuntimeMode;
use crate::{MarqueeError, Result};

/// Central configuration for all Marquee components.
#[derive(Debug, Clone, Default)]
pub struct MarqueeConfig {
    pub mode: RuntimeMode,
    pub catalog: CatalogConfig,
    pub trending: TrendingConfig,
    pub search: SearchConfig,
}

/// Movie catalog (TMDB) configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// API root, without trailing slash
    pub base_url: String,
    /// Bearer token for the `Authorization` header
    pub access_token: Option<String>,
    /// CDN prefix that poster paths are appended to
    pub image_base_url: String,
    /// Image shown when a movie has no poster
    pub placeholder_poster_url: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.themoviedb.org/3".to_string(),
            access_token: None,
            image_base_url: "https://image.tmdb.org/t/p/w500".to_string(),
            placeholder_poster_url: "https://placehold.co/500x750/0f0d23/cecefb?text=No+Image"
                .to_string(),
        }
    }
}

/// Hosted trending-search store configuration.
///
/// Targets an Appwrite-compatible document API. Project, database and
/// collection must all be set for the hosted store to be usable.
#[derive(Debug, Clone)]
pub struct TrendingConfig {
    /// API root, e.g. `https://cloud.appwrite.io/v1`
    pub endpoint: String,
    pub project_id: Option<String>,
    /// Server key; optional when the collection allows guest writes
    pub api_key: Option<String>,
    pub database_id: Option<String>,
    pub collection_id: Option<String>,
    /// Number of entries shown in the trending panel
    pub top_n: usize,
}

impl Default for TrendingConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://cloud.appwrite.io/v1".to_string(),
            project_id: None,
            api_key: None,
            database_id: None,
            collection_id: None,
            top_n: 5,
        }
    }
}

impl TrendingConfig {
    /// True when every identifier the hosted store needs is present.
    pub fn is_configured(&self) -> bool {
        self.project_id.is_some() && self.database_id.is_some() && self.collection_id.is_some()
    }
}

/// Search input behaviour.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    /// Quiet interval before a typed query is sent
    pub debounce: Duration,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
        }
    }
}

impl MarqueeConfig {
    /// Creates configuration with environment variable overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Creates configuration from an arbitrary key lookup.
    ///
    /// Unparseable numeric values are ignored and the default is kept.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(mode) = lookup("MARQUEE_MODE")
            && let Ok(mode) = mode.parse::<RuntimeMode>()
        {
            config.mode = mode;
        }

        // Catalog overrides
        config.catalog.access_token = lookup("TMDB_ACCESS_TOKEN").filter(|t| !t.is_empty());
        if let Some(base_url) = lookup("MARQUEE_TMDB_BASE_URL") {
            config.catalog.base_url = base_url.trim_end_matches('/').to_string();
        }
        if let Some(image_base) = lookup("MARQUEE_IMAGE_BASE_URL") {
            config.catalog.image_base_url = image_base.trim_end_matches('/').to_string();
        }

        // Trending store overrides
        if let Some(endpoint) = lookup("APPWRITE_ENDPOINT") {
            config.trending.endpoint = endpoint.trim_end_matches('/').to_string();
        }
        config.trending.project_id = lookup("APPWRITE_PROJECT_ID");
        config.trending.api_key = lookup("APPWRITE_API_KEY");
        config.trending.database_id = lookup("APPWRITE_DATABASE_ID");
        config.trending.collection_id = lookup("APPWRITE_COLLECTION_ID");
        if let Some(limit) = lookup("MARQUEE_TRENDING_LIMIT")
            && let Ok(count) = limit.parse::<usize>()
        {
            config.trending.top_n = count;
        }

        // Search overrides
        if let Some(debounce) = lookup("MARQUEE_DEBOUNCE_MS")
            && let Ok(millis) = debounce.parse::<u64>()
        {
            config.search.debounce = Duration::from_millis(millis);
        }

        config
    }

    /// Creates a configuration optimized for testing.
    pub fn for_testing() -> Self {
        Self {
            mode: RuntimeMode::Development,
            search: SearchConfig {
                debounce: Duration::from_millis(20),
            },
            ..Default::default()
        }
    }

    /// Checks that production mode has what it needs to reach the catalog.
    ///
    /// # Errors
    ///
    /// - `MarqueeError::Configuration` - Production mode without a TMDB token,
    ///   or a zero-sized trending panel
    pub fn validate(&self) -> Result<()> {
        if self.mode.is_production() && self.catalog.access_token.is_none() {
            return Err(MarqueeError::Configuration {
                reason: "TMDB_ACCESS_TOKEN is not set".to_string(),
            });
        }
        if self.trending.top_n == 0 {
            return Err(MarqueeError::Configuration {
                reason: "trending limit must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
