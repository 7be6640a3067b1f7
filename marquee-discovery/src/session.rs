//! One discovery session: search box, movie list, trending panel and detail
//! view wired together.

use std::sync::Arc;
use std::time::Duration;

use marquee_catalog::{CatalogClient, Genre, ImageConfig, MovieId, catalog_for_mode};
use marquee_core::{Debouncer, MarqueeConfig, ResultState};
use marquee_trending::{TrendingEntry, TrendingStore, trending_for_config};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::detail::{DetailOrchestrator, DetailView, MovieDetailBundle};
use crate::genres::GenreTable;
use crate::query::{ListView, MovieListState, QueryOrchestrator};
use crate::Result;

/// Session tuning.
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Quiet interval of the search box
    pub debounce: Duration,
    /// Entries shown in the trending panel
    pub trending_limit: usize,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(500),
            trending_limit: 5,
        }
    }
}

impl From<&MarqueeConfig> for SessionOptions {
    fn from(config: &MarqueeConfig) -> Self {
        Self {
            debounce: config.search.debounce,
            trending_limit: config.trending.top_n,
        }
    }
}

/// Running discovery session.
///
/// Typed text goes through the debouncer; each stabilized query is run in
/// its own task so a slow response never holds back a newer one. Dropping
/// the session stops the query driver.
#[derive(Debug)]
pub struct DiscoverySession {
    query: Arc<QueryOrchestrator>,
    detail: Arc<DetailOrchestrator>,
    genres: Arc<GenreTable>,
    trending: Arc<dyn TrendingStore>,
    trending_panel: watch::Sender<Vec<TrendingEntry>>,
    trending_limit: usize,
    search_box: Debouncer<String>,
    driver: JoinHandle<()>,
}

impl DiscoverySession {
    /// Builds catalog and trending store for the configured mode and starts
    /// a session over them.
    ///
    /// # Errors
    /// - `DiscoveryError::Catalog` - Catalog client could not be built
    /// - `DiscoveryError::Trending` - Trending store could not be built
    pub async fn from_config(config: &MarqueeConfig) -> Result<Self> {
        let catalog = catalog_for_mode(config.mode, &config.catalog)?;
        let trending = trending_for_config(
            config.mode,
            &config.trending,
            ImageConfig::from_config(&config.catalog),
        )?;
        tracing::info!(mode = %config.mode, "Starting discovery session");
        Ok(Self::start(catalog, trending, SessionOptions::from(config)).await)
    }

    /// Starts a session: loads genres and the trending panel and runs the
    /// initial empty query, all concurrently.
    ///
    /// Genre and trending failures are logged; the session starts anyway.
    pub async fn start(
        catalog: Arc<dyn CatalogClient>,
        trending: Arc<dyn TrendingStore>,
        options: SessionOptions,
    ) -> Self {
        let genres = Arc::new(GenreTable::new());
        let query = Arc::new(QueryOrchestrator::new(
            Arc::clone(&catalog),
            Arc::clone(&trending),
        ));
        let detail = Arc::new(DetailOrchestrator::new(
            Arc::clone(&catalog),
            Arc::clone(&genres),
        ));
        let (trending_panel, _) = watch::channel(Vec::new());

        let (search_box, stabilized) = Debouncer::with_initial(options.debounce, String::new());
        let driver = tokio::spawn(drive_queries(Arc::clone(&query), stabilized));

        let session = Self {
            query,
            detail,
            genres,
            trending,
            trending_panel,
            trending_limit: options.trending_limit,
            search_box,
            driver,
        };

        let (genre_load, _, _) = tokio::join!(
            session.genres.load(catalog.as_ref()),
            session.refresh_trending(),
            session.query.run_query(""),
        );
        if let Err(e) = genre_load {
            tracing::warn!(error = %e, "Genre list unavailable, detail genres may be incomplete");
        }

        session
    }

    /// Feeds one raw edit of the search box.
    ///
    /// Returns `false` if the session's query driver has stopped.
    pub fn type_query(&self, raw: impl Into<String>) -> bool {
        self.search_box.push(raw.into())
    }

    /// Runs a query immediately, bypassing the debouncer.
    pub async fn submit_query(&self, text: &str) -> MovieListState {
        self.query.run_query(text).await
    }

    pub async fn open_detail(&self, movie_id: MovieId) -> ResultState<MovieDetailBundle> {
        self.detail.open_detail(movie_id).await
    }

    pub fn close_detail(&self) {
        self.detail.close();
    }

    /// Reloads the trending panel.
    ///
    /// On failure the panel keeps its previous entries.
    pub async fn refresh_trending(&self) -> Vec<TrendingEntry> {
        match self.trending.list_top(self.trending_limit).await {
            Ok(entries) => {
                tracing::debug!(count = entries.len(), "Trending panel refreshed");
                self.trending_panel.send_replace(entries.clone());
                entries
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load trending searches");
                self.trending_panel.borrow().clone()
            }
        }
    }

    pub fn results(&self) -> MovieListState {
        self.query.snapshot().state
    }

    /// The movie list with the settled query it was produced for.
    pub fn list(&self) -> ListView {
        self.query.snapshot()
    }

    pub fn detail(&self) -> Option<DetailView> {
        self.detail.snapshot()
    }

    pub fn trending(&self) -> Vec<TrendingEntry> {
        self.trending_panel.borrow().clone()
    }

    pub fn genres(&self) -> Vec<Genre> {
        self.genres.entries()
    }

    pub fn subscribe_results(&self) -> watch::Receiver<ListView> {
        self.query.subscribe()
    }

    pub fn subscribe_detail(&self) -> watch::Receiver<Option<DetailView>> {
        self.detail.subscribe()
    }

    pub fn subscribe_trending(&self) -> watch::Receiver<Vec<TrendingEntry>> {
        self.trending_panel.subscribe()
    }
}

impl Drop for DiscoverySession {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

async fn drive_queries(query: Arc<QueryOrchestrator>, mut stabilized: mpsc::Receiver<String>) {
    while let Some(text) = stabilized.recv().await {
        tracing::debug!(query = %text, "Search text settled");
        let query = Arc::clone(&query);
        tokio::spawn(async move {
            query.run_query(&text).await;
        });
    }
    tracing::debug!("Search input closed");
}
