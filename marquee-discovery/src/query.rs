//! Catalog query orchestration.
//!
//! Turns stabilized query text into a movie list state. An empty query lists
//! popular movies; anything else is a title search. Successful non-empty
//! searches count towards trending.

use std::sync::Arc;

use marquee_catalog::{CatalogClient, CatalogError, MovieSummary};
use marquee_core::{ResultState, SequencedState};
use marquee_trending::{RepresentativeMovie, TrendingStore};
use serde::Serialize;
use tokio::sync::watch;

/// Shown for transport and HTTP failures.
pub const FETCH_FAILED_MESSAGE: &str = "Error fetching movies. Please try again later.";

/// Shown when the catalog reports failure without a message.
pub const REPORTED_FAILURE_FALLBACK: &str = "Failed to fetch movies";

/// State of the movie list.
pub type MovieListState = ResultState<Vec<MovieSummary>>;

/// The movie list together with the query it belongs to.
///
/// `query` is the stabilized text of the run whose state is shown, so a
/// heading taken from it always matches the listed movies.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListView {
    pub query: String,
    pub state: MovieListState,
}

impl Default for ListView {
    fn default() -> Self {
        Self {
            query: String::new(),
            state: ResultState::Ready(Vec::new()),
        }
    }
}

/// Runs catalog queries and publishes the latest one's outcome.
#[derive(Debug)]
pub struct QueryOrchestrator {
    catalog: Arc<dyn CatalogClient>,
    trending: Arc<dyn TrendingStore>,
    state: SequencedState<ListView>,
}

impl QueryOrchestrator {
    /// Creates an orchestrator whose list starts out empty and ready.
    pub fn new(catalog: Arc<dyn CatalogClient>, trending: Arc<dyn TrendingStore>) -> Self {
        Self {
            catalog,
            trending,
            state: SequencedState::new(ListView::default()),
        }
    }

    /// Runs one stabilized query.
    ///
    /// The list goes to `Loading` at once. The outcome is published only if
    /// no newer query started meanwhile, but it is returned either way.
    pub async fn run_query(&self, stabilized: &str) -> MovieListState {
        let ticket = self.state.begin(|view| {
            view.query = stabilized.to_string();
            view.state = ResultState::Loading;
        });
        tracing::debug!(query = stabilized, %ticket, "Query started");

        let outcome = match self.fetch(stabilized).await {
            Ok(movies) => ResultState::Ready(movies),
            Err(e) => {
                tracing::error!(query = stabilized, error = %e, "Movie fetch failed");
                ResultState::Failed(failure_message(&e))
            }
        };

        if !self.state.publish(ticket, |view| view.state = outcome.clone()) {
            tracing::debug!(query = stabilized, %ticket, "Superseded query outcome discarded");
        }

        if !stabilized.is_empty()
            && let ResultState::Ready(movies) = &outcome
            && let Some(first) = movies.first()
        {
            self.count_search(stabilized, first).await;
        }

        outcome
    }

    async fn fetch(&self, query: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        if query.is_empty() {
            self.catalog.discover().await
        } else {
            self.catalog.search(query).await
        }
    }

    async fn count_search(&self, term: &str, first: &MovieSummary) {
        let movie = RepresentativeMovie::from(first);
        match self.trending.record_hit(term, &movie).await {
            Ok(entry) => tracing::debug!(term, count = entry.count, "Search counted"),
            Err(e) => tracing::warn!(term, error = %e, "Failed to count search"),
        }
    }

    pub fn snapshot(&self) -> ListView {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<ListView> {
        self.state.subscribe()
    }
}

/// User-facing message for a failed fetch.
pub fn failure_message(error: &CatalogError) -> String {
    match error {
        CatalogError::ApiReported { message } => message
            .clone()
            .filter(|m| !m.is_empty())
            .unwrap_or_else(|| REPORTED_FAILURE_FALLBACK.to_string()),
        _ => FETCH_FAILED_MESSAGE.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use marquee_catalog::{MovieId, ScriptedCatalog, ScriptedFailure};
    use marquee_trending::RecordingTrendingStore;

    use super::*;

    fn orchestrator() -> (QueryOrchestrator, ScriptedCatalog, RecordingTrendingStore) {
        let catalog = ScriptedCatalog::new();
        let trending = RecordingTrendingStore::new();
        let orchestrator =
            QueryOrchestrator::new(Arc::new(catalog.clone()), Arc::new(trending.clone()));
        (orchestrator, catalog, trending)
    }

    #[tokio::test]
    async fn test_empty_query_discovers_without_counting() {
        let (orchestrator, catalog, trending) = orchestrator();

        let outcome = orchestrator.run_query("").await;

        let movies = outcome.ready().unwrap();
        assert!(!movies.is_empty());
        assert_eq!(catalog.queries(), vec![String::new()]);
        assert!(trending.hits().is_empty());
        assert_eq!(orchestrator.snapshot().state, outcome);
    }

    #[tokio::test]
    async fn test_search_counts_first_result_once() {
        let (orchestrator, _catalog, trending) = orchestrator();

        let outcome = orchestrator.run_query("batman").await;
        let first = outcome.ready().unwrap()[0].clone();

        let hits = trending.hits();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "batman");
        assert_eq!(hits[0].1.id, first.id);
    }

    #[tokio::test]
    async fn test_zero_results_not_counted() {
        let (orchestrator, _catalog, trending) = orchestrator();

        let outcome = orchestrator.run_query("zzzz no such film").await;

        assert_eq!(outcome, ResultState::Ready(Vec::new()));
        assert!(trending.hits().is_empty());
    }

    #[tokio::test]
    async fn test_transport_failure_uses_generic_message() {
        let (orchestrator, catalog, trending) = orchestrator();
        catalog.fail_query("dune", ScriptedFailure::Network);

        let outcome = orchestrator.run_query("dune").await;

        assert_eq!(outcome, ResultState::Failed(FETCH_FAILED_MESSAGE.to_string()));
        assert!(trending.hits().is_empty());
    }

    #[tokio::test]
    async fn test_reported_failure_shows_server_message() {
        let (orchestrator, catalog, _trending) = orchestrator();
        catalog.fail_query(
            "dune",
            ScriptedFailure::ApiReported(Some("Invalid API key".to_string())),
        );
        catalog.fail_query("alien", ScriptedFailure::ApiReported(None));

        assert_eq!(
            orchestrator.run_query("dune").await.error(),
            Some("Invalid API key")
        );
        assert_eq!(
            orchestrator.run_query("alien").await.error(),
            Some(REPORTED_FAILURE_FALLBACK)
        );
    }

    #[tokio::test]
    async fn test_trending_failure_does_not_fail_query() {
        let (orchestrator, _catalog, trending) = orchestrator();
        trending.set_fail_writes(true);

        let outcome = orchestrator.run_query("alien").await;

        assert!(outcome.is_ready());
        assert_eq!(trending.hits().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_loading_published_before_fetch_completes() {
        let (orchestrator, catalog, _trending) = orchestrator();
        catalog.delay_query("dune", Duration::from_millis(50));
        let orchestrator = Arc::new(orchestrator);

        let running = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.run_query("dune").await })
        };
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert!(orchestrator.snapshot().state.is_loading());
        assert!(running.await.unwrap().is_ready());
        assert!(orchestrator.snapshot().state.is_ready());
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_response_of_older_query_is_discarded() {
        let (orchestrator, catalog, trending) = orchestrator();
        catalog.delay_query("alien", Duration::from_millis(300));
        catalog.delay_query("dune", Duration::from_millis(10));

        let (slow, fast) = tokio::join!(orchestrator.run_query("alien"), async {
            tokio::time::sleep(Duration::from_millis(1)).await;
            orchestrator.run_query("dune").await
        });

        // The superseded outcome is still returned to its caller
        assert_eq!(slow.ready().unwrap()[0].id, MovieId(348));
        assert_eq!(
            orchestrator.snapshot(),
            ListView {
                query: "dune".to_string(),
                state: fast.clone(),
            }
        );
        assert_eq!(fast.ready().unwrap()[0].id, MovieId(438631));

        // Both searches really happened, so both count
        assert_eq!(trending.hits().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_published_list_carries_its_own_query() {
        let (orchestrator, catalog, _trending) = orchestrator();
        catalog.delay_query("alien", Duration::from_millis(50));
        let orchestrator = Arc::new(orchestrator);
        let mut views = orchestrator.subscribe();

        let running = {
            let orchestrator = Arc::clone(&orchestrator);
            tokio::spawn(async move { orchestrator.run_query("alien").await })
        };

        let loading = views
            .wait_for(|view| view.state.is_loading())
            .await
            .unwrap()
            .clone();
        assert_eq!(loading.query, "alien");

        running.await.unwrap();
        let view = orchestrator.snapshot();
        assert_eq!(view.query, "alien");
        assert_eq!(view.state.ready().unwrap()[0].id, MovieId(348));
    }
}
