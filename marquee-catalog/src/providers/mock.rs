//! Scriptable catalog for tests.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{CatalogClient, DemoCatalog};
use crate::errors::CatalogError;
use crate::types::{Credits, Genre, MovieDetail, MovieId, MovieSummary, ReleaseDates};

/// One of the three per-movie reads behind the detail view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetailLeg {
    /// `/movie/{id}`
    Detail,
    /// `/movie/{id}/credits`
    Credits,
    /// `/movie/{id}/release_dates`
    ReleaseDates,
}

/// Failure a script injects in place of a real response.
#[derive(Debug, Clone, PartialEq)]
pub enum ScriptedFailure {
    /// Transport failure
    Network,
    /// Non-success HTTP status
    Status(u16),
    /// 200 response whose body reports failure
    ApiReported(Option<String>),
}

impl ScriptedFailure {
    fn into_error(self, endpoint: String) -> CatalogError {
        match self {
            ScriptedFailure::Network => CatalogError::Network {
                endpoint,
                reason: "connection reset by script".to_string(),
            },
            ScriptedFailure::Status(status) => CatalogError::Status { endpoint, status },
            ScriptedFailure::ApiReported(message) => CatalogError::ApiReported { message },
        }
    }
}

#[derive(Debug, Default)]
struct Script {
    query_delays: HashMap<String, Duration>,
    query_failures: HashMap<String, ScriptedFailure>,
    leg_delays: HashMap<(MovieId, DetailLeg), Duration>,
    leg_failures: HashMap<(MovieId, DetailLeg), ScriptedFailure>,
    genre_failure: Option<ScriptedFailure>,
    queries: Vec<String>,
    legs: Vec<(MovieId, DetailLeg)>,
}

/// Catalog double that delegates to a base catalog, with injected delays
/// and failures and a log of every call.
///
/// Listing scripts are keyed by query text; the empty string addresses
/// `discover`.
#[derive(Debug, Clone)]
pub struct ScriptedCatalog {
    base: Arc<dyn CatalogClient>,
    script: Arc<Mutex<Script>>,
}

impl Default for ScriptedCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedCatalog {
    /// Scripted catalog over the demo data set.
    pub fn new() -> Self {
        Self::with_base(Arc::new(DemoCatalog::new()))
    }

    /// Scripted catalog over any other catalog.
    pub fn with_base(base: Arc<dyn CatalogClient>) -> Self {
        Self {
            base,
            script: Arc::new(Mutex::new(Script::default())),
        }
    }

    /// Holds back the listing for `query` by `delay`.
    pub fn delay_query(&self, query: &str, delay: Duration) -> &Self {
        self.script
            .lock()
            .query_delays
            .insert(query.to_string(), delay);
        self
    }

    /// Fails the listing for `query` after any delay.
    pub fn fail_query(&self, query: &str, failure: ScriptedFailure) -> &Self {
        self.script
            .lock()
            .query_failures
            .insert(query.to_string(), failure);
        self
    }

    /// Holds back one detail read of one movie.
    pub fn delay_leg(&self, id: MovieId, leg: DetailLeg, delay: Duration) -> &Self {
        self.script.lock().leg_delays.insert((id, leg), delay);
        self
    }

    /// Fails one detail read of one movie after any delay.
    pub fn fail_leg(&self, id: MovieId, leg: DetailLeg, failure: ScriptedFailure) -> &Self {
        self.script.lock().leg_failures.insert((id, leg), failure);
        self
    }

    /// Fails every genre list request.
    pub fn fail_genres(&self, failure: ScriptedFailure) -> &Self {
        self.script.lock().genre_failure = Some(failure);
        self
    }

    /// Removes every injected failure and delay.
    pub fn clear_script(&self) {
        let mut script = self.script.lock();
        script.query_delays.clear();
        script.query_failures.clear();
        script.leg_delays.clear();
        script.leg_failures.clear();
        script.genre_failure = None;
    }

    /// Query texts seen by `search` and `discover`, in call order.
    pub fn queries(&self) -> Vec<String> {
        self.script.lock().queries.clone()
    }

    /// Per-movie reads seen so far, in call order.
    pub fn legs(&self) -> Vec<(MovieId, DetailLeg)> {
        self.script.lock().legs.clone()
    }

    async fn before_query(&self, query: &str, endpoint: String) -> Result<(), CatalogError> {
        let (delay, failure) = {
            let mut script = self.script.lock();
            script.queries.push(query.to_string());
            (
                script.query_delays.get(query).copied(),
                script.query_failures.get(query).cloned(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(failure) => Err(failure.into_error(endpoint)),
            None => Ok(()),
        }
    }

    async fn before_leg(&self, id: MovieId, leg: DetailLeg) -> Result<(), CatalogError> {
        let (delay, failure) = {
            let mut script = self.script.lock();
            script.legs.push((id, leg));
            (
                script.leg_delays.get(&(id, leg)).copied(),
                script.leg_failures.get(&(id, leg)).cloned(),
            )
        };
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match failure {
            Some(failure) => Err(failure.into_error(format!("/movie/{id} ({leg:?})"))),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CatalogClient for ScriptedCatalog {
    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let failure = self.script.lock().genre_failure.clone();
        if let Some(failure) = failure {
            return Err(failure.into_error("/genre/movie/list".to_string()));
        }
        self.base.list_genres().await
    }

    async fn search(&self, text: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        self.before_query(text, format!("/search/movie?query={text}"))
            .await?;
        self.base.search(text).await
    }

    async fn discover(&self) -> Result<Vec<MovieSummary>, CatalogError> {
        self.before_query("", "/discover/movie".to_string()).await?;
        self.base.discover().await
    }

    async fn get_detail(&self, id: MovieId) -> Result<MovieDetail, CatalogError> {
        self.before_leg(id, DetailLeg::Detail).await?;
        self.base.get_detail(id).await
    }

    async fn get_credits(&self, id: MovieId) -> Result<Credits, CatalogError> {
        self.before_leg(id, DetailLeg::Credits).await?;
        self.base.get_credits(id).await
    }

    async fn get_release_dates(&self, id: MovieId) -> Result<ReleaseDates, CatalogError> {
        self.before_leg(id, DetailLeg::ReleaseDates).await?;
        self.base.get_release_dates(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_records_queries_in_order() {
        let catalog = ScriptedCatalog::new();

        catalog.discover().await.unwrap();
        catalog.search("dune").await.unwrap();

        assert_eq!(catalog.queries(), vec!["".to_string(), "dune".to_string()]);
    }

    #[tokio::test]
    async fn test_injected_failure_replaces_response() {
        let catalog = ScriptedCatalog::new();
        catalog.fail_query("dune", ScriptedFailure::Status(500));

        assert!(matches!(
            catalog.search("dune").await,
            Err(CatalogError::Status { status: 500, .. })
        ));

        catalog.clear_script();
        assert!(catalog.search("dune").await.is_ok());
    }

    #[tokio::test]
    async fn test_leg_failure_only_hits_that_leg() {
        let catalog = ScriptedCatalog::new();
        let id = MovieId(155);
        catalog.fail_leg(id, DetailLeg::Credits, ScriptedFailure::Network);

        assert!(catalog.get_detail(id).await.is_ok());
        assert!(catalog.get_credits(id).await.is_err());
        assert_eq!(
            catalog.legs(),
            vec![(id, DetailLeg::Detail), (id, DetailLeg::Credits)]
        );
    }
}
