//! Catalog client implementations.

use std::sync::Arc;

use async_trait::async_trait;
use marquee_core::config::CatalogConfig;
use marquee_core::RuntimeMode;

use crate::errors::CatalogError;
use crate::types::{Credits, Genre, MovieDetail, MovieId, MovieSummary, ReleaseDates};

pub mod demo;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod tmdb;

pub use demo::DemoCatalog;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::{DetailLeg, ScriptedCatalog, ScriptedFailure};
pub use tmdb::TmdbClient;

/// Read-only access to a remote movie catalog.
///
/// Every call is a single request/response: no retries, no pagination past
/// the first page, no rate limiting.
#[async_trait]
pub trait CatalogClient: Send + Sync + std::fmt::Debug {
    /// Lists all movie genres.
    ///
    /// # Errors
    /// - `CatalogError::Network` - Request did not complete
    /// - `CatalogError::Status` - Non-success HTTP status
    /// - `CatalogError::Parse` - Body could not be decoded
    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError>;

    /// Searches movies by title text.
    ///
    /// # Errors
    /// - `CatalogError::Network` - Request did not complete
    /// - `CatalogError::Status` - Non-success HTTP status
    /// - `CatalogError::ApiReported` - Service reported failure in a 200 body
    async fn search(&self, text: &str) -> Result<Vec<MovieSummary>, CatalogError>;

    /// Lists movies sorted by descending popularity.
    ///
    /// # Errors
    /// - `CatalogError::Network` - Request did not complete
    /// - `CatalogError::Status` - Non-success HTTP status
    /// - `CatalogError::ApiReported` - Service reported failure in a 200 body
    async fn discover(&self) -> Result<Vec<MovieSummary>, CatalogError>;

    /// Fetches the detail record of one movie.
    ///
    /// # Errors
    /// - `CatalogError::NotFound` - Unknown movie id
    /// - `CatalogError::Network` - Request did not complete
    async fn get_detail(&self, id: MovieId) -> Result<MovieDetail, CatalogError>;

    /// Fetches cast and crew of one movie.
    ///
    /// # Errors
    /// - `CatalogError::NotFound` - Unknown movie id
    /// - `CatalogError::Network` - Request did not complete
    async fn get_credits(&self, id: MovieId) -> Result<Credits, CatalogError>;

    /// Fetches per-country release dates and certifications of one movie.
    ///
    /// # Errors
    /// - `CatalogError::NotFound` - Unknown movie id
    /// - `CatalogError::Network` - Request did not complete
    async fn get_release_dates(&self, id: MovieId) -> Result<ReleaseDates, CatalogError>;
}

/// Builds the catalog client matching the runtime mode.
///
/// # Errors
/// - `CatalogError::Configuration` - Production mode without usable TMDB settings
pub fn catalog_for_mode(
    mode: RuntimeMode,
    config: &CatalogConfig,
) -> Result<Arc<dyn CatalogClient>, CatalogError> {
    match mode {
        RuntimeMode::Production => Ok(Arc::new(TmdbClient::new(config)?)),
        RuntimeMode::Development => Ok(Arc::new(DemoCatalog::new())),
    }
}
