//! Marquee Discovery - Search and detail orchestration

#![warn(clippy::too_many_lines)]
//!
//! Owns the render-ready state of a discovery session: the movie list driven
//! by debounced search text, the trending panel, and the detail view merged
//! from several catalog reads. Each orchestrator publishes its state through
//! a `watch` channel and only ever shows the outcome of its most recently
//! started request.

pub mod detail;
pub mod genres;
pub mod query;
pub mod session;

pub use detail::{DetailOrchestrator, DetailView, MovieDetailBundle};
pub use genres::GenreTable;
pub use query::{ListView, MovieListState, QueryOrchestrator};
pub use session::{DiscoverySession, SessionOptions};

use marquee_catalog::CatalogError;
use marquee_trending::TrendingError;
use thiserror::Error;

/// Errors raised while assembling a discovery session.
///
/// Once a session runs, remote failures surface as `Failed` states instead.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Catalog unavailable: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Trending store unavailable: {0}")]
    Trending(#[from] TrendingError),
}

impl DiscoveryError {
    /// True when the user can fix the problem through configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            DiscoveryError::Catalog(CatalogError::Configuration { .. })
                | DiscoveryError::Trending(TrendingError::Configuration { .. })
        )
    }
}

/// Convenience type alias for Results with DiscoveryError.
pub type Result<T> = std::result::Result<T, DiscoveryError>;
