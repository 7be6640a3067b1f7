//! Marquee Catalog - Movie metadata access

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![deny(clippy::missing_panics_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Wraps the remote movie catalog behind the `CatalogClient` trait: genre
//! listing, text search, popularity discovery and the three per-movie reads
//! the detail view is assembled from.

pub mod errors;
pub mod imagery;
pub mod providers;
pub mod types;

// Re-export main types
pub use errors::CatalogError;
pub use imagery::ImageConfig;
#[cfg(any(test, feature = "test-utils"))]
pub use providers::{DetailLeg, ScriptedCatalog, ScriptedFailure};
pub use providers::{CatalogClient, DemoCatalog, TmdbClient, catalog_for_mode};
pub use types::{
    CastMember, CountryReleases, Credits, CrewMember, DatedRelease, Genre, MovieDetail, MovieId,
    MovieSummary, ProductionCompany, ReleaseDates,
};

/// Convenience type alias for Results with CatalogError.
pub type Result<T> = std::result::Result<T, CatalogError>;
