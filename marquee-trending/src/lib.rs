//! Marquee Trending - Popular search counters

#![deny(missing_docs)]
#![deny(clippy::missing_errors_doc)]
#![warn(clippy::too_many_lines)]
//!
//! Every successful non-empty search bumps a counter keyed by its term; the
//! trending panel lists the terms with the highest counters. Failures here
//! are never fatal to searching.

pub mod appwrite;
pub mod errors;
pub mod memory;
#[cfg(any(test, feature = "test-utils"))]
pub mod mock;
pub mod store;
pub mod types;

pub use appwrite::AppwriteTrendingStore;
pub use errors::TrendingError;
pub use memory::InMemoryTrendingStore;
#[cfg(any(test, feature = "test-utils"))]
pub use mock::RecordingTrendingStore;
pub use store::{TrendingStore, trending_for_config};
pub use types::{RepresentativeMovie, TrendingEntry};

/// Convenience type alias for Results with TrendingError.
pub type Result<T> = std::result::Result<T, TrendingError>;
