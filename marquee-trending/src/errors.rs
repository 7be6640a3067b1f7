//! Error types for the trending store.

use thiserror::Error;

/// Errors that can occur while reading or updating trending counters.
#[derive(Debug, Error)]
pub enum TrendingError {
    /// The request never produced an HTTP response.
    #[error("Trending store unreachable during {operation}: {reason}")]
    Network {
        /// Store operation that was attempted
        operation: &'static str,
        /// The reason for the network error
        reason: String,
    },

    /// The store answered with a non-success status.
    #[error("Trending store returned HTTP {status} during {operation}")]
    Status {
        /// Store operation that was attempted
        operation: &'static str,
        /// HTTP status code
        status: u16,
    },

    /// The response body could not be decoded.
    #[error("Trending store response could not be parsed: {reason}")]
    Parse {
        /// The reason for the parse error
        reason: String,
    },

    /// The store cannot be built from the given settings.
    #[error("Trending store configuration error: {reason}")]
    Configuration {
        /// What is wrong with the settings
        reason: String,
    },
}
