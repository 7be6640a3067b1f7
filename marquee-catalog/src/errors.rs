//! Error types for movie catalog access.

use thiserror::Error;

/// Errors that can occur while talking to the movie catalog.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced an HTTP response.
    #[error("Network error on {endpoint}: {reason}")]
    Network {
        /// Path of the endpoint that was requested
        endpoint: String,
        /// The reason for the network error
        reason: String,
    },

    /// The catalog answered with a non-success status.
    #[error("Catalog returned HTTP {status} for {endpoint}")]
    Status {
        /// Path of the endpoint that was requested
        endpoint: String,
        /// HTTP status code
        status: u16,
    },

    /// The requested movie does not exist.
    #[error("Movie not found: {endpoint}")]
    NotFound {
        /// Path of the endpoint that was requested
        endpoint: String,
    },

    /// The response body could not be decoded.
    #[error("Parse error on {endpoint}: {reason}")]
    Parse {
        /// Path of the endpoint that was requested
        endpoint: String,
        /// The reason for the parse error
        reason: String,
    },

    /// A well-formed response that reports failure despite HTTP 200.
    #[error("Catalog reported failure: {}", message.as_deref().unwrap_or("no message"))]
    ApiReported {
        /// Message supplied by the service, if any
        message: Option<String>,
    },

    /// The client cannot be built from the given settings.
    #[error("Catalog configuration error: {reason}")]
    Configuration {
        /// What is wrong with the settings
        reason: String,
    },
}

impl CatalogError {
    /// True for failures that happened at the transport or HTTP level.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            CatalogError::Network { .. }
                | CatalogError::Status { .. }
                | CatalogError::NotFound { .. }
                | CatalogError::Parse { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_reported_display() {
        let with_message = CatalogError::ApiReported {
            message: Some("Movie not found!".to_string()),
        };
        assert_eq!(
            with_message.to_string(),
            "Catalog reported failure: Movie not found!"
        );
        assert!(!with_message.is_transport());

        let bare = CatalogError::ApiReported { message: None };
        assert_eq!(bare.to_string(), "Catalog reported failure: no message");
    }

    #[test]
    fn test_status_is_transport() {
        let error = CatalogError::Status {
            endpoint: "/discover/movie".to_string(),
            status: 503,
        };
        assert!(error.is_transport());
        assert_eq!(
            error.to_string(),
            "Catalog returned HTTP 503 for /discover/movie"
        );
    }
}
