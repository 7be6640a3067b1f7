//! TMDB catalog client.

use async_trait::async_trait;
use marquee_core::config::CatalogConfig;
use reqwest::header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use url::Url;

use super::CatalogClient;
use crate::errors::CatalogError;
use crate::types::{
    Credits, Genre, GenreListResponse, MovieDetail, MovieId, MovieListResponse, MovieSummary,
    ReleaseDates,
};

/// HTTP client for the TMDB v3 API using bearer-token authentication.
#[derive(Debug, Clone)]
pub struct TmdbClient {
    client: reqwest::Client,
    base_url: String,
}

impl TmdbClient {
    /// Creates a client from catalog settings.
    ///
    /// The token is attached as a default `Authorization: Bearer` header.
    /// Timeouts are left at the transport defaults.
    ///
    /// # Errors
    ///
    /// - `CatalogError::Configuration` - Missing token, unusable token
    ///   characters, or a base URL that does not parse
    pub fn new(config: &CatalogConfig) -> Result<Self, CatalogError> {
        let token = config
            .access_token
            .as_deref()
            .ok_or_else(|| CatalogError::Configuration {
                reason: "TMDB access token is not configured".to_string(),
            })?;

        Url::parse(&config.base_url).map_err(|e| CatalogError::Configuration {
            reason: format!("Invalid catalog base URL '{}': {e}", config.base_url),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let mut auth = HeaderValue::from_str(&format!("Bearer {token}")).map_err(|e| {
            CatalogError::Configuration {
                reason: format!("TMDB access token is not a valid header value: {e}"),
            }
        })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| CatalogError::Configuration {
                reason: format!("HTTP client creation failed: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Path and query of a text search, with the query percent-encoded.
    pub fn search_endpoint(text: &str) -> String {
        format!("/search/movie?query={}", urlencoding::encode(text))
    }

    /// Path and query of the popularity listing.
    pub fn discover_endpoint() -> &'static str {
        "/discover/movie?sort_by=popularity.desc"
    }

    async fn get_json<T: DeserializeOwned>(&self, endpoint: &str) -> Result<T, CatalogError> {
        let url = format!("{}{endpoint}", self.base_url);
        tracing::debug!(endpoint, "Catalog request");

        let response =
            self.client
                .get(&url)
                .send()
                .await
                .map_err(|e| CatalogError::Network {
                    endpoint: endpoint.to_string(),
                    reason: e.to_string(),
                })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(CatalogError::NotFound {
                endpoint: endpoint.to_string(),
            });
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::debug!(endpoint, %status, body = %body, "Catalog returned error status");
            return Err(CatalogError::Status {
                endpoint: endpoint.to_string(),
                status: status.as_u16(),
            });
        }

        let body = response.text().await.map_err(|e| CatalogError::Network {
            endpoint: endpoint.to_string(),
            reason: format!("Failed to read body: {e}"),
        })?;

        serde_json::from_str(&body).map_err(|e| CatalogError::Parse {
            endpoint: endpoint.to_string(),
            reason: e.to_string(),
        })
    }
}

#[async_trait]
impl CatalogClient for TmdbClient {
    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        let body: GenreListResponse = self.get_json("/genre/movie/list").await?;
        Ok(body.genres)
    }

    async fn search(&self, text: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let body: MovieListResponse = self.get_json(&Self::search_endpoint(text)).await?;
        body.into_results()
    }

    async fn discover(&self) -> Result<Vec<MovieSummary>, CatalogError> {
        let body: MovieListResponse = self.get_json(Self::discover_endpoint()).await?;
        body.into_results()
    }

    async fn get_detail(&self, id: MovieId) -> Result<MovieDetail, CatalogError> {
        self.get_json(&format!("/movie/{id}")).await
    }

    async fn get_credits(&self, id: MovieId) -> Result<Credits, CatalogError> {
        self.get_json(&format!("/movie/{id}/credits")).await
    }

    async fn get_release_dates(&self, id: MovieId) -> Result<ReleaseDates, CatalogError> {
        self.get_json(&format!("/movie/{id}/release_dates")).await
    }
}
