//! Trending store backed by an Appwrite-compatible document API.
//!
//! One document per search term in a single collection:
//!
//! | attribute    | type    |
//! |--------------|---------|
//! | `searchTerm` | string  |
//! | `count`      | integer |
//! | `movie_id`   | integer |
//! | `title`      | string  |
//! | `poster_url` | string  |
//!
//! Queries use the JSON query syntax (`{"method": "equal", ...}`) passed as
//! repeated `queries[]` parameters.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use marquee_catalog::{ImageConfig, MovieId};
use marquee_core::config::TrendingConfig;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::Url;

use crate::errors::TrendingError;
use crate::store::TrendingStore;
use crate::types::{RepresentativeMovie, TrendingEntry};

const PROJECT_HEADER: &str = "x-appwrite-project";
const KEY_HEADER: &str = "x-appwrite-key";

/// Document as the store returns it.
#[derive(Debug, Clone, Deserialize)]
struct TrendingDocument {
    #[serde(rename = "$id")]
    id: String,
    #[serde(rename = "searchTerm")]
    search_term: String,
    #[serde(default)]
    count: u64,
    movie_id: MovieId,
    #[serde(default)]
    title: String,
    #[serde(default)]
    poster_url: String,
    #[serde(rename = "$updatedAt", default)]
    updated_at: Option<DateTime<Utc>>,
}

impl From<TrendingDocument> for TrendingEntry {
    fn from(doc: TrendingDocument) -> Self {
        Self {
            id: doc.id,
            search_term: doc.search_term,
            count: doc.count,
            movie_id: doc.movie_id,
            title: doc.title,
            poster_url: doc.poster_url,
            last_searched: doc.updated_at,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DocumentList {
    #[serde(default)]
    documents: Vec<TrendingDocument>,
}

#[derive(Debug, Serialize)]
struct NewDocument<'a> {
    #[serde(rename = "searchTerm")]
    search_term: &'a str,
    count: u64,
    movie_id: MovieId,
    title: &'a str,
    poster_url: String,
}

/// REST client for the hosted trending collection.
#[derive(Debug, Clone)]
pub struct AppwriteTrendingStore {
    client: reqwest::Client,
    documents_url: String,
    images: ImageConfig,
}

impl AppwriteTrendingStore {
    /// Creates a store client from trending settings.
    ///
    /// # Errors
    ///
    /// - `TrendingError::Configuration` - Missing project, database or
    ///   collection id, an endpoint that does not parse, or header values
    ///   with unusable characters
    pub fn new(config: &TrendingConfig, images: ImageConfig) -> Result<Self, TrendingError> {
        let missing = |what: &str| TrendingError::Configuration {
            reason: format!("Appwrite {what} is not configured"),
        };
        let project_id = config
            .project_id
            .as_deref()
            .ok_or_else(|| missing("project id"))?;
        let database_id = config
            .database_id
            .as_deref()
            .ok_or_else(|| missing("database id"))?;
        let collection_id = config
            .collection_id
            .as_deref()
            .ok_or_else(|| missing("collection id"))?;

        let endpoint = config.endpoint.trim_end_matches('/');
        Url::parse(endpoint).map_err(|e| TrendingError::Configuration {
            reason: format!("Invalid trending endpoint '{endpoint}': {e}"),
        })?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(PROJECT_HEADER, header_value(project_id, "project id")?);
        if let Some(key) = config.api_key.as_deref() {
            let mut value = header_value(key, "API key")?;
            value.set_sensitive(true);
            headers.insert(KEY_HEADER, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(concat!("marquee/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| TrendingError::Configuration {
                reason: format!("HTTP client creation failed: {e}"),
            })?;

        Ok(Self {
            client,
            documents_url: format!(
                "{endpoint}/databases/{database_id}/collections/{collection_id}/documents"
            ),
            images,
        })
    }

    /// Query strings selecting the entry of one term.
    pub fn term_queries(term: &str) -> Vec<String> {
        vec![
            json!({"method": "equal", "attribute": "searchTerm", "values": [term]}).to_string(),
            json!({"method": "limit", "values": [1]}).to_string(),
        ]
    }

    /// Query strings listing the `n` most counted entries.
    pub fn top_queries(n: usize) -> Vec<String> {
        vec![
            json!({"method": "orderDesc", "attribute": "count"}).to_string(),
            json!({"method": "limit", "values": [n]}).to_string(),
        ]
    }

    async fn list_documents(
        &self,
        operation: &'static str,
        queries: Vec<String>,
    ) -> Result<Vec<TrendingDocument>, TrendingError> {
        let params: Vec<(&str, String)> = queries.into_iter().map(|q| ("queries[]", q)).collect();
        let request = self.client.get(&self.documents_url).query(&params);
        let list: DocumentList = send(operation, request).await?;
        Ok(list.documents)
    }

    async fn create_document(
        &self,
        term: &str,
        movie: &RepresentativeMovie,
    ) -> Result<TrendingDocument, TrendingError> {
        let data = NewDocument {
            search_term: term,
            count: 1,
            movie_id: movie.id,
            title: &movie.title,
            poster_url: movie.poster_url(&self.images),
        };
        let request = self
            .client
            .post(&self.documents_url)
            .json(&json!({"documentId": "unique()", "data": data}));
        send("create", request).await
    }

    async fn update_count(
        &self,
        document_id: &str,
        count: u64,
    ) -> Result<TrendingDocument, TrendingError> {
        let request = self
            .client
            .patch(format!("{}/{document_id}", self.documents_url))
            .json(&json!({"data": {"count": count}}));
        send("update", request).await
    }
}

fn header_value(raw: &str, what: &str) -> Result<HeaderValue, TrendingError> {
    HeaderValue::from_str(raw).map_err(|e| TrendingError::Configuration {
        reason: format!("Appwrite {what} is not a valid header value: {e}"),
    })
}

async fn send<T: DeserializeOwned>(
    operation: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<T, TrendingError> {
    let response = request.send().await.map_err(|e| TrendingError::Network {
        operation,
        reason: e.to_string(),
    })?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        tracing::debug!(operation, %status, body = %body, "Trending store returned error status");
        return Err(TrendingError::Status {
            operation,
            status: status.as_u16(),
        });
    }

    let body = response.text().await.map_err(|e| TrendingError::Network {
        operation,
        reason: format!("Failed to read body: {e}"),
    })?;
    serde_json::from_str(&body).map_err(|e| TrendingError::Parse {
        reason: format!("{operation}: {e}"),
    })
}

#[async_trait]
impl TrendingStore for AppwriteTrendingStore {
    async fn record_hit(
        &self,
        term: &str,
        movie: &RepresentativeMovie,
    ) -> Result<TrendingEntry, TrendingError> {
        let existing = self
            .list_documents("lookup", Self::term_queries(term))
            .await?
            .into_iter()
            .next();

        // Read-then-write: concurrent hits on one term may lose an increment.
        let document = match existing {
            Some(doc) => {
                tracing::debug!(term, count = doc.count + 1, "Incrementing trending entry");
                self.update_count(&doc.id, doc.count + 1).await?
            }
            None => {
                tracing::debug!(term, movie_id = %movie.id, "Creating trending entry");
                self.create_document(term, movie).await?
            }
        };
        Ok(document.into())
    }

    async fn list_top(&self, n: usize) -> Result<Vec<TrendingEntry>, TrendingError> {
        if n == 0 {
            return Ok(Vec::new());
        }
        let documents = self.list_documents("list", Self::top_queries(n)).await?;
        Ok(documents.into_iter().map(TrendingEntry::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    fn configured() -> TrendingConfig {
        TrendingConfig {
            endpoint: "https://appwrite.test/v1/".to_string(),
            project_id: Some("proj".to_string()),
            api_key: Some("secret".to_string()),
            database_id: Some("db".to_string()),
            collection_id: Some("metrics".to_string()),
            ..TrendingConfig::default()
        }
    }

    #[test]
    fn test_documents_url_layout() {
        let store = AppwriteTrendingStore::new(&configured(), ImageConfig::default()).unwrap();
        assert_eq!(
            store.documents_url,
            "https://appwrite.test/v1/databases/db/collections/metrics/documents"
        );
    }

    #[test]
    fn test_missing_collection_is_rejected() {
        let config = TrendingConfig {
            collection_id: None,
            ..configured()
        };
        match AppwriteTrendingStore::new(&config, ImageConfig::default()) {
            Err(TrendingError::Configuration { reason }) => {
                assert!(reason.contains("collection id"));
            }
            other => panic!("expected configuration error, got {other:?}"),
        }
    }

    #[test]
    fn test_query_strings() {
        let lookup = AppwriteTrendingStore::term_queries("the batman");
        let equal: Value = serde_json::from_str(&lookup[0]).unwrap();
        assert_eq!(equal["method"], "equal");
        assert_eq!(equal["attribute"], "searchTerm");
        assert_eq!(equal["values"][0], "the batman");

        let top = AppwriteTrendingStore::top_queries(5);
        let order: Value = serde_json::from_str(&top[0]).unwrap();
        let limit: Value = serde_json::from_str(&top[1]).unwrap();
        assert_eq!(order["method"], "orderDesc");
        assert_eq!(order["attribute"], "count");
        assert_eq!(limit["values"][0], 5);
    }

    #[test]
    fn test_document_decodes_into_entry() {
        let doc: TrendingDocument = serde_json::from_str(
            r#"{
                "$id": "65f0c1",
                "$createdAt": "2024-03-01T10:00:00.000+00:00",
                "$updatedAt": "2024-03-02T12:30:00.000+00:00",
                "searchTerm": "dune",
                "count": 7,
                "movie_id": 438631,
                "title": "Dune",
                "poster_url": "https://image.tmdb.org/t/p/w500/d5NXSklXo0qyIYkgV94XAgMIckC.jpg"
            }"#,
        )
        .unwrap();

        let entry = TrendingEntry::from(doc);
        assert_eq!(entry.id, "65f0c1");
        assert_eq!(entry.count, 7);
        assert_eq!(entry.movie_id, MovieId(438631));
        assert!(entry.last_searched.is_some());
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_network_error() {
        let config = TrendingConfig {
            endpoint: "http://127.0.0.1:9/v1".to_string(),
            ..configured()
        };
        let store = AppwriteTrendingStore::new(&config, ImageConfig::default()).unwrap();

        assert!(matches!(
            store.list_top(5).await,
            Err(TrendingError::Network { operation: "list", .. })
        ));
    }
}
