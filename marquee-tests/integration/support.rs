//! Local stand-ins for the TMDB API and the Appwrite document API.
//!
//! Both servers bind to `127.0.0.1:0` and record what they receive so tests
//! can assert on the wire traffic of the real clients.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;

use axum::extract::{Path, Query, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use marquee_core::config::{CatalogConfig, TrendingConfig};
use parking_lot::Mutex;
use serde_json::{Value, json};

pub const TEST_TOKEN: &str = "test-read-token";
pub const TEST_PROJECT: &str = "marquee-test";
pub const TEST_DATABASE: &str = "movies";
pub const TEST_COLLECTION: &str = "metrics";

/// Search text that makes the fake catalog answer HTTP 500.
pub const BROKEN_QUERY: &str = "broken";
/// Search text that makes the fake catalog report failure inside a 200.
pub const REPORTED_QUERY: &str = "reported";
pub const REPORTED_MESSAGE: &str = "Invalid API key: You must be granted a valid key.";

/// One request as the fake catalog saw it.
#[derive(Debug, Clone)]
pub struct SeenRequest {
    pub path: String,
    pub query: HashMap<String, String>,
    pub authorization: Option<String>,
    pub accept: Option<String>,
}

async fn bind(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake server");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("fake server stopped");
    });
    format!("http://{addr}")
}

fn header(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

// ---------------------------------------------------------------------------
// TMDB
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct TmdbState {
    seen: Arc<Mutex<Vec<SeenRequest>>>,
}

impl TmdbState {
    fn record(&self, path: String, query: HashMap<String, String>, headers: &HeaderMap) {
        self.seen.lock().push(SeenRequest {
            path,
            query,
            authorization: header(headers, "authorization"),
            accept: header(headers, "accept"),
        });
    }
}

/// Running fake TMDB server.
pub struct FakeTmdb {
    pub base_url: String,
    state: TmdbState,
}

impl FakeTmdb {
    pub async fn start() -> Self {
        let state = TmdbState::default();
        let app = Router::new()
            .route("/3/genre/movie/list", get(tmdb_genres))
            .route("/3/search/movie", get(tmdb_search))
            .route("/3/discover/movie", get(tmdb_discover))
            .route("/3/movie/{id}", get(tmdb_detail))
            .route("/3/movie/{id}/credits", get(tmdb_credits))
            .route("/3/movie/{id}/release_dates", get(tmdb_release_dates))
            .with_state(state.clone());
        let base_url = format!("{}/3", bind(app).await);
        Self { base_url, state }
    }

    pub fn catalog_config(&self) -> CatalogConfig {
        CatalogConfig {
            base_url: self.base_url.clone(),
            access_token: Some(TEST_TOKEN.to_string()),
            ..CatalogConfig::default()
        }
    }

    pub fn requests(&self) -> Vec<SeenRequest> {
        self.state.seen.lock().clone()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

fn listing(results: Value) -> Json<Value> {
    let total = results.as_array().map_or(0, Vec::len);
    Json(json!({
        "page": 1,
        "results": results,
        "total_pages": 1,
        "total_results": total,
    }))
}

fn tmdb_movies() -> Value {
    json!([
        {
            "id": 414906,
            "title": "The Batman",
            "poster_path": "/74xTEgt7R36Fpooo50r9T25onhq.jpg",
            "vote_average": 7.7,
            "release_date": "2022-03-01",
            "original_language": "en",
            "genre_ids": [80, 9648, 53],
            "overview": "In his second year of fighting crime...",
            "popularity": 150.2
        },
        {
            "id": 272,
            "title": "Batman Begins",
            "poster_path": null,
            "vote_average": 0,
            "release_date": "",
            "original_language": "en",
            "genre_ids": [28, 80, 18],
            "popularity": 80.4
        }
    ])
}

async fn tmdb_genres(State(state): State<TmdbState>, headers: HeaderMap) -> Json<Value> {
    state.record("/genre/movie/list".to_string(), HashMap::new(), &headers);
    Json(json!({
        "genres": [
            {"id": 28, "name": "Action"},
            {"id": 80, "name": "Crime"},
            {"id": 18, "name": "Drama"},
            {"id": 9648, "name": "Mystery"},
            {"id": 53, "name": "Thriller"}
        ]
    }))
}

async fn tmdb_search(
    State(state): State<TmdbState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    let text = query.get("query").cloned().unwrap_or_default();
    state.record("/search/movie".to_string(), query, &headers);

    match text.as_str() {
        BROKEN_QUERY => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        REPORTED_QUERY => Json(json!({
            "success": false,
            "status_code": 7,
            "status_message": REPORTED_MESSAGE
        }))
        .into_response(),
        text if text.to_lowercase().contains("batman") => listing(tmdb_movies()).into_response(),
        _ => listing(json!([])).into_response(),
    }
}

async fn tmdb_discover(
    State(state): State<TmdbState>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Json<Value> {
    state.record("/discover/movie".to_string(), query, &headers);
    listing(tmdb_movies())
}

async fn tmdb_detail(
    State(state): State<TmdbState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Response {
    state.record(format!("/movie/{id}"), HashMap::new(), &headers);
    if id != 414906 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"success": false, "status_message": "The resource you requested could not be found."})),
        )
            .into_response();
    }
    Json(json!({
        "id": 414906,
        "title": "The Batman",
        "poster_path": "/74xTEgt7R36Fpooo50r9T25onhq.jpg",
        "vote_average": 7.7,
        "release_date": "2022-03-01",
        "original_language": "en",
        "genres": [{"id": 80, "name": "Crime"}, {"id": 9648, "name": "Mystery"}],
        "overview": "In his second year of fighting crime...",
        "runtime": 177,
        "popularity": 150.2,
        "tagline": "Unmask the truth.",
        "production_companies": [
            {"id": 174, "name": "Warner Bros. Pictures", "origin_country": "US"},
            {"id": 101405, "name": "6th & Idaho", "origin_country": "US"}
        ]
    }))
    .into_response()
}

async fn tmdb_credits(
    State(state): State<TmdbState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(format!("/movie/{id}/credits"), HashMap::new(), &headers);
    Json(json!({
        "id": id,
        "cast": [{"name": "Robert Pattinson", "character": "Bruce Wayne"}],
        "crew": [
            {"name": "Dylan Clark", "job": "Producer", "department": "Production"},
            {"name": "Matt Reeves", "job": "Director", "department": "Directing"},
            {"name": "Someone Else", "job": "Director", "department": "Directing"}
        ]
    }))
}

async fn tmdb_release_dates(
    State(state): State<TmdbState>,
    Path(id): Path<u64>,
    headers: HeaderMap,
) -> Json<Value> {
    state.record(format!("/movie/{id}/release_dates"), HashMap::new(), &headers);
    Json(json!({
        "id": id,
        "results": [
            {"iso_3166_1": "GB", "release_dates": [{"certification": "15", "type": 3}]},
            {"iso_3166_1": "US", "release_dates": [
                {"certification": "", "type": 1},
                {"certification": "PG-13", "type": 3}
            ]}
        ]
    }))
}

// ---------------------------------------------------------------------------
// Appwrite
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct AppwriteState {
    documents: Arc<Mutex<Vec<Value>>>,
    next_id: Arc<Mutex<u64>>,
}

/// Running fake Appwrite server with one collection.
pub struct FakeAppwrite {
    pub endpoint: String,
    state: AppwriteState,
}

impl FakeAppwrite {
    pub async fn start() -> Self {
        let state = AppwriteState::default();
        let documents = "/v1/databases/{db}/collections/{col}/documents";
        let app = Router::new()
            .route(documents, get(list_documents).post(create_document))
            .route(
                "/v1/databases/{db}/collections/{col}/documents/{id}",
                axum::routing::patch(update_document),
            )
            .with_state(state.clone());
        let endpoint = format!("{}/v1", bind(app).await);
        Self { endpoint, state }
    }

    pub fn trending_config(&self) -> TrendingConfig {
        TrendingConfig {
            endpoint: self.endpoint.clone(),
            project_id: Some(TEST_PROJECT.to_string()),
            api_key: Some("server-key".to_string()),
            database_id: Some(TEST_DATABASE.to_string()),
            collection_id: Some(TEST_COLLECTION.to_string()),
            ..TrendingConfig::default()
        }
    }

    /// Stored documents, in creation order.
    pub fn documents(&self) -> Vec<Value> {
        self.state.documents.lock().clone()
    }

    pub fn insert(&self, term: &str, count: u64) {
        let id = self.state.allocate_id();
        self.state.documents.lock().push(json!({
            "$id": id,
            "$updatedAt": "2024-01-01T00:00:00.000+00:00",
            "searchTerm": term,
            "count": count,
            "movie_id": 1,
            "title": format!("Seeded {term}"),
            "poster_url": "https://placehold.test/none.png"
        }));
    }
}

impl AppwriteState {
    fn allocate_id(&self) -> String {
        let mut next = self.next_id.lock();
        *next += 1;
        format!("doc{next:04}")
    }
}

fn authorized(headers: &HeaderMap, db: &str, col: &str) -> Result<(), Response> {
    if header(headers, "x-appwrite-project").as_deref() != Some(TEST_PROJECT) {
        return Err((
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Project not found", "code": 401})),
        )
            .into_response());
    }
    if db != TEST_DATABASE || col != TEST_COLLECTION {
        return Err((
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Collection not found", "code": 404})),
        )
            .into_response());
    }
    Ok(())
}

async fn list_documents(
    State(state): State<AppwriteState>,
    Path((db, col)): Path<(String, String)>,
    RawQuery(raw): RawQuery,
    headers: HeaderMap,
) -> Response {
    if let Err(rejection) = authorized(&headers, &db, &col) {
        return rejection;
    }

    let queries: Vec<Value> = url::form_urlencoded::parse(raw.unwrap_or_default().as_bytes())
        .filter(|(key, _)| key == "queries[]")
        .filter_map(|(_, value)| serde_json::from_str(&value).ok())
        .collect();

    let mut documents = state.documents.lock().clone();
    let mut limit = 25;
    for query in &queries {
        match query["method"].as_str() {
            Some("equal") => {
                let attribute = query["attribute"].as_str().unwrap_or_default().to_string();
                let wanted = query["values"].clone();
                documents.retain(|doc| {
                    wanted
                        .as_array()
                        .is_some_and(|values| values.contains(&doc[&attribute]))
                });
            }
            Some("orderDesc") => {
                let attribute = query["attribute"].as_str().unwrap_or_default().to_string();
                documents.sort_by(|a, b| {
                    b[&attribute]
                        .as_u64()
                        .unwrap_or(0)
                        .cmp(&a[&attribute].as_u64().unwrap_or(0))
                });
            }
            Some("limit") => {
                limit = query["values"][0].as_u64().unwrap_or(25) as usize;
            }
            _ => {}
        }
    }
    let total = documents.len();
    documents.truncate(limit);

    Json(json!({"total": total, "documents": documents})).into_response()
}

async fn create_document(
    State(state): State<AppwriteState>,
    Path((db, col)): Path<(String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorized(&headers, &db, &col) {
        return rejection;
    }
    if body["documentId"] != "unique()" {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({"message": "Invalid documentId", "code": 400})),
        )
            .into_response();
    }

    let mut document = body["data"].clone();
    document["$id"] = json!(state.allocate_id());
    document["$createdAt"] = json!("2024-01-01T00:00:00.000+00:00");
    document["$updatedAt"] = json!("2024-01-01T00:00:00.000+00:00");
    state.documents.lock().push(document.clone());

    (StatusCode::CREATED, Json(document)).into_response()
}

async fn update_document(
    State(state): State<AppwriteState>,
    Path((db, col, id)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if let Err(rejection) = authorized(&headers, &db, &col) {
        return rejection;
    }

    let mut documents = state.documents.lock();
    let Some(document) = documents.iter_mut().find(|doc| doc["$id"] == id.as_str()) else {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Document not found", "code": 404})),
        )
            .into_response();
    };
    if let Some(data) = body["data"].as_object() {
        for (key, value) in data {
            document[key] = value.clone();
        }
    }
    document["$updatedAt"] = json!("2024-01-02T00:00:00.000+00:00");
    Json(document.clone()).into_response()
}
