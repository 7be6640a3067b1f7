//! TMDB client against the fake catalog server.

use marquee_catalog::{CatalogClient, CatalogError, MovieId, TmdbClient};

use crate::support::{BROKEN_QUERY, FakeTmdb, REPORTED_MESSAGE, REPORTED_QUERY, TEST_TOKEN};

#[tokio::test]
async fn test_search_sends_bearer_token_and_escaped_query() {
    let server = FakeTmdb::start().await;
    let client = TmdbClient::new(&server.catalog_config()).unwrap();

    let movies = client.search("robin & marian/1976").await.unwrap();
    assert!(movies.is_empty());

    let requests = server.requests();
    let request = &requests[0];
    assert_eq!(request.path, "/search/movie");
    assert_eq!(
        request.query.get("query").map(String::as_str),
        Some("robin & marian/1976")
    );
    assert_eq!(
        request.authorization.as_deref(),
        Some(format!("Bearer {TEST_TOKEN}").as_str())
    );
    assert_eq!(request.accept.as_deref(), Some("application/json"));
}

#[tokio::test]
async fn test_search_decodes_sparse_fields() {
    let server = FakeTmdb::start().await;
    let client = TmdbClient::new(&server.catalog_config()).unwrap();

    let movies = client.search("batman").await.unwrap();

    assert_eq!(movies.len(), 2);
    assert_eq!(movies[0].display_year(), "2022");
    let begins = &movies[1];
    assert_eq!(begins.poster_path, None);
    assert_eq!(begins.release_date, None);
    assert_eq!(begins.display_rating(), "N/A");
}

#[tokio::test]
async fn test_discover_sorts_by_popularity() {
    let server = FakeTmdb::start().await;
    let client = TmdbClient::new(&server.catalog_config()).unwrap();

    client.discover().await.unwrap();

    let requests = server.requests();
    let request = &requests[0];
    assert_eq!(request.path, "/discover/movie");
    assert_eq!(
        request.query.get("sort_by").map(String::as_str),
        Some("popularity.desc")
    );
}

#[tokio::test]
async fn test_http_failure_is_status_error() {
    let server = FakeTmdb::start().await;
    let client = TmdbClient::new(&server.catalog_config()).unwrap();

    match client.search(BROKEN_QUERY).await {
        Err(CatalogError::Status { status, .. }) => assert_eq!(status, 500),
        other => panic!("expected status error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_failure_inside_200_is_reported() {
    let server = FakeTmdb::start().await;
    let client = TmdbClient::new(&server.catalog_config()).unwrap();

    match client.search(REPORTED_QUERY).await {
        Err(CatalogError::ApiReported { message }) => {
            assert_eq!(message.as_deref(), Some(REPORTED_MESSAGE));
        }
        other => panic!("expected reported failure, got {other:?}"),
    }
}

#[tokio::test]
async fn test_detail_reads_hit_their_endpoints() {
    let server = FakeTmdb::start().await;
    let client = TmdbClient::new(&server.catalog_config()).unwrap();
    let id = MovieId(414906);

    let detail = client.get_detail(id).await.unwrap();
    let credits = client.get_credits(id).await.unwrap();
    let releases = client.get_release_dates(id).await.unwrap();
    let genres = client.list_genres().await.unwrap();

    assert_eq!(detail.runtime, Some(177));
    assert_eq!(detail.genres.len(), 2);
    assert_eq!(credits.crew.len(), 3);
    assert_eq!(releases.results.len(), 2);
    assert_eq!(genres.len(), 5);
    assert_eq!(
        server.paths(),
        vec![
            "/movie/414906",
            "/movie/414906/credits",
            "/movie/414906/release_dates",
            "/genre/movie/list",
        ]
    );
}

#[tokio::test]
async fn test_unknown_movie_is_not_found() {
    let server = FakeTmdb::start().await;
    let client = TmdbClient::new(&server.catalog_config()).unwrap();

    assert!(matches!(
        client.get_detail(MovieId(1)).await,
        Err(CatalogError::NotFound { .. })
    ));
}
