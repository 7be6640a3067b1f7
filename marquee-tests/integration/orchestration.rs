//! Orchestrators driving the real HTTP clients.

use std::sync::Arc;

use marquee_catalog::{ImageConfig, MovieId, TmdbClient};
use marquee_core::ResultState;
use marquee_discovery::query::{FETCH_FAILED_MESSAGE, QueryOrchestrator};
use marquee_discovery::{DetailOrchestrator, GenreTable};
use marquee_trending::{AppwriteTrendingStore, RecordingTrendingStore, TrendingStore};

use crate::support::{BROKEN_QUERY, FakeAppwrite, FakeTmdb, REPORTED_MESSAGE, REPORTED_QUERY};

#[tokio::test]
async fn test_search_counts_first_result_in_hosted_store() {
    let tmdb = FakeTmdb::start().await;
    let appwrite = FakeAppwrite::start().await;
    let trending: Arc<dyn TrendingStore> = Arc::new(
        AppwriteTrendingStore::new(&appwrite.trending_config(), ImageConfig::default()).unwrap(),
    );
    let orchestrator = QueryOrchestrator::new(
        Arc::new(TmdbClient::new(&tmdb.catalog_config()).unwrap()),
        Arc::clone(&trending),
    );

    let outcome = orchestrator.run_query("batman").await;
    assert_eq!(outcome.ready().unwrap()[0].id, MovieId(414906));

    let top = trending.list_top(5).await.unwrap();
    assert_eq!(top.len(), 1);
    assert_eq!(top[0].search_term, "batman");
    assert_eq!(top[0].title, "The Batman");
    assert_eq!(top[0].count, 1);
}

#[tokio::test]
async fn test_failures_map_to_user_messages() {
    let tmdb = FakeTmdb::start().await;
    let trending = RecordingTrendingStore::new();
    let orchestrator = QueryOrchestrator::new(
        Arc::new(TmdbClient::new(&tmdb.catalog_config()).unwrap()),
        Arc::new(trending.clone()),
    );

    assert_eq!(
        orchestrator.run_query(BROKEN_QUERY).await,
        ResultState::Failed(FETCH_FAILED_MESSAGE.to_string())
    );
    assert_eq!(
        orchestrator.run_query(REPORTED_QUERY).await,
        ResultState::Failed(REPORTED_MESSAGE.to_string())
    );
    assert!(trending.hits().is_empty());
}

#[tokio::test]
async fn test_detail_bundle_from_three_endpoints() {
    let tmdb = FakeTmdb::start().await;
    let catalog = Arc::new(TmdbClient::new(&tmdb.catalog_config()).unwrap());
    let genres = Arc::new(GenreTable::new());
    genres.load(catalog.as_ref()).await.unwrap();
    let orchestrator = DetailOrchestrator::new(catalog, genres);

    let bundle = orchestrator
        .open_detail(MovieId(414906))
        .await
        .ready()
        .cloned()
        .unwrap();

    assert_eq!(bundle.director, "Matt Reeves");
    assert_eq!(bundle.certification, "PG-13");
    assert_eq!(bundle.genres, vec!["Crime", "Mystery"]);
    assert_eq!(
        bundle.production_companies,
        vec!["Warner Bros. Pictures", "6th & Idaho"]
    );
    assert_eq!(bundle.tagline.as_deref(), Some("Unmask the truth."));
}

#[tokio::test]
async fn test_missing_movie_fails_detail() {
    let tmdb = FakeTmdb::start().await;
    let orchestrator = DetailOrchestrator::new(
        Arc::new(TmdbClient::new(&tmdb.catalog_config()).unwrap()),
        Arc::new(GenreTable::new()),
    );

    let outcome = orchestrator.open_detail(MovieId(7)).await;

    assert!(outcome.is_failed());
    assert!(orchestrator.snapshot().unwrap().state.is_failed());
}
