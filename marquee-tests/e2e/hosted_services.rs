//! A production-mode session wired to the fake TMDB and Appwrite servers.

use std::time::Duration;

use marquee_catalog::MovieId;
use marquee_core::config::SearchConfig;
use marquee_core::{MarqueeConfig, RuntimeMode};
use marquee_discovery::DiscoverySession;

use crate::support::{FakeAppwrite, FakeTmdb};

async fn production_session(tmdb: &FakeTmdb, appwrite: &FakeAppwrite) -> DiscoverySession {
    let config = MarqueeConfig {
        mode: RuntimeMode::Production,
        catalog: tmdb.catalog_config(),
        trending: appwrite.trending_config(),
        search: SearchConfig {
            debounce: Duration::from_millis(20),
        },
    };
    config.validate().unwrap();
    DiscoverySession::from_config(&config).await.unwrap()
}

/// Polls until the fake Appwrite server holds `expected` documents.
async fn wait_for_documents(appwrite: &FakeAppwrite, expected: usize) {
    for _ in 0..100 {
        if appwrite.documents().len() == expected {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!(
        "expected {expected} documents, found {}",
        appwrite.documents().len()
    );
}

#[tokio::test]
async fn test_startup_discovers_and_loads_genres_without_counting() {
    let tmdb = FakeTmdb::start().await;
    let appwrite = FakeAppwrite::start().await;

    let session = production_session(&tmdb, &appwrite).await;

    let mut paths = tmdb.paths();
    paths.sort();
    assert_eq!(paths, vec!["/discover/movie", "/genre/movie/list"]);
    assert_eq!(session.results().ready().unwrap().len(), 2);
    assert_eq!(session.genres().len(), 5);
    assert!(session.trending().is_empty());
    assert!(appwrite.documents().is_empty());
}

#[tokio::test]
async fn test_typed_search_is_counted_once_and_trends() {
    let tmdb = FakeTmdb::start().await;
    let appwrite = FakeAppwrite::start().await;
    let session = production_session(&tmdb, &appwrite).await;

    for partial in ["b", "ba", "bat", "batm", "batma", "batman"] {
        session.type_query(partial);
    }
    wait_for_documents(&appwrite, 1).await;

    let searches: Vec<String> = tmdb
        .requests()
        .into_iter()
        .filter(|r| r.path == "/search/movie")
        .filter_map(|r| r.query.get("query").cloned())
        .collect();
    assert_eq!(searches, vec!["batman"]);

    let panel = session.refresh_trending().await;
    assert_eq!(panel.len(), 1);
    assert_eq!(panel[0].search_term, "batman");
    assert_eq!(panel[0].count, 1);
    assert_eq!(panel[0].movie_id, MovieId(414906));
}

#[tokio::test]
async fn test_repeat_search_increments_hosted_count() {
    let tmdb = FakeTmdb::start().await;
    let appwrite = FakeAppwrite::start().await;
    appwrite.insert("batman", 4);
    let session = production_session(&tmdb, &appwrite).await;
    assert_eq!(session.trending()[0].count, 4);

    session.submit_query("batman").await;

    let panel = session.refresh_trending().await;
    assert_eq!(panel[0].count, 5);
    assert_eq!(appwrite.documents().len(), 1);
}

#[tokio::test]
async fn test_empty_search_result_leaves_store_alone() {
    let tmdb = FakeTmdb::start().await;
    let appwrite = FakeAppwrite::start().await;
    let session = production_session(&tmdb, &appwrite).await;

    let outcome = session.submit_query("a movie nobody made").await;

    assert_eq!(outcome.ready().map(Vec::len), Some(0));
    assert!(appwrite.documents().is_empty());
}

#[tokio::test]
async fn test_detail_through_session() {
    let tmdb = FakeTmdb::start().await;
    let appwrite = FakeAppwrite::start().await;
    let session = production_session(&tmdb, &appwrite).await;

    let outcome = session.open_detail(MovieId(414906)).await;
    let bundle = outcome.ready().unwrap();

    assert_eq!(bundle.director, "Matt Reeves");
    assert_eq!(bundle.certification, "PG-13");
    assert_eq!(bundle.display_runtime(), "2h 57m");
    assert_eq!(session.detail().unwrap().movie_id, MovieId(414906));

    session.close_detail();
    assert!(session.detail().is_none());
}
