//! Appwrite trending store against the fake document server.

use marquee_catalog::{ImageConfig, MovieId};
use marquee_core::config::TrendingConfig;
use marquee_trending::{AppwriteTrendingStore, RepresentativeMovie, TrendingError, TrendingStore};

use crate::support::FakeAppwrite;

fn images() -> ImageConfig {
    ImageConfig::new("https://image.test/t/p/w500", "https://placehold.test/none.png")
}

fn the_batman() -> RepresentativeMovie {
    RepresentativeMovie {
        id: MovieId(414906),
        title: "The Batman".to_string(),
        poster_path: Some("/74xTEgt7R36Fpooo50r9T25onhq.jpg".to_string()),
    }
}

#[tokio::test]
async fn test_first_hit_creates_document() {
    let server = FakeAppwrite::start().await;
    let store = AppwriteTrendingStore::new(&server.trending_config(), images()).unwrap();

    let entry = store.record_hit("batman", &the_batman()).await.unwrap();

    assert_eq!(entry.count, 1);
    assert_eq!(entry.movie_id, MovieId(414906));
    assert_eq!(
        entry.poster_url,
        "https://image.test/t/p/w500/74xTEgt7R36Fpooo50r9T25onhq.jpg"
    );

    let documents = server.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0]["searchTerm"], "batman");
    assert_eq!(documents[0]["movie_id"], 414906);
}

#[tokio::test]
async fn test_repeat_hit_increments_existing_document() {
    let server = FakeAppwrite::start().await;
    let store = AppwriteTrendingStore::new(&server.trending_config(), images()).unwrap();

    let first = store.record_hit("batman", &the_batman()).await.unwrap();
    let second = store.record_hit("batman", &the_batman()).await.unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.count, 2);
    assert_eq!(server.documents().len(), 1);
}

#[tokio::test]
async fn test_list_top_orders_by_count() {
    let server = FakeAppwrite::start().await;
    server.insert("alien", 2);
    server.insert("dune", 9);
    server.insert("inception", 4);
    let store = AppwriteTrendingStore::new(&server.trending_config(), images()).unwrap();

    let top = store.list_top(2).await.unwrap();

    let terms: Vec<(&str, u64)> = top
        .iter()
        .map(|e| (e.search_term.as_str(), e.count))
        .collect();
    assert_eq!(terms, vec![("dune", 9), ("inception", 4)]);
    assert!(top[0].last_searched.is_some());
}

#[tokio::test]
async fn test_wrong_project_is_status_error() {
    let server = FakeAppwrite::start().await;
    let config = TrendingConfig {
        project_id: Some("someone-else".to_string()),
        ..server.trending_config()
    };
    let store = AppwriteTrendingStore::new(&config, images()).unwrap();

    assert!(matches!(
        store.list_top(5).await,
        Err(TrendingError::Status { status: 401, .. })
    ));
    assert!(matches!(
        store.record_hit("batman", &the_batman()).await,
        Err(TrendingError::Status {
            operation: "lookup",
            status: 401
        })
    ));
    assert!(server.documents().is_empty());
}
