//! Session workflows over the demo catalog.

use std::sync::Arc;
use std::time::Duration;

use marquee_catalog::{DetailLeg, MovieId, ScriptedCatalog, ScriptedFailure};
use marquee_core::{MarqueeConfig, ResultState};
use marquee_discovery::detail::{DETAIL_FAILED_MESSAGE, NOT_AVAILABLE};
use marquee_discovery::{DetailView, DiscoverySession, SessionOptions};
use marquee_trending::RecordingTrendingStore;
use parking_lot::Mutex;

const QUIET: Duration = Duration::from_millis(500);

struct Harness {
    session: DiscoverySession,
    catalog: ScriptedCatalog,
    trending: RecordingTrendingStore,
}

impl Harness {
    async fn start() -> Self {
        let catalog = ScriptedCatalog::new();
        let trending = RecordingTrendingStore::new();
        let session = DiscoverySession::start(
            Arc::new(catalog.clone()),
            Arc::new(trending.clone()),
            SessionOptions {
                debounce: QUIET,
                trending_limit: 5,
            },
        )
        .await;
        Self {
            session,
            catalog,
            trending,
        }
    }

    /// Types `text` one character at a time, `gap` apart.
    async fn type_slowly(&self, text: &str, gap: Duration) {
        for end in 1..=text.len() {
            self.session.type_query(&text[..end]);
            tokio::time::sleep(gap).await;
        }
    }

    async fn settle(&self) {
        tokio::time::sleep(QUIET * 2).await;
    }
}

/// Collects every detail state the session publishes.
fn record_detail_states(session: &DiscoverySession) -> Arc<Mutex<Vec<Option<DetailView>>>> {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut views = session.subscribe_detail();
    let sink = Arc::clone(&seen);
    tokio::spawn(async move {
        while views.changed().await.is_ok() {
            let view = views.borrow_and_update().clone();
            sink.lock().push(view);
        }
    });
    seen
}

#[tokio::test(start_paused = true)]
async fn test_startup_is_discover_mode_with_trending_untouched() {
    let harness = Harness::start().await;

    assert_eq!(harness.catalog.queries(), vec![String::new()]);
    let movies = harness.session.results();
    let movies = movies.ready().unwrap();
    assert_eq!(movies[0].title, "Dune");
    assert!(harness.trending.hits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_fast_typing_sends_only_final_text() {
    let harness = Harness::start().await;

    harness.type_slowly("inception", Duration::from_millis(120)).await;
    harness.settle().await;

    assert_eq!(
        harness.catalog.queries(),
        vec![String::new(), "inception".to_string()]
    );
    let movies = harness.session.results();
    assert_eq!(movies.ready().unwrap()[0].id, MovieId(27205));
}

#[tokio::test(start_paused = true)]
async fn test_pauses_longer_than_quiet_interval_send_each_text() {
    let harness = Harness::start().await;

    harness.session.type_query("alien");
    harness.settle().await;
    harness.session.type_query("aliens");
    harness.settle().await;

    assert_eq!(
        harness.catalog.queries(),
        vec![String::new(), "alien".to_string(), "aliens".to_string()]
    );
    let hits: Vec<(String, MovieId)> = harness
        .trending
        .hits()
        .into_iter()
        .map(|(term, movie)| (term, movie.id))
        .collect();
    assert_eq!(
        hits,
        vec![
            ("alien".to_string(), MovieId(348)),
            ("aliens".to_string(), MovieId(679)),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn test_clearing_the_box_returns_to_discover_without_counting() {
    let harness = Harness::start().await;

    harness.session.type_query("dune");
    harness.settle().await;
    harness.session.type_query("");
    harness.settle().await;

    assert_eq!(
        harness.catalog.queries(),
        vec![String::new(), "dune".to_string(), String::new()]
    );
    assert_eq!(harness.trending.hits().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn test_zero_results_never_counted() {
    let harness = Harness::start().await;

    harness.session.type_query("no such movie anywhere");
    harness.settle().await;

    assert_eq!(harness.session.results(), ResultState::Ready(Vec::new()));
    assert!(harness.trending.hits().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_slow_earlier_search_never_overwrites_newer_one() {
    let harness = Harness::start().await;
    harness.catalog.delay_query("alien", Duration::from_secs(3));

    harness.session.type_query("alien");
    harness.settle().await;
    harness.session.type_query("dune");
    harness.settle().await;
    assert_eq!(harness.session.results().ready().unwrap()[0].title, "Dune");

    // Let the slow "alien" response land
    tokio::time::sleep(Duration::from_secs(5)).await;
    assert_eq!(harness.session.results().ready().unwrap()[0].title, "Dune");
}

#[tokio::test(start_paused = true)]
async fn test_failed_leg_never_exposes_partial_bundle() {
    let harness = Harness::start().await;
    harness
        .catalog
        .fail_leg(MovieId(155), DetailLeg::ReleaseDates, ScriptedFailure::Network);
    harness
        .catalog
        .delay_leg(MovieId(155), DetailLeg::Credits, Duration::from_millis(100));
    let seen = record_detail_states(&harness.session);

    let outcome = harness.session.open_detail(MovieId(155)).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(
        outcome,
        ResultState::Failed(DETAIL_FAILED_MESSAGE.to_string())
    );
    let seen = seen.lock().clone();
    assert!(!seen.is_empty());
    assert!(
        seen.iter()
            .flatten()
            .all(|view| !view.state.is_ready()),
        "a bundle was published: {seen:?}"
    );
}

#[tokio::test(start_paused = true)]
async fn test_certification_and_director_rules() {
    let harness = Harness::start().await;

    let dune = harness.session.open_detail(MovieId(438631)).await;
    let dune = dune.ready().unwrap();
    assert_eq!(dune.certification, "PG-13");
    assert_eq!(dune.director, "Denis Villeneuve");

    let matinee = harness.session.open_detail(MovieId(999001)).await;
    let matinee = matinee.ready().unwrap();
    assert_eq!(matinee.certification, NOT_AVAILABLE);
    assert_eq!(matinee.director, NOT_AVAILABLE);
}

#[tokio::test(start_paused = true)]
async fn test_reopen_shows_same_bundle_without_stale_flash() {
    let harness = Harness::start().await;
    harness
        .catalog
        .delay_leg(MovieId(10681), DetailLeg::Detail, Duration::from_millis(50));

    let first = harness.session.open_detail(MovieId(10681)).await;
    harness.session.close_detail();
    assert_eq!(harness.session.detail(), None);

    let seen = record_detail_states(&harness.session);
    let second = harness.session.open_detail(MovieId(10681)).await;
    tokio::time::sleep(Duration::from_millis(10)).await;

    assert_eq!(first, second);
    let seen = seen.lock().clone();
    let first_seen = seen.first().cloned().flatten().unwrap();
    assert!(first_seen.state.is_loading());
    assert_eq!(seen.last().cloned().flatten().unwrap().state, second);
}

#[tokio::test(start_paused = true)]
async fn test_closing_during_load_keeps_view_closed() {
    let harness = Harness::start().await;
    harness
        .catalog
        .delay_leg(MovieId(348), DetailLeg::Credits, Duration::from_millis(300));

    let (_, ()) = tokio::join!(harness.session.open_detail(MovieId(348)), async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        harness.session.close_detail();
    });

    assert_eq!(harness.session.detail(), None);
}

#[tokio::test]
async fn test_batman_search_reaches_trending_in_development_mode() {
    let config = MarqueeConfig::for_testing();
    let session = DiscoverySession::from_config(&config).await.unwrap();
    let mut results = session.subscribe_results();

    session.type_query("batman");
    let state = results
        .wait_for(|view| {
            view.state.ready().is_some_and(|movies| {
                !movies.is_empty() && movies.iter().all(|m| m.title.contains("Batman"))
            })
        })
        .await
        .unwrap()
        .clone();
    assert_eq!(state.query, "batman");

    // The hit is recorded right after the list is published
    let mut panel = session.refresh_trending().await;
    for _ in 0..50 {
        if panel.iter().any(|e| e.search_term == "batman") {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
        panel = session.refresh_trending().await;
    }

    let entry = panel
        .iter()
        .find(|e| e.search_term == "batman")
        .expect("batman is trending");
    assert!(entry.count >= 1);
    assert_eq!(session.trending(), panel);
}
