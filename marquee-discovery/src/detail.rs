//! Detail view aggregation.
//!
//! A detail bundle is merged from three independent catalog reads: the movie
//! record, its credits and its release dates. The reads run concurrently and
//! any single failure fails the whole view, so a half-merged bundle is never
//! observable.

use std::sync::Arc;

use chrono::NaiveDate;
use marquee_catalog::{
    CatalogClient, CatalogError, Credits, CrewMember, MovieDetail, MovieId, ReleaseDates,
};
use marquee_core::{ResultState, SequencedState};
use serde::Serialize;
use tokio::sync::watch;

use crate::genres::GenreTable;

/// Shown when any of the detail reads fails.
pub const DETAIL_FAILED_MESSAGE: &str = "Failed to load movie details. Please try again later.";

/// Placeholder for fields the catalog has no value for.
pub const NOT_AVAILABLE: &str = "N/A";

/// Only this region's certification is shown.
pub const CERTIFICATION_REGION: &str = "US";

/// Render-ready detail of one movie.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MovieDetailBundle {
    pub id: MovieId,
    pub title: String,
    pub poster_path: Option<String>,
    pub vote_average: Option<f32>,
    pub release_date: Option<NaiveDate>,
    pub original_language: String,
    pub genre_ids: Vec<u64>,
    pub popularity: Option<f64>,
    pub overview: Option<String>,
    /// Minutes
    pub runtime: Option<u32>,
    pub tagline: Option<String>,
    pub genres: Vec<String>,
    pub director: String,
    pub certification: String,
    pub production_companies: Vec<String>,
}

impl MovieDetailBundle {
    /// Runtime as `2h 32m`, or "N/A".
    pub fn display_runtime(&self) -> String {
        match self.runtime {
            Some(minutes) if minutes > 0 => format!("{}h {}m", minutes / 60, minutes % 60),
            _ => NOT_AVAILABLE.to_string(),
        }
    }
}

/// The open detail view: which movie, and how far its bundle got.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub movie_id: MovieId,
    pub state: ResultState<MovieDetailBundle>,
}

/// Name of the first crew member credited as director.
pub fn resolve_director(crew: &[CrewMember]) -> Option<&str> {
    crew.iter()
        .find(|member| member.job == "Director")
        .map(|member| member.name.as_str())
}

/// First non-empty certification of the US release entry.
///
/// Other regions are never consulted, even when the US has no rating.
pub fn resolve_certification(releases: &ReleaseDates) -> Option<&str> {
    releases
        .results
        .iter()
        .find(|country| country.iso_3166_1 == CERTIFICATION_REGION)?
        .release_dates
        .iter()
        .map(|release| release.certification.as_str())
        .find(|certification| !certification.is_empty())
}

/// Merges the three detail reads into a bundle.
pub fn merge_bundle(
    detail: MovieDetail,
    credits: &Credits,
    releases: &ReleaseDates,
    genres: &GenreTable,
) -> MovieDetailBundle {
    let genre_names = if detail.genres.is_empty() {
        genres.resolve(&detail.genre_ids)
    } else {
        detail.genres.iter().map(|g| g.name.clone()).collect()
    };
    let genre_ids = if detail.genre_ids.is_empty() {
        detail.genres.iter().map(|g| g.id).collect()
    } else {
        detail.genre_ids
    };

    MovieDetailBundle {
        id: detail.id,
        title: detail.title,
        poster_path: detail.poster_path,
        vote_average: detail.vote_average,
        release_date: detail.release_date,
        original_language: detail.original_language,
        genre_ids,
        popularity: detail.popularity,
        overview: detail.overview,
        runtime: detail.runtime,
        tagline: detail.tagline.filter(|t| !t.is_empty()),
        genres: genre_names,
        director: resolve_director(&credits.crew)
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        certification: resolve_certification(releases)
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        production_companies: detail
            .production_companies
            .into_iter()
            .map(|company| company.name)
            .collect(),
    }
}

/// Loads and holds the bundle of the currently selected movie.
#[derive(Debug)]
pub struct DetailOrchestrator {
    catalog: Arc<dyn CatalogClient>,
    genres: Arc<GenreTable>,
    state: SequencedState<Option<DetailView>>,
}

impl DetailOrchestrator {
    pub fn new(catalog: Arc<dyn CatalogClient>, genres: Arc<GenreTable>) -> Self {
        Self {
            catalog,
            genres,
            state: SequencedState::new(None),
        }
    }

    /// Selects `movie_id` and loads its bundle.
    ///
    /// The view switches to `Loading` for the new movie immediately. The
    /// outcome is published only if the view was not closed or re-opened in
    /// the meantime.
    pub async fn open_detail(&self, movie_id: MovieId) -> ResultState<MovieDetailBundle> {
        let ticket = self.state.begin(|view| {
            *view = Some(DetailView {
                movie_id,
                state: ResultState::Loading,
            });
        });
        tracing::debug!(%movie_id, %ticket, "Detail requested");

        let outcome = match self.fetch_bundle(movie_id).await {
            Ok(bundle) => ResultState::Ready(bundle),
            Err(e) => {
                tracing::error!(%movie_id, error = %e, "Detail fetch failed");
                ResultState::Failed(DETAIL_FAILED_MESSAGE.to_string())
            }
        };

        let published = self.state.publish(ticket, |view| {
            *view = Some(DetailView {
                movie_id,
                state: outcome.clone(),
            });
        });
        if !published {
            tracing::debug!(%movie_id, %ticket, "Detail outcome discarded after close or reopen");
        }

        outcome
    }

    async fn fetch_bundle(&self, movie_id: MovieId) -> Result<MovieDetailBundle, CatalogError> {
        let (detail, credits, releases) = futures::try_join!(
            self.catalog.get_detail(movie_id),
            self.catalog.get_credits(movie_id),
            self.catalog.get_release_dates(movie_id),
        )?;
        Ok(merge_bundle(detail, &credits, &releases, &self.genres))
    }

    /// Clears the selection and invalidates any open in flight.
    pub fn close(&self) {
        self.state.begin(|view| *view = None);
    }

    pub fn snapshot(&self) -> Option<DetailView> {
        self.state.snapshot()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<DetailView>> {
        self.state.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use marquee_catalog::{
        CountryReleases, DatedRelease, DemoCatalog, DetailLeg, ScriptedCatalog, ScriptedFailure,
    };
    use proptest::prelude::*;

    use super::*;

    fn crew(entries: &[(&str, &str)]) -> Vec<CrewMember> {
        entries
            .iter()
            .map(|(name, job)| CrewMember {
                name: name.to_string(),
                job: job.to_string(),
                department: None,
            })
            .collect()
    }

    fn release_table(entries: &[(&str, &[&str])]) -> ReleaseDates {
        ReleaseDates {
            results: entries
                .iter()
                .map(|(country, certifications)| CountryReleases {
                    iso_3166_1: country.to_string(),
                    release_dates: certifications
                        .iter()
                        .map(|c| DatedRelease {
                            certification: c.to_string(),
                            release_date: None,
                        })
                        .collect(),
                })
                .collect(),
        }
    }

    async fn orchestrator_over(catalog: &ScriptedCatalog) -> DetailOrchestrator {
        let genres = Arc::new(GenreTable::new());
        genres.load(&DemoCatalog::new()).await.unwrap();
        DetailOrchestrator::new(Arc::new(catalog.clone()), genres)
    }

    #[test]
    fn test_first_director_wins() {
        let crew = crew(&[("A", "Producer"), ("B", "Director"), ("C", "Director")]);
        assert_eq!(resolve_director(&crew), Some("B"));
        assert_eq!(resolve_director(&[]), None);
    }

    #[test]
    fn test_us_certification_skips_empty_entries() {
        let releases = release_table(&[("GB", &["12A"][..]), ("US", &["", "PG-13"][..])]);
        assert_eq!(resolve_certification(&releases), Some("PG-13"));
    }

    #[test]
    fn test_missing_us_entry_is_not_available() {
        let releases = release_table(&[("GB", &["12A"][..]), ("FR", &["TP"][..])]);
        assert_eq!(resolve_certification(&releases), None);

        let blank_us = release_table(&[("US", &["", ""][..])]);
        assert_eq!(resolve_certification(&blank_us), None);
    }

    proptest! {
        #[test]
        fn prop_director_is_first_director_in_crew(
            jobs in prop::collection::vec(
                prop::sample::select(vec!["Director", "Producer", "Writer", "Editor"]),
                0..12,
            )
        ) {
            let members: Vec<CrewMember> = jobs
                .iter()
                .enumerate()
                .map(|(i, job)| CrewMember {
                    name: format!("person-{i}"),
                    job: job.to_string(),
                    department: None,
                })
                .collect();

            let expected = jobs
                .iter()
                .position(|job| *job == "Director")
                .map(|i| format!("person-{i}"));
            prop_assert_eq!(resolve_director(&members).map(str::to_string), expected);
        }

        #[test]
        fn prop_certification_never_read_outside_us(
            foreign in prop::collection::vec("[A-Z0-9-]{1,5}", 0..6),
            us in prop::option::of(prop::collection::vec(
                prop::sample::select(vec!["", "G", "PG", "PG-13", "R"]),
                0..5,
            )),
        ) {
            let mut results = vec![CountryReleases {
                iso_3166_1: "DE".to_string(),
                release_dates: foreign
                    .iter()
                    .map(|c| DatedRelease { certification: c.clone(), release_date: None })
                    .collect(),
            }];
            if let Some(us) = &us {
                results.push(CountryReleases {
                    iso_3166_1: "US".to_string(),
                    release_dates: us
                        .iter()
                        .map(|c| DatedRelease { certification: c.to_string(), release_date: None })
                        .collect(),
                });
            }

            let expected = us
                .as_ref()
                .and_then(|us| us.iter().find(|c| !c.is_empty()))
                .map(|c| c.to_string());
            let releases = ReleaseDates { results };
            prop_assert_eq!(resolve_certification(&releases).map(str::to_string), expected);
        }
    }

    #[tokio::test]
    async fn test_open_merges_all_three_reads() {
        let catalog = ScriptedCatalog::new();
        let orchestrator = orchestrator_over(&catalog).await;

        let bundle = orchestrator.open_detail(MovieId(272)).await.ready().cloned().unwrap();

        assert_eq!(bundle.title, "Batman Begins");
        assert_eq!(bundle.director, "Christopher Nolan");
        assert_eq!(bundle.certification, "PG-13");
        assert_eq!(bundle.genres, vec!["Action", "Crime", "Drama"]);
        assert_eq!(bundle.production_companies[0], "Warner Bros. Pictures");
        assert_eq!(bundle.display_runtime(), "2h 20m");

        let legs: Vec<DetailLeg> = catalog.legs().into_iter().map(|(_, leg)| leg).collect();
        assert_eq!(legs.len(), 3);
        assert!(legs.contains(&DetailLeg::Credits));
        assert!(legs.contains(&DetailLeg::ReleaseDates));
    }

    #[tokio::test]
    async fn test_sparse_movie_falls_back_per_field() {
        let orchestrator = orchestrator_over(&ScriptedCatalog::new()).await;

        let bundle = orchestrator
            .open_detail(MovieId(999001))
            .await
            .ready()
            .cloned()
            .unwrap();

        assert_eq!(bundle.director, NOT_AVAILABLE);
        assert_eq!(bundle.certification, NOT_AVAILABLE);
        // 10770 is not in the genre table and is dropped
        assert_eq!(bundle.genres, vec!["Drama"]);
        assert!(bundle.production_companies.is_empty());
        assert_eq!(bundle.tagline, None);
        assert_eq!(bundle.display_runtime(), NOT_AVAILABLE);
    }

    #[tokio::test]
    async fn test_any_failed_leg_fails_whole_view() {
        for leg in [DetailLeg::Detail, DetailLeg::Credits, DetailLeg::ReleaseDates] {
            let catalog = ScriptedCatalog::new();
            catalog.fail_leg(MovieId(155), leg, ScriptedFailure::Status(500));
            let orchestrator = orchestrator_over(&catalog).await;

            let outcome = orchestrator.open_detail(MovieId(155)).await;

            assert_eq!(
                outcome,
                ResultState::Failed(DETAIL_FAILED_MESSAGE.to_string()),
                "leg {leg:?}"
            );
            let view = orchestrator.snapshot().unwrap();
            assert_eq!(view.movie_id, MovieId(155));
            assert!(view.state.is_failed());
        }
    }

    #[tokio::test]
    async fn test_unknown_movie_fails() {
        let orchestrator = orchestrator_over(&ScriptedCatalog::new()).await;
        assert!(orchestrator.open_detail(MovieId(1)).await.is_failed());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_discards_late_bundle() {
        let catalog = ScriptedCatalog::new();
        catalog.delay_leg(MovieId(348), DetailLeg::Credits, Duration::from_millis(200));
        let orchestrator = orchestrator_over(&catalog).await;

        let (outcome, ()) = tokio::join!(orchestrator.open_detail(MovieId(348)), async {
            tokio::time::sleep(Duration::from_millis(50)).await;
            assert!(orchestrator.snapshot().unwrap().state.is_loading());
            orchestrator.close();
        });

        assert!(outcome.is_ready());
        assert_eq!(orchestrator.snapshot(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reopen_other_movie_discards_late_bundle() {
        let catalog = ScriptedCatalog::new();
        catalog.delay_leg(MovieId(348), DetailLeg::Detail, Duration::from_millis(200));
        let orchestrator = orchestrator_over(&catalog).await;

        let (_, second) = tokio::join!(orchestrator.open_detail(MovieId(348)), async {
            tokio::time::sleep(Duration::from_millis(10)).await;
            orchestrator.open_detail(MovieId(679)).await
        });

        let view = orchestrator.snapshot().unwrap();
        assert_eq!(view.movie_id, MovieId(679));
        assert_eq!(view.state, second);
        assert_eq!(view.state.ready().unwrap().title, "Aliens");
    }

    #[tokio::test(start_paused = true)]
    async fn test_open_close_reopen_gives_identical_bundle() {
        let catalog = ScriptedCatalog::new();
        catalog.delay_leg(MovieId(27205), DetailLeg::Detail, Duration::from_millis(20));
        let orchestrator = orchestrator_over(&catalog).await;
        let mut views = orchestrator.subscribe();

        let first = orchestrator.open_detail(MovieId(27205)).await;
        orchestrator.close();
        views.mark_unchanged();

        let reopened = {
            let pending = orchestrator.open_detail(MovieId(27205));
            tokio::pin!(pending);
            // The reopened view must start from Loading, never the old bundle
            let initial = tokio::select! {
                biased;
                _ = views.changed() => views.borrow_and_update().clone(),
                _ = &mut pending => panic!("open finished before Loading was observed"),
            };
            assert_eq!(
                initial,
                Some(DetailView {
                    movie_id: MovieId(27205),
                    state: ResultState::Loading,
                })
            );
            pending.await
        };

        assert_eq!(first, reopened);
        assert!(first.is_ready());
    }
}
