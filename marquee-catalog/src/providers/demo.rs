//! Demo catalog for development mode.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::CatalogClient;
use crate::errors::CatalogError;
use crate::types::{
    CastMember, CountryReleases, Credits, CrewMember, DatedRelease, Genre, MovieDetail, MovieId,
    MovieSummary, ProductionCompany, ReleaseDates,
};

/// In-process catalog with a fixed set of movies.
///
/// Lets the front end run without a TMDB token. Search is a case-insensitive
/// title match; discover orders by popularity like the real endpoint.
#[derive(Debug, Clone)]
pub struct DemoCatalog {
    genres: Vec<Genre>,
    movies: Vec<DemoMovie>,
}

#[derive(Debug, Clone)]
struct DemoMovie {
    detail: MovieDetail,
    credits: Credits,
    release_dates: ReleaseDates,
}

impl Default for DemoCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoCatalog {
    /// Builds the fixed data set.
    pub fn new() -> Self {
        let genres = [
            (28, "Action"),
            (12, "Adventure"),
            (16, "Animation"),
            (35, "Comedy"),
            (80, "Crime"),
            (18, "Drama"),
            (27, "Horror"),
            (878, "Science Fiction"),
            (53, "Thriller"),
        ]
        .into_iter()
        .map(|(id, name)| Genre {
            id,
            name: name.to_string(),
        })
        .collect::<Vec<_>>();

        let specs = [
            DemoSpec {
                id: 272,
                title: "Batman Begins",
                poster: Some("/sPX89Td70IDDjVr85jdSBb4rWGr.jpg"),
                rating: 7.7,
                released: Some((2005, 6, 10)),
                genre_ids: &[28, 80, 18],
                popularity: 80.4,
                runtime: 140,
                tagline: "Evil fears the knight.",
                companies: &["Warner Bros. Pictures", "Syncopy", "Legendary Pictures"],
                directors: &["Christopher Nolan"],
                us_certifications: &["", "PG-13"],
            },
            DemoSpec {
                id: 155,
                title: "The Dark Knight",
                poster: Some("/qJ2tW6WMUDux911r6m7haRef0WH.jpg"),
                rating: 8.5,
                released: Some((2008, 7, 16)),
                genre_ids: &[18, 28, 80, 53],
                popularity: 120.9,
                runtime: 152,
                tagline: "Welcome to a world without rules.",
                companies: &["Warner Bros. Pictures", "Legendary Pictures", "Syncopy"],
                directors: &["Christopher Nolan"],
                us_certifications: &["PG-13"],
            },
            DemoSpec {
                id: 414906,
                title: "The Batman",
                poster: Some("/74xTEgt7R36Fpooo50r9T25onhq.jpg"),
                rating: 7.7,
                released: Some((2022, 3, 1)),
                genre_ids: &[80, 53],
                popularity: 150.2,
                runtime: 177,
                tagline: "Unmask the truth.",
                companies: &["Warner Bros. Pictures", "6th & Idaho", "Dylan Clark Productions"],
                directors: &["Matt Reeves"],
                us_certifications: &["PG-13"],
            },
            DemoSpec {
                id: 438631,
                title: "Dune",
                poster: Some("/d5NXSklXo0qyIYkgV94XAgMIckC.jpg"),
                rating: 7.8,
                released: Some((2021, 9, 15)),
                genre_ids: &[878, 12],
                popularity: 201.3,
                runtime: 155,
                tagline: "Beyond fear, destiny awaits.",
                companies: &["Legendary Pictures"],
                directors: &["Denis Villeneuve"],
                us_certifications: &["", "PG-13"],
            },
            DemoSpec {
                id: 348,
                title: "Alien",
                poster: Some("/vfrQk5IPloGg1v9Rzbh2Eg3VGyM.jpg"),
                rating: 8.2,
                released: Some((1979, 5, 25)),
                genre_ids: &[27, 878],
                popularity: 60.1,
                runtime: 117,
                tagline: "In space no one can hear you scream.",
                companies: &["Brandywine Productions", "20th Century Fox"],
                directors: &["Ridley Scott"],
                us_certifications: &["R"],
            },
            DemoSpec {
                id: 679,
                title: "Aliens",
                poster: Some("/r1x5JGpyqZU8PYhbs4UcrO1Xb6x.jpg"),
                rating: 7.9,
                released: Some((1986, 7, 18)),
                genre_ids: &[28, 53, 878],
                popularity: 55.7,
                runtime: 137,
                tagline: "This time it's war.",
                companies: &["20th Century Fox", "Brandywine Productions"],
                directors: &["James Cameron"],
                us_certifications: &["R"],
            },
            DemoSpec {
                id: 27205,
                title: "Inception",
                poster: Some("/oYuLEt3zVCKq57qu2F8dT7NIa6f.jpg"),
                rating: 8.4,
                released: Some((2010, 7, 15)),
                genre_ids: &[28, 878, 12],
                popularity: 110.5,
                runtime: 148,
                tagline: "Your mind is the scene of the crime.",
                companies: &["Legendary Pictures", "Syncopy", "Warner Bros. Pictures"],
                directors: &["Christopher Nolan"],
                us_certifications: &["PG-13"],
            },
            DemoSpec {
                id: 10681,
                title: "WALL·E",
                poster: Some("/hbhFnRzzg6ZDmm8YAmxBnQpQIPh.jpg"),
                rating: 8.1,
                released: Some((2008, 6, 22)),
                genre_ids: &[16, 35, 878],
                popularity: 70.0,
                runtime: 98,
                tagline: "After 700 years of doing what he was built for, he'll discover what he's meant for.",
                companies: &["Pixar"],
                directors: &["Andrew Stanton"],
                us_certifications: &["G"],
            },
            DemoSpec {
                id: 999001,
                title: "Midnight Matinee",
                poster: None,
                rating: 0.0,
                released: None,
                genre_ids: &[18, 10770],
                popularity: 0.6,
                runtime: 0,
                tagline: "",
                companies: &[],
                directors: &[],
                us_certifications: &[],
            },
        ];

        let movies = specs.iter().map(|spec| spec.build(&genres)).collect();

        Self { genres, movies }
    }

    fn find(&self, id: MovieId, endpoint: String) -> Result<&DemoMovie, CatalogError> {
        self.movies
            .iter()
            .find(|movie| movie.detail.id == id)
            .ok_or(CatalogError::NotFound { endpoint })
    }

    fn summaries<'a>(movies: impl Iterator<Item = &'a DemoMovie>) -> Vec<MovieSummary> {
        movies.map(|movie| summary_of(&movie.detail)).collect()
    }
}

#[async_trait]
impl CatalogClient for DemoCatalog {
    async fn list_genres(&self) -> Result<Vec<Genre>, CatalogError> {
        Ok(self.genres.clone())
    }

    async fn search(&self, text: &str) -> Result<Vec<MovieSummary>, CatalogError> {
        let needle = text.trim().to_lowercase();
        let mut hits: Vec<&DemoMovie> = self
            .movies
            .iter()
            .filter(|movie| movie.detail.title.to_lowercase().contains(&needle))
            .collect();
        // Exact title matches rank first, then by popularity
        hits.sort_by(|a, b| {
            let a_exact = a.detail.title.to_lowercase() == needle;
            let b_exact = b.detail.title.to_lowercase() == needle;
            b_exact
                .cmp(&a_exact)
                .then_with(|| popularity_desc(&a.detail, &b.detail))
        });
        Ok(Self::summaries(hits.into_iter()))
    }

    async fn discover(&self) -> Result<Vec<MovieSummary>, CatalogError> {
        let mut movies: Vec<&DemoMovie> = self.movies.iter().collect();
        movies.sort_by(|a, b| popularity_desc(&a.detail, &b.detail));
        Ok(Self::summaries(movies.into_iter()))
    }

    async fn get_detail(&self, id: MovieId) -> Result<MovieDetail, CatalogError> {
        Ok(self.find(id, format!("/movie/{id}"))?.detail.clone())
    }

    async fn get_credits(&self, id: MovieId) -> Result<Credits, CatalogError> {
        Ok(self.find(id, format!("/movie/{id}/credits"))?.credits.clone())
    }

    async fn get_release_dates(&self, id: MovieId) -> Result<ReleaseDates, CatalogError> {
        Ok(self
            .find(id, format!("/movie/{id}/release_dates"))?
            .release_dates
            .clone())
    }
}

/// Listing entry derived from a detail record.
pub(crate) fn summary_of(detail: &MovieDetail) -> MovieSummary {
    let genre_ids = if detail.genres.is_empty() {
        detail.genre_ids.clone()
    } else {
        detail.genres.iter().map(|genre| genre.id).collect()
    };
    MovieSummary {
        id: detail.id,
        title: detail.title.clone(),
        poster_path: detail.poster_path.clone(),
        vote_average: detail.vote_average,
        release_date: detail.release_date,
        original_language: detail.original_language.clone(),
        genre_ids,
        overview: detail.overview.clone(),
        popularity: detail.popularity,
    }
}

fn popularity_desc(a: &MovieDetail, b: &MovieDetail) -> std::cmp::Ordering {
    b.popularity
        .unwrap_or(0.0)
        .total_cmp(&a.popularity.unwrap_or(0.0))
}

struct DemoSpec {
    id: u64,
    title: &'static str,
    poster: Option<&'static str>,
    rating: f32,
    released: Option<(i32, u32, u32)>,
    genre_ids: &'static [u64],
    popularity: f64,
    runtime: u32,
    tagline: &'static str,
    companies: &'static [&'static str],
    directors: &'static [&'static str],
    us_certifications: &'static [&'static str],
}

impl DemoSpec {
    fn build(&self, genres: &[Genre]) -> DemoMovie {
        // Movies with unknown genres keep bare ids so the detail view has to
        // fall back to the genre table.
        let all_known = self
            .genre_ids
            .iter()
            .all(|id| genres.iter().any(|genre| genre.id == *id));
        let (embedded, bare) = if all_known {
            let embedded = self
                .genre_ids
                .iter()
                .filter_map(|id| genres.iter().find(|genre| genre.id == *id).cloned())
                .collect();
            (embedded, Vec::new())
        } else {
            (Vec::new(), self.genre_ids.to_vec())
        };

        let detail = MovieDetail {
            id: MovieId(self.id),
            title: self.title.to_string(),
            poster_path: self.poster.map(str::to_string),
            vote_average: Some(self.rating),
            release_date: self
                .released
                .and_then(|(year, month, day)| NaiveDate::from_ymd_opt(year, month, day)),
            original_language: if self.directors.is_empty() { "fr" } else { "en" }.to_string(),
            genres: embedded,
            genre_ids: bare,
            overview: Some(format!("{} (demo catalog entry)", self.title)),
            runtime: (self.runtime > 0).then_some(self.runtime),
            popularity: Some(self.popularity),
            tagline: (!self.tagline.is_empty()).then(|| self.tagline.to_string()),
            production_companies: self
                .companies
                .iter()
                .enumerate()
                .map(|(index, name)| ProductionCompany {
                    id: self.id * 10 + index as u64,
                    name: name.to_string(),
                    origin_country: Some("US".to_string()),
                })
                .collect(),
        };

        let mut crew = vec![CrewMember {
            name: "Demo Producer".to_string(),
            job: "Producer".to_string(),
            department: Some("Production".to_string()),
        }];
        crew.extend(self.directors.iter().map(|name| CrewMember {
            name: name.to_string(),
            job: "Director".to_string(),
            department: Some("Directing".to_string()),
        }));

        let credits = Credits {
            cast: vec![CastMember {
                name: "Demo Lead".to_string(),
                character: Some("Lead".to_string()),
            }],
            crew,
        };

        let mut results = vec![CountryReleases {
            iso_3166_1: "FR".to_string(),
            release_dates: vec![DatedRelease {
                certification: "TP".to_string(),
                release_date: None,
            }],
        }];
        if !self.us_certifications.is_empty() {
            results.push(CountryReleases {
                iso_3166_1: "US".to_string(),
                release_dates: self
                    .us_certifications
                    .iter()
                    .map(|certification| DatedRelease {
                        certification: certification.to_string(),
                        release_date: None,
                    })
                    .collect(),
            });
        }

        DemoMovie {
            detail,
            credits,
            release_dates: ReleaseDates { results },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_discover_orders_by_popularity() {
        let catalog = DemoCatalog::new();
        let movies = catalog.discover().await.unwrap();

        assert!(!movies.is_empty());
        let popularity: Vec<f64> = movies.iter().filter_map(|m| m.popularity).collect();
        assert!(popularity.windows(2).all(|pair| pair[0] >= pair[1]));
    }

    #[tokio::test]
    async fn test_search_is_case_insensitive() {
        let catalog = DemoCatalog::new();
        let movies = catalog.search("BATMAN").await.unwrap();

        let titles: Vec<&str> = movies.iter().map(|m| m.title.as_str()).collect();
        assert_eq!(titles.len(), 2);
        assert!(titles.contains(&"Batman Begins"));
        assert!(titles.contains(&"The Batman"));
        assert!(catalog.search("no such film").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_exact_title_ranks_first() {
        let catalog = DemoCatalog::new();
        let movies = catalog.search("alien").await.unwrap();

        assert_eq!(movies[0].title, "Alien");
        assert_eq!(movies[1].title, "Aliens");
    }

    #[tokio::test]
    async fn test_unknown_movie_is_not_found() {
        let catalog = DemoCatalog::new();
        let result = catalog.get_credits(MovieId(1)).await;

        match result {
            Err(CatalogError::NotFound { endpoint }) => assert_eq!(endpoint, "/movie/1/credits"),
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_sparse_movie_keeps_bare_genre_ids() {
        let catalog = DemoCatalog::new();
        let detail = catalog.get_detail(MovieId(999001)).await.unwrap();

        assert!(detail.genres.is_empty());
        assert_eq!(detail.genre_ids, vec![18, 10770]);
        assert!(detail.poster_path.is_none());
        assert!(detail.release_date.is_none());

        let releases = catalog.get_release_dates(MovieId(999001)).await.unwrap();
        assert!(releases.results.iter().all(|r| r.iso_3166_1 != "US"));
    }
}
