//! Data types for movie catalog responses.
//!
//! Field names follow the TMDB wire format so the same types deserialize
//! straight from the API and serialize back for fixtures.

use chrono::NaiveDate;
use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::CatalogError;

/// Catalog identifier of a movie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MovieId(pub u64);

impl MovieId {
    /// Wraps a raw catalog id.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// The raw catalog id.
    pub fn as_u64(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for MovieId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for MovieId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// Genre lookup entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Genre {
    /// Catalog genre id
    pub id: u64,
    /// Display name, e.g. "Science Fiction"
    pub name: String,
}

/// One entry of a search or discover listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieSummary {
    /// Catalog id
    pub id: MovieId,
    /// Display title
    pub title: String,
    /// Poster path relative to the image CDN
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Average rating on a 0-10 scale
    #[serde(default)]
    pub vote_average: Option<f32>,
    /// Unknown when missing or malformed
    #[serde(default, deserialize_with = "optional_date")]
    pub release_date: Option<NaiveDate>,
    /// ISO 639-1 code of the original language
    #[serde(default)]
    pub original_language: String,
    /// Ids resolved through the genre table
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    /// Plot summary
    #[serde(default)]
    pub overview: Option<String>,
    /// Catalog popularity score
    #[serde(default)]
    pub popularity: Option<f64>,
}

impl MovieSummary {
    /// Rating with one decimal, or "N/A" when unrated.
    pub fn display_rating(&self) -> String {
        display_rating(self.vote_average)
    }

    /// Release year, or "N/A" when the date is unknown.
    pub fn display_year(&self) -> String {
        display_year(self.release_date)
    }
}

/// Formats a 0-10 rating; zero means "no votes" on TMDB.
pub fn display_rating(vote_average: Option<f32>) -> String {
    match vote_average {
        Some(rating) if rating > 0.0 => format!("{rating:.1}"),
        _ => "N/A".to_string(),
    }
}

/// Formats a release date at year granularity.
pub fn display_year(release_date: Option<NaiveDate>) -> String {
    release_date
        .map(|date| date.format("%Y").to_string())
        .unwrap_or_else(|| "N/A".to_string())
}

/// Body of `/search/movie` and `/discover/movie`.
///
/// Some movie metadata services report failures inside a 200 response
/// (`"Response": "False"` with `"Error"`, or `"success": false` with
/// `"status_message"`), so those fields are captured alongside the results.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MovieListResponse {
    /// Page number of this listing
    #[serde(default)]
    pub page: Option<u32>,
    /// Movies on this page
    #[serde(default)]
    pub results: Vec<MovieSummary>,
    /// Total matches across all pages
    #[serde(default)]
    pub total_results: Option<u64>,
    /// `"False"` when an OMDb-style body reports failure
    #[serde(rename = "Response", default)]
    pub response: Option<String>,
    /// Failure message paired with `response`
    #[serde(rename = "Error", default)]
    pub error: Option<String>,
    /// `false` when a TMDB body reports failure
    #[serde(default)]
    pub success: Option<bool>,
    /// Failure message paired with `success`
    #[serde(default)]
    pub status_message: Option<String>,
}

impl MovieListResponse {
    /// Extracts the result list, surfacing service-reported failures.
    ///
    /// # Errors
    ///
    /// - `CatalogError::ApiReported` - The body says the request failed
    pub fn into_results(self) -> Result<Vec<MovieSummary>, CatalogError> {
        let reported_failure =
            self.response.as_deref() == Some("False") || self.success == Some(false);
        if reported_failure {
            return Err(CatalogError::ApiReported {
                message: self.error.or(self.status_message),
            });
        }
        Ok(self.results)
    }
}

/// Body of `/genre/movie/list`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GenreListResponse {
    /// Every movie genre the catalog knows
    #[serde(default)]
    pub genres: Vec<Genre>,
}

/// Production company credited on a movie.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionCompany {
    /// Catalog company id
    pub id: u64,
    /// Company name
    pub name: String,
    /// ISO 3166-1 country code
    #[serde(default)]
    pub origin_country: Option<String>,
}

/// Body of `/movie/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovieDetail {
    /// Catalog id
    pub id: MovieId,
    /// Display title
    pub title: String,
    /// Poster path relative to the image CDN
    #[serde(default)]
    pub poster_path: Option<String>,
    /// Average rating on a 0-10 scale
    #[serde(default)]
    pub vote_average: Option<f32>,
    /// Unknown when missing or malformed
    #[serde(default, deserialize_with = "optional_date")]
    pub release_date: Option<NaiveDate>,
    /// ISO 639-1 code of the original language
    #[serde(default)]
    pub original_language: String,
    /// Resolved genres, as `/movie/{id}` embeds them
    #[serde(default)]
    pub genres: Vec<Genre>,
    /// Bare genre ids, as listing-shaped payloads carry them
    #[serde(default)]
    pub genre_ids: Vec<u64>,
    /// Plot summary
    #[serde(default)]
    pub overview: Option<String>,
    /// Length in minutes
    #[serde(default)]
    pub runtime: Option<u32>,
    /// Catalog popularity score
    #[serde(default)]
    pub popularity: Option<f64>,
    /// Marketing tagline
    #[serde(default)]
    pub tagline: Option<String>,
    /// Credited studios
    #[serde(default)]
    pub production_companies: Vec<ProductionCompany>,
}

/// Crew member from `/movie/{id}/credits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewMember {
    /// Person name
    pub name: String,
    /// Credited job; directors carry `"Director"`
    pub job: String,
    /// Department, e.g. "Directing"
    #[serde(default)]
    pub department: Option<String>,
}

/// Cast member from `/movie/{id}/credits`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CastMember {
    /// Actor name
    pub name: String,
    /// Role played
    #[serde(default)]
    pub character: Option<String>,
}

/// Body of `/movie/{id}/credits`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Credits {
    /// Billed cast
    #[serde(default)]
    pub cast: Vec<CastMember>,
    /// Crew credits
    #[serde(default)]
    pub crew: Vec<CrewMember>,
}

/// One dated release within a country.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatedRelease {
    /// Age rating, empty when unrated
    #[serde(default)]
    pub certification: String,
    /// Raw release timestamp
    #[serde(default)]
    pub release_date: Option<String>,
}

/// Releases grouped by ISO 3166-1 country code.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CountryReleases {
    /// ISO 3166-1 country code
    pub iso_3166_1: String,
    /// Releases in this country
    #[serde(default)]
    pub release_dates: Vec<DatedRelease>,
}

/// Body of `/movie/{id}/release_dates`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReleaseDates {
    /// Releases per country
    #[serde(default)]
    pub results: Vec<CountryReleases>,
}

/// Treats missing, null, empty and malformed dates as unknown.
fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw
        .filter(|value| !value.is_empty())
        .and_then(|value| NaiveDate::parse_from_str(&value, "%Y-%m-%d").ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_tolerates_sparse_payload() {
        let json = r#"{
            "id": 268,
            "title": "Batman",
            "poster_path": null,
            "release_date": "",
            "genre_ids": [14, 28]
        }"#;

        let summary: MovieSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.id, MovieId(268));
        assert!(summary.poster_path.is_none());
        assert!(summary.release_date.is_none());
        assert_eq!(summary.display_year(), "N/A");
        assert_eq!(summary.display_rating(), "N/A");
        assert_eq!(summary.genre_ids, vec![14, 28]);
    }

    #[test]
    fn test_summary_display_helpers() {
        let json = r#"{
            "id": 155,
            "title": "The Dark Knight",
            "vote_average": 8.516,
            "release_date": "2008-07-16",
            "original_language": "en"
        }"#;

        let summary: MovieSummary = serde_json::from_str(json).unwrap();

        assert_eq!(summary.display_rating(), "8.5");
        assert_eq!(summary.display_year(), "2008");
    }

    #[test]
    fn test_list_response_reports_inline_failure() {
        let json = r#"{"Response": "False", "Error": "Too many results."}"#;
        let response: MovieListResponse = serde_json::from_str(json).unwrap();

        match response.into_results() {
            Err(CatalogError::ApiReported { message }) => {
                assert_eq!(message.as_deref(), Some("Too many results."));
            }
            other => panic!("expected ApiReported, got {other:?}"),
        }
    }

    #[test]
    fn test_list_response_success_false_without_message() {
        let json = r#"{"success": false}"#;
        let response: MovieListResponse = serde_json::from_str(json).unwrap();

        assert!(matches!(
            response.into_results(),
            Err(CatalogError::ApiReported { message: None })
        ));
    }

    #[test]
    fn test_list_response_missing_results_is_empty() {
        let response: MovieListResponse = serde_json::from_str(r#"{"page": 1}"#).unwrap();
        assert!(response.into_results().unwrap().is_empty());
    }

    #[test]
    fn test_movie_id_parse() {
        assert_eq!(" 550 ".parse::<MovieId>(), Ok(MovieId(550)));
        assert!("abc".parse::<MovieId>().is_err());
        assert_eq!(MovieId(550).to_string(), "550");
    }
}
