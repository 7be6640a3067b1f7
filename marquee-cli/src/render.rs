//! Plain-text rendering of session snapshots.

use std::fmt::Write;

use marquee_catalog::types::{display_rating, display_year};
use marquee_catalog::{Genre, ImageConfig, MovieSummary};
use marquee_core::ResultState;
use marquee_discovery::{DetailView, MovieDetailBundle, MovieListState};
use marquee_trending::TrendingEntry;

const RULE_WIDTH: usize = 60;

/// One line per movie: id, title, rating, language and year.
pub fn movie_line(movie: &MovieSummary) -> String {
    format!(
        "{:>8}  {}  ★ {} • {} • {}",
        movie.id,
        movie.title,
        movie.display_rating(),
        display_language(&movie.original_language),
        movie.display_year()
    )
}

/// Heading of the movie list shown for a settled query.
pub fn list_heading(query: &str) -> String {
    if query.is_empty() {
        "Popular Movies".to_string()
    } else {
        format!("Results for \"{query}\"")
    }
}

pub fn movie_list(heading: &str, state: &MovieListState) -> String {
    let mut out = format!("{heading}\n{:-<RULE_WIDTH$}\n", "");
    match state {
        ResultState::Loading => out.push_str("Loading...\n"),
        ResultState::Failed(message) => {
            let _ = writeln!(out, "{message}");
        }
        ResultState::Ready(movies) if movies.is_empty() => out.push_str("No movies found.\n"),
        ResultState::Ready(movies) => {
            for movie in movies {
                let _ = writeln!(out, "{}", movie_line(movie));
            }
        }
    }
    out
}

pub fn trending_panel(entries: &[TrendingEntry]) -> String {
    let mut out = format!("Trending Movies\n{:-<RULE_WIDTH$}\n", "");
    if entries.is_empty() {
        out.push_str("Nothing trending yet.\n");
        return out;
    }
    for (rank, entry) in entries.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>2}. {}  (\"{}\", {} searches)",
            rank + 1,
            entry.title,
            entry.search_term,
            entry.count
        );
    }
    out
}

pub fn detail_view(view: Option<&DetailView>, images: &ImageConfig) -> String {
    match view {
        None => String::new(),
        Some(view) => match &view.state {
            ResultState::Loading => format!("Loading movie {}...\n", view.movie_id),
            ResultState::Failed(message) => format!("{message}\n"),
            ResultState::Ready(bundle) => bundle_text(bundle, images),
        },
    }
}

fn bundle_text(bundle: &MovieDetailBundle, images: &ImageConfig) -> String {
    let mut out = format!("{}\n{:=<RULE_WIDTH$}\n", bundle.title, "");
    if let Some(tagline) = &bundle.tagline {
        let _ = writeln!(out, "\"{tagline}\"");
    }
    if !bundle.genres.is_empty() {
        let _ = writeln!(out, "[{}]", bundle.genres.join("] ["));
    }
    let _ = writeln!(
        out,
        "\nOverview\n{}\n",
        bundle
            .overview
            .as_deref()
            .filter(|o| !o.is_empty())
            .unwrap_or("No overview available.")
    );

    let release = bundle
        .release_date
        .map(|d| d.to_string())
        .unwrap_or_else(|| "N/A".to_string());
    let rating = match display_rating(bundle.vote_average).as_str() {
        "N/A" => "N/A".to_string(),
        rating => format!("{rating} / 10"),
    };
    let popularity = bundle
        .popularity
        .map(|p| format!("{p:.0}"))
        .unwrap_or_else(|| "N/A".to_string());
    let studios = if bundle.production_companies.is_empty() {
        "N/A".to_string()
    } else {
        bundle.production_companies.join(", ")
    };

    let rows = [
        ("Release Date", release),
        ("Year", display_year(bundle.release_date)),
        ("Rating", rating),
        ("Rated", bundle.certification.clone()),
        ("Runtime", bundle.display_runtime()),
        ("Director", bundle.director.clone()),
        ("Language", display_language(&bundle.original_language)),
        ("Popularity", popularity),
        ("Studio", studios),
        (
            "Poster",
            images.poster_url(bundle.poster_path.as_deref()),
        ),
    ];
    for (label, value) in rows {
        let _ = writeln!(out, "{label:<14}{value}");
    }
    out
}

pub fn genre_table(genres: &[Genre]) -> String {
    let mut out = format!("Genres\n{:-<RULE_WIDTH$}\n", "");
    for genre in genres {
        let _ = writeln!(out, "{:>6}  {}", genre.id, genre.name);
    }
    out
}

fn display_language(code: &str) -> String {
    if code.is_empty() {
        "N/A".to_string()
    } else {
        code.to_uppercase()
    }
}
