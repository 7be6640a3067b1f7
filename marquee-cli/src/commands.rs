//! CLI command implementations

use std::io::Write;
use std::sync::Arc;

use anyhow::Context;
use clap::Subcommand;
use marquee_catalog::{CatalogClient, ImageConfig, MovieId, catalog_for_mode};
use marquee_core::MarqueeConfig;
use marquee_discovery::{DetailOrchestrator, DiscoverySession, GenreTable, QueryOrchestrator};
use marquee_trending::{TrendingStore, trending_for_config};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::render;

/// Available CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Interactive search session (default)
    Browse,
    /// Search once and print the results; no text lists popular movies
    Search {
        /// Title text to search for
        #[arg(default_value = "")]
        text: String,
    },
    /// Show the detail view of one movie
    Detail {
        /// Catalog id of the movie
        id: MovieId,
    },
    /// Show the most searched terms
    Trending {
        /// Number of entries to show
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// List movie genres
    Genres,
}

/// Handle the CLI command
///
/// # Errors
/// Returns an error when the catalog or trending store cannot be built, or
/// when the terminal cannot be read.
pub async fn handle_command(command: Commands, config: MarqueeConfig) -> anyhow::Result<()> {
    match command {
        Commands::Browse => browse(&config).await,
        Commands::Search { text } => search(&config, &text).await,
        Commands::Detail { id } => detail(&config, id).await,
        Commands::Trending { limit } => trending(&config, limit).await,
        Commands::Genres => genres(&config).await,
    }
}

fn catalog(config: &MarqueeConfig) -> anyhow::Result<Arc<dyn CatalogClient>> {
    catalog_for_mode(config.mode, &config.catalog).context("Failed to set up movie catalog")
}

fn trending_store(config: &MarqueeConfig) -> anyhow::Result<Arc<dyn TrendingStore>> {
    trending_for_config(
        config.mode,
        &config.trending,
        ImageConfig::from_config(&config.catalog),
    )
    .context("Failed to set up trending store")
}

/// One-shot search; counts towards trending like a typed search does.
///
/// # Errors
/// - Catalog or trending store could not be built
pub async fn search(config: &MarqueeConfig, text: &str) -> anyhow::Result<()> {
    let orchestrator = QueryOrchestrator::new(catalog(config)?, trending_store(config)?);
    let outcome = orchestrator.run_query(text).await;

    print!(
        "{}",
        render::movie_list(&render::list_heading(text), &outcome)
    );
    Ok(())
}

/// One-shot detail view.
///
/// # Errors
/// - Catalog could not be built
pub async fn detail(config: &MarqueeConfig, id: MovieId) -> anyhow::Result<()> {
    let catalog = catalog(config)?;
    let genres = Arc::new(GenreTable::new());
    if let Err(e) = genres.load(catalog.as_ref()).await {
        tracing::warn!(error = %e, "Genre list unavailable");
    }

    let orchestrator = DetailOrchestrator::new(catalog, genres);
    orchestrator.open_detail(id).await;

    let images = ImageConfig::from_config(&config.catalog);
    print!(
        "{}",
        render::detail_view(orchestrator.snapshot().as_ref(), &images)
    );
    Ok(())
}

/// Prints the trending panel.
///
/// # Errors
/// - Trending store could not be built or listed
pub async fn trending(config: &MarqueeConfig, limit: Option<usize>) -> anyhow::Result<()> {
    let store = trending_store(config)?;
    let entries = store
        .list_top(limit.unwrap_or(config.trending.top_n))
        .await
        .context("Failed to load trending searches")?;
    print!("{}", render::trending_panel(&entries));
    Ok(())
}

/// Prints the genre table.
///
/// # Errors
/// - Catalog could not be built or the genre list could not be fetched
pub async fn genres(config: &MarqueeConfig) -> anyhow::Result<()> {
    let table = GenreTable::new();
    table
        .load(catalog(config)?.as_ref())
        .await
        .context("Failed to load genres")?;
    print!("{}", render::genre_table(&table.entries()));
    Ok(())
}

/// One line of interactive input.
#[derive(Debug, PartialEq)]
enum BrowseInput {
    Query(String),
    Open(MovieId),
    Close,
    Trending,
    Help,
    Quit,
    Invalid(String),
}

fn parse_input(line: &str) -> BrowseInput {
    let Some(command) = line.trim().strip_prefix(':') else {
        return BrowseInput::Query(line.to_string());
    };
    let mut parts = command.split_whitespace();
    match (parts.next(), parts.next()) {
        (Some("open"), Some(id)) => match id.parse() {
            Ok(id) => BrowseInput::Open(id),
            Err(_) => BrowseInput::Invalid(format!("Not a movie id: {id}")),
        },
        (Some("close"), None) => BrowseInput::Close,
        (Some("trending"), None) => BrowseInput::Trending,
        (Some("help"), None) => BrowseInput::Help,
        (Some("quit" | "q"), None) => BrowseInput::Quit,
        _ => BrowseInput::Invalid(format!("Unknown command: {}", line.trim())),
    }
}

const BROWSE_HELP: &str = "\
Type to search; each line replaces the search text (empty line = popular).
  :open <id>   show movie details
  :close       close the detail view
  :trending    refresh trending searches
  :quit        leave";

/// Interactive session driven by stdin lines.
///
/// # Errors
/// - Catalog or trending store could not be built
/// - Standard input could not be read
pub async fn browse(config: &MarqueeConfig) -> anyhow::Result<()> {
    let session = DiscoverySession::from_config(config)
        .await
        .context("Failed to start discovery session")?;
    let images = ImageConfig::from_config(&config.catalog);
    let stdin = BufReader::new(tokio::io::stdin());
    run_browse(Arc::new(session), &images, stdin, &mut std::io::stdout()).await
}

/// Reads commands from `input` and renders every published state to `out`.
///
/// Detail loads and trending refreshes run as their own tasks, so input is
/// read and rendered while they are in flight.
async fn run_browse<R, W>(
    session: Arc<DiscoverySession>,
    images: &ImageConfig,
    input: R,
    out: &mut W,
) -> anyhow::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: Write,
{
    let mut results = session.subscribe_results();
    let mut detail = session.subscribe_detail();
    let mut trending = session.subscribe_trending();

    let list = session.list();
    write!(out, "{}", render::trending_panel(&session.trending()))?;
    write!(
        out,
        "{}",
        render::movie_list(&render::list_heading(&list.query), &list.state)
    )?;
    writeln!(out, "{BROWSE_HELP}")?;
    results.mark_unchanged();
    detail.mark_unchanged();
    trending.mark_unchanged();

    let mut lines = input.lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line.context("Failed to read input")? else {
                    break;
                };
                match parse_input(&line) {
                    BrowseInput::Query(text) => {
                        session.type_query(text);
                    }
                    BrowseInput::Open(id) => {
                        let session = Arc::clone(&session);
                        tokio::spawn(async move {
                            session.open_detail(id).await;
                        });
                    }
                    BrowseInput::Close => session.close_detail(),
                    BrowseInput::Trending => {
                        let session = Arc::clone(&session);
                        tokio::spawn(async move {
                            session.refresh_trending().await;
                        });
                    }
                    BrowseInput::Help => writeln!(out, "{BROWSE_HELP}")?,
                    BrowseInput::Quit => break,
                    BrowseInput::Invalid(message) => writeln!(out, "{message}")?,
                }
            }
            changed = results.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = results.borrow_and_update().clone();
                let heading = render::list_heading(&view.query);
                write!(out, "{}", render::movie_list(&heading, &view.state))?;
            }
            changed = detail.changed() => {
                if changed.is_err() {
                    break;
                }
                let view = detail.borrow_and_update().clone();
                write!(out, "{}", render::detail_view(view.as_ref(), images))?;
            }
            changed = trending.changed() => {
                if changed.is_err() {
                    break;
                }
                let entries = trending.borrow_and_update().clone();
                write!(out, "{}", render::trending_panel(&entries))?;
            }
        }
        out.flush()?;
    }

    tracing::debug!("Browse session ended");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use marquee_catalog::{DetailLeg, ScriptedCatalog};
    use marquee_discovery::SessionOptions;
    use marquee_trending::InMemoryTrendingStore;
    use tokio::io::AsyncWriteExt;

    use super::*;

    const QUIET: Duration = Duration::from_millis(500);

    async fn scripted_session(catalog: &ScriptedCatalog) -> Arc<DiscoverySession> {
        let session = DiscoverySession::start(
            Arc::new(catalog.clone()),
            Arc::new(InMemoryTrendingStore::new(ImageConfig::default())),
            SessionOptions {
                debounce: QUIET,
                trending_limit: 5,
            },
        )
        .await;
        Arc::new(session)
    }

    /// Splits browse output into `(query, rendered text)` per search list.
    fn search_lists(text: &str) -> Vec<(String, String)> {
        text.split("Results for \"")
            .skip(1)
            .filter_map(|chunk| chunk.split_once('"'))
            .map(|(query, body)| (query.to_string(), body.to_string()))
            .collect()
    }

    #[test]
    fn test_plain_lines_are_queries() {
        assert_eq!(
            parse_input("the batman"),
            BrowseInput::Query("the batman".to_string())
        );
        assert_eq!(parse_input(""), BrowseInput::Query(String::new()));
    }

    #[test]
    fn test_commands() {
        assert_eq!(parse_input(":open 155"), BrowseInput::Open(MovieId(155)));
        assert_eq!(parse_input(" :close "), BrowseInput::Close);
        assert_eq!(parse_input(":q"), BrowseInput::Quit);
        assert!(matches!(parse_input(":open abc"), BrowseInput::Invalid(_)));
        assert!(matches!(parse_input(":open"), BrowseInput::Invalid(_)));
    }

    #[tokio::test]
    async fn test_one_shot_commands_in_development_mode() {
        let config = MarqueeConfig::for_testing();

        search(&config, "dune").await.unwrap();
        detail(&config, MovieId(438631)).await.unwrap();
        trending(&config, None).await.unwrap();
        genres(&config).await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_is_read_while_detail_still_loading() {
        let catalog = ScriptedCatalog::new();
        catalog.delay_leg(MovieId(348), DetailLeg::Credits, Duration::from_secs(5));
        let session = scripted_session(&catalog).await;
        let images = ImageConfig::default();
        let (mut keyboard, input) = tokio::io::duplex(256);
        let mut out = Vec::new();

        let (outcome, ()) = tokio::join!(
            run_browse(Arc::clone(&session), &images, BufReader::new(input), &mut out),
            async {
                keyboard.write_all(b":open 348\n").await.unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert!(session.detail().unwrap().state.is_loading());

                keyboard.write_all(b":close\n").await.unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
                assert_eq!(session.detail(), None);

                // Credits arrive long after the view was closed
                tokio::time::sleep(Duration::from_secs(6)).await;
                assert_eq!(session.detail(), None);
                keyboard.write_all(b":quit\n").await.unwrap();
            }
        );
        outcome.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Loading movie 348..."));
        assert!(!text.contains("Director"), "closed detail was rendered:\n{text}");
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_open_replaces_slow_first_one() {
        let catalog = ScriptedCatalog::new();
        catalog.delay_leg(MovieId(348), DetailLeg::Detail, Duration::from_secs(5));
        let session = scripted_session(&catalog).await;
        let images = ImageConfig::default();
        let (mut keyboard, input) = tokio::io::duplex(256);
        let mut out = Vec::new();

        let (outcome, ()) = tokio::join!(
            run_browse(Arc::clone(&session), &images, BufReader::new(input), &mut out),
            async {
                keyboard.write_all(b":open 348\n:open 155\n").await.unwrap();
                tokio::time::sleep(Duration::from_millis(100)).await;
                let view = session.detail().unwrap();
                assert_eq!(view.movie_id, MovieId(155));
                assert!(view.state.is_ready());

                tokio::time::sleep(Duration::from_secs(6)).await;
                assert_eq!(session.detail().unwrap().movie_id, MovieId(155));
                keyboard.write_all(b":quit\n").await.unwrap();
            }
        );
        outcome.unwrap();

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Christopher Nolan"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_list_heading_follows_settled_query() {
        let catalog = ScriptedCatalog::new();
        catalog.delay_query("alien", Duration::from_millis(300));
        let session = scripted_session(&catalog).await;
        let images = ImageConfig::default();
        let (mut keyboard, input) = tokio::io::duplex(256);
        let mut out = Vec::new();

        let (outcome, ()) = tokio::join!(
            run_browse(Arc::clone(&session), &images, BufReader::new(input), &mut out),
            async {
                keyboard.write_all(b"alien\n").await.unwrap();
                tokio::time::sleep(QUIET + Duration::from_millis(100)).await;
                // Alien is still loading when the next text is typed
                keyboard.write_all(b"dune\n").await.unwrap();
                tokio::time::sleep(QUIET * 2).await;
                keyboard.write_all(b":quit\n").await.unwrap();
            }
        );
        outcome.unwrap();

        let lists = search_lists(&String::from_utf8(out).unwrap());
        assert!(
            lists
                .iter()
                .any(|(query, body)| query == "alien" && body.contains("Alien"))
        );
        assert!(
            lists
                .iter()
                .any(|(query, body)| query == "dune" && body.contains("Dune"))
        );
        for (query, body) in &lists {
            if query == "dune" {
                assert!(!body.contains("Alien"), "alien results under dune:\n{body}");
            }
        }
    }
}
