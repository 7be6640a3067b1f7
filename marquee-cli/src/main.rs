//! Marquee CLI - Terminal movie discovery
//!
//! Search the movie catalog, open movie details and see what other people
//! search for.

mod commands;
mod render;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use marquee_core::tracing_setup::{CliLogLevel, init_tracing};
use marquee_core::{MarqueeConfig, RuntimeMode};

#[derive(Parser)]
#[command(name = "marquee")]
#[command(about = "Movie discovery with debounced search and trending searches")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<commands::Commands>,

    /// Console log level (RUST_LOG takes precedence)
    #[arg(long, value_enum, default_value_t = CliLogLevel::Warn, global = true)]
    log_level: CliLogLevel,

    /// Runtime mode: production or development (overrides MARQUEE_MODE)
    #[arg(long, global = true)]
    mode: Option<RuntimeMode>,

    /// Directory for the debug log file
    #[arg(long, global = true)]
    logs_dir: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine; real environment variables still apply
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_tracing(cli.log_level.as_tracing_level(), cli.logs_dir.as_deref())
        .context("Failed to initialize logging")?;

    let mut config = MarqueeConfig::from_env();
    if let Some(mode) = cli.mode {
        config.mode = mode;
    }
    if let Err(e) = config.validate() {
        eprintln!("{}", e.user_message());
        eprintln!("Set the variable in the environment or a .env file, or run with --mode development.");
        std::process::exit(2);
    }

    let command = cli.command.unwrap_or(commands::Commands::Browse);
    commands::handle_command(command, config).await
}
