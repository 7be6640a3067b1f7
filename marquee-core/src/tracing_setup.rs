//! Logging for the marquee binary.
//!
//! Two sinks share one registry. Stderr carries what the user asked to see.
//! The run log under the logs directory records everything, which is where
//! the technical detail of fetch failures goes since the interface only
//! shows short messages.

use std::fs::{File, create_dir_all};
use std::path::{Path, PathBuf};

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer, fmt};

use crate::{MarqueeError, Result};

/// File name of the per-run debug log, overwritten on every start.
pub const LOG_FILE_NAME: &str = "marquee-last-run.log";

/// Logs directory used when none is given.
pub const DEFAULT_LOGS_DIR: &str = "logs";

/// Run log filter: all of marquee, with the HTTP stack held to summaries.
const RUN_LOG_DIRECTIVES: &str = "trace,hyper=info,hyper_util=info,h2=info,rustls=info";

/// Where the run log for `logs_dir` is written.
pub fn run_log_path(logs_dir: Option<&Path>) -> PathBuf {
    logs_dir
        .unwrap_or_else(|| Path::new(DEFAULT_LOGS_DIR))
        .join(LOG_FILE_NAME)
}

/// `RUST_LOG` wins over the level picked on the command line.
fn console_filter(level: Level) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.to_string()))
}

fn run_log_filter() -> EnvFilter {
    EnvFilter::new(RUN_LOG_DIRECTIVES)
}

fn open_run_log(path: &Path) -> Result<File> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    Ok(File::create(path)?)
}

/// Installs the global subscriber and returns the path of the run log.
///
/// # Errors
///
/// - `MarqueeError::Io` - Logs directory or run log cannot be created
/// - `MarqueeError::Logging` - A global subscriber is already installed
pub fn init_tracing(console_level: Level, logs_dir: Option<&Path>) -> Result<PathBuf> {
    let path = run_log_path(logs_dir);
    let run_log = open_run_log(&path)?;

    let console = fmt::layer()
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .with_filter(console_filter(console_level));

    let file = fmt::layer()
        .with_thread_names(true)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_writer(run_log)
        .with_filter(run_log_filter());

    tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init()
        .map_err(|e| MarqueeError::Logging {
            reason: e.to_string(),
        })?;

    tracing::info!(console = %console_level, run_log = %path.display(), "Logging ready");
    Ok(path)
}

/// Verbosity choices of the `--log-level` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum CliLogLevel {
    /// Failures only
    Error,
    /// Failures and degraded behaviour, such as an unreachable trending store
    #[default]
    Warn,
    /// Session lifecycle
    Info,
    /// Every request and state change
    Debug,
    /// Everything, including debounce decisions
    Trace,
}

impl CliLogLevel {
    /// The `tracing` level this choice stands for.
    ///
    /// ```
    /// use marquee_core::tracing_setup::CliLogLevel;
    ///
    /// assert_eq!(CliLogLevel::Info.as_tracing_level(), tracing::Level::INFO);
    /// ```
    pub fn as_tracing_level(self) -> Level {
        Level::from(self)
    }
}

impl From<CliLogLevel> for Level {
    fn from(level: CliLogLevel) -> Self {
        match level {
            CliLogLevel::Error => Level::ERROR,
            CliLogLevel::Warn => Level::WARN,
            CliLogLevel::Info => Level::INFO,
            CliLogLevel::Debug => Level::DEBUG,
            CliLogLevel::Trace => Level::TRACE,
        }
    }
}

impl std::fmt::Display for CliLogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.as_tracing_level().to_string().to_ascii_lowercase())
    }
}
