//! Marquee Core - Shared building blocks for movie discovery
//!
//! This crate provides the pieces every other Marquee crate leans on:
//! configuration, runtime mode selection, the tri-state result model with
//! request sequencing, the search debouncer, and tracing setup.

pub mod config;
pub mod debounce;
pub mod mode;
pub mod state;
pub mod tracing_setup;

// Re-export main types for convenient access
pub use config::MarqueeConfig;
pub use debounce::Debouncer;
pub use mode::RuntimeMode;
pub use state::{RequestSequence, ResultState, SequencedState, Ticket};

/// Core errors that can bubble up from application setup.
///
/// Remote service failures live in the catalog and trending crates; this
/// enum covers what goes wrong before any request is made.
#[derive(Debug, thiserror::Error)]
pub enum MarqueeError {
    #[error("Configuration error: {reason}")]
    Configuration { reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Logging setup failed: {reason}")]
    Logging { reason: String },
}

impl MarqueeError {
    /// Returns a user-friendly error message suitable for display.
    pub fn user_message(&self) -> String {
        match self {
            MarqueeError::Configuration { reason } => format!("Configuration problem: {reason}"),
            MarqueeError::Io(_) => "File system error occurred".to_string(),
            MarqueeError::Logging { .. } => "Could not set up logging".to_string(),
        }
    }

    /// Checks if this error is due to user-supplied settings.
    pub fn is_user_error(&self) -> bool {
        matches!(self, MarqueeError::Configuration { .. })
    }
}

pub type Result<T> = std::result::Result<T, MarqueeError>;
