//! # Flare Core
//!
//! Document model and highlight state management.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────┐
//! │                    Document                       │
//! │  ┌───────────┐ ┌────────────┐ ┌───────────────┐  │
//! │  │   lines   │ │ LineState  │ │  span cache   │  │
//! │  │ Vec<String>│ │ per line   │ │  per line     │  │
//! │  └───────────┘ └────────────┘ └───────────────┘  │
//! │        │              │                           │
//! │        └── classify(text, state[i-1]) ────────────┼──▶ render spans
//! └──────────────────────────────────────────────────┘
//! ```
//!
//! The classifier itself lives in `flare-syntax` and is pure; this crate owns
//! the per-line state array and decides how far a change propagates.

pub mod config;
pub mod document;

pub use config::Config;
pub use document::Document;

/// Result type for core operations
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("line {0} is out of bounds")]
    LineOutOfBounds(usize),

    #[error("language error: {0}")]
    Language(#[from] flare_syntax::LanguageError),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),
}
