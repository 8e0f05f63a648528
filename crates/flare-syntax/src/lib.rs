//! # Flare Syntax
//!
//! Regex-based incremental syntax highlighting.
//!
//! The engine classifies one line at a time: [`classify`] takes a line's text
//! plus the [`LineState`] carried out of the previous line, and produces
//! display [`Span`]s plus the state to carry into the next line. Triple-quoted
//! strings are the only construct that crosses line boundaries, and the
//! carried state is what keeps re-highlighting after a keystroke cheap: a
//! document only needs to re-classify lines until one line's outgoing state
//! matches its stored value.
//!
//! ## Why regex instead of a real parser?
//!
//! - **Bounded latency**: classification must finish between keystrokes
//! - **Error tolerance**: half-typed code still highlights usefully
//! - **Simplicity**: a language is a data table, not a grammar
//!
//! ## Learning: Purity as an API Contract
//!
//! [`classify`] is a pure function of `(text, incoming state, definition)`.
//! There is no hidden per-line slot mutated behind the scenes; callers own
//! the state array and decide how far invalidation propagates.

mod classify;
mod indent;
mod language;
mod theme;

pub use classify::{LineState, Span, classify};
pub use indent::{dedent_on, indent_for, leading_whitespace};
pub use language::{
    Category, LanguageDefinition, MultilineStrings, Pattern, language_for_extension,
};
pub use theme::{Color, FontWeight, Style, Theme};

/// Result type for syntax operations
pub type SyntaxResult<T> = Result<T, LanguageError>;

/// Errors that can occur while building a language definition.
///
/// Classification itself never fails: a malformed source line yields a
/// best-effort span set, not an error. Everything that *can* go wrong is
/// caught here, when the definition is constructed.
#[derive(Debug, thiserror::Error)]
pub enum LanguageError {
    #[error("invalid pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: Box<regex::Error>,
    },

    #[error("theme has no style for category `{0}`")]
    MissingStyle(Category),

    #[error("indent width must be positive")]
    InvalidIndentWidth,
}
