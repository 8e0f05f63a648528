//! # Flare - Incremental Syntax Highlighting
//!
//! A per-line tokenizer/highlighter engine, with a CLI driver that renders a
//! file to ANSI-colored terminal output.
//!
//! ## Quick Start
//!
//! ```bash
//! # Highlight a file (language detected from the extension)
//! cargo run -- path/to/script.py
//!
//! # Force a language
//! cargo run -- notes.txt --language python
//! ```

use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use flare_core::{Config, Document};
use flare_syntax::{Category, FontWeight, Span, Style, Theme, language_for_extension};

/// Flare - an incremental syntax-highlighting engine
#[derive(Parser, Debug)]
#[command(name = "flare")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to highlight
    #[arg(value_name = "FILE")]
    file: PathBuf,

    /// Language to highlight as (default: detect from the file extension)
    #[arg(short, long)]
    language: Option<String>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Initialize logging
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting flare v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::load();

    // Pick the language from the flag or the file extension.
    let selector = args.language.clone().unwrap_or_else(|| {
        args.file
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default()
            .to_string()
    });
    let mut definition = language_for_extension(&selector)?;
    let tab_size = config.tab_size_for(definition.name());
    if tab_size != definition.indent_width() {
        definition = definition.with_indent_width(tab_size)?;
    }
    tracing::info!(
        language = definition.name(),
        "highlighting {}",
        args.file.display()
    );

    let text = std::fs::read_to_string(&args.file)?;
    let document = Document::from_text(Arc::new(definition), &text);

    let theme = document.language().theme().clone();
    for i in 0..document.line_count() {
        println!(
            "{}",
            render_line(document.line(i)?, document.spans(i)?, &theme)
        );
    }

    Ok(())
}

/// Renders one line with ANSI truecolor escapes.
///
/// Spans are painted in production order onto a per-byte style buffer, so
/// later spans (custom matches, comments, strings) win on overlap — the same
/// layering a GUI text surface applies.
fn render_line(line: &str, spans: &[Span], theme: &Theme) -> String {
    let mut styles: Vec<Style> = vec![theme.style(Category::Identifier); line.len()];
    for span in spans {
        let style = theme.style(span.category);
        for byte in span.range() {
            if byte < styles.len() {
                styles[byte] = style;
            }
        }
    }

    let mut out = String::with_capacity(line.len() * 2);
    let mut current: Option<Style> = None;
    for (i, c) in line.char_indices() {
        if current != Some(styles[i]) {
            out.push_str(&ansi(styles[i]));
            current = Some(styles[i]);
        }
        out.push(c);
    }
    out.push_str("\x1b[0m");
    out
}

fn ansi(style: Style) -> String {
    let bold = if style.weight == FontWeight::Bold {
        "1;"
    } else {
        ""
    };
    format!(
        "\x1b[0m\x1b[{}38;2;{};{};{}m",
        bold, style.color.r, style.color.g, style.color.b
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use flare_syntax::{LanguageDefinition, LineState, classify};

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["flare", "test.py"]);
        assert_eq!(args.file, PathBuf::from("test.py"));
        assert!(args.language.is_none());
    }

    #[test]
    fn test_args_with_language() {
        let args = Args::parse_from(["flare", "notes.txt", "--language", "python"]);
        assert_eq!(args.language.as_deref(), Some("python"));
    }

    #[test]
    fn test_render_line_resets_at_end() {
        let def = LanguageDefinition::python().unwrap();
        let (spans, _) = classify("x = 1", LineState::Normal, &def);
        let rendered = render_line("x = 1", &spans, def.theme());
        assert!(rendered.ends_with("\x1b[0m"));
        assert!(rendered.contains('x'));
    }
}
