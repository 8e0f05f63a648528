//! Document model: line storage plus the highlight invalidation cascade.
//!
//! ## Learning: Arena + Index over Hidden Slots
//!
//! GUI text widgets often hang per-block user state off the rendering
//! framework. Here the per-line [`LineState`] array is owned explicitly by
//! the document, the classifier stays a pure function, and invalidation is a
//! plain loop over indices — easy to test without any widget in sight.

use regex::Regex;
use std::ops::Range;
use std::sync::Arc;

use flare_syntax::{LanguageDefinition, LineState, Span, classify};

use crate::{CoreError, CoreResult};

/// A document being highlighted: line text, the outgoing [`LineState`] of
/// every line, and the cached display spans.
///
/// Each line's classification depends only on its text and the previous
/// line's outgoing state, so an edit re-classifies the changed line and then
/// walks forward only while outgoing states keep changing (fixed-point
/// propagation). A keystroke that does not toggle a multi-line construct
/// touches exactly one line; one that opens or closes a triple-quoted string
/// pays for the lines it actually affects, worst case the rest of the
/// document.
pub struct Document {
    language: Arc<LanguageDefinition>,
    lines: Vec<String>,
    /// Outgoing state per line; line `i + 1` classifies against `states[i]`
    states: Vec<LineState>,
    spans: Vec<Vec<Span>>,
}

impl Document {
    /// Creates an empty single-line document.
    pub fn new(language: Arc<LanguageDefinition>) -> Self {
        let mut doc = Self {
            language,
            lines: vec![String::new()],
            states: vec![LineState::Normal],
            spans: vec![Vec::new()],
        };
        // A single empty line classifies trivially but keeps the caches
        // consistent with the invariant that every line has been classified.
        let _ = doc.on_line_changed(0);
        doc
    }

    /// Creates a document from full text, classifying every line once.
    ///
    /// Lines are split on `\n`; a trailing `\r` is stripped so CRLF input
    /// highlights the same as LF input.
    pub fn from_text(language: Arc<LanguageDefinition>, text: &str) -> Self {
        let lines: Vec<String> = text
            .split('\n')
            .map(|line| line.strip_suffix('\r').unwrap_or(line).to_string())
            .collect();
        let count = lines.len();
        let mut doc = Self {
            language,
            lines,
            states: vec![LineState::Normal; count],
            spans: vec![Vec::new(); count],
        };
        let mut incoming = LineState::Normal;
        for i in 0..count {
            let (spans, outgoing) = classify(&doc.lines[i], incoming, &doc.language);
            doc.spans[i] = spans;
            doc.states[i] = outgoing;
            incoming = outgoing;
        }
        doc
    }

    // ==================== Queries ====================

    /// The language this document is highlighted as.
    pub fn language(&self) -> &LanguageDefinition {
        &self.language
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> CoreResult<&str> {
        self.lines
            .get(index)
            .map(String::as_str)
            .ok_or(CoreError::LineOutOfBounds(index))
    }

    /// The cached display spans for a line.
    pub fn spans(&self, index: usize) -> CoreResult<&[Span]> {
        self.spans
            .get(index)
            .map(Vec::as_slice)
            .ok_or(CoreError::LineOutOfBounds(index))
    }

    /// The outgoing classification state of a line.
    pub fn state(&self, index: usize) -> CoreResult<LineState> {
        self.states
            .get(index)
            .copied()
            .ok_or(CoreError::LineOutOfBounds(index))
    }

    /// The full text, lines joined with `\n`.
    pub fn text(&self) -> String {
        self.lines.join("\n")
    }

    // ==================== Edits ====================

    /// Replaces a line's text and re-classifies.
    ///
    /// Returns the number of lines re-classified.
    pub fn set_line(&mut self, index: usize, text: impl Into<String>) -> CoreResult<usize> {
        if index >= self.lines.len() {
            return Err(CoreError::LineOutOfBounds(index));
        }
        self.lines[index] = text.into();
        self.on_line_changed(index)
    }

    /// Inserts a new line before `index` (`index == line_count` appends).
    ///
    /// Returns the number of lines re-classified.
    pub fn insert_line(&mut self, index: usize, text: impl Into<String>) -> CoreResult<usize> {
        if index > self.lines.len() {
            return Err(CoreError::LineOutOfBounds(index));
        }
        self.lines.insert(index, text.into());
        // Seed the new slot with the state the following line last consumed,
        // so the cascade's fixed-point check stays meaningful.
        let seed = if index == 0 {
            LineState::Normal
        } else {
            self.states[index - 1]
        };
        self.states.insert(index, seed);
        self.spans.insert(index, Vec::new());
        self.on_line_changed(index)
    }

    /// Removes a line. The last remaining line is cleared instead of removed.
    ///
    /// Returns the number of lines re-classified.
    pub fn remove_line(&mut self, index: usize) -> CoreResult<usize> {
        if index >= self.lines.len() {
            return Err(CoreError::LineOutOfBounds(index));
        }
        if self.lines.len() == 1 {
            return self.set_line(0, String::new());
        }
        self.lines.remove(index);
        self.states.remove(index);
        self.spans.remove(index);
        if index < self.lines.len() {
            // The line now at `index` has a new predecessor.
            self.on_line_changed(index)
        } else {
            Ok(0)
        }
    }

    /// Re-classifies a line and cascades forward while outgoing states keep
    /// changing.
    ///
    /// This is the fixed-point propagation: the walk stops at the first line
    /// whose outgoing state matches its stored value (nothing downstream can
    /// be affected) or at end of document.
    pub fn on_line_changed(&mut self, index: usize) -> CoreResult<usize> {
        if index >= self.lines.len() {
            return Err(CoreError::LineOutOfBounds(index));
        }
        let mut reclassified = 0;
        let mut i = index;
        loop {
            let incoming = if i == 0 {
                LineState::Normal
            } else {
                self.states[i - 1]
            };
            let (spans, outgoing) = classify(&self.lines[i], incoming, &self.language);
            let changed = outgoing != self.states[i];
            self.spans[i] = spans;
            self.states[i] = outgoing;
            reclassified += 1;
            if !changed || i + 1 >= self.lines.len() {
                break;
            }
            i += 1;
        }
        tracing::debug!(start = index, lines = reclassified, "re-classified");
        Ok(reclassified)
    }

    // ==================== Search ====================

    /// Whole-word occurrences of `word` across the document, as
    /// `(line index, byte range)` pairs. Used by the editing surface to
    /// highlight every occurrence of the selected word.
    pub fn word_occurrences(&self, word: &str) -> Vec<(usize, Range<usize>)> {
        if word.is_empty() {
            return Vec::new();
        }
        let Ok(pattern) = Regex::new(&format!(r"\b{}\b", regex::escape(word))) else {
            return Vec::new();
        };
        self.lines
            .iter()
            .enumerate()
            .flat_map(|(i, line)| pattern.find_iter(line).map(move |m| (i, m.range())))
            .collect()
    }
}
