//! The per-line classifier.
//!
//! Classification runs a fixed sequence of passes, and the order is load
//! bearing:
//!
//! 1. Triple-quoted string regions are found first (honoring the state
//!    carried in from the previous line) and blanked out of the text every
//!    later pass sees.
//! 2. Comment markers are searched in a copy that also blanks provisional
//!    single-line string regions, so a `#` inside any string is never a
//!    comment. Everything from the earliest comment start onward is invisible
//!    to later passes.
//! 3. The generic category sweep and the custom matches run over the blanked,
//!    truncated text; custom matches come later so they win on overlap.
//! 4. Single-line strings are scanned last; their spans (and the multi-line
//!    spans from pass 1) land after the token spans, so a renderer applying
//!    spans in order always paints strings and comments over tokens.
//!
//! Escapes follow one rule everywhere: a character preceded by an odd run of
//! backslashes is escaped; an even run (including zero) leaves it live.

use std::ops::Range;

use crate::language::{Category, LanguageDefinition, Pattern};

/// Classification context carried between consecutive lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineState {
    /// No construct is open at the line boundary.
    #[default]
    Normal,
    /// A single-line string was continued past the line break with a trailing
    /// backslash; the payload is the delimiter that opened it.
    InString(char),
    /// A triple-quoted string is open at the line boundary.
    InMultilineString,
}

/// A categorized sub-range of a line, as byte offsets into the line's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Span {
    pub category: Category,
    pub start: usize,
    pub len: usize,
}

impl Span {
    pub fn new(category: Category, start: usize, len: usize) -> Self {
        Self {
            category,
            start,
            len,
        }
    }

    pub fn end(&self) -> usize {
        self.start + self.len
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Classifies one line of text.
///
/// Pure: the result depends only on the line's text, the state carried out of
/// the previous line, and the (immutable) language definition. Returns the
/// spans to display and the state to carry into the next line.
///
/// Unterminated constructs are not errors. An unclosed single-line string is
/// closed at end of line unless continued with a trailing backslash; an
/// unclosed triple-quoted string leaves [`LineState::InMultilineString`] for
/// the document to propagate.
pub fn classify(
    text: &str,
    incoming: LineState,
    def: &LanguageDefinition,
) -> (Vec<Span>, LineState) {
    let mut spans = Vec::new();

    let start_inside = matches!(incoming, LineState::InMultilineString);
    let scan = |t: &str| match def.multiline_strings() {
        Some(ext) => scan_multiline(t, start_inside, ext.delimiters()),
        None => (Vec::new(), false),
    };
    let continued = match incoming {
        LineState::InString(delim) => Some(delim),
        _ => None,
    };

    // Pass 1: multi-line regions, then the comment search on fully blanked
    // text.
    let (ml_regions, ml_open) = scan(text);
    let masked = mask_regions(text, &ml_regions);
    let (provisional_strings, _) = scan_strings(&masked, continued, def.string_delimiters());
    let comment_mask = mask_regions(&masked, &provisional_strings);
    let comment = find_comment(&comment_mask, def.comment_patterns());

    // A confirmed comment truncates the line; the multi-line scan re-runs on
    // the truncated text because a "delimiter" inside the comment is not one.
    let (visible, ml_regions, ml_open) = match &comment {
        Some(span) => {
            let cut = floor_char_boundary(text, span.start);
            tracing::trace!(at = cut, "comment truncates line");
            let truncated = &text[..cut];
            let (regions, open) = scan(truncated);
            (truncated, regions, open)
        }
        None => (text, ml_regions, ml_open),
    };

    // Pass 4 input: visible text with multi-line regions blanked.
    let visible_masked = mask_regions(visible, &ml_regions);
    let (string_regions, carry) =
        scan_strings(&visible_masked, continued, def.string_delimiters());

    // Passes 2 and 3: the token sweeps never see string or comment bytes.
    let token_text = mask_regions(&visible_masked, &string_regions);
    for (category, category_patterns) in def.categories() {
        for pattern in category_patterns {
            emit_matches(&token_text, *category, pattern, &mut spans);
        }
    }
    for (category, pattern) in def.custom_matches() {
        emit_matches(&token_text, *category, pattern, &mut spans);
    }

    if let Some(span) = comment {
        spans.push(span);
    }
    push_regions(&mut spans, &ml_regions);
    push_regions(&mut spans, &string_regions);

    let outgoing = if ml_open {
        LineState::InMultilineString
    } else if let Some(delim) = carry {
        LineState::InString(delim)
    } else {
        LineState::Normal
    };
    (spans, outgoing)
}

/// Finds triple-quote string regions and whether one is still open at end of
/// line.
///
/// A run of three identical quote characters toggles the region unless the
/// run is preceded by an odd number of backslashes. Quotes consumed by one
/// delimiter cannot participate in the next, and a line shorter than three
/// characters cannot form a delimiter at all.
fn scan_multiline(
    text: &str,
    start_inside: bool,
    quotes: &[char],
) -> (Vec<Range<usize>>, bool) {
    let chars: Vec<(usize, char)> = text.char_indices().collect();
    let mut regions = Vec::new();
    let mut inside = start_inside;
    let mut start = 0usize;
    let mut next_allowed = 0usize;

    for i in 0..chars.len() {
        if i < 2 || i < next_allowed {
            continue;
        }
        let c = chars[i].1;
        if !quotes.contains(&c) || chars[i - 1].1 != c || chars[i - 2].1 != c {
            continue;
        }
        let mut backslashes = 0;
        while i >= 3 + backslashes && chars[i - 3 - backslashes].1 == '\\' {
            backslashes += 1;
        }
        if backslashes % 2 == 1 {
            continue;
        }
        if inside {
            regions.push(start..chars[i].0 + c.len_utf8());
        } else {
            start = chars[i - 2].0;
        }
        inside = !inside;
        next_allowed = i + 3;
    }

    if inside {
        regions.push(start..text.len());
    }
    (regions, inside)
}

/// Scans single-line strings left to right.
///
/// Returns the string regions and, when the line ends inside a string with an
/// odd trailing-backslash run, the delimiter to carry into the next line.
/// Without the trailing backslash an unterminated string simply closes at end
/// of line; that leniency is deliberate, half-typed strings are the common
/// case in an editor.
fn scan_strings(
    text: &str,
    continued: Option<char>,
    delimiters: &[char],
) -> (Vec<Range<usize>>, Option<char>) {
    let mut regions = Vec::new();
    let mut current = continued;
    let mut start = 0usize;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if delimiters.contains(&c) && !escaped {
            match current {
                Some(delim) if c == delim => {
                    regions.push(start..i + c.len_utf8());
                    current = None;
                }
                Some(_) => {}
                None => {
                    current = Some(c);
                    start = i;
                }
            }
        }
        escaped = c == '\\' && !escaped;
    }

    if current.is_some() {
        regions.push(start..text.len());
        // `escaped` is true exactly when the trailing backslash run is odd.
        if escaped {
            return (regions, current);
        }
    }
    (regions, None)
}

/// Returns the earliest comment span across all comment patterns.
///
/// Runs over text whose string regions are already blanked, so the first
/// match per pattern is the first real comment marker.
fn find_comment(text: &str, comment_patterns: &[Pattern]) -> Option<Span> {
    let mut best: Option<Span> = None;
    for pattern in comment_patterns {
        let Some(caps) = pattern.regex().captures(text) else {
            continue;
        };
        let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
            continue;
        };
        if m.is_empty() {
            continue;
        }
        if best.as_ref().is_none_or(|b| m.start() < b.start) {
            best = Some(Span::new(Category::Comment, m.start(), m.end() - m.start()));
        }
    }
    best
}

/// Repeatedly matches one pattern, emitting a span per match.
///
/// Group 1 is preferred when the pattern defines and matched one; the search
/// resumes from the end of the emitted range.
fn emit_matches(text: &str, category: Category, pattern: &Pattern, spans: &mut Vec<Span>) {
    let mut at = 0;
    while at <= text.len() {
        let Some(caps) = pattern.regex().captures_at(text, at) else {
            break;
        };
        let Some(m) = caps.get(1).or_else(|| caps.get(0)) else {
            break;
        };
        if !m.is_empty() {
            spans.push(Span::new(category, m.start(), m.end() - m.start()));
        }
        // Forward progress even on a zero-width group.
        at = if m.end() > at {
            m.end()
        } else {
            next_char_boundary(text, at)
        };
    }
}

/// Replaces every character inside the regions with spaces, preserving byte
/// offsets so spans found in the masked text map straight back to the line.
fn mask_regions(text: &str, regions: &[Range<usize>]) -> String {
    if regions.is_empty() {
        return text.to_string();
    }
    let mut masked = String::with_capacity(text.len());
    for (i, c) in text.char_indices() {
        if regions.iter().any(|r| r.contains(&i)) {
            for _ in 0..c.len_utf8() {
                masked.push(' ');
            }
        } else {
            masked.push(c);
        }
    }
    masked
}

fn push_regions(spans: &mut Vec<Span>, regions: &[Range<usize>]) {
    for region in regions {
        if region.end > region.start {
            spans.push(Span::new(
                Category::String,
                region.start,
                region.end - region.start,
            ));
        }
    }
}

fn next_char_boundary(text: &str, at: usize) -> usize {
    let mut next = at + 1;
    while next < text.len() && !text.is_char_boundary(next) {
        next += 1;
    }
    next
}

fn floor_char_boundary(text: &str, at: usize) -> usize {
    let mut cut = at.min(text.len());
    while cut > 0 && !text.is_char_boundary(cut) {
        cut -= 1;
    }
    cut
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::language::LanguageDefinition;
    use proptest::prelude::*;

    fn python() -> LanguageDefinition {
        LanguageDefinition::python().unwrap()
    }

    /// Spans of one category, ordered by offset (production order follows
    /// the pattern table, not the text).
    fn spans_of(spans: &[Span], category: Category) -> Vec<(usize, usize)> {
        let mut found: Vec<(usize, usize)> = spans
            .iter()
            .filter(|s| s.category == category)
            .map(|s| (s.start, s.len))
            .collect();
        found.sort_unstable();
        found
    }

    #[test]
    fn test_classify_is_idempotent() {
        let def = python();
        let line = r#"def foo(self, n=0):  # comment"#;
        let first = classify(line, LineState::Normal, &def);
        let second = classify(line, LineState::Normal, &def);
        assert_eq!(first, second);
    }

    #[test]
    fn test_keyword_offsets_are_exact() {
        let def = python();
        let (spans, state) = classify("if x and y:", LineState::Normal, &def);
        assert_eq!(state, LineState::Normal);
        assert_eq!(spans_of(&spans, Category::Keyword), vec![(0, 2), (5, 3)]);
    }

    #[test]
    fn test_builtin_and_number() {
        let def = python();
        let (spans, _) = classify("print(42)", LineState::Normal, &def);
        assert_eq!(spans_of(&spans, Category::Builtin), vec![(0, 5)]);
        assert_eq!(spans_of(&spans, Category::Number), vec![(6, 2)]);
        assert_eq!(spans_of(&spans, Category::Brace), vec![(5, 1), (8, 1)]);
    }

    #[test]
    fn test_hex_number_capture() {
        let def = python();
        let (spans, _) = classify("v = 0x1F", LineState::Normal, &def);
        let numbers = spans_of(&spans, Category::Number);
        // The decimal pattern also claims the leading 0; the hex pattern
        // claims the whole literal.
        assert!(numbers.contains(&(4, 4)));
    }

    #[test]
    fn test_escaped_quote_does_not_open_a_string() {
        let def = python();
        // a\"b" — the first quote is escaped; the real string starts at the
        // second quote and closes at end of line.
        let (spans, state) = classify(r#"a\"b""#, LineState::Normal, &def);
        assert_eq!(state, LineState::Normal);
        assert_eq!(spans_of(&spans, Category::String), vec![(4, 1)]);
    }

    #[test]
    fn test_double_backslash_does_not_escape() {
        let def = python();
        // a\\"b" — the backslashes cancel, so the first quote opens and the
        // second closes.
        let (spans, _) = classify(r#"a\\"b""#, LineState::Normal, &def);
        assert_eq!(spans_of(&spans, Category::String), vec![(3, 3)]);
    }

    #[test]
    fn test_multiline_continuation_chain() {
        let def = python();

        let (spans, state) = classify(r#"x = """abc"#, LineState::Normal, &def);
        assert_eq!(state, LineState::InMultilineString);
        assert_eq!(spans_of(&spans, Category::String), vec![(4, 6)]);

        let (spans, state) = classify("def", state, &def);
        assert_eq!(state, LineState::InMultilineString);
        assert_eq!(spans_of(&spans, Category::String), vec![(0, 3)]);
        // `def` inside the string is not a keyword.
        assert!(spans_of(&spans, Category::Keyword).is_empty());

        let (spans, state) = classify(r#"ghi""""#, state, &def);
        assert_eq!(state, LineState::Normal);
        assert_eq!(spans_of(&spans, Category::String), vec![(0, 6)]);
    }

    #[test]
    fn test_escaped_triple_quote_does_not_close() {
        let def = python();
        let (_, state) = classify(r#"x = """abc"#, LineState::Normal, &def);
        let (_, state) = classify(r#"still open \""""#, state, &def);
        assert_eq!(state, LineState::InMultilineString);
        // Escape-escape cancels: \\""" does close.
        let (_, state) = classify(r#"now closed \\""""#, state, &def);
        assert_eq!(state, LineState::Normal);
    }

    #[test]
    fn test_comment_suppressed_inside_string() {
        let def = python();
        let (spans, state) = classify(r##"s = "# not a comment""##, LineState::Normal, &def);
        assert_eq!(state, LineState::Normal);
        assert!(spans_of(&spans, Category::Comment).is_empty());
        assert_eq!(spans_of(&spans, Category::String), vec![(4, 17)]);
    }

    #[test]
    fn test_comment_suppressed_inside_multiline_string() {
        let def = python();
        let (spans, state) = classify("# still a string", LineState::InMultilineString, &def);
        assert_eq!(state, LineState::InMultilineString);
        assert!(spans_of(&spans, Category::Comment).is_empty());
        assert_eq!(spans_of(&spans, Category::String), vec![(0, 16)]);
    }

    #[test]
    fn test_comment_after_string_is_accepted() {
        let def = python();
        let (spans, _) = classify(r#"s = "a" # trailing"#, LineState::Normal, &def);
        assert_eq!(spans_of(&spans, Category::Comment), vec![(8, 10)]);
        assert_eq!(spans_of(&spans, Category::String), vec![(4, 3)]);
    }

    #[test]
    fn test_comment_hides_rest_of_line() {
        let def = python();
        let (spans, state) = classify(r#"x = 1 # y = """ and "s""#, LineState::Normal, &def);
        assert_eq!(state, LineState::Normal);
        assert_eq!(spans_of(&spans, Category::Comment), vec![(6, 17)]);
        // Nothing after the comment start is tokenized.
        assert!(spans.iter().all(|s| s.category == Category::Comment || s.end() <= 6));
    }

    #[test]
    fn test_tokens_suppressed_inside_multiline_string() {
        let def = python();
        let (spans, _) = classify(r#"x = """if y""""#, LineState::Normal, &def);
        assert!(spans_of(&spans, Category::Keyword).is_empty());
        assert_eq!(spans_of(&spans, Category::String), vec![(4, 10)]);
    }

    #[test]
    fn test_string_continuation_with_trailing_backslash() {
        let def = python();
        let (_, state) = classify(r#"s = "abc\"#, LineState::Normal, &def);
        assert_eq!(state, LineState::InString('"'));

        let (spans, state) = classify(r#"tail""#, state, &def);
        assert_eq!(state, LineState::Normal);
        assert_eq!(spans_of(&spans, Category::String), vec![(0, 5)]);
    }

    #[test]
    fn test_unterminated_string_closes_at_eol() {
        let def = python();
        let (spans, state) = classify(r#"s = "abc"#, LineState::Normal, &def);
        assert_eq!(state, LineState::Normal);
        assert_eq!(spans_of(&spans, Category::String), vec![(4, 4)]);
    }

    #[test]
    fn test_empty_line_keeps_multiline_state() {
        let def = python();
        let (spans, state) = classify("", LineState::InMultilineString, &def);
        assert!(spans.is_empty());
        assert_eq!(state, LineState::InMultilineString);

        let (spans, state) = classify("", LineState::Normal, &def);
        assert!(spans.is_empty());
        assert_eq!(state, LineState::Normal);
    }

    #[test]
    fn test_short_line_cannot_open_triple_quote() {
        let def = python();
        let (_, state) = classify(r#""""#, LineState::Normal, &def);
        assert_eq!(state, LineState::Normal);
    }

    #[test]
    fn test_custom_matches_win_over_generic() {
        let def = python();
        let (spans, _) = classify("class Foo:", LineState::Normal, &def);
        assert_eq!(spans_of(&spans, Category::Keyword), vec![(0, 5)]);
        assert_eq!(spans_of(&spans, Category::ClassName), vec![(6, 3)]);

        let (spans, _) = classify("self.x = 1", LineState::Normal, &def);
        assert_eq!(spans_of(&spans, Category::SelfParam), vec![(0, 4)]);
    }

    #[test]
    fn test_function_name_capture() {
        let def = python();
        let (spans, _) = classify("def run(self):", LineState::Normal, &def);
        assert_eq!(spans_of(&spans, Category::FunctionName), vec![(4, 3)]);
    }

    #[test]
    fn test_generic_definition_has_no_multiline_strings() {
        let def = LanguageDefinition::generic().unwrap();
        let (spans, state) = classify(r#"x = """abc"#, LineState::Normal, &def);
        assert_eq!(state, LineState::Normal);
        // Three plain quotes: open-close, then an unterminated string.
        assert!(!spans_of(&spans, Category::String).is_empty());
    }

    #[test]
    fn test_spans_stay_in_bounds_with_multibyte_text() {
        let def = python();
        let line = "s = \"héllo\" # caña";
        let (spans, _) = classify(line, LineState::Normal, &def);
        for span in &spans {
            assert!(span.end() <= line.len());
            assert!(line.is_char_boundary(span.start));
            assert!(line.is_char_boundary(span.end()));
        }
    }

    proptest! {
        #[test]
        fn prop_classify_is_pure(text in "[ -~]{0,60}", which in 0usize..3) {
            let def = python();
            let incoming = match which {
                0 => LineState::Normal,
                1 => LineState::InString('"'),
                _ => LineState::InMultilineString,
            };
            let first = classify(&text, incoming, &def);
            let second = classify(&text, incoming, &def);
            prop_assert_eq!(&first, &second);
            for span in &first.0 {
                prop_assert!(span.len > 0);
                prop_assert!(span.end() <= text.len());
            }
        }
    }
}
