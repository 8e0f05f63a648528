//! Static language definitions: lexical categories, their matching rules, and
//! the indentation and theme tables that go with them.
//!
//! A definition is built once at startup and never mutated. Languages that
//! support triple-quoted strings carry a [`MultilineStrings`] extension; the
//! classifier composes its generic passes with that capability when present.
//! There is no trait object or subclassing involved — a language is data.

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::theme::Theme;
use crate::{LanguageError, SyntaxResult};

/// Spaces per indent unit unless a definition overrides it.
pub const DEFAULT_INDENT_WIDTH: usize = 4;

/// Lexical categories a span can be classified as.
///
/// ## Learning: Enums over String Keys
///
/// Category names are a closed set, so they are an enum rather than strings:
/// a typo'd category is a compile error, and theme coverage can be verified
/// when the definition is built instead of failing mid-keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Plain text that no other category claimed
    Identifier,
    Keyword,
    Builtin,
    Operator,
    Brace,
    Number,
    /// Name following a function-definition keyword
    FunctionName,
    /// Name following a class-definition keyword
    ClassName,
    /// Reserved self-reference identifier
    SelfParam,
    String,
    Comment,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Identifier => "identifier",
            Category::Keyword => "keyword",
            Category::Builtin => "builtin",
            Category::Operator => "operator",
            Category::Brace => "brace",
            Category::Number => "number",
            Category::FunctionName => "function_name",
            Category::ClassName => "class_name",
            Category::SelfParam => "self_param",
            Category::String => "string",
            Category::Comment => "comment",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled matching rule.
///
/// Compilation happens exactly once, when the definition is constructed;
/// classification only ever runs pre-compiled patterns.
#[derive(Debug, Clone)]
pub struct Pattern {
    regex: Regex,
}

impl Pattern {
    pub fn new(pattern: &str) -> SyntaxResult<Self> {
        Regex::new(pattern)
            .map(|regex| Self { regex })
            .map_err(|source| LanguageError::InvalidPattern {
                pattern: pattern.to_string(),
                source: Box::new(source),
            })
    }

    pub fn regex(&self) -> &Regex {
        &self.regex
    }
}

/// Multi-line string capability: the quote characters that, tripled, open and
/// close a string region spanning lines (e.g. `"""` and `'''`).
#[derive(Debug, Clone)]
pub struct MultilineStrings {
    delimiters: Vec<char>,
}

impl MultilineStrings {
    pub fn new(delimiters: Vec<char>) -> Self {
        Self { delimiters }
    }

    pub fn delimiters(&self) -> &[char] {
        &self.delimiters
    }
}

/// An immutable description of how one language is highlighted and indented.
///
/// # Thread Safety
///
/// `LanguageDefinition` is `Send + Sync`: it is read-only after construction
/// and can be shared between threads behind an `Arc`.
#[derive(Debug, Clone)]
pub struct LanguageDefinition {
    name: &'static str,
    /// Ordered category table for the generic token pass
    categories: Vec<(Category, Vec<Pattern>)>,
    /// Characters that open and close single-line strings
    string_delimiters: Vec<char>,
    comment_patterns: Vec<Pattern>,
    /// Evaluated after the generic sweep; later matches win on overlap
    custom_matches: Vec<(Category, Pattern)>,
    /// A line matching any trigger indents the next line one unit further
    indent_triggers: Vec<Pattern>,
    indent_width: usize,
    theme: Theme,
    multiline_strings: Option<MultilineStrings>,
}

impl LanguageDefinition {
    // ==================== Accessors ====================

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn categories(&self) -> &[(Category, Vec<Pattern>)] {
        &self.categories
    }

    pub fn string_delimiters(&self) -> &[char] {
        &self.string_delimiters
    }

    pub fn comment_patterns(&self) -> &[Pattern] {
        &self.comment_patterns
    }

    pub fn custom_matches(&self) -> &[(Category, Pattern)] {
        &self.custom_matches
    }

    pub fn indent_triggers(&self) -> &[Pattern] {
        &self.indent_triggers
    }

    pub fn indent_width(&self) -> usize {
        self.indent_width
    }

    pub fn theme(&self) -> &Theme {
        &self.theme
    }

    pub fn multiline_strings(&self) -> Option<&MultilineStrings> {
        self.multiline_strings.as_ref()
    }

    /// Returns a copy of the definition with a different indent width.
    pub fn with_indent_width(mut self, width: usize) -> SyntaxResult<Self> {
        if width == 0 {
            return Err(LanguageError::InvalidIndentWidth);
        }
        self.indent_width = width;
        Ok(self)
    }

    // ==================== Construction ====================

    /// Validates the definition invariants.
    ///
    /// The theme must style every category the definition can emit; a hole
    /// here is a configuration bug and must surface now, not mid-keystroke.
    fn validate(self) -> SyntaxResult<Self> {
        if self.indent_width == 0 {
            return Err(LanguageError::InvalidIndentWidth);
        }
        for category in self.used_categories() {
            if !self.theme.contains(category) {
                return Err(LanguageError::MissingStyle(category));
            }
        }
        Ok(self)
    }

    /// Every category this definition can produce spans for.
    fn used_categories(&self) -> Vec<Category> {
        let mut used = vec![Category::Identifier, Category::String, Category::Comment];
        used.extend(self.categories.iter().map(|(c, _)| *c));
        used.extend(self.custom_matches.iter().map(|(c, _)| *c));
        used
    }

    /// A language-agnostic definition: control-flow keywords, operators,
    /// numbers, braces, single-line strings, and `#` comments.
    pub fn generic() -> SyntaxResult<Self> {
        let def = Self {
            name: "generic",
            categories: vec![
                (
                    Category::Keyword,
                    word_patterns(&[
                        "break", "continue", "else", "for", "if", "return", "while",
                    ])?,
                ),
                (Category::Number, number_patterns()?),
                (Category::Operator, operator_patterns()?),
                (Category::Brace, brace_patterns()?),
            ],
            string_delimiters: vec!['\'', '"'],
            comment_patterns: vec![Pattern::new(r"#.*")?],
            custom_matches: Vec::new(),
            // Blocks introduced by a trailing `:` or `{`
            indent_triggers: vec![Pattern::new(r"[:{]\s*$")?],
            indent_width: DEFAULT_INDENT_WIDTH,
            theme: Theme::one_dark(),
            multiline_strings: None,
        };
        def.validate()
    }

    /// The Python definition: the generic passes plus builtins, definition
    /// name captures, the `self` custom match, and triple-quoted strings.
    pub fn python() -> SyntaxResult<Self> {
        let def = Self {
            name: "python",
            categories: vec![
                (
                    Category::Keyword,
                    word_patterns(&[
                        "and", "assert", "break", "class", "continue", "def", "del",
                        "elif", "else", "except", "finally", "for", "from", "global",
                        "if", "import", "in", "is", "lambda", "not", "or", "pass",
                        "raise", "return", "try", "while", "yield", "with", "None",
                        "True", "False", "as",
                    ])?,
                ),
                (
                    Category::Builtin,
                    word_patterns(&[
                        "abs", "all", "any", "ascii", "bin", "bool", "breakpoint",
                        "bytearray", "bytes", "callable", "chr", "classmethod",
                        "compile", "complex", "delattr", "dict", "dir", "divmod",
                        "enumerate", "eval", "exec", "filter", "float", "format",
                        "frozenset", "getattr", "globals", "hasattr", "hash", "help",
                        "hex", "id", "input", "int", "isinstance", "issubclass",
                        "iter", "len", "list", "locals", "map", "max", "memoryview",
                        "min", "next", "object", "oct", "open", "ord", "pow", "print",
                        "property", "range", "repr", "reversed", "round", "set",
                        "setattr", "slice", "sorted", "staticmethod", "str", "sum",
                        "super", "tuple", "type", "vars", "zip", "__import__",
                    ])?,
                ),
                (Category::Number, number_patterns()?),
                (Category::Operator, operator_patterns()?),
                (Category::Brace, brace_patterns()?),
                (
                    Category::FunctionName,
                    vec![Pattern::new(r"def[ \t]+(\w+)")?],
                ),
            ],
            string_delimiters: vec!['\'', '"'],
            comment_patterns: vec![Pattern::new(r"#.*")?],
            custom_matches: vec![
                (Category::SelfParam, Pattern::new(r"\bself\b")?),
                (Category::ClassName, Pattern::new(r"class[ \t]+(\w+)")?),
            ],
            indent_triggers: patterns(&[
                r"\bdef \w+.*:",
                r"\bclass \w+.*:",
                r"\bif .+:",
                r"\belif .*:",
                r"\belse\s*:",
                r"\bwith .+:",
                r"\bfor .+:",
                r"\bwhile .+:",
            ])?,
            indent_width: DEFAULT_INDENT_WIDTH,
            theme: Theme::one_dark(),
            multiline_strings: Some(MultilineStrings::new(vec!['"', '\''])),
        };
        def.validate()
    }
}

/// Picks the definition for a file extension, falling back to the generic one.
pub fn language_for_extension(ext: &str) -> SyntaxResult<LanguageDefinition> {
    match ext.to_lowercase().as_str() {
        "py" | "pyw" | "python" => LanguageDefinition::python(),
        _ => LanguageDefinition::generic(),
    }
}

fn patterns(list: &[&str]) -> SyntaxResult<Vec<Pattern>> {
    list.iter().map(|p| Pattern::new(p)).collect()
}

/// Whole-word patterns for a keyword table.
fn word_patterns(words: &[&str]) -> SyntaxResult<Vec<Pattern>> {
    words
        .iter()
        .map(|word| Pattern::new(&format!(r"\b{word}\b")))
        .collect()
}

fn number_patterns() -> SyntaxResult<Vec<Pattern>> {
    patterns(&[
        r"(?:[^\w]|^)(\d+)",              // base 10
        r"(?:[^\w]|^)(0x[0-9a-fA-F]+)",   // base 16
        r"(?:[^\w]|^)(0b[01]+)",          // base 2
    ])
}

fn operator_patterns() -> SyntaxResult<Vec<Pattern>> {
    patterns(&[
        "=", // assignment
        "==", "!=", "<", "<=", ">", ">=", // comparison
        r"\+", "-", r"\*", "/", "//", "%", r"\*\*", // arithmetic
        r"\+=", "-=", r"\*=", "/=", "%=", // in place
        r"\^", r"\|", "&", "~", ">>", "<<", // bitwise
    ])
}

fn brace_patterns() -> SyntaxResult<Vec<Pattern>> {
    patterns(&[r"\{", r"\}", r"\(", r"\)", r"\[", r"\]"])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::theme::{Color, Style};
    use std::collections::HashMap;

    #[test]
    fn test_python_builds() {
        let def = LanguageDefinition::python().unwrap();
        assert_eq!(def.name(), "python");
        assert!(def.multiline_strings().is_some());
        assert_eq!(def.indent_width(), 4);
    }

    #[test]
    fn test_generic_builds() {
        let def = LanguageDefinition::generic().unwrap();
        assert!(def.multiline_strings().is_none());
        assert!(def.custom_matches().is_empty());
    }

    #[test]
    fn test_invalid_pattern_is_rejected() {
        assert!(matches!(
            Pattern::new("["),
            Err(LanguageError::InvalidPattern { .. })
        ));
    }

    #[test]
    fn test_zero_indent_width_is_rejected() {
        let def = LanguageDefinition::python().unwrap();
        assert!(matches!(
            def.with_indent_width(0),
            Err(LanguageError::InvalidIndentWidth)
        ));
    }

    #[test]
    fn test_missing_theme_style_fails_construction() {
        // A theme that only styles identifiers cannot back a definition
        // that emits keywords.
        let theme = Theme::new(HashMap::from([(
            Category::Identifier,
            Style::new(Color::rgb(0, 0, 0)),
        )]));
        let def = LanguageDefinition {
            name: "broken",
            categories: vec![(Category::Keyword, word_patterns(&["if"]).unwrap())],
            string_delimiters: vec!['"'],
            comment_patterns: Vec::new(),
            custom_matches: Vec::new(),
            indent_triggers: Vec::new(),
            indent_width: 4,
            theme,
            multiline_strings: None,
        };
        assert!(matches!(
            def.validate(),
            Err(LanguageError::MissingStyle(Category::String))
        ));
    }

    #[test]
    fn test_language_for_extension() {
        assert_eq!(language_for_extension("py").unwrap().name(), "python");
        assert_eq!(language_for_extension("PY").unwrap().name(), "python");
        assert_eq!(language_for_extension("txt").unwrap().name(), "generic");
    }
}
