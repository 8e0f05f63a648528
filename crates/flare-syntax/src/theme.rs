//! Display styles for classified spans.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::language::Category;

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Builds a color from a `0xRRGGBB` literal.
    pub const fn from_hex(hex: u32) -> Self {
        Self {
            r: ((hex >> 16) & 0xFF) as u8,
            g: ((hex >> 8) & 0xFF) as u8,
            b: (hex & 0xFF) as u8,
        }
    }
}

/// Font weight for a span.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FontWeight {
    #[default]
    Normal,
    Bold,
}

/// How spans of one category are displayed: foreground color plus weight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Style {
    pub color: Color,
    #[serde(default)]
    pub weight: FontWeight,
}

impl Style {
    pub const fn new(color: Color) -> Self {
        Self {
            color,
            weight: FontWeight::Normal,
        }
    }

    pub const fn bold(color: Color) -> Self {
        Self {
            color,
            weight: FontWeight::Bold,
        }
    }
}

/// Mapping from lexical category to display style.
///
/// A [`LanguageDefinition`](crate::LanguageDefinition) checks at construction
/// time that its theme covers every category it can emit, so [`Theme::style`]
/// never misses at runtime for a category the language actually produces.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Theme {
    styles: HashMap<Category, Style>,
}

/// Plain text fallback, matching the identifier color of [`Theme::one_dark`].
const FALLBACK: Style = Style::new(Color::from_hex(0xA9B7C6));

impl Theme {
    pub fn new(styles: HashMap<Category, Style>) -> Self {
        Self { styles }
    }

    /// Returns the style for a category.
    ///
    /// Falls back to the identifier style for categories the theme does not
    /// name; definition validation makes that unreachable in practice.
    pub fn style(&self, category: Category) -> Style {
        self.styles
            .get(&category)
            .or_else(|| self.styles.get(&Category::Identifier))
            .copied()
            .unwrap_or(FALLBACK)
    }

    /// Returns true if the theme names a style for the category.
    pub fn contains(&self, category: Category) -> bool {
        self.styles.contains_key(&category)
    }

    /// The default dark palette.
    pub fn one_dark() -> Self {
        let styles = HashMap::from([
            (Category::Identifier, Style::new(Color::from_hex(0xA9B7C6))),
            (Category::Keyword, Style::bold(Color::from_hex(0xC679DD))),
            (Category::Builtin, Style::new(Color::from_hex(0x57B6C2))),
            (Category::Operator, Style::new(Color::from_hex(0xA9B7C6))),
            (Category::Brace, Style::new(Color::from_hex(0xA9B7C6))),
            (Category::FunctionName, Style::new(Color::from_hex(0x61AFEF))),
            (Category::ClassName, Style::new(Color::from_hex(0xFFC66D))),
            (Category::String, Style::new(Color::from_hex(0x98C476))),
            (Category::Comment, Style::new(Color::from_hex(0x808080))),
            (Category::Number, Style::new(Color::from_hex(0xD2945D))),
            (Category::SelfParam, Style::new(Color::from_hex(0xE06C75))),
        ]);
        Self { styles }
    }
}
