//! Inline style declarations to a normalized style record
//!
//! Only the handful of properties the preview can display are recognized:
//! `background`, `border`, `padding`, `margin` and `border-radius`. Anything
//! else is ignored, as is any recognized declaration whose value does not
//! parse.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use crate::stylesheet::{tokens, Stylesheet};

static PX: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)px").expect("valid regex"));

/// Margin applied on every side when a style does not set one
pub const DEFAULT_MARGIN: u32 = 8;

/// Thickness used for `border-left`, regardless of the declared width
pub const LEFT_BORDER_THICKNESS: u32 = 3;

/// Thickness used for `border` when no `<n>px` width is given
pub const DEFAULT_BORDER_THICKNESS: u32 = 1;

/// CSS named colors the resolver recognizes
const NAMED_COLORS: &[&str] = &[
    "aqua", "black", "blue", "brown", "crimson", "cyan", "darkblue", "darkgray", "darkgreen",
    "darkred", "fuchsia", "gold", "gray", "green", "grey", "indigo", "lightblue", "lightgray",
    "lightgreen", "lightyellow", "lime", "magenta", "maroon", "navy", "olive", "orange", "pink",
    "purple", "red", "silver", "teal", "transparent", "violet", "white", "yellow",
];

/// A concrete color
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ColorValue {
    /// Hex color like #ff0000 or #f00
    Hex(String),
    /// Named color like red, navy
    Named(String),
}

impl ColorValue {
    /// Parse a single color-looking token
    ///
    /// Accepts `#rgb`, `#rgba`, `#rrggbb` and `#rrggbbaa`, or a known color
    /// name (case-insensitive; stored lowercase).
    pub fn parse(token: &str) -> Option<Self> {
        let token = token.trim();
        if let Some(digits) = token.strip_prefix('#') {
            let valid = matches!(digits.len(), 3 | 4 | 6 | 8)
                && digits.chars().all(|c| c.is_ascii_hexdigit());
            return valid.then(|| ColorValue::Hex(token.to_string()));
        }
        let lower = token.to_ascii_lowercase();
        NAMED_COLORS
            .contains(&lower.as_str())
            .then_some(ColorValue::Named(lower))
    }

    pub fn white() -> Self {
        ColorValue::Hex("#FFFFFF".to_string())
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColorValue::Hex(s) | ColorValue::Named(s) => s,
        }
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Per-side lengths in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Edges {
    pub left: u32,
    pub top: u32,
    pub right: u32,
    pub bottom: u32,
}

impl Edges {
    pub fn uniform(value: u32) -> Self {
        Self {
            left: value,
            top: value,
            right: value,
            bottom: value,
        }
    }

    /// Vertical sides take `vertical`, horizontal sides take `horizontal`
    pub fn symmetric(vertical: u32, horizontal: u32) -> Self {
        Self {
            left: horizontal,
            top: vertical,
            right: horizontal,
            bottom: vertical,
        }
    }

    pub fn left_only(value: u32) -> Self {
        Self {
            left: value,
            ..Self::default()
        }
    }

    pub fn is_uniform(&self) -> bool {
        self.left == self.top && self.top == self.right && self.right == self.bottom
    }
}

impl fmt::Display for Edges {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_uniform() {
            write!(f, "{}", self.left)
        } else {
            write!(f, "{},{},{},{}", self.left, self.top, self.right, self.bottom)
        }
    }
}

/// Normalized presentation attributes of a container
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StyleRecord {
    pub background: Option<ColorValue>,
    pub border_color: Option<ColorValue>,
    pub border_thickness: Option<Edges>,
    pub padding: Option<Edges>,
    pub margin: Edges,
    pub corner_radius: Option<u32>,
}

impl Default for StyleRecord {
    fn default() -> Self {
        Self {
            background: None,
            border_color: None,
            border_thickness: None,
            padding: None,
            margin: Edges::uniform(DEFAULT_MARGIN),
            corner_radius: None,
        }
    }
}

/// Parse a style attribute with the default palette
pub fn parse_style(text: &str) -> StyleRecord {
    parse_style_with(text, &Stylesheet::default())
}

/// Parse a style attribute, flattening `rgba(...)` backgrounds through
/// `palette`
pub fn parse_style_with(text: &str, palette: &Stylesheet) -> StyleRecord {
    let mut record = StyleRecord::default();

    for declaration in text.split(';') {
        let Some((name, value)) = declaration.split_once(':') else {
            continue;
        };
        let name = name.trim().to_ascii_lowercase();
        let value = value.trim();
        if value.is_empty() {
            continue;
        }

        match name.as_str() {
            "background" | "background-color" => {
                record.background = Some(parse_background(value, palette));
            }
            "border" | "border-left" => {
                if let Some(color) = first_color(value) {
                    record.border_color = Some(color);
                }
                let thickness = if name == "border-left" {
                    Edges::left_only(LEFT_BORDER_THICKNESS)
                } else {
                    Edges::uniform(first_px(value).unwrap_or(DEFAULT_BORDER_THICKNESS))
                };
                record.border_thickness = Some(thickness);
            }
            "padding" => {
                if let Some(px) = first_px(value) {
                    record.padding = Some(Edges::uniform(px));
                }
            }
            "margin" => {
                if let Some(margin) = parse_margin(value) {
                    record.margin = margin;
                }
            }
            "border-radius" => {
                if let Some(px) = first_px(value) {
                    record.corner_radius = Some(px);
                }
            }
            _ => {}
        }
    }

    record
}

fn parse_background(value: &str, palette: &Stylesheet) -> ColorValue {
    if value.to_ascii_lowercase().contains("rgba") {
        let flat = palette.flatten_rgba(value);
        return ColorValue::parse(&flat).unwrap_or_else(ColorValue::white);
    }
    value
        .split_whitespace()
        .next()
        .and_then(ColorValue::parse)
        .or_else(|| ColorValue::parse(&palette.resolve_or_default(tokens::BACKGROUND)))
        .unwrap_or_else(ColorValue::white)
}

fn first_color(value: &str) -> Option<ColorValue> {
    value
        .split(|c: char| c.is_whitespace() || c == ',')
        .find_map(ColorValue::parse)
}

fn first_px(value: &str) -> Option<u32> {
    PX.captures(value)?.get(1)?.as_str().parse().ok()
}

fn parse_margin(value: &str) -> Option<Edges> {
    let mut numbers = PX.captures_iter(value).filter_map(|c| c.get(1)?.as_str().parse().ok());
    let top = numbers.next()?;
    let right = numbers.next()?;
    Some(Edges::symmetric(top, right))
}
