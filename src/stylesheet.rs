//! Preview palette
//!
//! The markup parser styles heading, emphasis, text and error nodes with
//! fixed colors, and maps `rgba(...)` backgrounds onto flat colors through a
//! small compatibility table. Both live here so an application can swap them
//! out with a TOML file.

use std::collections::HashMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing stylesheets
#[derive(Error, Debug)]
pub enum StylesheetError {
    #[error("Failed to read stylesheet file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse stylesheet TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Maps an `rgba(...)` value onto a flat color by literal substring match
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RgbaRule {
    /// Matches when the value contains at least one of these
    #[serde(default)]
    pub any: Vec<String>,
    /// Matches when the value contains every one of these
    #[serde(default)]
    pub all: Vec<String>,
    /// Flat color used on a match
    pub color: String,
}

impl RgbaRule {
    /// Check the rule against a declaration value
    pub fn matches(&self, value: &str) -> bool {
        if self.any.is_empty() && self.all.is_empty() {
            return false;
        }
        let any_ok = self.any.is_empty() || self.any.iter().any(|s| value.contains(s.as_str()));
        let all_ok = self.all.iter().all(|s| value.contains(s.as_str()));
        any_ok && all_ok
    }
}

/// A stylesheet mapping semantic tokens to concrete colors
#[derive(Debug, Clone)]
pub struct Stylesheet {
    /// Optional name for the stylesheet
    pub name: Option<String>,
    /// Optional description
    pub description: Option<String>,
    /// Color mappings: token name -> hex color
    pub colors: HashMap<String, String>,
    /// Compatibility table for `rgba(...)` backgrounds, first match wins
    pub rgba: Vec<RgbaRule>,
}

/// TOML structure for deserializing stylesheets
#[derive(Deserialize)]
struct TomlStylesheet {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: HashMap<String, String>,
    #[serde(default)]
    rgba: Vec<RgbaRule>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
    description: Option<String>,
}

/// Token names used by the markup parser
pub mod tokens {
    pub const HEADING: &str = "heading";
    pub const EMPHASIS: &str = "emphasis";
    pub const TEXT: &str = "text";
    pub const ERROR: &str = "error";
    pub const MUTED: &str = "muted";
    /// Fallback for unparseable or unrecognized backgrounds
    pub const BACKGROUND: &str = "background";
}

/// Default palette, taken from the application's own widget colors
const DEFAULT_PALETTE: &str = r##"
[metadata]
name = "default"

[colors]
heading = "#BA0C2F"
emphasis = "#000000"
text = "#000000"
error = "#FF0000"
muted = "#808080"
background = "#FFFFFF"

# rgba backgrounds used by the bundled widget templates
[[rgba]]
any = ["186", "BA0C2F"]
color = "#FFF3CD"

[[rgba]]
all = ["255", "249"]
color = "#FFF9E6"
"##;

impl Stylesheet {
    /// Load stylesheet from TOML file
    pub fn from_file(path: &Path) -> Result<Self, StylesheetError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Load stylesheet from TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, StylesheetError> {
        let parsed: TomlStylesheet = toml::from_str(content)?;

        Ok(Stylesheet {
            name: parsed.metadata.as_ref().and_then(|m| m.name.clone()),
            description: parsed.metadata.as_ref().and_then(|m| m.description.clone()),
            colors: parsed.colors,
            rgba: parsed.rgba,
        })
    }

    /// Resolve a token to a concrete value
    ///
    /// Returns None if the token is not defined in this stylesheet.
    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(|s| s.as_str())
    }

    /// Resolve a token with fallback to the default palette
    ///
    /// Unknown tokens resolve to black.
    pub fn resolve_or_default(&self, token: &str) -> String {
        if let Some(color) = self.resolve(token) {
            return color.to_string();
        }

        let default = Self::default();
        if let Some(color) = default.resolve(token) {
            return color.to_string();
        }

        "#000000".to_string()
    }

    /// Flat color for an `rgba(...)` background value
    ///
    /// This is a literal substring match against colors this application is
    /// known to use, not a color-function parser. Values no rule recognizes
    /// get the `background` color.
    pub fn flatten_rgba(&self, value: &str) -> String {
        self.rgba
            .iter()
            .find(|rule| rule.matches(value))
            .map(|rule| rule.color.clone())
            .unwrap_or_else(|| self.resolve_or_default(tokens::BACKGROUND))
    }
}

impl Default for Stylesheet {
    fn default() -> Self {
        Self::from_str(DEFAULT_PALETTE).expect("Default palette should be valid TOML")
    }
}
