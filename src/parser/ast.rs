//! Node tree produced from preview markup

use std::fmt;

use serde::Serialize;

use crate::style::{ColorValue, StyleRecord};
use crate::stylesheet::{tokens, Stylesheet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Container,
    Heading,
    Emphasis,
    Text,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NodeKind::Container => "container",
            NodeKind::Heading => "heading",
            NodeKind::Emphasis => "emphasis",
            NodeKind::Text => "text",
        })
    }
}

/// Fixed typographic style of a leaf
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TextStyle {
    pub bold: bool,
    pub color: ColorValue,
}

impl TextStyle {
    fn from_palette(palette: &Stylesheet, token: &str, bold: bool) -> Self {
        let color = ColorValue::parse(&palette.resolve_or_default(token))
            .unwrap_or_else(|| ColorValue::Hex("#000000".to_string()));
        Self { bold, color }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Node {
    pub kind: NodeKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub style: Option<StyleRecord>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text_style: Option<TextStyle>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Node>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl Node {
    pub fn container(style: Option<StyleRecord>, children: Vec<Node>) -> Self {
        Self {
            kind: NodeKind::Container,
            style,
            text_style: None,
            children,
            text: None,
            is_error: false,
        }
    }

    fn leaf(kind: NodeKind, text: impl Into<String>, text_style: TextStyle) -> Self {
        Self {
            kind,
            style: None,
            text_style: Some(text_style),
            children: vec![],
            text: Some(text.into()),
            is_error: false,
        }
    }

    /// Bold, accent-colored heading
    pub fn heading(text: impl Into<String>, palette: &Stylesheet) -> Self {
        Self::leaf(
            NodeKind::Heading,
            text,
            TextStyle::from_palette(palette, tokens::HEADING, true),
        )
    }

    /// Bold, default-colored emphasis
    pub fn emphasis(text: impl Into<String>, palette: &Stylesheet) -> Self {
        Self::leaf(
            NodeKind::Emphasis,
            text,
            TextStyle::from_palette(palette, tokens::EMPHASIS, true),
        )
    }

    pub fn text(text: impl Into<String>, palette: &Stylesheet) -> Self {
        Self::leaf(
            NodeKind::Text,
            text,
            TextStyle::from_palette(palette, tokens::TEXT, false),
        )
    }

    /// Visible leaf standing in for a failed conversion
    pub fn error(message: impl fmt::Display, palette: &Stylesheet) -> Self {
        let mut node = Self::leaf(
            NodeKind::Text,
            format!("Render error: {}", message),
            TextStyle::from_palette(palette, tokens::ERROR, false),
        );
        node.is_error = true;
        node
    }

    /// Muted placeholder leaf for empty input
    pub fn placeholder(text: impl Into<String>, palette: &Stylesheet) -> Self {
        Self::leaf(
            NodeKind::Text,
            text,
            TextStyle::from_palette(palette, tokens::MUTED, false),
        )
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty() && self.kind != NodeKind::Container
    }

    /// Texts of every leaf, depth-first
    pub fn leaf_texts(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_texts(&mut out);
        out
    }

    fn collect_texts<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(text) = &self.text {
            out.push(text);
        }
        for child in &self.children {
            child.collect_texts(out);
        }
    }

    fn write_tree(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        write!(f, "{}{}", "  ".repeat(depth), self.kind)?;
        if let Some(style) = &self.style {
            if let Some(bg) = &style.background {
                write!(f, " background={}", bg)?;
            }
            if let Some(color) = &style.border_color {
                write!(f, " border={}", color)?;
            }
            if let Some(thickness) = &style.border_thickness {
                write!(f, " border-width={}", thickness)?;
            }
            if let Some(padding) = &style.padding {
                write!(f, " padding={}", padding)?;
            }
            write!(f, " margin={}", style.margin)?;
            if let Some(radius) = style.corner_radius {
                write!(f, " radius={}", radius)?;
            }
        }
        if self.is_error {
            write!(f, " error")?;
        }
        if let Some(text) = &self.text {
            write!(f, " {:?}", text)?;
        }
        writeln!(f)?;
        for child in &self.children {
            child.write_tree(f, depth + 1)?;
        }
        Ok(())
    }
}

/// Indented outline, one node per line
impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.write_tree(f, 0)
    }
}
