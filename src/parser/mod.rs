//! Markup to node tree conversion for previews
//!
//! The preview understands a small subset of markup: `<div>` containers with
//! an inline `style`, `<h1>`..`<h6>` headings, `<strong>` emphasis, line
//! breaks and plain text. Everything else is stripped to its text. See
//! [`grammar`] for the exact span rules.
//!
//! Conversion never fails outright: problems produce a tree with one error
//! leaf and a [`ConversionStatus::Degraded`] status.

pub mod ast;
mod grammar;
pub mod lexer;

pub use ast::*;
pub use grammar::{parse, parse_strict, Block, Item};

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

use crate::error::MarkupError;
use crate::parser::lexer::Token;
use crate::style::parse_style_with;
use crate::stylesheet::Stylesheet;

static CONDITIONAL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\{\{#if[^}]*\}\}.*?\{\{/if\}\}").expect("valid regex")
});
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{[^}]*\}\}").expect("valid regex"));
static STYLE_ATTR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)\bstyle\s*=\s*(?:"([^"]*)"|'([^']*)')"#).expect("valid regex")
});

/// Text substituted for every placeholder before parsing
pub const DEFAULT_FILLER: &str = "Sample Text";

/// Inputs larger than this degrade instead of parsing
pub const DEFAULT_MAX_INPUT_BYTES: usize = 1024 * 1024;

/// Text of the single leaf produced for empty input
pub const NO_CONTENT: &str = "No content";

/// Leftover container text shorter than this is dropped
const MIN_TRAILING_CHARS: usize = 3;

/// Fallback lines this short are dropped
const MIN_LINE_CHARS: usize = 2;

/// Configuration for markup conversion
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Replacement for `{{...}}` placeholders, stripped again from text
    pub filler: String,
    pub max_input_bytes: usize,
    /// Degrade on a container opener with no closing tag
    pub strict: bool,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            filler: DEFAULT_FILLER.to_string(),
            max_input_bytes: DEFAULT_MAX_INPUT_BYTES,
            strict: false,
        }
    }
}

impl ParserConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filler(mut self, filler: impl Into<String>) -> Self {
        self.filler = filler.into();
        self
    }

    pub fn with_max_input_bytes(mut self, limit: usize) -> Self {
        self.max_input_bytes = limit;
        self
    }

    pub fn with_strict(mut self, strict: bool) -> Self {
        self.strict = strict;
        self
    }
}

/// How a conversion arrived at its tree
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionStatus {
    /// One child per container span
    Containers(usize),
    /// No container spans; one text leaf per line
    Lines(usize),
    /// Empty input; a single placeholder leaf
    Empty,
    /// Conversion failed; a single error leaf
    Degraded(MarkupError),
}

/// Result of converting markup: the root container plus how it was built
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub root: Node,
    pub status: ConversionStatus,
}

impl Conversion {
    pub fn is_degraded(&self) -> bool {
        matches!(self.status, ConversionStatus::Degraded(_))
    }
}

/// Convert markup with default settings and palette
pub fn convert(markup: &str) -> Conversion {
    convert_with(markup, &ParserConfig::default(), &Stylesheet::default())
}

/// Convert markup into a node tree whose root is always a container
pub fn convert_with(markup: &str, config: &ParserConfig, palette: &Stylesheet) -> Conversion {
    if markup.trim().is_empty() {
        return Conversion {
            root: Node::container(None, vec![Node::placeholder(NO_CONTENT, palette)]),
            status: ConversionStatus::Empty,
        };
    }

    if markup.len() > config.max_input_bytes {
        return degraded(
            MarkupError::TooLarge {
                size: markup.len(),
                limit: config.max_input_bytes,
            },
            palette,
        );
    }

    let prepared = prepare(markup, config);
    let parsed = if config.strict {
        grammar::parse_strict(&prepared)
    } else {
        grammar::parse(&prepared)
    };
    match parsed {
        Ok(blocks) => build(blocks, config, palette),
        Err(errs) => {
            let err = errs.into_iter().next().unwrap_or_else(|| MarkupError::Syntax {
                span: 0..prepared.len(),
                message: "Unparseable markup".to_string(),
                expected: vec![],
            });
            degraded(err, palette)
        }
    }
}

/// Drop conditional spans, then fill the remaining placeholders
///
/// Conditionals go first: once placeholders are filled, the `{{#if}}`
/// markers no longer exist to be matched.
pub fn prepare(markup: &str, config: &ParserConfig) -> String {
    let without_conditionals = CONDITIONAL.replace_all(markup, "");
    PLACEHOLDER
        .replace_all(&without_conditionals, NoExpand(&config.filler))
        .into_owned()
}

fn degraded(err: MarkupError, palette: &Stylesheet) -> Conversion {
    tracing::warn!("markup conversion degraded: {}", err);
    Conversion {
        root: Node::container(None, vec![Node::error(&err, palette)]),
        status: ConversionStatus::Degraded(err),
    }
}

fn build(blocks: Vec<Block>, config: &ParserConfig, palette: &Stylesheet) -> Conversion {
    let has_containers = blocks.iter().any(|b| matches!(b, Block::Container { .. }));

    if has_containers {
        let children: Vec<Node> = blocks
            .into_iter()
            .filter_map(|block| match block {
                Block::Container { open_tag, items, .. } => {
                    Some(container_node(&open_tag, items, config, palette))
                }
                Block::Stray(_) => None,
            })
            .collect();
        let count = children.len();
        return Conversion {
            root: Node::container(None, children),
            status: ConversionStatus::Containers(count),
        };
    }

    let tokens = blocks.into_iter().filter_map(|block| match block {
        Block::Stray(tok) => Some(tok),
        Block::Container { .. } => None,
    });
    let children: Vec<Node> = split_lines(tokens)
        .into_iter()
        .map(|line| decode(&line).trim().to_string())
        .filter(|line| line.chars().count() >= MIN_LINE_CHARS)
        .map(|line| Node::text(line, palette))
        .collect();
    let count = children.len();
    Conversion {
        root: Node::container(None, children),
        status: ConversionStatus::Lines(count),
    }
}

fn container_node(
    open_tag: &str,
    items: Vec<Item>,
    config: &ParserConfig,
    palette: &Stylesheet,
) -> Node {
    let style = STYLE_ATTR.captures(open_tag).and_then(|caps| {
        caps.get(1)
            .or_else(|| caps.get(2))
            .map(|m| parse_style_with(m.as_str(), palette))
    });

    let mut headings = Vec::new();
    let mut emphasis = Vec::new();
    let mut leftover = String::new();

    for item in items {
        match item {
            Item::Heading(tokens) => {
                push_span(&mut headings, &tokens, Node::heading, palette);
                for inner in inner_spans(&tokens, &Token::EmphasisOpen, &Token::EmphasisClose) {
                    push_span(&mut emphasis, inner, Node::emphasis, palette);
                }
            }
            Item::Emphasis(tokens) => {
                push_span(&mut emphasis, &tokens, Node::emphasis, palette);
                for inner in inner_spans(&tokens, &Token::HeadingOpen, &Token::HeadingClose) {
                    push_span(&mut headings, inner, Node::heading, palette);
                }
            }
            Item::Other(token) => leftover.push_str(token.visible_text()),
        }
    }

    let mut children = headings;
    children.append(&mut emphasis);

    let trailing = strip_filler(&decode(&leftover), &config.filler);
    let trailing = trailing.trim();
    if trailing.chars().count() >= MIN_TRAILING_CHARS {
        children.push(Node::text(trailing, palette));
    }

    Node::container(style, children)
}

fn push_span(
    nodes: &mut Vec<Node>,
    tokens: &[Token],
    make: fn(String, &Stylesheet) -> Node,
    palette: &Stylesheet,
) {
    let text = span_text(tokens);
    if !text.is_empty() {
        nodes.push(make(text, palette));
    }
}

/// Closed `open`..`close` runs nested in another span's tokens
///
/// Each run ends at its first close; an opener without one is ignored.
fn inner_spans<'t>(tokens: &'t [Token], open: &Token, close: &Token) -> Vec<&'t [Token]> {
    let mut spans = Vec::new();
    let mut start = None;
    for (i, token) in tokens.iter().enumerate() {
        if start.is_none() && token == open {
            start = Some(i + 1);
        } else if token == close {
            if let Some(from) = start.take() {
                spans.push(&tokens[from..i]);
            }
        }
    }
    spans
}

/// Visible text of a heading or emphasis span
fn span_text(tokens: &[Token]) -> String {
    let raw: String = tokens.iter().map(Token::visible_text).collect();
    decode(&raw).trim().to_string()
}

fn decode(text: &str) -> String {
    html_escape::decode_html_entities(text).into_owned()
}

/// Remove each occurrence of `filler` together with the whitespace after it
fn strip_filler(text: &str, filler: &str) -> String {
    if filler.is_empty() {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(filler) {
        out.push_str(&rest[..pos]);
        rest = rest[pos + filler.len()..].trim_start();
    }
    out.push_str(rest);
    out
}

fn split_lines(tokens: impl Iterator<Item = Token>) -> Vec<String> {
    let mut lines = vec![String::new()];
    for token in tokens {
        if token == Token::LineBreak {
            lines.push(String::new());
        } else if let Some(current) = lines.last_mut() {
            current.push_str(token.visible_text());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{ColorValue, Edges};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_fallback_lines() {
        let conversion = convert("Line one<br>Line two<br><br>");
        assert_eq!(conversion.status, ConversionStatus::Lines(2));
        assert_eq!(conversion.root.kind, NodeKind::Container);
        assert_eq!(conversion.root.children.len(), 2);
        assert!(conversion.root.children.iter().all(|c| c.kind == NodeKind::Text));
        assert_eq!(conversion.root.leaf_texts(), vec!["Line one", "Line two"]);
    }

    #[test]
    fn test_fallback_strips_tags_and_short_lines() {
        let conversion = convert("<p>Tom &amp; Jerry</p><br/>x<br />  <em>ok</em>  ");
        assert_eq!(conversion.root.leaf_texts(), vec!["Tom & Jerry", "ok"]);
    }

    #[test]
    fn test_container_children_order() {
        let markup = r#"<div style="background: #112233; padding: 12px">
            <p>Body text here</p>
            <strong>Bold</strong>
            <h2>Heading</h2>
        </div>"#;
        let conversion = convert(markup);
        assert_eq!(conversion.status, ConversionStatus::Containers(1));

        let container = &conversion.root.children[0];
        let kinds: Vec<_> = container.children.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Heading, NodeKind::Emphasis, NodeKind::Text]);
        assert_eq!(container.leaf_texts(), vec!["Heading", "Bold", "Body text here"]);

        let style = container.style.as_ref().unwrap();
        assert_eq!(style.background, Some(ColorValue::Hex("#112233".to_string())));
        assert_eq!(style.padding, Some(Edges::uniform(12)));
    }

    #[test]
    fn test_emphasis_inside_heading_is_extracted() {
        let markup =
            "<div><h2>Meeting <strong>Tonight</strong></h2><p>Details follow here</p></div>";
        let container = &convert(markup).root.children[0];
        let kinds: Vec<_> = container.children.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Heading, NodeKind::Emphasis, NodeKind::Text]);
        assert_eq!(
            container.leaf_texts(),
            vec!["Meeting Tonight", "Tonight", "Details follow here"]
        );
    }

    #[test]
    fn test_heading_inside_emphasis_is_extracted() {
        let container = &convert("<div><strong>Note <h3>Title</h3></strong></div>").root.children[0];
        let kinds: Vec<_> = container.children.iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![NodeKind::Heading, NodeKind::Emphasis]);
        assert_eq!(container.leaf_texts(), vec!["Title", "Note Title"]);
    }

    #[test]
    fn test_inner_spans() {
        let tokens = vec![
            Token::EmphasisOpen,
            Token::Text("a".to_string()),
            Token::EmphasisClose,
            Token::EmphasisOpen,
            Token::Text("b".to_string()),
        ];
        let spans = inner_spans(&tokens, &Token::EmphasisOpen, &Token::EmphasisClose);
        assert_eq!(spans, vec![&tokens[1..2]]);
    }

    #[test]
    fn test_unclosed_openers_convert_quickly() {
        let markup = format!("<div>{}</div>{}", "<h2>x".repeat(5_000), "<div>x".repeat(10_000));
        let start = std::time::Instant::now();
        let conversion = convert(&markup);
        assert!(start.elapsed() < std::time::Duration::from_secs(5));
        assert_eq!(conversion.status, ConversionStatus::Containers(1));
    }

    #[test]
    fn test_strict_mode_degrades_on_unclosed_container() {
        let config = ParserConfig::new().with_strict(true);
        let conversion = convert_with("<div>open", &config, &Stylesheet::default());
        assert!(matches!(
            conversion.status,
            ConversionStatus::Degraded(MarkupError::Syntax { .. })
        ));

        let lenient = convert("<div>open");
        assert_eq!(lenient.status, ConversionStatus::Lines(1));
    }

    #[test]
    fn test_container_without_style_attribute() {
        let conversion = convert("<div class=\"x\">Plain content</div>");
        let container = &conversion.root.children[0];
        assert_eq!(container.style, None);
        assert_eq!(container.leaf_texts(), vec!["Plain content"]);
    }

    #[test]
    fn test_nested_containers_flatten() {
        let conversion = convert("<div>outer <div>inner</div> tail</div>");
        assert_eq!(conversion.status, ConversionStatus::Containers(1));
        let container = &conversion.root.children[0];
        assert!(container.children.iter().all(|c| c.kind != NodeKind::Container));
        assert_eq!(container.leaf_texts(), vec!["outer inner"]);
    }

    #[test]
    fn test_multiple_containers_in_source_order() {
        let conversion = convert("<div>First</div>ignored<div>Second</div>");
        assert_eq!(conversion.status, ConversionStatus::Containers(2));
        assert_eq!(conversion.root.leaf_texts(), vec!["First", "Second"]);
    }

    #[test]
    fn test_placeholders_become_filler_and_are_stripped() {
        let conversion = convert("<div><h3>{{title}}</h3>{{message}} </div>");
        let container = &conversion.root.children[0];
        // Headings keep the filler; leftover text loses it and is too short
        assert_eq!(container.leaf_texts(), vec!["Sample Text"]);
    }

    #[test]
    fn test_conditionals_are_always_removed() {
        let markup = "<div>Keep{{#if urgent}}<strong>Urgent</strong>\n{{/IF}} this</div>";
        let container = &convert(markup).root.children[0];
        assert_eq!(container.leaf_texts(), vec!["Keep this"]);
    }

    #[test]
    fn test_prepare_order() {
        let config = ParserConfig::new().with_filler("$X");
        assert_eq!(prepare("a{{#if x}}b{{/if}}c{{d}}", &config), "ac$X");
    }

    #[test]
    fn test_short_trailing_text_dropped() {
        let container = &convert("<div><h1>T</h1>ab</div>").root.children[0];
        assert_eq!(container.leaf_texts(), vec!["T"]);
    }

    #[test]
    fn test_entities_decoded() {
        let container = &convert("<div>&lt;b&gt; &quot;quoted&quot;</div>").root.children[0];
        assert_eq!(container.leaf_texts(), vec![r#"<b> "quoted""#]);
    }

    #[test]
    fn test_empty_input() {
        let conversion = convert("   ");
        assert_eq!(conversion.status, ConversionStatus::Empty);
        assert_eq!(conversion.root.leaf_texts(), vec![NO_CONTENT]);
    }

    #[test]
    fn test_oversize_input_degrades() {
        let config = ParserConfig::new().with_max_input_bytes(8);
        let conversion = convert_with("<div>too long</div>", &config, &Stylesheet::default());
        assert!(conversion.is_degraded());
        let leaf = &conversion.root.children[0];
        assert!(leaf.is_error);
        assert!(leaf.text.as_deref().unwrap().starts_with("Render error: "));
    }

    #[test]
    fn test_strip_filler() {
        assert_eq!(strip_filler("Sample Text  Hello", "Sample Text"), "Hello");
        assert_eq!(strip_filler("a Sample Textb", "Sample Text"), "a b");
        assert_eq!(strip_filler("abc", ""), "abc");
    }
}
