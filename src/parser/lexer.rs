//! Lexer for the preview markup subset using logos
//!
//! Only the tags the node tree distinguishes get their own tokens; every
//! other tag collapses into [`Token::Tag`] and is stripped later.

use logos::Logos;

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

#[derive(Logos, Debug, Clone, PartialEq)]
pub enum Token {
    /// `<div ...>`, carrying the whole opening tag
    #[regex(r"<div(\s[^>]*)?>", |lex| lex.slice().to_string(), ignore(ascii_case))]
    ContainerOpen(String),
    #[regex(r"</div\s*>", ignore(ascii_case))]
    ContainerClose,

    #[regex(r"<h[1-6](\s[^>]*)?>", ignore(ascii_case))]
    HeadingOpen,
    #[regex(r"</h[1-6]\s*>", ignore(ascii_case))]
    HeadingClose,

    #[regex(r"<strong(\s[^>]*)?>", ignore(ascii_case))]
    EmphasisOpen,
    #[regex(r"</strong\s*>", ignore(ascii_case))]
    EmphasisClose,

    #[regex(r"<br\s*/?>", ignore(ascii_case))]
    LineBreak,

    /// Any other tag, comment or doctype
    #[regex(r"<[^>]*>", |lex| lex.slice().to_string(), priority = 1)]
    Tag(String),

    #[regex(r"[^<]+", |lex| lex.slice().to_string())]
    Text(String),

    /// A `<` that never closes into a tag
    #[token("<")]
    Lt,
}

impl Token {
    /// Visible text once tags are stripped
    pub fn visible_text(&self) -> &str {
        match self {
            Token::Text(s) => s,
            Token::Lt => "<",
            _ => "",
        }
    }
}

/// Create a lexer iterator that yields (Token, Span) pairs
pub fn lex(input: &str) -> impl Iterator<Item = (Token, Span)> + '_ {
    Token::lexer(input)
        .spanned()
        .filter_map(|(tok, span)| tok.ok().map(|t| (t, span)))
}
