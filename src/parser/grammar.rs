//! Grammar for the preview markup subset using chumsky
//!
//! ```text
//! document  := (container | stray)*
//! container := CONTAINER_OPEN item* CONTAINER_CLOSE
//! item      := heading | emphasis | <any token but CONTAINER_CLOSE>
//! heading   := HEADING_OPEN <any but HEADING_CLOSE, CONTAINER_CLOSE>* HEADING_CLOSE
//! emphasis  := EMPHASIS_OPEN <any but EMPHASIS_CLOSE, CONTAINER_CLOSE>* EMPHASIS_CLOSE
//! ```
//!
//! A container ends at the first closing container tag, so a nested
//! container's opening tag is just another item and its content flattens
//! into the outer span. An opening tag with no matching close anywhere
//! later is a stray token, as are heading and emphasis openers that never
//! close inside their container.
//!
//! Openers that can never close are demoted to plain [`Token::Tag`]s before
//! the grammar runs, so every span the grammar attempts succeeds and parsing
//! stays linear on partial markup. In strict mode an unclosed container is a
//! syntax error instead.

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::parser::lexer::{Span, Token};

/// Content item inside a container span
#[derive(Debug, Clone, PartialEq)]
pub enum Item {
    Heading(Vec<Token>),
    Emphasis(Vec<Token>),
    Other(Token),
}

/// Top-level piece of a markup document
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Container {
        /// The opening tag, attributes included
        open_tag: String,
        items: Vec<Item>,
        span: Span,
    },
    Stray(Token),
}

/// Parse markup into top-level blocks
///
/// Unclosed containers are stray tokens; this never returns `Err`.
pub fn parse(input: &str) -> Result<Vec<Block>, Vec<crate::MarkupError>> {
    parse_with(input, false)
}

/// Parse markup, rejecting a container opener with no closing tag
pub fn parse_strict(input: &str) -> Result<Vec<Block>, Vec<crate::MarkupError>> {
    parse_with(input, true)
}

fn parse_with(input: &str, strict: bool) -> Result<Vec<Block>, Vec<crate::MarkupError>> {
    let len = input.len();

    let mut tokens: Vec<(Token, Span)> = crate::parser::lexer::lex(input).collect();
    demote_unclosed(input, &mut tokens, !strict);

    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    document_parser(strict)
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Turn openers that can never close into plain tags
///
/// One backwards pass: a container opener needs a container close somewhere
/// after it; heading and emphasis openers need their close before the next
/// container close.
fn demote_unclosed(input: &str, tokens: &mut [(Token, Span)], containers: bool) {
    let mut container_close = false;
    let mut heading_close = false;
    let mut emphasis_close = false;

    for (token, span) in tokens.iter_mut().rev() {
        let unclosed = match token {
            Token::ContainerClose => {
                container_close = true;
                heading_close = false;
                emphasis_close = false;
                false
            }
            Token::HeadingClose => {
                heading_close = true;
                false
            }
            Token::EmphasisClose => {
                emphasis_close = true;
                false
            }
            Token::ContainerOpen(_) => containers && !container_close,
            Token::HeadingOpen => !heading_close,
            Token::EmphasisOpen => !emphasis_close,
            _ => false,
        };
        if unclosed {
            let raw = input.get(span.clone()).unwrap_or_default();
            *token = Token::Tag(raw.to_string());
        }
    }
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> Span {
    e.start()..e.end()
}

fn document_parser<'a, I>(strict: bool) -> impl Parser<'a, I, Vec<Block>, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let heading = just(Token::HeadingOpen)
        .ignore_then(
            any()
                .filter(|t: &Token| !matches!(t, Token::HeadingClose | Token::ContainerClose))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(just(Token::HeadingClose))
        .map(Item::Heading);

    let emphasis = just(Token::EmphasisOpen)
        .ignore_then(
            any()
                .filter(|t: &Token| !matches!(t, Token::EmphasisClose | Token::ContainerClose))
                .repeated()
                .collect::<Vec<_>>(),
        )
        .then_ignore(just(Token::EmphasisClose))
        .map(Item::Emphasis);

    let other = any()
        .filter(|t: &Token| *t != Token::ContainerClose)
        .map(Item::Other);

    let item = choice((heading, emphasis, other));

    let container = select! {
        Token::ContainerOpen(tag) => tag,
    }
    .then(item.repeated().collect::<Vec<_>>())
    .then_ignore(just(Token::ContainerClose))
    .map_with(|(open_tag, items), e| Block::Container {
        open_tag,
        items,
        span: span_range(&e.span()),
    });

    let stray = any()
        .filter(move |t: &Token| !(strict && matches!(t, Token::ContainerOpen(_))))
        .map(Block::Stray);

    choice((container, stray))
        .repeated()
        .collect::<Vec<_>>()
        .then_ignore(end())
}
