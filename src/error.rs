//! Error types for markup parsing

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

use crate::parser::lexer::{Span, Token};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MarkupError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
    #[error("Markup is {size} bytes, over the {limit} byte limit")]
    TooLarge { size: usize, limit: usize },
}

impl MarkupError {
    /// Format the error with source context using ariadne
    pub fn format(&self, source: &str, filename: &str) -> String {
        let (span, message, note) = match self {
            MarkupError::Syntax {
                span,
                message,
                expected,
            } => {
                let note = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };
                (span.clone(), message.clone(), note)
            }
            MarkupError::TooLarge { .. } => (0..0, self.to_string(), String::new()),
        };

        let mut buf = Vec::new();
        let written = Report::build(ReportKind::Error, filename, span.start)
            .with_message(&message)
            .with_label(
                Label::new((filename, span))
                    .with_message(format!("{}{}", message, note))
                    .with_color(Color::Red),
            )
            .finish()
            .write((filename, Source::from(source)), &mut buf);

        match written {
            Ok(()) => String::from_utf8_lossy(&buf).into_owned(),
            Err(_) => self.to_string(),
        }
    }
}

impl<'a> From<chumsky::error::Rich<'a, Token>> for MarkupError {
    fn from(err: chumsky::error::Rich<'a, Token>) -> Self {
        use chumsky::error::{RichPattern, RichReason};

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                let found_str = match found {
                    Some(tok) => format_token(tok),
                    None => "end of input".to_string(),
                };
                format!("Unexpected {}", found_str)
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                RichPattern::Token(tok) => Some(format_token(tok)),
                RichPattern::Label(label) => Some(label.to_string()),
                RichPattern::EndOfInput => Some("end of input".to_string()),
                RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                RichPattern::Any => Some("any token".to_string()),
                RichPattern::SomethingElse => None,
            })
            .collect();

        MarkupError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &Token) -> String {
    match tok {
        Token::ContainerOpen(tag) => format!("container tag '{}'", tag),
        Token::ContainerClose => "'</div>'".to_string(),
        Token::HeadingOpen => "heading tag".to_string(),
        Token::HeadingClose => "heading close tag".to_string(),
        Token::EmphasisOpen => "'<strong>'".to_string(),
        Token::EmphasisClose => "'</strong>'".to_string(),
        Token::LineBreak => "line break".to_string(),
        Token::Tag(tag) => format!("tag '{}'", tag),
        Token::Text(text) => format!("text {:?}", text),
        Token::Lt => "'<'".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_includes_message_and_filename() {
        let err = MarkupError::Syntax {
            span: 5..11,
            message: "Unexpected '</div>'".to_string(),
            expected: vec!["end of input".to_string()],
        };
        let report = err.format("<div></div>", "widget.html");
        assert!(report.contains("Unexpected '</div>'"));
        assert!(report.contains("widget.html"));
        assert!(report.contains("Expected: end of input"));
    }

    #[test]
    fn test_too_large_display() {
        let err = MarkupError::TooLarge { size: 10, limit: 4 };
        assert_eq!(err.to_string(), "Markup is 10 bytes, over the 4 byte limit");
        assert!(err.format("0123456789", "big.html").contains("byte limit"));
    }
}
