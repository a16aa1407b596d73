//! Lexer for condition expressions.
//!
//! Conditions are written as tagged JSON objects, for example
//! `{"$and": [{"$eq": {"u.id": ":id"}}, {"$is": {"u.deleted": null}}]}`.
//! The lexer turns that text into a flat stream of [`Token`]s with spans:
//!
//! - structural characters `{ } [ ] : ,`
//! - quoted text: a `:name` parameter, an `$op` operator keyword, or a column
//! - bare `null` and numeric literals
//!
//! Any other bare text, and an unterminated quoted string, is a lex error.

use std::fmt;
use std::sync::LazyLock;

use chumsky::prelude::*;
use regex::Regex;

use super::ast::{Operator, OperatorKind};
use super::{ConditionError, ConditionResult};

static NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\d+(\.\d+)?([eE][+-]?\d+)?$").unwrap());

/// A token in a condition expression.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Token<'src> {
    /// `{`
    LBrace,
    /// `}`
    RBrace,
    /// `[`
    LBracket,
    /// `]`
    RBracket,
    /// `:`
    Colon,
    /// `,`
    Comma,
    /// A quoted column name such as `u.firstName`.
    Column(&'src str),
    /// A bare numeric literal, kept in its source spelling.
    Number(&'src str),
    /// The bare word `null`.
    Null,
    /// A quoted `:name` parameter (name without the colon).
    Parameter(&'src str),
    /// A quoted `$op` operator keyword.
    Operator(Operator),
}

/// Coarse classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Char,
    Column,
    Number,
    Null,
    Parameter,
    Comparison,
    NullComparison,
    InComparison,
    Boolean,
}

impl Token<'_> {
    /// Operators are non-terminal; everything else is a terminal.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Token::Operator(_))
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::LBrace
            | Token::RBrace
            | Token::LBracket
            | Token::RBracket
            | Token::Colon
            | Token::Comma => TokenKind::Char,
            Token::Column(_) => TokenKind::Column,
            Token::Number(_) => TokenKind::Number,
            Token::Null => TokenKind::Null,
            Token::Parameter(_) => TokenKind::Parameter,
            Token::Operator(op) => match op.kind() {
                OperatorKind::Comparison => TokenKind::Comparison,
                OperatorKind::NullComparison => TokenKind::NullComparison,
                OperatorKind::InComparison => TokenKind::InComparison,
                OperatorKind::Boolean => TokenKind::Boolean,
            },
        }
    }
}

impl fmt::Display for Token<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::LBrace => write!(f, "{{"),
            Token::RBrace => write!(f, "}}"),
            Token::LBracket => write!(f, "["),
            Token::RBracket => write!(f, "]"),
            Token::Colon => write!(f, ":"),
            Token::Comma => write!(f, ","),
            Token::Column(c) => write!(f, "\"{}\"", c),
            Token::Number(n) => write!(f, "{}", n),
            Token::Null => write!(f, "null"),
            Token::Parameter(p) => write!(f, "\":{}\"", p),
            Token::Operator(op) => write!(f, "\"{}\"", op.keyword()),
        }
    }
}

/// Raw lexeme, before quoted and bare text is classified.
#[derive(Debug, Clone)]
enum Lexeme<'src> {
    Char(Token<'src>),
    Quoted(&'src str),
    Bare(&'src str),
    Unterminated(&'src str),
}

fn lexer<'src>(
) -> impl Parser<'src, &'src str, Vec<(Lexeme<'src>, SimpleSpan)>, extra::Err<Rich<'src, char>>> {
    let symbol = choice((
        just('{').to(Token::LBrace),
        just('}').to(Token::RBrace),
        just('[').to(Token::LBracket),
        just(']').to(Token::RBracket),
        just(':').to(Token::Colon),
        just(',').to(Token::Comma),
    ))
    .map(Lexeme::Char);

    // Quoted text, honouring backslash escapes
    let quoted = just('"')
        .ignore_then(
            none_of("\\\"")
                .ignored()
                .or(just('\\').then(any()).ignored())
                .repeated()
                .to_slice(),
        )
        .then_ignore(just('"'))
        .map(Lexeme::Quoted);

    // An opening quote that is never closed swallows the rest of the input
    let unterminated = just('"')
        .then(any().repeated())
        .to_slice()
        .then_ignore(end())
        .map(Lexeme::Unterminated);

    let bare = none_of("{}[]:,\" \t\r\n")
        .repeated()
        .at_least(1)
        .to_slice()
        .map(Lexeme::Bare);

    let lexeme = choice((symbol, quoted, unterminated, bare)).map_with(|l, e| (l, e.span()));

    lexeme.padded().repeated().collect().padded().then_ignore(end())
}

fn classify<'src>(lexeme: Lexeme<'src>, span: SimpleSpan) -> ConditionResult<Token<'src>> {
    match lexeme {
        Lexeme::Char(token) => Ok(token),
        Lexeme::Quoted(text) => {
            if let Some(name) = text.strip_prefix(':') {
                if name.is_empty() {
                    return Err(ConditionError::UnexpectedText {
                        text: format!("\"{}\"", text),
                        position: span.start,
                    });
                }
                Ok(Token::Parameter(name))
            } else if let Some(op) = Operator::from_keyword(text) {
                Ok(Token::Operator(op))
            } else {
                Ok(Token::Column(text))
            }
        }
        Lexeme::Bare("null") => Ok(Token::Null),
        Lexeme::Bare(text) if NUMBER.is_match(text) => Ok(Token::Number(text)),
        Lexeme::Bare(text) => Err(ConditionError::UnexpectedText {
            text: text.to_string(),
            position: span.start,
        }),
        Lexeme::Unterminated(text) => Err(ConditionError::UnterminatedString {
            text: text.to_string(),
            position: span.start,
        }),
    }
}

/// Lex a condition string into tokens with their spans.
pub fn lex(source: &str) -> ConditionResult<Vec<(Token<'_>, SimpleSpan)>> {
    let (lexemes, errs) = lexer().parse(source).into_output_errors();

    if let Some(err) = errs.into_iter().next() {
        return Err(ConditionError::Syntax {
            message: err.to_string(),
        });
    }

    lexemes
        .unwrap_or_default()
        .into_iter()
        .map(|(lexeme, span)| classify(lexeme, span).map(|token| (token, span)))
        .collect()
}
