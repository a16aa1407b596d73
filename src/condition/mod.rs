//! Condition DSL: lexer, parser, compiler and column mapper.
//!
//! Conditions are tagged JSON objects. Operators are `$`-prefixed keys, columns
//! are quoted `alias.property` names and parameters are quoted `:name`
//! placeholders:
//!
//! ```ignore
//! use relfold::condition::ConditionCompiler;
//! use relfold::dialect::Dialect;
//! use serde_json::json;
//!
//! let sql = ConditionCompiler::new(&Dialect::MySql)
//!     .compile_condition(&json!({"$eq": {"u.id": ":id"}}), None)?;
//! assert_eq!(sql, "`u`.`id` = :id");
//! ```
//!
//! A condition may be supplied as a [`serde_json::Value`] or as its text.

pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod mapper;
pub mod parser;

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value;
use thiserror::Error;

pub use ast::{Operand, Operator, OperatorKind, ParseTree};
pub use compiler::ConditionCompiler;
pub use mapper::{map, map_tree};

/// Parameter values keyed by placeholder name (without the `:`).
pub type Params = HashMap<String, Value>;

/// Result type for condition operations.
pub type ConditionResult<T> = Result<T, ConditionError>;

/// Errors raised while lexing, parsing, compiling or mapping a condition.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConditionError {
    /// Bare text that is neither `null`, a number nor a structural character.
    #[error("unexpected text {text:?} at position {position}")]
    UnexpectedText { text: String, position: usize },

    /// A quoted string without a closing quote.
    #[error("unterminated string {text:?} at position {position}")]
    UnterminatedString { text: String, position: usize },

    /// The token stream does not follow the condition grammar.
    #[error("invalid condition: {message}")]
    Syntax { message: String },

    /// A parameter has no replacement in the supplied values.
    #[error("replacement value for parameter {name:?} not present")]
    MissingParameter { name: String },

    /// A column has no entry in the column lookup.
    #[error("column {column:?} not found in column lookup")]
    UnmappedColumn { column: String },
}

/// Anything a condition can be read from.
pub trait ConditionSource {
    fn condition_text(&self) -> Cow<'_, str>;
}

impl ConditionSource for Value {
    fn condition_text(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }
}

impl ConditionSource for str {
    fn condition_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self)
    }
}

impl ConditionSource for String {
    fn condition_text(&self) -> Cow<'_, str> {
        Cow::Borrowed(self.as_str())
    }
}

/// Lex and parse a condition into a [`ParseTree`].
pub fn parse(condition: &(impl ConditionSource + ?Sized)) -> ConditionResult<ParseTree> {
    use chumsky::input::Input;
    use chumsky::span::SimpleSpan;
    use chumsky::Parser as _;

    let source = condition.condition_text();
    let tokens = lexer::lex(&source)?;

    let len = source.len();
    let eoi: SimpleSpan = (len..len).into();
    let token_stream = tokens
        .as_slice()
        .map(eoi, |(tok, span): &(lexer::Token<'_>, SimpleSpan)| (tok, span));

    let result = parser::parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| ConditionError::Syntax {
            message: errs
                .into_iter()
                .map(|e| e.to_string())
                .collect::<Vec<_>>()
                .join("; "),
        });
    result
}

/// Whether a condition is an empty object (`{}`), which renders nothing.
pub fn is_empty_condition(condition: &Value) -> bool {
    matches!(condition, Value::Object(map) if map.is_empty())
}
