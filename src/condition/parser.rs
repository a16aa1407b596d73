//! Parser for condition token streams using chumsky.
//!
//! Grammar:
//!
//! ```text
//! condition   := "{" comparison | null_cmp | in_cmp | boolean "}"
//! comparison  := op ":" "{" column ":" operand "}"
//! null_cmp    := op ":" "{" column ":" null "}"
//! in_cmp      := op ":" "{" column ":" "[" operand ("," operand)* "]" "}"
//! boolean     := op ":" "[" condition ("," condition)* "]"
//! ```

use chumsky::input::ValueInput;
use chumsky::prelude::*;

use super::ast::{Operand, Operator, OperatorKind, ParseTree};
use super::lexer::Token;

/// Create the condition parser.
///
/// The parser is generic over the input type, accepting any `ValueInput`
/// that produces `Token` values with `SimpleSpan` spans.
pub fn parser<'tokens, 'src: 'tokens, I>(
) -> impl Parser<'tokens, I, ParseTree, extra::Err<Rich<'tokens, Token<'src>, SimpleSpan>>>
where
    I: ValueInput<'tokens, Token = Token<'src>, Span = SimpleSpan>,
{
    let column = select! {
        Token::Column(c) => c.to_string(),
    }
    .labelled("column");

    let operand = select! {
        Token::Column(c) => Operand::Column(c.to_string()),
        Token::Parameter(p) => Operand::Parameter(p.to_string()),
        Token::Number(n) => Operand::Number(n.to_string()),
    }
    .labelled("column, parameter or number");

    let comparison_op = select! {
        Token::Operator(op) if op.kind() == OperatorKind::Comparison => op,
    }
    .labelled("comparison operator");

    let null_op = select! {
        Token::Operator(op) if op.kind() == OperatorKind::NullComparison => op,
    }
    .labelled("null comparison operator");

    let in_op = select! {
        Token::Operator(op) if op.kind() == OperatorKind::InComparison => op,
    }
    .labelled("in comparison operator");

    let boolean_op = select! {
        Token::Operator(op) if op.kind() == OperatorKind::Boolean => op,
    }
    .labelled("boolean operator");

    recursive(|condition| {
        let comparison = comparison_op
            .then_ignore(just(Token::Colon))
            .then(
                column
                    .clone()
                    .then_ignore(just(Token::Colon))
                    .then(operand.clone())
                    .delimited_by(just(Token::LBrace), just(Token::RBrace)),
            )
            .map(|(operator, (column, value))| ParseTree::Comparison {
                operator,
                column,
                value,
            });

        let null_comparison = null_op
            .then_ignore(just(Token::Colon))
            .then(
                column
                    .clone()
                    .then_ignore(just(Token::Colon))
                    .then_ignore(just(Token::Null))
                    .delimited_by(just(Token::LBrace), just(Token::RBrace)),
            )
            .map(|(operator, column)| ParseTree::NullComparison { operator, column });

        let in_comparison = in_op
            .then_ignore(just(Token::Colon))
            .then(
                column
                    .then_ignore(just(Token::Colon))
                    .then(
                        operand
                            .separated_by(just(Token::Comma))
                            .at_least(1)
                            .collect::<Vec<_>>()
                            .delimited_by(just(Token::LBracket), just(Token::RBracket)),
                    )
                    .delimited_by(just(Token::LBrace), just(Token::RBrace)),
            )
            .map(|(operator, (column, values))| ParseTree::InComparison {
                operator,
                column,
                values,
            });

        let boolean = boolean_op
            .then_ignore(just(Token::Colon))
            .then(
                condition
                    .separated_by(just(Token::Comma))
                    .at_least(1)
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::LBracket), just(Token::RBracket)),
            )
            .map(|(operator, conditions): (Operator, Vec<ParseTree>)| ParseTree::Boolean {
                operator,
                conditions,
            });

        choice((comparison, null_comparison, in_comparison, boolean))
            .delimited_by(just(Token::LBrace), just(Token::RBrace))
    })
    .then_ignore(end())
}
