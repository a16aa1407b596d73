//! Compile condition parse trees to SQL boolean expressions.
//!
//! Columns are escaped as fully-qualified names by the dialect, numbers are
//! emitted verbatim and parameters are emitted as `:name` placeholders. Values
//! are never inlined; binding them is the executer's job.

use tracing::trace;

use super::ast::{Operand, Operator, ParseTree};
use super::{ConditionError, ConditionResult, ConditionSource, Params};
use crate::sql::dialect::SqlDialect;
use crate::sql::token::{Token, TokenStream};

/// Renders condition trees using a dialect's escaping rules.
#[derive(Debug, Clone, Copy)]
pub struct ConditionCompiler<'d> {
    dialect: &'d dyn SqlDialect,
}

impl<'d> ConditionCompiler<'d> {
    pub fn new(dialect: &'d dyn SqlDialect) -> Self {
        Self { dialect }
    }

    /// Lex, parse and compile a condition in one step.
    pub fn compile_condition(
        &self,
        condition: &(impl ConditionSource + ?Sized),
        params: Option<&Params>,
    ) -> ConditionResult<String> {
        let tree = super::parse(condition)?;
        self.compile(&tree, params)
    }

    /// Compile a parse tree to SQL.
    ///
    /// When `params` is supplied, every parameter the tree references must
    /// have a value in it.
    pub fn compile(&self, tree: &ParseTree, params: Option<&Params>) -> ConditionResult<String> {
        if let Some(params) = params {
            check_parameters(tree, params)?;
        }

        let mut ts = TokenStream::new();
        self.emit(tree, &mut ts);
        let sql = ts.serialize(self.dialect);
        trace!(sql = %sql, "compiled condition");
        Ok(sql)
    }

    /// Distinct column names referenced by a tree, in first-encountered order.
    pub fn columns(&self, tree: &ParseTree) -> Vec<String> {
        tree.columns()
    }

    fn emit(&self, tree: &ParseTree, ts: &mut TokenStream) {
        match tree {
            ParseTree::Comparison {
                operator,
                column,
                value,
            } => {
                ts.push(Token::Column(column.clone())).space();
                emit_operator(*operator, ts);
                ts.space().push(operand_token(value));
            }
            ParseTree::NullComparison { operator, column } => {
                ts.push(Token::Column(column.clone())).space();
                emit_operator(*operator, ts);
                ts.space().push(Token::Null);
            }
            ParseTree::InComparison {
                operator,
                column,
                values,
            } => {
                ts.push(Token::Column(column.clone())).space();
                emit_operator(*operator, ts);
                ts.space()
                    .lparen()
                    .comma_separated(values.iter().map(operand_token))
                    .rparen();
            }
            ParseTree::Boolean {
                operator,
                conditions,
            } => {
                ts.lparen();
                for (i, condition) in conditions.iter().enumerate() {
                    if i > 0 {
                        ts.space();
                        emit_operator(*operator, ts);
                        ts.space();
                    }
                    self.emit(condition, ts);
                }
                ts.rparen();
            }
        }
    }
}

fn emit_operator(operator: Operator, ts: &mut TokenStream) {
    match operator {
        Operator::Eq => ts.push(Token::Eq),
        Operator::Neq => ts.push(Token::Ne),
        Operator::Lt => ts.push(Token::Lt),
        Operator::Lte => ts.push(Token::Lte),
        Operator::Gt => ts.push(Token::Gt),
        Operator::Gte => ts.push(Token::Gte),
        Operator::Like => ts.push(Token::Like),
        Operator::NotLike => ts.push(Token::Not).space().push(Token::Like),
        Operator::In => ts.push(Token::In),
        Operator::NotIn => ts.push(Token::Not).space().push(Token::In),
        Operator::Is => ts.push(Token::Is),
        Operator::Isnt => ts.push(Token::Is).space().push(Token::Not),
        Operator::And => ts.push(Token::And),
        Operator::Or => ts.push(Token::Or),
    };
}

fn operand_token(operand: &Operand) -> Token {
    match operand {
        Operand::Column(c) => Token::Column(c.clone()),
        Operand::Parameter(p) => Token::Param(p.clone()),
        Operand::Number(n) => Token::Number(n.clone()),
    }
}

/// Fail with the first parameter of `tree` that has no value in `params`.
pub(crate) fn check_parameters(tree: &ParseTree, params: &Params) -> ConditionResult<()> {
    match tree
        .parameters()
        .into_iter()
        .find(|name| !params.contains_key(name))
    {
        Some(name) => Err(ConditionError::MissingParameter { name }),
        None => Ok(()),
    }
}
