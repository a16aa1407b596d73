//! Rewrite the column names of a condition.
//!
//! Conditions are written against fully-qualified property names
//! (`u.firstName`); the mapper swaps them for real column names
//! (`u.first_name`) before compilation.

use std::collections::HashMap;

use serde_json::Value;

use super::ast::{Operand, ParseTree};
use super::compiler::check_parameters;
use super::{ConditionError, ConditionResult, ConditionSource, Params};

/// Map every column of `condition` through `lookup`, returning the rewritten
/// tagged object.
///
/// Operators, numbers and parameters are left untouched. When `params` is
/// supplied, every referenced parameter must have a value.
pub fn map(
    condition: &(impl ConditionSource + ?Sized),
    lookup: &HashMap<String, String>,
    params: Option<&Params>,
) -> ConditionResult<Value> {
    let tree = super::parse(condition)?;
    if let Some(params) = params {
        check_parameters(&tree, params)?;
    }
    Ok(map_tree(&tree, lookup)?.to_value())
}

/// Map every column of a parsed tree through `lookup`.
pub fn map_tree(tree: &ParseTree, lookup: &HashMap<String, String>) -> ConditionResult<ParseTree> {
    let mapped = match tree {
        ParseTree::Comparison {
            operator,
            column,
            value,
        } => ParseTree::Comparison {
            operator: *operator,
            column: map_column(column, lookup)?,
            value: map_operand(value, lookup)?,
        },
        ParseTree::NullComparison { operator, column } => ParseTree::NullComparison {
            operator: *operator,
            column: map_column(column, lookup)?,
        },
        ParseTree::InComparison {
            operator,
            column,
            values,
        } => ParseTree::InComparison {
            operator: *operator,
            column: map_column(column, lookup)?,
            values: values
                .iter()
                .map(|v| map_operand(v, lookup))
                .collect::<ConditionResult<_>>()?,
        },
        ParseTree::Boolean {
            operator,
            conditions,
        } => ParseTree::Boolean {
            operator: *operator,
            conditions: conditions
                .iter()
                .map(|c| map_tree(c, lookup))
                .collect::<ConditionResult<_>>()?,
        },
    };
    Ok(mapped)
}

fn map_column(column: &str, lookup: &HashMap<String, String>) -> ConditionResult<String> {
    lookup
        .get(column)
        .cloned()
        .ok_or_else(|| ConditionError::UnmappedColumn {
            column: column.to_string(),
        })
}

fn map_operand(operand: &Operand, lookup: &HashMap<String, String>) -> ConditionResult<Operand> {
    match operand {
        Operand::Column(c) => Ok(Operand::Column(map_column(c, lookup)?)),
        other => Ok(other.clone()),
    }
}
