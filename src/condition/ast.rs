//! Parse tree for condition expressions.

use serde_json::{Map, Number, Value};

/// A condition operator keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Eq,
    Neq,
    Lt,
    Lte,
    Gt,
    Gte,
    Like,
    NotLike,
    In,
    NotIn,
    Is,
    Isnt,
    And,
    Or,
}

/// Arity class of an operator, which decides the shape of its operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperatorKind {
    /// `{op: {column: value}}`
    Comparison,
    /// `{op: {column: null}}`
    NullComparison,
    /// `{op: {column: [value, ...]}}`
    InComparison,
    /// `{op: [condition, ...]}`
    Boolean,
}

impl Operator {
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        let op = match keyword {
            "$eq" => Operator::Eq,
            "$neq" => Operator::Neq,
            "$lt" => Operator::Lt,
            "$lte" => Operator::Lte,
            "$gt" => Operator::Gt,
            "$gte" => Operator::Gte,
            "$like" => Operator::Like,
            "$notLike" => Operator::NotLike,
            "$in" => Operator::In,
            "$notIn" => Operator::NotIn,
            "$is" => Operator::Is,
            "$isnt" => Operator::Isnt,
            "$and" => Operator::And,
            "$or" => Operator::Or,
            _ => return None,
        };
        Some(op)
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            Operator::Eq => "$eq",
            Operator::Neq => "$neq",
            Operator::Lt => "$lt",
            Operator::Lte => "$lte",
            Operator::Gt => "$gt",
            Operator::Gte => "$gte",
            Operator::Like => "$like",
            Operator::NotLike => "$notLike",
            Operator::In => "$in",
            Operator::NotIn => "$notIn",
            Operator::Is => "$is",
            Operator::Isnt => "$isnt",
            Operator::And => "$and",
            Operator::Or => "$or",
        }
    }

    pub fn kind(&self) -> OperatorKind {
        match self {
            Operator::Eq
            | Operator::Neq
            | Operator::Lt
            | Operator::Lte
            | Operator::Gt
            | Operator::Gte
            | Operator::Like
            | Operator::NotLike => OperatorKind::Comparison,
            Operator::In | Operator::NotIn => OperatorKind::InComparison,
            Operator::Is | Operator::Isnt => OperatorKind::NullComparison,
            Operator::And | Operator::Or => OperatorKind::Boolean,
        }
    }
}

/// The right-hand side of a comparison.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Column(String),
    Parameter(String),
    Number(String),
}

impl Operand {
    fn to_value(&self) -> Value {
        match self {
            Operand::Column(c) => Value::String(c.clone()),
            Operand::Parameter(p) => Value::String(format!(":{}", p)),
            Operand::Number(n) => Value::Number(Number::from_string_unchecked(n.clone())),
        }
    }
}

/// A parsed condition.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseTree {
    Comparison {
        operator: Operator,
        column: String,
        value: Operand,
    },
    NullComparison {
        operator: Operator,
        column: String,
    },
    InComparison {
        operator: Operator,
        column: String,
        values: Vec<Operand>,
    },
    Boolean {
        operator: Operator,
        conditions: Vec<ParseTree>,
    },
}

impl ParseTree {
    pub fn operator(&self) -> Operator {
        match self {
            ParseTree::Comparison { operator, .. }
            | ParseTree::NullComparison { operator, .. }
            | ParseTree::InComparison { operator, .. }
            | ParseTree::Boolean { operator, .. } => *operator,
        }
    }

    /// Distinct column names in first-encountered order.
    ///
    /// Both left-hand columns and column operands are included.
    pub fn columns(&self) -> Vec<String> {
        let mut columns = Vec::new();
        self.visit_columns(&mut |c| {
            if !columns.iter().any(|seen: &String| seen == c) {
                columns.push(c.to_string());
            }
        });
        columns
    }

    /// Parameter names in first-encountered order, without the leading `:`.
    pub fn parameters(&self) -> Vec<String> {
        let mut params = Vec::new();
        self.visit_operands(&mut |operand| {
            if let Operand::Parameter(p) = operand {
                if !params.contains(p) {
                    params.push(p.clone());
                }
            }
        });
        params
    }

    fn visit_columns(&self, f: &mut impl FnMut(&str)) {
        match self {
            ParseTree::Comparison { column, value, .. } => {
                f(column);
                if let Operand::Column(c) = value {
                    f(c);
                }
            }
            ParseTree::NullComparison { column, .. } => f(column),
            ParseTree::InComparison { column, values, .. } => {
                f(column);
                for value in values {
                    if let Operand::Column(c) = value {
                        f(c);
                    }
                }
            }
            ParseTree::Boolean { conditions, .. } => {
                for condition in conditions {
                    condition.visit_columns(f);
                }
            }
        }
    }

    fn visit_operands(&self, f: &mut impl FnMut(&Operand)) {
        match self {
            ParseTree::Comparison { value, .. } => f(value),
            ParseTree::NullComparison { .. } => {}
            ParseTree::InComparison { values, .. } => values.iter().for_each(|v| f(v)),
            ParseTree::Boolean { conditions, .. } => {
                for condition in conditions {
                    condition.visit_operands(f);
                }
            }
        }
    }

    /// Rebuild the tagged-object form of this condition.
    pub fn to_value(&self) -> Value {
        let body = match self {
            ParseTree::Comparison { column, value, .. } => single(column, value.to_value()),
            ParseTree::NullComparison { column, .. } => single(column, Value::Null),
            ParseTree::InComparison { column, values, .. } => single(
                column,
                Value::Array(values.iter().map(Operand::to_value).collect()),
            ),
            ParseTree::Boolean { conditions, .. } => {
                Value::Array(conditions.iter().map(ParseTree::to_value).collect())
            }
        };
        single(self.operator().keyword(), body)
    }
}

fn single(key: &str, value: Value) -> Value {
    let mut map = Map::new();
    map.insert(key.to_string(), value);
    Value::Object(map)
}
