//! UPDATE over a join graph.

use std::sync::Arc;

use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::mapper::Model;
use crate::sql::dialect::{MutationStyle, SqlDialect};
use crate::sql::token::{Token, TokenStream};

use super::executer::{Executer, MutateResult};
use super::join_graph::JoinGraph;

/// Builds and runs an UPDATE.
///
/// The model maps fully-qualified properties to new values; every property
/// must be available in the graph. Each value is bound to a freshly minted
/// parameter:
///
/// ```text
/// UPDATE `users` AS `u`
/// SET `u`.`firstName` = :u_firstName_0
/// WHERE `u`.`userID` = :u_id_1
/// ```
///
/// Only MySQL assigns columns of joined tables. Other dialects update the
/// base table and render joins as described by [`MutationStyle`].
#[must_use = "Update has no effect until executed or converted with to_sql()"]
pub struct Update {
    graph: JoinGraph,
    executer: Arc<dyn Executer>,
    assignments: Vec<Assignment>,
    require_affected_rows: bool,
}

struct Assignment {
    column: String,
    fq_column: String,
    param: String,
}

impl Update {
    pub fn new(mut graph: JoinGraph, executer: Arc<dyn Executer>, model: &Model) -> QueryResult<Self> {
        let dialect = graph.dialect();
        let base_alias = graph.base().alias.clone();
        let mut assignments = Vec::with_capacity(model.len());

        for (property, value) in model {
            let (column, fq_column, value) = {
                let column = graph.require_column(property)?;
                if column.table_alias != base_alias
                    && !dialect.mutation_style().updates_joined_tables()
                {
                    return Err(QueryError::JoinedUpdateTarget {
                        dialect: dialect.to_string(),
                        property: property.clone(),
                    });
                }
                (
                    column.column.name.clone(),
                    column.fq_column_name.clone(),
                    column.column.apply_save(value),
                )
            };
            let params = graph.params_mut();
            let param = params.create_parameter_name(property);
            params.add_parameter(param.clone(), value, false)?;
            assignments.push(Assignment {
                column,
                fq_column,
                param,
            });
        }

        Ok(Self {
            graph,
            executer,
            assignments,
            require_affected_rows: true,
        })
    }

    /// Whether an update touching no rows is an error. Defaults to `true`.
    pub fn require_affected_rows(mut self, require: bool) -> Self {
        self.require_affected_rows = require;
        self
    }

    pub fn graph(&self) -> &JoinGraph {
        &self.graph
    }

    /// The UPDATE statement, or an empty string if nothing is assigned.
    pub fn to_sql(&self) -> String {
        if self.assignments.is_empty() {
            return String::new();
        }

        let dialect = self.graph.dialect();
        let style = dialect.mutation_style();
        let base = self.graph.base();
        let mut ts = TokenStream::new();

        ts.push(Token::Update).space();
        match style {
            MutationStyle::MultiTable => {
                self.graph.emit_table_ref(base, &mut ts);
                for join in self.graph.join_sql() {
                    ts.newline().push(Token::Raw(join));
                }
            }
            MutationStyle::TargetAlias => {
                ts.push(Token::Ident(base.alias.clone()));
            }
            MutationStyle::KeySubquery => {
                self.graph.emit_table_ref(base, &mut ts);
            }
        }

        ts.newline().push(Token::Set).space();
        for (i, assignment) in self.assignments.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            let target = match style {
                MutationStyle::KeySubquery => Token::Ident(assignment.column.clone()),
                _ => Token::Column(assignment.fq_column.clone()),
            };
            ts.push(target)
                .space()
                .push(Token::Eq)
                .space()
                .push(Token::Param(assignment.param.clone()));
        }

        match style {
            MutationStyle::MultiTable => {
                if let Some(filter) = self.graph.where_sql() {
                    ts.newline().push(Token::Raw(filter));
                }
            }
            MutationStyle::TargetAlias => {
                ts.newline().push(Token::Raw(self.graph.to_sql()));
            }
            MutationStyle::KeySubquery if self.graph.has_joins() => {
                ts.newline();
                self.graph.emit_key_subquery(base, &mut ts);
            }
            MutationStyle::KeySubquery => {
                if let Some(filter) = self.graph.where_sql() {
                    ts.newline().push(Token::Raw(filter));
                }
            }
        }
        ts.serialize(&dialect)
    }

    /// Run the update.
    ///
    /// An empty assignment list reports zero affected rows without calling
    /// the executer.
    pub async fn execute(&self) -> QueryResult<MutateResult> {
        if self.assignments.is_empty() {
            return Ok(MutateResult::default());
        }

        let sql = self.to_sql();
        let params = self.graph.params().params();
        debug!(sql = %sql, params = params.len(), "update: executing");
        let result = self.executer.update(&sql, params).await?;

        if result.affected_rows == 0 && self.require_affected_rows {
            return Err(QueryError::NoRowsAffected);
        }
        Ok(result)
    }
}
