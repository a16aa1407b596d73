//! DELETE over a join graph.

use std::sync::Arc;

use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::sql::dialect::{MutationStyle, SqlDialect};
use crate::sql::token::{Token, TokenStream};

use super::executer::{Executer, MutateResult};
use super::join_graph::JoinGraph;

/// Builds and runs a DELETE from one table of the graph.
///
/// ```text
/// DELETE `u`
/// FROM `users` AS `u`
/// WHERE `u`.`userID` = :u_id_0
/// ```
///
/// PostgreSQL and DuckDB delete from one table, so joins there narrow the
/// target through a key subquery:
///
/// ```text
/// DELETE FROM "phone_numbers" AS "pn"
/// WHERE "pn"."phoneNumberID" IN (SELECT "pn"."phoneNumberID"
/// FROM "users" AS "u"
/// INNER JOIN "phone_numbers" AS "pn" ON "u"."userID" = "pn"."userID")
/// ```
#[must_use = "Delete has no effect until executed or converted with to_sql()"]
pub struct Delete {
    graph: JoinGraph,
    executer: Arc<dyn Executer>,
    alias: String,
    require_affected_rows: bool,
}

impl Delete {
    /// Delete from the base table.
    pub fn new(graph: JoinGraph, executer: Arc<dyn Executer>) -> Self {
        let alias = graph.base().alias.clone();
        Self {
            graph,
            executer,
            alias,
            require_affected_rows: true,
        }
    }

    /// Delete from the table joined as `alias` instead.
    pub fn from_alias(mut self, alias: &str) -> QueryResult<Self> {
        if self.graph.table(alias).is_none() {
            return Err(QueryError::UnknownAlias(alias.to_string()));
        }
        self.alias = alias.to_string();
        Ok(self)
    }

    /// Whether a delete removing no rows is an error. Defaults to `true`.
    pub fn require_affected_rows(mut self, require: bool) -> Self {
        self.require_affected_rows = require;
        self
    }

    pub fn graph(&self) -> &JoinGraph {
        &self.graph
    }

    pub fn to_sql(&self) -> String {
        let dialect = self.graph.dialect();
        let mut ts = TokenStream::new();
        ts.push(Token::Delete).space();

        match dialect.mutation_style() {
            MutationStyle::MultiTable | MutationStyle::TargetAlias => {
                ts.push(Token::Ident(self.alias.clone()))
                    .newline()
                    .push(Token::Raw(self.graph.to_sql()));
            }
            MutationStyle::KeySubquery if self.graph.has_joins() => {
                if let Some(target) = self.graph.table(&self.alias) {
                    ts.push(Token::From).space();
                    self.graph.emit_table_ref(target, &mut ts);
                    ts.newline();
                    self.graph.emit_key_subquery(target, &mut ts);
                }
            }
            MutationStyle::KeySubquery => {
                ts.push(Token::Raw(self.graph.to_sql()));
            }
        }
        ts.serialize(&dialect)
    }

    pub async fn execute(&self) -> QueryResult<MutateResult> {
        let sql = self.to_sql();
        let params = self.graph.params().params();
        debug!(sql = %sql, params = params.len(), "delete: executing");
        let result = self.executer.delete(&sql, params).await?;

        if result.affected_rows == 0 && self.require_affected_rows {
            return Err(QueryError::NoRowsAffected);
        }
        Ok(result)
    }
}
