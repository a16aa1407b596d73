//! COUNT queries over a join graph.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::sql::token::{Token, TokenStream};

use super::executer::Executer;
use super::join_graph::JoinGraph;
use super::select::{OrderBy, OrderClause};

/// Builds and runs `SELECT COUNT(...) AS count`.
#[must_use = "Count has no effect until executed or converted with to_sql()"]
pub struct Count {
    graph: JoinGraph,
    executer: Arc<dyn Executer>,
    /// Fully-qualified column to count; `None` counts rows.
    column: Option<String>,
    count_performed: bool,
    order: OrderClause,
}

impl Count {
    pub fn new(graph: JoinGraph, executer: Arc<dyn Executer>) -> Self {
        Self {
            graph,
            executer,
            column: None,
            count_performed: false,
            order: OrderClause::default(),
        }
    }

    pub fn graph(&self) -> &JoinGraph {
        &self.graph
    }

    /// Count non-null values of `property` instead of rows.
    pub fn count(mut self, property: Option<&str>) -> QueryResult<Self> {
        if self.count_performed {
            return Err(QueryError::CountAlreadyPerformed);
        }
        self.column = match property {
            Some(property) => Some(self.graph.require_column(property)?.fq_column_name.clone()),
            None => None,
        };
        self.count_performed = true;
        Ok(self)
    }

    pub fn order_by(mut self, order: Vec<OrderBy>) -> QueryResult<Self> {
        self.order.set(&self.graph, order)?;
        Ok(self)
    }

    pub fn to_sql(&self) -> String {
        let dialect = self.graph.dialect();
        let mut ts = TokenStream::new();

        ts.push(Token::Select).space().push(Token::Count).lparen();
        match &self.column {
            Some(column) => ts.push(Token::Column(column.clone())),
            None => ts.push(Token::Star),
        };
        ts.rparen()
            .space()
            .push(Token::As)
            .space()
            .push(Token::Ident("count".into()))
            .newline()
            .push(Token::Raw(self.graph.to_sql()));

        self.order.emit(&mut ts);
        ts.serialize(&dialect)
    }

    /// Run the query and return the `count` column of the first row.
    pub async fn execute(&self) -> QueryResult<u64> {
        let sql = self.to_sql();
        let params = self.graph.params().params();

        debug!(sql = %sql, params = params.len(), "count: executing");
        let rows = self.executer.select(&sql, params).await?;

        let count = rows
            .first()
            .and_then(|row| row.get("count"))
            .ok_or(QueryError::InvalidCountResult)?;
        match count {
            Value::Number(n) => n.as_u64(),
            // Some drivers return BIGINT counts as strings
            Value::String(s) => s.parse().ok(),
            _ => None,
        }
        .ok_or(QueryError::InvalidCountResult)
    }
}
