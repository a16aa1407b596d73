//! SELECT queries over a join graph.

use std::collections::HashSet;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::mapper::{from_model, DataMapper, Model, Schema};
use crate::sql::dialect::SqlDialect;
use crate::sql::token::{Token, TokenStream};

use super::executer::Executer;
use super::join_graph::{FromColumnMeta, FromTableMeta, JoinGraph};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

/// One ORDER BY item, referencing a fully-qualified property.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub property: String,
    pub dir: SortDir,
}

impl OrderBy {
    pub fn asc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            dir: SortDir::Asc,
        }
    }

    pub fn desc(property: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            dir: SortDir::Desc,
        }
    }
}

/// A validated ORDER BY clause, shared by select and count.
#[derive(Debug, Clone, Default)]
pub(crate) struct OrderClause {
    /// (fully-qualified column, direction)
    items: Vec<(String, SortDir)>,
    performed: bool,
}

impl OrderClause {
    pub(crate) fn set(&mut self, graph: &JoinGraph, order: Vec<OrderBy>) -> QueryResult<()> {
        if self.performed {
            return Err(QueryError::OrderByAlreadyPerformed);
        }
        let items = order
            .into_iter()
            .map(|o| {
                let column = graph.require_column(&o.property)?;
                Ok((column.fq_column_name.clone(), o.dir))
            })
            .collect::<QueryResult<Vec<_>>>()?;
        self.items = items;
        self.performed = true;
        Ok(())
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub(crate) fn emit(&self, ts: &mut TokenStream) {
        if self.items.is_empty() {
            return;
        }
        ts.newline().push(Token::OrderBy).space();
        for (i, (column, dir)) in self.items.iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.push(Token::Column(column.clone())).space().push(match dir {
                SortDir::Asc => Token::Asc,
                SortDir::Desc => Token::Desc,
            });
        }
    }
}

/// Builds and runs a SELECT, folding the rows into nested models.
///
/// ```text
/// SELECT `u`.`userID` AS `u.id`, `pn`.`phoneNumber` AS `pn.phoneNumber`
/// FROM `users` AS `u`
/// LEFT OUTER JOIN `phone_numbers` AS `pn` ON `u`.`userID` = `pn`.`userID`
/// ORDER BY `u`.`firstName` ASC
/// LIMIT 20, 10
/// ```
#[must_use = "Select has no effect until executed or converted with to_sql()"]
pub struct Select {
    graph: JoinGraph,
    executer: Arc<dyn Executer>,
    selected: Option<Vec<String>>,
    order: OrderClause,
    limit: Option<(u64, Option<u64>)>,
}

impl Select {
    pub fn new(graph: JoinGraph, executer: Arc<dyn Executer>) -> Self {
        Self {
            graph,
            executer,
            selected: None,
            order: OrderClause::default(),
            limit: None,
        }
    }

    pub fn graph(&self) -> &JoinGraph {
        &self.graph
    }

    /// Choose the selected properties (`alias.property`).
    ///
    /// Without a call, or with no properties, every available column is
    /// selected. Otherwise the full primary key of every table in the graph
    /// must be part of the selection.
    pub fn select<S: Into<String>>(
        mut self,
        properties: impl IntoIterator<Item = S>,
    ) -> QueryResult<Self> {
        if self.selected.is_some() {
            return Err(QueryError::SelectAlreadyPerformed);
        }

        let mut seen = HashSet::new();
        let mut selected = Vec::new();
        for property in properties {
            let property = property.into();
            self.graph.require_column(&property)?;
            if !seen.insert(property.clone()) {
                return Err(QueryError::DuplicateSelect(property));
            }
            selected.push(property);
        }

        // An empty selection means every column, which covers every key
        if selected.is_empty() {
            self.selected = Some(selected);
            return Ok(self);
        }

        for table in self.graph.tables() {
            let complete = table
                .table
                .primary_key()
                .iter()
                .all(|pk| seen.contains(&format!("{}.{}", table.alias, pk.property_name)));
            if !complete {
                return Err(QueryError::MissingPrimaryKey {
                    table: table.table.name.clone(),
                    alias: table.alias.clone(),
                });
            }
        }

        self.selected = Some(selected);
        Ok(self)
    }

    pub fn order_by(mut self, order: Vec<OrderBy>) -> QueryResult<Self> {
        self.order.set(&self.graph, order)?;
        Ok(self)
    }

    /// Limit the result to `count` rows, skipping `offset` rows first.
    pub fn limit(mut self, count: u64, offset: Option<u64>) -> QueryResult<Self> {
        if self.limit.is_some() {
            return Err(QueryError::LimitAlreadyPerformed);
        }
        self.limit = Some((count, offset));
        Ok(self)
    }

    /// Selected columns in selection order (graph order when defaulted).
    pub fn selected_columns(&self) -> Vec<&FromColumnMeta> {
        match &self.selected {
            Some(selected) if !selected.is_empty() => selected
                .iter()
                .filter_map(|p| self.graph.column(p))
                .collect(),
            _ => self.graph.columns().iter().collect(),
        }
    }

    pub fn to_sql(&self) -> String {
        let dialect = self.graph.dialect();
        let mut ts = TokenStream::new();

        ts.push(Token::Select).space();
        for (i, column) in self.selected_columns().into_iter().enumerate() {
            if i > 0 {
                ts.comma().space();
            }
            ts.push(Token::Column(column.fq_column_name.clone()))
                .space()
                .push(Token::As)
                .space()
                .push(Token::Ident(column.fq_property_name.clone()));
        }
        ts.newline().push(Token::Raw(self.graph.to_sql()));

        self.order.emit(&mut ts);

        if let Some((count, offset)) = self.limit {
            // OFFSET ... FETCH is only valid after an ORDER BY
            if self.order.is_empty() && dialect.requires_order_by_for_offset() {
                ts.newline()
                    .push(Token::OrderBy)
                    .space()
                    .lparen()
                    .push(Token::Select)
                    .space()
                    .push(Token::Null)
                    .rparen();
            }
            let paging = dialect.emit_limit_offset(Some(count), offset);
            if !paging.is_empty() {
                ts.newline().append(&paging);
            }
        }

        ts.serialize(&dialect)
    }

    /// The schema tree the rows of this query fold into.
    pub fn schema(&self) -> QueryResult<Schema> {
        self.table_schema(self.graph.base())
    }

    fn table_schema(&self, table: &FromTableMeta) -> QueryResult<Schema> {
        let key_columns = table
            .table
            .primary_key()
            .iter()
            .map(|pk| format!("{}.{}", table.alias, pk.property_name))
            .collect();
        let mut schema = Schema::new(table.table.clone(), key_columns);

        for column in self
            .selected_columns()
            .into_iter()
            .filter(|c| c.table_alias == table.alias)
        {
            schema.add_column(
                column.fq_property_name.clone(),
                column.column.property_name.clone(),
                column.column.retrieve_transform(),
            )?;
        }

        for child in self.graph.children(&table.alias) {
            if let Some(relationship) = &child.relationship {
                let sub = self.table_schema(child)?;
                schema.add_schema(relationship.clone(), sub)?;
            }
        }

        Ok(schema)
    }

    /// Run the query and fold the rows into models.
    pub async fn execute(&self) -> QueryResult<Vec<Model>> {
        let sql = self.to_sql();
        let schema = self.schema()?;
        let params = self.graph.params().params();

        debug!(sql = %sql, params = params.len(), "select: executing");
        let rows = self.executer.select(&sql, params).await?;
        debug!(rows = rows.len(), "select: folding rows");

        Ok(DataMapper::new().serialize(&rows, &schema))
    }

    /// Run the query and deserialize each model into `T`.
    pub async fn execute_as<T: DeserializeOwned>(&self) -> QueryResult<Vec<T>> {
        self.execute().await?.into_iter().map(from_model).collect()
    }
}
