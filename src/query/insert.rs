//! INSERT of a single model.

use std::sync::Arc;

use tracing::debug;

use crate::error::{QueryError, QueryResult};
use crate::mapper::Model;
use crate::metadata::TableMetadata;
use crate::sql::dialect::Dialect;
use crate::sql::token::{Token, TokenStream};

use super::executer::Executer;
use super::params::ParameterList;

/// Builds and runs an INSERT for one model.
///
/// Only columns whose property is present on the model are written; a
/// property explicitly set to null is written as NULL. Parameters are named
/// after the properties:
///
/// ```text
/// INSERT INTO `users` (`firstName`, `lastName`)
/// VALUES (:firstName, :lastName)
/// ```
#[must_use = "Insert has no effect until executed or converted with to_sql()"]
pub struct Insert {
    table: Arc<TableMetadata>,
    dialect: Dialect,
    executer: Arc<dyn Executer>,
    model: Model,
    /// (column name, parameter name)
    columns: Vec<(String, String)>,
    params: ParameterList,
}

impl Insert {
    pub fn new(
        table: Arc<TableMetadata>,
        dialect: Dialect,
        executer: Arc<dyn Executer>,
        model: Model,
    ) -> QueryResult<Self> {
        let mut columns = Vec::new();
        let mut params = ParameterList::new();

        for column in &table.columns {
            if let Some(value) = model.get(&column.property_name) {
                params.add_parameter(
                    column.property_name.clone(),
                    column.apply_save(value),
                    false,
                )?;
                columns.push((column.name.clone(), column.property_name.clone()));
            }
        }

        Ok(Self {
            table,
            dialect,
            executer,
            model,
            columns,
            params,
        })
    }

    pub fn params(&self) -> &ParameterList {
        &self.params
    }

    /// The INSERT statement, or an empty string if no column is written.
    pub fn to_sql(&self) -> String {
        if self.columns.is_empty() {
            return String::new();
        }

        let mut ts = TokenStream::new();
        ts.push(Token::Insert)
            .space()
            .push(Token::Into)
            .space()
            .push(Token::QualifiedIdent {
                schema: self.table.schema.clone(),
                name: self.table.name.clone(),
            })
            .space()
            .lparen()
            .comma_separated(self.columns.iter().map(|(c, _)| Token::Ident(c.clone())))
            .rparen()
            .newline()
            .push(Token::Values)
            .space()
            .lparen()
            .comma_separated(self.columns.iter().map(|(_, p)| Token::Param(p.clone())))
            .rparen();
        ts.serialize(&self.dialect)
    }

    /// Run the insert and return the model, with a generated key filled in.
    ///
    /// Nothing is sent to the executer when no column is written.
    pub async fn execute(&self) -> QueryResult<Model> {
        let mut model = self.model.clone();
        if self.columns.is_empty() {
            return Ok(model);
        }

        let sql = self.to_sql();
        debug!(sql = %sql, params = self.params.len(), "insert: executing");
        let result = self.executer.insert(&sql, self.params.params()).await?;

        if let Some(id) = result.insert_id.filter(|id| !id.is_null()) {
            let primary_key = self.table.primary_key();
            match primary_key.as_slice() {
                [column] => {
                    model.insert(column.property_name.clone(), id);
                }
                _ => return Err(QueryError::CompositeGeneratedKey(self.table.entity.clone())),
            }
        }

        Ok(model)
    }
}
