//! The Executer trait definition.
//!
//! An executer runs generated SQL against a database. Connection handling,
//! pooling, transactions and parameter binding all live behind this trait;
//! the query builders only produce SQL text plus named parameter values and
//! await a single result.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::condition::Params;
use crate::error::ExecuterError;

/// A flat result row keyed by column alias.
pub type Row = Map<String, Value>;

/// Result type for executer calls.
pub type ExecuterResult<T> = Result<T, ExecuterError>;

/// Outcome of an INSERT.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InsertResult {
    /// Identifier generated by the database, if any.
    pub insert_id: Option<Value>,
}

/// Outcome of an UPDATE or DELETE.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MutateResult {
    pub affected_rows: u64,
}

/// Runs SQL produced by the query builders.
///
/// Parameters are referenced in the SQL as `:name` and supplied in `params`
/// keyed by `name`. Errors are returned to the caller unchanged.
///
/// # Example
///
/// ```ignore
/// use relfold::query::{Executer, ExecuterResult, Row};
///
/// struct Logging;
///
/// #[async_trait::async_trait]
/// impl Executer for Logging {
///     async fn select(&self, sql: &str, _params: &Params) -> ExecuterResult<Vec<Row>> {
///         println!("{sql}");
///         Ok(vec![])
///     }
///     // ...
/// }
/// ```
#[async_trait]
pub trait Executer: Send + Sync {
    /// Run a SELECT and return its rows.
    async fn select(&self, sql: &str, params: &Params) -> ExecuterResult<Vec<Row>>;

    /// Run an INSERT.
    async fn insert(&self, sql: &str, params: &Params) -> ExecuterResult<InsertResult>;

    /// Run an UPDATE.
    async fn update(&self, sql: &str, params: &Params) -> ExecuterResult<MutateResult>;

    /// Run a DELETE.
    async fn delete(&self, sql: &str, params: &Params) -> ExecuterResult<MutateResult>;
}
