//! # relfold
//!
//! A relational data-access core: compiles join graphs and JSON condition
//! objects to parameterized SQL, and folds flat result rows back into nested
//! models.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │        Registry (tables, columns, relationships)         │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [join graph]
//! ┌─────────────────────────────────────────────────────────┐
//! │   FROM / JOIN / WHERE  ◄── condition DSL (lex, parse,    │
//! │                             map, compile)                │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [builders]
//! ┌─────────────────────────────────────────────────────────┐
//! │  SELECT · COUNT · INSERT · UPDATE · DELETE  + parameters │
//! └─────────────────────────────────────────────────────────┘
//!                          │
//!                          ▼ [executer]
//! ┌─────────────────────────────────────────────────────────┐
//! │      Flat rows ──► schema ──► data mapper ──► models     │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod condition;
pub mod config;
pub mod error;
pub mod mapper;
pub mod metadata;
pub mod query;
pub mod sql;

// Re-export SQL submodules at crate level
pub use sql::dialect;
pub use sql::token;

/// Re-exports for convenient usage.
pub mod prelude {
    pub use crate::condition::{ConditionCompiler, ConditionError, Params};
    pub use crate::config::Settings;
    pub use crate::dialect::{Dialect, SqlDialect};
    pub use crate::error::{QueryError, QueryResult};
    pub use crate::mapper::{from_model, to_model, DataMapper, Model, Schema};
    pub use crate::metadata::{
        converters, Cardinality, ColumnMetadata, Registry, RelationshipMetadata, TableMetadata,
    };
    pub use crate::query::{
        params, DataContext, Executer, ExecuterResult, InsertResult, JoinGraph, JoinSpec,
        JoinType, MutateResult, OrderBy, Row, SortDir,
    };
}

// Also export at crate root for convenience
pub use dialect::Dialect;
pub use error::{QueryError, QueryResult};
pub use query::DataContext;
