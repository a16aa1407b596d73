//! SQL dialect definitions and escaping rules.
//!
//! This module provides a trait-based abstraction for the handful of dialect
//! differences the query builders care about:
//!
//! - Identifier quoting: `` ` `` (MySQL), `"` (PostgreSQL/DuckDB), `[]` (T-SQL)
//! - Escaping of fully-qualified `table.column` names
//! - Pagination: `LIMIT offset, count` vs `LIMIT/OFFSET` vs `OFFSET FETCH`
//! - How UPDATE and DELETE reach joined tables ([`MutationStyle`])
//!
//! The dialect doubles as the escaping strategy handed to the condition
//! compiler and the join graph.
//!
//! # Usage
//!
//! ```ignore
//! use relfold::dialect::{Dialect, SqlDialect};
//!
//! let dialect = Dialect::MySql;
//! assert_eq!(dialect.escape_property("u.id"), "`u.id`");
//! assert_eq!(dialect.escape_fully_qualified_column("u.id"), "`u`.`id`");
//! ```

mod duckdb;
pub mod helpers;
mod mysql;
mod postgres;
mod tsql;

pub use duckdb::DuckDb;
pub use mysql::MySql;
pub use postgres::Postgres;
pub use tsql::TSql;

use super::token::TokenStream;

/// How UPDATE and DELETE statements reach the joined tables of a graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationStyle {
    /// `UPDATE t AS a JOIN .. SET a.c = ..` and `DELETE a FROM t AS a JOIN ..`
    MultiTable,
    /// `UPDATE a SET a.c = .. FROM t AS a JOIN ..` and `DELETE a FROM t AS a JOIN ..`
    TargetAlias,
    /// Unqualified SET targets. Joins and filters narrow the target through
    /// `WHERE <key> IN (SELECT <key> FROM ..)`.
    KeySubquery,
}

impl MutationStyle {
    /// Whether an UPDATE may assign columns of joined tables.
    pub fn updates_joined_tables(&self) -> bool {
        matches!(self, MutationStyle::MultiTable)
    }
}

/// SQL dialect trait - defines how identifiers and pagination are rendered.
///
/// Implementations only need to supply [`SqlDialect::quote_identifier`]; the
/// escaping helpers are built on top of it.
pub trait SqlDialect: std::fmt::Debug + Send + Sync {
    /// Dialect name for display/logging.
    fn name(&self) -> &'static str;

    // =========================================================================
    // Identifier Quoting
    // =========================================================================

    /// Quote a single identifier (table, column, alias).
    fn quote_identifier(&self, ident: &str) -> String;

    /// Escape a single property or alias name.
    ///
    /// Dots are not treated specially, so `u.id` becomes one quoted name.
    fn escape_property(&self, name: &str) -> String {
        self.quote_identifier(name)
    }

    /// Escape a fully-qualified `table.column` name.
    ///
    /// The table and column parts are escaped independently, splitting on the
    /// first `.`. A name without a dot is escaped as a bare property.
    fn escape_fully_qualified_column(&self, name: &str) -> String {
        match helpers::split_qualified(name) {
            Some((table, column)) => format!(
                "{}.{}",
                self.escape_property(table),
                self.escape_property(column)
            ),
            None => self.escape_property(name),
        }
    }

    /// Format a NULL literal.
    fn format_null(&self) -> &'static str {
        "NULL"
    }

    // =========================================================================
    // Pagination
    // =========================================================================

    /// Emit LIMIT/OFFSET or equivalent pagination clause.
    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_standard(limit, offset)
    }

    /// Whether this dialect requires ORDER BY for OFFSET/LIMIT.
    ///
    /// T-SQL requires ORDER BY when using OFFSET FETCH.
    fn requires_order_by_for_offset(&self) -> bool {
        false
    }

    // =========================================================================
    // DML
    // =========================================================================

    /// How UPDATE and DELETE statements reach joined tables.
    fn mutation_style(&self) -> MutationStyle {
        MutationStyle::KeySubquery
    }
}

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Dialect {
    #[default]
    MySql,
    Postgres,
    DuckDb,
    TSql,
}

impl Dialect {
    /// Get the dialect implementation.
    pub fn dialect(&self) -> &'static dyn SqlDialect {
        match self {
            Dialect::MySql => &MySql,
            Dialect::Postgres => &Postgres,
            Dialect::DuckDb => &DuckDb,
            Dialect::TSql => &TSql,
        }
    }

    /// Look up a dialect by name, case-insensitively.
    ///
    /// Accepts the display names plus the common aliases `postgresql`,
    /// `mssql` and `sqlserver`.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "mysql" | "mariadb" => Some(Dialect::MySql),
            "postgres" | "postgresql" => Some(Dialect::Postgres),
            "duckdb" => Some(Dialect::DuckDb),
            "tsql" | "mssql" | "sqlserver" => Some(Dialect::TSql),
            _ => None,
        }
    }
}

// Implement SqlDialect for Dialect enum by delegating to concrete types
impl SqlDialect for Dialect {
    fn name(&self) -> &'static str {
        self.dialect().name()
    }

    fn quote_identifier(&self, ident: &str) -> String {
        self.dialect().quote_identifier(ident)
    }

    fn escape_property(&self, name: &str) -> String {
        self.dialect().escape_property(name)
    }

    fn escape_fully_qualified_column(&self, name: &str) -> String {
        self.dialect().escape_fully_qualified_column(name)
    }

    fn format_null(&self) -> &'static str {
        self.dialect().format_null()
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        self.dialect().emit_limit_offset(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        self.dialect().requires_order_by_for_offset()
    }

    fn mutation_style(&self) -> MutationStyle {
        self.dialect().mutation_style()
    }
}

impl std::fmt::Display for Dialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.dialect().name())
    }
}
