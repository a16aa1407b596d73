//! Shared helper functions for SQL dialect implementations.
//!
//! This module provides reusable building blocks that dialects can compose
//! to implement the `SqlDialect` trait with minimal duplication.

use super::super::token::{Token, TokenStream};

// =============================================================================
// Identifier Quoting
// =============================================================================

/// Quote identifier with double quotes (ANSI style).
/// Used by: Postgres, DuckDB
pub fn quote_double(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// Quote identifier with backticks.
/// Used by: MySQL
pub fn quote_backtick(ident: &str) -> String {
    format!("`{}`", ident.replace('`', "``"))
}

/// Quote identifier with square brackets.
/// Used by: T-SQL (SQL Server, Azure Synapse)
pub fn quote_bracket(ident: &str) -> String {
    format!("[{}]", ident.replace(']', "]]"))
}

/// Split a fully-qualified name on its first `.`.
///
/// `"u.first.name"` splits into `("u", "first.name")`; a name without a dot
/// yields `None`.
pub fn split_qualified(name: &str) -> Option<(&str, &str)> {
    name.split_once('.')
}

// =============================================================================
// Pagination
// =============================================================================

/// Emit LIMIT ... OFFSET ... (standard SQL).
/// Used by: Postgres, DuckDB
pub fn emit_limit_offset_standard(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if let Some(lim) = limit {
        ts.push(Token::Limit).space().push(Token::LitInt(lim));
    }

    if let Some(off) = offset {
        if limit.is_some() {
            ts.space();
        }
        ts.push(Token::Offset).space().push(Token::LitInt(off));
    }

    ts
}

/// Emit `LIMIT offset, count` (MySQL comma form).
///
/// Without an offset this is a plain `LIMIT count`. MySQL has no OFFSET-only
/// form, so an offset without a limit uses the documented maximum row count.
pub fn emit_limit_offset_mysql(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    match (limit, offset) {
        (Some(lim), Some(off)) => {
            ts.push(Token::Limit)
                .space()
                .push(Token::LitInt(off))
                .comma()
                .space()
                .push(Token::LitInt(lim));
        }
        (Some(lim), None) => {
            ts.push(Token::Limit).space().push(Token::LitInt(lim));
        }
        (None, Some(off)) => {
            ts.push(Token::Limit)
                .space()
                .push(Token::LitInt(off))
                .comma()
                .space()
                .push(Token::LitInt(u64::MAX));
        }
        (None, None) => {}
    }

    ts
}

/// Emit OFFSET ... ROWS FETCH NEXT ... ROWS ONLY (T-SQL style).
/// Used by: T-SQL (SQL Server, Azure Synapse)
/// Note: Requires ORDER BY clause in T-SQL
pub fn emit_limit_offset_tsql(limit: Option<u64>, offset: Option<u64>) -> TokenStream {
    let mut ts = TokenStream::new();

    if limit.is_none() && offset.is_none() {
        return ts;
    }

    let off = offset.unwrap_or(0);
    ts.push(Token::Offset)
        .space()
        .push(Token::LitInt(off))
        .space()
        .push(Token::Rows);

    if let Some(lim) = limit {
        ts.space()
            .push(Token::Fetch)
            .space()
            .push(Token::Next)
            .space()
            .push(Token::LitInt(lim))
            .space()
            .push(Token::Rows)
            .space()
            .push(Token::Only);
    }

    ts
}
