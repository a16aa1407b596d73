//! T-SQL (SQL Server / Azure SQL) dialect.
//!
//! T-SQL differences from ANSI that matter here:
//! - Square bracket identifier quoting (`[name]`)
//! - OFFSET FETCH for pagination (requires ORDER BY)
//! - `UPDATE alias SET .. FROM ..` for joined updates

use super::helpers;
use super::{MutationStyle, SqlDialect};
use crate::sql::token::TokenStream;

/// T-SQL (SQL Server) dialect.
#[derive(Debug, Clone, Copy)]
pub struct TSql;

impl SqlDialect for TSql {
    fn name(&self) -> &'static str {
        "tsql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_bracket(ident)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_tsql(limit, offset)
    }

    fn requires_order_by_for_offset(&self) -> bool {
        true
    }

    fn mutation_style(&self) -> MutationStyle {
        MutationStyle::TargetAlias
    }
}
