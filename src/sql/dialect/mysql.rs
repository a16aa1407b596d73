//! MySQL SQL dialect.
//!
//! MySQL differences from ANSI:
//! - Backtick identifier quoting (`` `name` ``)
//! - `LIMIT offset, count` for pagination
//! - Multi-table `UPDATE ... JOIN` and `DELETE alias FROM ...`

use super::helpers;
use super::{MutationStyle, SqlDialect};
use crate::sql::token::TokenStream;

/// MySQL SQL dialect.
#[derive(Debug, Clone, Copy)]
pub struct MySql;

impl SqlDialect for MySql {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn quote_identifier(&self, ident: &str) -> String {
        helpers::quote_backtick(ident)
    }

    fn emit_limit_offset(&self, limit: Option<u64>, offset: Option<u64>) -> TokenStream {
        helpers::emit_limit_offset_mysql(limit, offset)
    }

    fn mutation_style(&self) -> MutationStyle {
        MutationStyle::MultiTable
    }
}
