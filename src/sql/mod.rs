//! SQL rendering primitives.
//!
//! Builders assemble a [`TokenStream`] and serialize it once for the target
//! [`Dialect`], which decides identifier quoting and pagination syntax.

pub mod dialect;
pub mod token;


pub use dialect::{Dialect, SqlDialect};
pub use token::{Token, TokenStream};
