//! Query building and execution.
//!
//! Every query starts from a [`JoinGraph`]: the base table, the tables
//! joined to it through registry relationships, and an optional filter. The
//! builders ([`Select`], [`Count`], [`Insert`], [`Update`], [`Delete`]) add
//! their own clause on top, render SQL with named parameters and hand both
//! to an [`Executer`].
//!
//! [`DataContext`] ties the registry, dialect and executer together.

mod context;
mod count;
mod delete;
mod executer;
mod insert;
mod join_graph;
mod mutate;
mod params;
mod select;
mod update;

#[cfg(test)]
pub(crate) mod test_utils;

pub use context::{DataContext, FromAdapter};
pub use count::Count;
pub use delete::Delete;
pub use executer::{Executer, ExecuterResult, InsertResult, MutateResult, Row};
pub use insert::Insert;
pub use join_graph::{FromColumnMeta, FromTableMeta, JoinGraph, JoinSpec, JoinType, TableSpec};
pub use mutate::{delete_model, model_alias, primary_key_condition, update_model};
pub use params::{params, ParameterList};
pub use select::{OrderBy, Select, SortDir};
pub use update::Update;
