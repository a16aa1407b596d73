//! Row-to-model mapping.
//!
//! A [`Schema`] tree mirrors the join graph of a select query; the
//! [`DataMapper`] folds the flat rows the executer returns into nested models.

mod data_mapper;
mod schema;

pub use data_mapper::DataMapper;
pub use schema::{Schema, SchemaColumn, SubSchema};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{QueryError, QueryResult};

/// A model: property name to value.
pub type Model = Map<String, Value>;

/// Convert a serializable value into a model.
pub fn to_model<T: Serialize>(value: &T) -> QueryResult<Model> {
    match serde_json::to_value(value)? {
        Value::Object(model) => Ok(model),
        _ => Err(QueryError::InvalidModel),
    }
}

/// Convert a model into a user type.
pub fn from_model<T: DeserializeOwned>(model: Model) -> QueryResult<T> {
    Ok(serde_json::from_value(Value::Object(model))?)
}
