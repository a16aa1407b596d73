//! Named query parameters.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::condition::Params;
use crate::error::{QueryError, QueryResult};

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());

/// Build a [`Params`] map from `(name, value)` pairs.
pub fn params<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Params
where
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .map(|(k, v)| (k.into(), v.into()))
        .collect()
}

/// Parameter values for one query, plus a counter for minting unique names.
#[derive(Debug, Clone, Default)]
pub struct ParameterList {
    params: Params,
    next_id: usize,
}

impl ParameterList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a parameter name from `base` that this list has not handed out.
    ///
    /// Non-word characters become `_` and a counter suffix is appended, so
    /// `u.id` yields `u_id_0`, `u_id_1`, ...
    pub fn create_parameter_name(&mut self, base: &str) -> String {
        let name = format!("{}_{}", NON_WORD.replace_all(base, "_"), self.next_id);
        self.next_id += 1;
        name
    }

    /// Add one parameter.
    ///
    /// Re-adding a name with an equal value is a no-op; a different value is
    /// an error unless `overwrite` is set.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        value: Value,
        overwrite: bool,
    ) -> QueryResult<&mut Self> {
        let name = name.into();
        match self.params.get(&name) {
            Some(existing) if *existing == value => {}
            Some(_) if !overwrite => return Err(QueryError::ParameterConflict { name }),
            _ => {
                self.params.insert(name, value);
            }
        }
        Ok(self)
    }

    /// Add every parameter of `params`, with the same conflict rules.
    pub fn add_parameters(&mut self, params: &Params, overwrite: bool) -> QueryResult<&mut Self> {
        for (name, value) in params {
            self.add_parameter(name.clone(), value.clone(), overwrite)?;
        }
        Ok(self)
    }

    /// Merge another list's parameters into this one.
    pub fn merge(&mut self, other: &ParameterList, overwrite: bool) -> QueryResult<&mut Self> {
        self.add_parameters(&other.params, overwrite)
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    pub fn params(&self) -> &Params {
        &self.params
    }

    pub fn into_params(self) -> Params {
        self.params
    }

    pub fn len(&self) -> usize {
        self.params.len()
    }

    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}
