//! Update and delete a single model by its primary key.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{json, Value};

use crate::condition::Params;
use crate::error::{QueryError, QueryResult};
use crate::mapper::Model;
use crate::metadata::{Registry, TableMetadata};
use crate::sql::dialect::Dialect;

use super::delete::Delete;
use super::executer::Executer;
use super::join_graph::JoinGraph;
use super::params::ParameterList;
use super::update::Update;

static NON_WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\W").unwrap());

/// Table alias used when mutating a model of `entity`.
pub fn model_alias(entity: &str) -> String {
    NON_WORD.replace_all(entity, "_").into_owned()
}

/// Build `$eq` conditions over every primary-key property of `model`.
///
/// Values are bound to parameter names minted from `names`; a single key
/// yields one `$eq`, several yield an `$and`. A missing or null key is an
/// error naming the property.
pub fn primary_key_condition(
    table: &TableMetadata,
    alias: &str,
    model: &Model,
    names: &mut ParameterList,
) -> QueryResult<(Value, Params)> {
    let mut params = Params::new();
    let mut equalities = Vec::new();

    for column in table.primary_key() {
        let value = match model.get(&column.property_name) {
            Some(value) if !value.is_null() => value,
            _ => return Err(QueryError::MissingModelKey(column.property_name.clone())),
        };
        let fq_property = format!("{}.{}", alias, column.property_name);
        let name = names.create_parameter_name(&fq_property);
        equalities.push(json!({ "$eq": { fq_property: format!(":{}", name) } }));
        params.insert(name, column.apply_save(value));
    }

    let condition = match equalities.len() {
        1 => equalities.into_iter().next().unwrap_or_default(),
        _ => json!({ "$and": equalities }),
    };
    Ok((condition, params))
}

/// Join graph over `entity` filtered down to the row `model` identifies.
fn keyed_graph(
    registry: Arc<Registry>,
    dialect: Dialect,
    entity: &str,
    model: &Model,
) -> QueryResult<JoinGraph> {
    let alias = model_alias(entity);
    let mut graph = JoinGraph::new(registry, dialect, entity, &alias)?;
    let table = graph.base().table.clone();
    let (condition, params) = primary_key_condition(&table, &alias, model, graph.params_mut())?;
    graph.filter(condition, params)?;
    Ok(graph)
}

/// An UPDATE writing every non-key property of `model` to its row.
///
/// Properties without a mapped column are ignored.
pub fn update_model(
    registry: Arc<Registry>,
    dialect: Dialect,
    executer: Arc<dyn Executer>,
    entity: &str,
    model: &Model,
) -> QueryResult<Update> {
    let graph = keyed_graph(registry, dialect, entity, model)?;
    let alias = &graph.base().alias;

    let assignments: Model = graph
        .base()
        .table
        .columns
        .iter()
        .filter(|c| !c.is_primary)
        .filter_map(|c| {
            model
                .get(&c.property_name)
                .map(|v| (format!("{}.{}", alias, c.property_name), v.clone()))
        })
        .collect();

    Update::new(graph, executer, &assignments)
}

/// A DELETE of the row `model` identifies.
pub fn delete_model(
    registry: Arc<Registry>,
    dialect: Dialect,
    executer: Arc<dyn Executer>,
    entity: &str,
    model: &Model,
) -> QueryResult<Delete> {
    let graph = keyed_graph(registry, dialect, entity, model)?;
    Ok(Delete::new(graph, executer))
}
