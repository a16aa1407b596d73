//! Fold flat join rows into nested, de-duplicated models.
//!
//! A SQL join repeats the parent columns once per child row. The data mapper
//! walks every row through the schema tree and keeps, for each (parent model,
//! relationship) pair, a lookup of the models already built keyed by their
//! key-column values. Repeated keys reuse the existing model; a null key
//! (an outer join with no match) builds nothing.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use serde_json::{Map, Value};

use super::schema::Schema;
use super::Model;
use crate::query::Row;

/// Models of one schema level, in first-encountered order.
#[derive(Debug, Default)]
struct Collection {
    order: Vec<String>,
    nodes: HashMap<String, Node>,
}

/// One built model plus the collections of its nested relationships.
#[derive(Debug)]
struct Node {
    document: Model,
    relations: HashMap<String, Collection>,
}

/// Folds rows into models according to a [`Schema`].
#[derive(Debug, Default, Clone, Copy)]
pub struct DataMapper;

impl DataMapper {
    pub fn new() -> Self {
        Self
    }

    /// Fold `rows` into one model per distinct base key, in row order.
    pub fn serialize(&self, rows: &[Row], schema: &Schema) -> Vec<Model> {
        let mut root = Collection::default();
        for row in rows {
            fold(row, schema, &mut root);
        }
        materialize(root, schema)
    }
}

/// Stringified key-column values, or `None` if any is null or absent.
fn key_of(row: &Row, schema: &Schema) -> Option<String> {
    let mut values = Vec::with_capacity(schema.key_columns.len());
    for column in &schema.key_columns {
        match row.get(column) {
            None | Some(Value::Null) => return None,
            Some(value) => values.push(value.clone()),
        }
    }
    Some(Value::Array(values).to_string())
}

fn build_document(row: &Row, schema: &Schema) -> Model {
    let mut document = Map::new();
    for column in &schema.columns {
        let value = row.get(&column.name).cloned().unwrap_or(Value::Null);
        let value = match &column.transform {
            Some(transform) => transform(&value),
            None => value,
        };
        document.insert(column.property_name.clone(), value);
    }
    document
}

fn fold(row: &Row, schema: &Schema, collection: &mut Collection) {
    let Some(key) = key_of(row, schema) else {
        return;
    };

    let Collection { order, nodes } = collection;
    let node = match nodes.entry(key) {
        Entry::Occupied(entry) => entry.into_mut(),
        Entry::Vacant(entry) => {
            order.push(entry.key().clone());
            entry.insert(Node {
                document: build_document(row, schema),
                relations: HashMap::new(),
            })
        }
    };

    for sub in &schema.sub_schemas {
        let children = node
            .relations
            .entry(sub.property_name().to_string())
            .or_default();
        fold(row, &sub.schema, children);
    }
}

fn materialize(mut collection: Collection, schema: &Schema) -> Vec<Model> {
    collection
        .order
        .iter()
        .filter_map(|key| collection.nodes.remove(key))
        .map(|node| {
            let Node {
                mut document,
                mut relations,
            } = node;
            for sub in &schema.sub_schemas {
                let children = relations
                    .remove(sub.property_name())
                    .map(|c| materialize(c, &sub.schema))
                    .unwrap_or_default();
                let value = if sub.is_collection() {
                    Value::Array(children.into_iter().map(Value::Object).collect())
                } else {
                    children
                        .into_iter()
                        .next()
                        .map(Value::Object)
                        .unwrap_or(Value::Null)
                };
                document.insert(sub.property_name().to_string(), value);
            }
            document
        })
        .collect()
}
