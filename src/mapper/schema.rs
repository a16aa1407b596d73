//! Schemas describe how flat rows fold into nested models.

use std::collections::HashSet;
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};
use crate::metadata::{Cardinality, RelationshipMetadata, TableMetadata, Transform};

/// A row column copied onto the model.
#[derive(Clone)]
pub struct SchemaColumn {
    /// Column name in the row.
    pub name: String,
    /// Property name on the model.
    pub property_name: String,
    pub transform: Option<Transform>,
}

impl std::fmt::Debug for SchemaColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchemaColumn")
            .field("name", &self.name)
            .field("property_name", &self.property_name)
            .field("transform", &self.transform.is_some())
            .finish()
    }
}

/// A nested schema attached through a relationship.
#[derive(Debug, Clone)]
pub struct SubSchema {
    pub relationship: Arc<RelationshipMetadata>,
    pub schema: Schema,
}

impl SubSchema {
    pub fn property_name(&self) -> &str {
        &self.relationship.property_name
    }

    /// One-to-many relationships fold into arrays, the rest into one object.
    pub fn is_collection(&self) -> bool {
        self.relationship.cardinality == Cardinality::OneToMany
    }
}

/// How one table's columns (and its nested tables) map onto a model.
#[derive(Debug, Clone)]
pub struct Schema {
    pub table: Arc<TableMetadata>,
    /// Row columns identifying one model; a null value means "no model".
    pub key_columns: Vec<String>,
    pub columns: Vec<SchemaColumn>,
    pub sub_schemas: Vec<SubSchema>,
    properties: HashSet<String>,
}

impl Schema {
    pub fn new(table: Arc<TableMetadata>, key_columns: Vec<String>) -> Self {
        Self {
            table,
            key_columns,
            columns: Vec::new(),
            sub_schemas: Vec::new(),
            properties: HashSet::new(),
        }
    }

    /// Copy row column `name` to model property `property_name`.
    pub fn add_column(
        &mut self,
        name: impl Into<String>,
        property_name: impl Into<String>,
        transform: Option<Transform>,
    ) -> QueryResult<&mut Self> {
        let property_name = property_name.into();
        self.claim(&property_name)?;
        self.columns.push(SchemaColumn {
            name: name.into(),
            property_name,
            transform,
        });
        Ok(self)
    }

    /// Nest `schema` under the relationship's property.
    pub fn add_schema(
        &mut self,
        relationship: Arc<RelationshipMetadata>,
        schema: Schema,
    ) -> QueryResult<&mut Self> {
        self.claim(&relationship.property_name)?;
        self.sub_schemas.push(SubSchema {
            relationship,
            schema,
        });
        Ok(self)
    }

    fn claim(&mut self, property: &str) -> QueryResult<()> {
        if !self.properties.insert(property.to_string()) {
            return Err(QueryError::DuplicateSchemaProperty(property.to_string()));
        }
        Ok(())
    }
}
