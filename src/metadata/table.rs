//! Table and column metadata.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::types::DataType;

/// A value transform applied when saving or retrieving a column.
pub type Transform = Arc<dyn Fn(&Value) -> Value + Send + Sync>;

/// Optional save/retrieve transforms for a column.
#[derive(Clone, Default)]
pub struct Converter {
    on_save: Option<Transform>,
    on_retrieve: Option<Transform>,
}

impl Converter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Transform applied to model values before they are written.
    pub fn on_save(mut self, transform: Transform) -> Self {
        self.on_save = Some(transform);
        self
    }

    /// Transform applied to row values as they are read.
    pub fn on_retrieve(mut self, transform: Transform) -> Self {
        self.on_retrieve = Some(transform);
        self
    }

    pub fn save(&self, value: &Value) -> Value {
        match &self.on_save {
            Some(f) => f(value),
            None => value.clone(),
        }
    }

    pub fn retrieve(&self, value: &Value) -> Value {
        match &self.on_retrieve {
            Some(f) => f(value),
            None => value.clone(),
        }
    }

    pub fn retrieve_transform(&self) -> Option<&Transform> {
        self.on_retrieve.as_ref()
    }
}

impl fmt::Debug for Converter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Converter")
            .field("on_save", &self.on_save.is_some())
            .field("on_retrieve", &self.on_retrieve.is_some())
            .finish()
    }
}

/// Metadata for one mapped column.
#[derive(Debug, Clone)]
pub struct ColumnMetadata {
    /// Column name in the database.
    pub name: String,
    /// Property name on the model.
    pub property_name: String,
    pub is_primary: bool,
    /// Value is generated by the database (auto increment).
    pub is_generated: bool,
    pub is_nullable: bool,
    pub data_type: Option<DataType>,
    pub max_length: Option<u32>,
    pub converter: Option<Converter>,
}

impl ColumnMetadata {
    /// A nullable column whose property name equals its column name.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            property_name: name.clone(),
            name,
            is_primary: false,
            is_generated: false,
            is_nullable: true,
            data_type: None,
            max_length: None,
            converter: None,
        }
    }

    pub fn property(mut self, property_name: impl Into<String>) -> Self {
        self.property_name = property_name.into();
        self
    }

    /// Mark as part of the primary key. Primary key columns are not null.
    pub fn primary(mut self) -> Self {
        self.is_primary = true;
        self.is_nullable = false;
        self
    }

    pub fn generated(mut self) -> Self {
        self.is_generated = true;
        self
    }

    pub fn not_null(mut self) -> Self {
        self.is_nullable = false;
        self
    }

    /// Set the SQL type, e.g. `varchar(255)`. The maximum length is derived
    /// from it; an unrecognised type leaves both unset.
    pub fn data_type(mut self, sql_type: &str) -> Self {
        self.data_type = DataType::parse(sql_type);
        self.max_length = self.data_type.as_ref().and_then(DataType::max_length);
        self
    }

    pub fn with_converter(mut self, converter: Converter) -> Self {
        self.converter = Some(converter);
        self
    }

    pub fn apply_save(&self, value: &Value) -> Value {
        match &self.converter {
            Some(c) => c.save(value),
            None => value.clone(),
        }
    }

    pub fn apply_retrieve(&self, value: &Value) -> Value {
        match &self.converter {
            Some(c) => c.retrieve(value),
            None => value.clone(),
        }
    }

    pub fn retrieve_transform(&self) -> Option<Transform> {
        self.converter
            .as_ref()
            .and_then(|c| c.retrieve_transform().cloned())
    }
}

/// Metadata for one mapped table.
#[derive(Debug, Clone)]
pub struct TableMetadata {
    /// Entity name used for registry lookups.
    pub entity: String,
    /// Table name in the database.
    pub name: String,
    pub schema: Option<String>,
    pub columns: Vec<Arc<ColumnMetadata>>,
}

impl TableMetadata {
    pub fn new(entity: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            name: name.into(),
            schema: None,
            columns: Vec::new(),
        }
    }

    pub fn schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }

    pub fn column(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(Arc::new(column));
        self
    }

    /// Primary key columns in declaration order.
    pub fn primary_key(&self) -> Vec<&Arc<ColumnMetadata>> {
        self.columns.iter().filter(|c| c.is_primary).collect()
    }

    pub fn column_by_property(&self, property: &str) -> Option<&Arc<ColumnMetadata>> {
        self.columns.iter().find(|c| c.property_name == property)
    }
}
