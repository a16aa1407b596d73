//! The metadata registry.
//!
//! A [`Registry`] is built once from table and relationship declarations and
//! is read-only afterwards; share it with `Arc`.
//!
//! ```ignore
//! use relfold::metadata::{ColumnMetadata, Registry, RelationshipMetadata, TableMetadata};
//!
//! let registry = Registry::builder()
//!     .table(
//!         TableMetadata::new("User", "users")
//!             .column(ColumnMetadata::new("userID").property("id").primary().generated())
//!             .column(ColumnMetadata::new("firstName")),
//!     )
//!     .table(
//!         TableMetadata::new("PhoneNumber", "phone_numbers")
//!             .column(ColumnMetadata::new("phoneNumberID").primary().generated())
//!             .column(ColumnMetadata::new("userID")),
//!     )
//!     .relationship(
//!         RelationshipMetadata::one_to_many("User", "phoneNumbers", "PhoneNumber")
//!             .on("id", "userID"),
//!     )
//!     .build()?;
//! ```

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::error::{QueryError, QueryResult};

use super::table::{ColumnMetadata, TableMetadata};

/// How many targets one owner row relates to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cardinality {
    OneToMany,
    ManyToOne,
    OneToOne,
}

/// A named relationship from an owner entity to a target entity.
#[derive(Debug, Clone)]
pub struct RelationshipMetadata {
    pub owner: String,
    pub target: String,
    /// Property on the owner that holds the related entity or entities.
    pub property_name: String,
    pub cardinality: Cardinality,
    /// `[owner property, target property]` pairs joining the two tables.
    pub join_keys: Vec<Vec<String>>,
}

impl RelationshipMetadata {
    pub fn new(
        owner: impl Into<String>,
        property_name: impl Into<String>,
        target: impl Into<String>,
        cardinality: Cardinality,
    ) -> Self {
        Self {
            owner: owner.into(),
            target: target.into(),
            property_name: property_name.into(),
            cardinality,
            join_keys: Vec::new(),
        }
    }

    pub fn one_to_many(
        owner: impl Into<String>,
        property_name: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::new(owner, property_name, target, Cardinality::OneToMany)
    }

    pub fn many_to_one(
        owner: impl Into<String>,
        property_name: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::new(owner, property_name, target, Cardinality::ManyToOne)
    }

    pub fn one_to_one(
        owner: impl Into<String>,
        property_name: impl Into<String>,
        target: impl Into<String>,
    ) -> Self {
        Self::new(owner, property_name, target, Cardinality::OneToOne)
    }

    /// Add a join pair: owner property equals target property.
    pub fn on(mut self, owner_property: impl Into<String>, target_property: impl Into<String>) -> Self {
        self.join_keys
            .push(vec![owner_property.into(), target_property.into()]);
        self
    }

    /// Replace the join pairs wholesale.
    pub fn join_keys(mut self, join_keys: Vec<Vec<String>>) -> Self {
        self.join_keys = join_keys;
        self
    }
}

/// Read-only lookup of tables, columns and relationships by entity.
#[derive(Debug, Default)]
pub struct Registry {
    tables: HashMap<String, Arc<TableMetadata>>,
    relationships: Vec<Arc<RelationshipMetadata>>,
}

impl Registry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn table(&self, entity: &str) -> QueryResult<&Arc<TableMetadata>> {
        self.tables
            .get(entity)
            .ok_or_else(|| QueryError::UnknownEntity(entity.to_string()))
    }

    pub fn columns(&self, entity: &str) -> QueryResult<&[Arc<ColumnMetadata>]> {
        Ok(&self.table(entity)?.columns)
    }

    pub fn primary_key(&self, entity: &str) -> QueryResult<Vec<&Arc<ColumnMetadata>>> {
        Ok(self.table(entity)?.primary_key())
    }

    /// Relationships owned by `owner`.
    pub fn relationships<'a, 'b>(
        &'a self,
        owner: &'b str,
    ) -> impl Iterator<Item = &'a Arc<RelationshipMetadata>> + 'b
    where
        'a: 'b,
    {
        self.relationships.iter().filter(move |r| r.owner == owner)
    }

    /// The relationship named `property` from `owner` to `target`.
    pub fn relationship(
        &self,
        owner: &str,
        target: &str,
        property: &str,
    ) -> QueryResult<&Arc<RelationshipMetadata>> {
        self.relationships(owner)
            .find(|r| r.target == target && r.property_name == property)
            .ok_or_else(|| QueryError::UnknownRelationship {
                owner: owner.to_string(),
                target: target.to_string(),
                property: property.to_string(),
            })
    }

    /// Property name to column name, optionally prefixing both with `alias.`.
    pub fn property_map(&self, entity: &str, alias: Option<&str>) -> QueryResult<HashMap<String, String>> {
        let prefix = |name: &str| match alias {
            Some(alias) => format!("{}.{}", alias, name),
            None => name.to_string(),
        };
        Ok(self
            .columns(entity)?
            .iter()
            .map(|c| (prefix(&c.property_name), prefix(&c.name)))
            .collect())
    }
}

/// Collects declarations and validates them into a [`Registry`].
#[derive(Debug, Default)]
pub struct RegistryBuilder {
    tables: Vec<TableMetadata>,
    relationships: Vec<RelationshipMetadata>,
}

impl RegistryBuilder {
    pub fn table(mut self, table: TableMetadata) -> Self {
        self.tables.push(table);
        self
    }

    pub fn relationship(mut self, relationship: RelationshipMetadata) -> Self {
        self.relationships.push(relationship);
        self
    }

    /// Validate and build.
    ///
    /// Entities must be unique and have a primary key; relationships must
    /// connect registered entities and have unique names per owner.
    pub fn build(self) -> QueryResult<Registry> {
        // Phase 1: tables
        let mut tables = HashMap::new();
        for table in self.tables {
            if table.primary_key().is_empty() {
                return Err(QueryError::NoPrimaryKey(table.entity));
            }
            if tables.contains_key(&table.entity) {
                return Err(QueryError::DuplicateEntity(table.entity));
            }
            tables.insert(table.entity.clone(), Arc::new(table));
        }

        // Phase 2: relationships
        let mut seen = HashSet::new();
        let mut relationships = Vec::with_capacity(self.relationships.len());
        for relationship in self.relationships {
            for entity in [&relationship.owner, &relationship.target] {
                if !tables.contains_key(entity) {
                    return Err(QueryError::UnknownEntity(entity.clone()));
                }
            }
            if !seen.insert((relationship.owner.clone(), relationship.property_name.clone())) {
                return Err(QueryError::DuplicateRelationship {
                    owner: relationship.owner,
                    property: relationship.property_name,
                });
            }
            relationships.push(Arc::new(relationship));
        }

        Ok(Registry {
            tables,
            relationships,
        })
    }
}
