//! The join graph: the FROM / JOIN / WHERE part of a query.
//!
//! A [`JoinGraph`] registers every participating table under a unique alias,
//! records how each joined table hangs off its parent, and compiles join and
//! filter conditions. Conditions are written against fully-qualified property
//! names (`u.id`) and compiled to fully-qualified column names (`` `u`.`userID` ``).
//!
//! ```text
//! FROM `users` AS `u`
//! LEFT OUTER JOIN `phone_numbers` AS `pn` ON `u`.`userID` = `pn`.`userID`
//! WHERE `u`.`firstName` LIKE :name
//! ```
//!
//! Invariants:
//! - aliases are unique and contain only word characters
//! - a (parent alias, relationship) pair is joined at most once
//! - a condition may only reference columns already in the graph

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::{json, Value};
use tracing::trace;

use crate::condition::{self, is_empty_condition, ConditionCompiler, Params};
use crate::error::{QueryError, QueryResult};
use crate::metadata::{ColumnMetadata, Registry, RelationshipMetadata, TableMetadata};
use crate::sql::dialect::Dialect;
use crate::sql::token::{Token, TokenStream};

use super::params::ParameterList;

static ALIAS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\w+$").unwrap());

/// Join kinds supported by the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinType {
    Inner,
    LeftOuter,
    RightOuter,
}

impl JoinType {
    fn emit(&self, ts: &mut TokenStream) {
        match self {
            JoinType::Inner => ts.push(Token::Inner),
            JoinType::LeftOuter => ts.push(Token::Left).space().push(Token::Outer),
            JoinType::RightOuter => ts.push(Token::Right).space().push(Token::Outer),
        };
        ts.space().push(Token::Join);
    }
}

/// One aliased table in the graph.
#[derive(Debug, Clone)]
pub struct FromTableMeta {
    pub table: Arc<TableMetadata>,
    pub alias: String,
    /// Alias of the table this one is joined to; `None` for the base table.
    pub parent: Option<String>,
    /// Relationship from the parent that produced this table.
    pub relationship: Option<Arc<RelationshipMetadata>>,
    pub join_type: Option<JoinType>,
    /// The condition as supplied: ON for joins, WHERE for the base table.
    pub condition: Option<Value>,
    /// The condition compiled to SQL.
    pub condition_sql: Option<String>,
}

/// One column made available by a table in the graph.
#[derive(Debug, Clone)]
pub struct FromColumnMeta {
    pub table_alias: String,
    pub column: Arc<ColumnMetadata>,
    /// `alias.columnName`
    pub fq_column_name: String,
    /// `alias.propertyName`
    pub fq_property_name: String,
}

/// Description of a table to add with [`JoinGraph::add_table`].
#[derive(Debug, Clone)]
pub struct TableSpec {
    pub entity: String,
    pub alias: String,
    pub parent: Option<String>,
    pub relationship: Option<String>,
    pub join_type: Option<JoinType>,
    pub condition: Option<Value>,
    pub params: Params,
}

impl TableSpec {
    pub fn new(entity: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            entity: entity.into(),
            alias: alias.into(),
            parent: None,
            relationship: None,
            join_type: None,
            condition: None,
            params: Params::new(),
        }
    }

    /// Nest under `parent` through the relationship named `relationship`.
    pub fn parent(mut self, parent: impl Into<String>, relationship: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self.relationship = Some(relationship.into());
        self
    }

    pub fn join_type(mut self, join_type: JoinType) -> Self {
        self.join_type = Some(join_type);
        self
    }

    pub fn on(mut self, condition: Value, params: Params) -> Self {
        self.condition = Some(condition);
        self.params = params;
        self
    }
}

/// Description of a join added with [`JoinGraph::join`].
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub entity: String,
    pub alias: String,
    /// `parentAlias.relationshipProperty`
    pub parent_property: String,
    pub condition: Option<Value>,
    pub params: Params,
}

impl JoinSpec {
    pub fn new(
        entity: impl Into<String>,
        alias: impl Into<String>,
        parent_property: impl Into<String>,
    ) -> Self {
        Self {
            entity: entity.into(),
            alias: alias.into(),
            parent_property: parent_property.into(),
            condition: None,
            params: Params::new(),
        }
    }

    /// Join with an explicit condition instead of the relationship's keys.
    pub fn on(mut self, condition: Value, params: Params) -> Self {
        self.condition = Some(condition);
        self.params = params;
        self
    }
}

/// Tables, columns, conditions and parameters for one query.
#[derive(Debug, Clone)]
pub struct JoinGraph {
    registry: Arc<Registry>,
    dialect: Dialect,
    tables: Vec<FromTableMeta>,
    columns: Vec<FromColumnMeta>,
    /// `alias.property` to `alias.column`
    column_lookup: HashMap<String, String>,
    /// (parent alias, relationship property) pairs already joined
    mappings: HashSet<(String, String)>,
    params: ParameterList,
    where_performed: bool,
}

impl JoinGraph {
    /// Start a graph with `entity` as the base table.
    pub fn new(
        registry: Arc<Registry>,
        dialect: Dialect,
        entity: &str,
        alias: &str,
    ) -> QueryResult<Self> {
        let mut graph = Self {
            registry,
            dialect,
            tables: Vec::new(),
            columns: Vec::new(),
            column_lookup: HashMap::new(),
            mappings: HashSet::new(),
            params: ParameterList::new(),
            where_performed: false,
        };
        graph.add_table(TableSpec::new(entity, alias))?;
        Ok(graph)
    }

    /// Add a table to the graph.
    ///
    /// Every column of the table becomes available as `alias.property`. A
    /// condition is compiled after its columns are checked against the
    /// available set (including this table's own columns).
    pub fn add_table(&mut self, spec: TableSpec) -> QueryResult<&mut Self> {
        let TableSpec {
            entity,
            alias,
            parent,
            relationship,
            join_type,
            condition,
            params,
        } = spec;

        if !ALIAS.is_match(&alias) {
            return Err(QueryError::InvalidAlias(alias));
        }
        if self.table(&alias).is_some() {
            return Err(QueryError::DuplicateAlias(alias));
        }

        let table = self.registry.table(&entity)?.clone();

        let (relationship, mapping) = match (parent.as_deref(), relationship.as_deref()) {
            (Some(parent), Some(name)) => {
                let parent_table = self
                    .table(parent)
                    .ok_or_else(|| QueryError::MissingParent(parent.to_string()))?;
                let mapping = (parent.to_string(), name.to_string());
                if self.mappings.contains(&mapping) {
                    return Err(QueryError::MappingNotUnique {
                        parent: mapping.0,
                        relationship: mapping.1,
                    });
                }
                let relationship = self
                    .registry
                    .relationship(&parent_table.table.entity, &entity, name)?
                    .clone();
                (Some(relationship), Some(mapping))
            }
            (None, None) if self.tables.is_empty() => (None, None),
            _ => return Err(QueryError::ParentRequired(alias)),
        };

        // Columns are staged so a failed condition leaves the graph untouched
        let staged: Vec<FromColumnMeta> = table
            .columns
            .iter()
            .map(|column| FromColumnMeta {
                table_alias: alias.clone(),
                column: column.clone(),
                fq_column_name: format!("{}.{}", alias, column.name),
                fq_property_name: format!("{}.{}", alias, column.property_name),
            })
            .collect();
        let mut lookup = self.column_lookup.clone();
        lookup.extend(
            staged
                .iter()
                .map(|c| (c.fq_property_name.clone(), c.fq_column_name.clone())),
        );

        let mut merged = self.params.clone();
        let condition_sql = match &condition {
            Some(cond) if !is_empty_condition(cond) => {
                merged.add_parameters(&params, false)?;
                Some(self.compile_condition(cond, &lookup, &merged)?)
            }
            _ => None,
        };

        trace!(
            entity = %entity,
            alias = %alias,
            parent = ?parent,
            columns = staged.len(),
            "join graph: added table"
        );

        self.column_lookup = lookup;
        self.columns.extend(staged);
        self.params = merged;
        if let Some(mapping) = mapping {
            self.mappings.insert(mapping);
        }
        self.tables.push(FromTableMeta {
            table,
            alias,
            parent,
            relationship,
            join_type,
            condition,
            condition_sql,
        });

        Ok(self)
    }

    /// Join a table through a relationship of an existing table.
    ///
    /// `parent_property` names the parent alias and relationship property
    /// (`u.phoneNumbers`). Without an explicit condition the relationship's
    /// join keys are used: one pair gives an equality, several give an `$and`
    /// of equalities.
    pub fn join(&mut self, join_type: JoinType, spec: JoinSpec) -> QueryResult<&mut Self> {
        let (parent, property) = spec
            .parent_property
            .split_once('.')
            .ok_or_else(|| QueryError::InvalidParentProperty(spec.parent_property.clone()))?;

        let condition = match spec.condition {
            Some(condition) => condition,
            None => {
                let parent_table = self
                    .table(parent)
                    .ok_or_else(|| QueryError::MissingParent(parent.to_string()))?;
                let relationship =
                    self.registry
                        .relationship(&parent_table.table.entity, &spec.entity, property)?;
                join_key_condition(relationship, parent, &spec.alias)?
            }
        };

        self.add_table(TableSpec {
            entity: spec.entity,
            alias: spec.alias,
            parent: Some(parent.to_string()),
            relationship: Some(property.to_string()),
            join_type: Some(join_type),
            condition: Some(condition),
            params: spec.params,
        })
    }

    /// Set the WHERE condition of the base table.
    ///
    /// May be called once. An empty object renders nothing but still uses up
    /// the call; a rejected condition does not.
    pub fn filter(&mut self, condition: Value, params: Params) -> QueryResult<&mut Self> {
        if self.where_performed {
            return Err(QueryError::WhereAlreadyPerformed);
        }

        if is_empty_condition(&condition) {
            self.where_performed = true;
            return Ok(self);
        }

        let mut merged = self.params.clone();
        merged.add_parameters(&params, false)?;
        let sql = self.compile_condition(&condition, &self.column_lookup, &merged)?;
        self.params = merged;
        self.where_performed = true;

        let base = &mut self.tables[0];
        base.condition = Some(condition);
        base.condition_sql = Some(sql);
        Ok(self)
    }

    fn compile_condition(
        &self,
        condition: &Value,
        lookup: &HashMap<String, String>,
        params: &ParameterList,
    ) -> QueryResult<String> {
        let tree = condition::parse(condition)?;
        if let Some(column) = tree.columns().into_iter().find(|c| !lookup.contains_key(c)) {
            return Err(QueryError::ColumnNotAvailable(column));
        }
        let mapped = condition::map_tree(&tree, lookup)?;
        Ok(ConditionCompiler::new(&self.dialect).compile(&mapped, Some(params.params()))?)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Tables in insertion order; the first is the base table.
    pub fn tables(&self) -> &[FromTableMeta] {
        &self.tables
    }

    pub fn base(&self) -> &FromTableMeta {
        &self.tables[0]
    }

    pub fn table(&self, alias: &str) -> Option<&FromTableMeta> {
        self.tables.iter().find(|t| t.alias == alias)
    }

    /// Tables whose parent is `alias`, in insertion order.
    pub fn children<'a>(&'a self, alias: &'a str) -> impl Iterator<Item = &'a FromTableMeta> + 'a {
        self.tables
            .iter()
            .filter(move |t| t.parent.as_deref() == Some(alias))
    }

    /// Available columns in insertion order.
    pub fn columns(&self) -> &[FromColumnMeta] {
        &self.columns
    }

    /// Look up an available column by `alias.property`.
    pub fn column(&self, fq_property: &str) -> Option<&FromColumnMeta> {
        self.columns
            .iter()
            .find(|c| c.fq_property_name == fq_property)
    }

    pub fn is_column_available(&self, fq_property: &str) -> bool {
        self.column_lookup.contains_key(fq_property)
    }

    /// Require `fq_property` to be available, returning its column.
    pub fn require_column(&self, fq_property: &str) -> QueryResult<&FromColumnMeta> {
        self.column(fq_property)
            .ok_or_else(|| QueryError::PropertyNotAvailable(fq_property.to_string()))
    }

    pub fn column_lookup(&self) -> &HashMap<String, String> {
        &self.column_lookup
    }

    pub fn params(&self) -> &ParameterList {
        &self.params
    }

    pub fn params_mut(&mut self) -> &mut ParameterList {
        &mut self.params
    }

    // =========================================================================
    // Rendering
    // =========================================================================

    /// `` `table` AS `alias` ``
    pub(crate) fn emit_table_ref(&self, table: &FromTableMeta, ts: &mut TokenStream) {
        ts.push(Token::QualifiedIdent {
            schema: table.table.schema.clone(),
            name: table.table.name.clone(),
        })
        .space()
        .push(Token::As)
        .space()
        .push(Token::Ident(table.alias.clone()));
    }

    /// `WHERE <key> IN (SELECT <key> FROM ..)`, narrowing `target` to the
    /// rows this graph reaches. Composite keys compare as a row value.
    pub(crate) fn emit_key_subquery(&self, target: &FromTableMeta, ts: &mut TokenStream) {
        let keys: Vec<Token> = target
            .table
            .primary_key()
            .iter()
            .map(|pk| Token::Column(format!("{}.{}", target.alias, pk.name)))
            .collect();

        ts.push(Token::Where).space();
        if keys.len() > 1 {
            ts.lparen().comma_separated(keys.clone()).rparen();
        } else {
            ts.comma_separated(keys.clone());
        }
        ts.space()
            .push(Token::In)
            .space()
            .lparen()
            .push(Token::Select)
            .space()
            .comma_separated(keys)
            .newline()
            .push(Token::Raw(self.to_sql()))
            .rparen();
    }

    pub fn has_joins(&self) -> bool {
        self.tables.len() > 1
    }

    /// `FROM <table> AS <alias>`
    pub fn from_sql(&self) -> String {
        let mut ts = TokenStream::new();
        ts.push(Token::From).space();
        self.emit_table_ref(self.base(), &mut ts);
        ts.serialize(&self.dialect)
    }

    /// One `<JOIN> <table> AS <alias> [ON <cond>]` line per joined table.
    pub fn join_sql(&self) -> Vec<String> {
        self.tables
            .iter()
            .skip(1)
            .map(|table| {
                let mut ts = TokenStream::new();
                table.join_type.unwrap_or(JoinType::Inner).emit(&mut ts);
                ts.space();
                self.emit_table_ref(table, &mut ts);
                if let Some(sql) = &table.condition_sql {
                    ts.space().push(Token::On).space().push(Token::Raw(sql.clone()));
                }
                ts.serialize(&self.dialect)
            })
            .collect()
    }

    /// `WHERE <cond>`, if a base condition was set.
    pub fn where_sql(&self) -> Option<String> {
        self.base().condition_sql.as_ref().map(|sql| {
            let mut ts = TokenStream::new();
            ts.push(Token::Where).space().push(Token::Raw(sql.clone()));
            ts.serialize(&self.dialect)
        })
    }

    /// FROM, JOIN and WHERE parts joined with newlines.
    pub fn to_sql(&self) -> String {
        let mut parts = vec![self.from_sql()];
        parts.extend(self.join_sql());
        parts.extend(self.where_sql());
        parts.join("\n")
    }
}

/// Build the default join condition from a relationship's key pairs.
fn join_key_condition(
    relationship: &RelationshipMetadata,
    parent: &str,
    alias: &str,
) -> QueryResult<Value> {
    let invalid = || QueryError::InvalidJoinKeys(relationship.property_name.clone());

    let equalities = relationship
        .join_keys
        .iter()
        .map(|pair| match pair.as_slice() {
            [parent_property, child_property] => Ok(json!({
                "$eq": {
                    format!("{}.{}", parent, parent_property): format!("{}.{}", alias, child_property)
                }
            })),
            _ => Err(invalid()),
        })
        .collect::<QueryResult<Vec<_>>>()?;

    match equalities.len() {
        0 => Err(invalid()),
        1 => Ok(equalities.into_iter().next().unwrap_or_default()),
        _ => Ok(json!({ "$and": equalities })),
    }
}
