//! The data context: registry, dialect and executer in one handle.

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

use crate::condition::Params;
use crate::config::{Settings, SettingsError};
use crate::error::QueryResult;
use crate::mapper::Model;
use crate::metadata::Registry;
use crate::sql::dialect::Dialect;

use super::count::Count;
use super::delete::Delete;
use super::executer::{Executer, MutateResult};
use super::insert::Insert;
use super::join_graph::{JoinGraph, JoinSpec, JoinType};
use super::mutate;
use super::select::Select;
use super::update::Update;

/// Entry point for building and running queries.
///
/// ```ignore
/// let ctx = DataContext::new(registry, executer);
/// let users = ctx
///     .from("User", "u")?
///     .left_outer_join(JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers"))?
///     .filter(json!({"$like": {"u.firstName": ":name"}}), params([("name", "J%")]))?
///     .select_all()
///     .execute()
///     .await?;
/// ```
#[derive(Clone)]
pub struct DataContext {
    registry: Arc<Registry>,
    dialect: Dialect,
    executer: Arc<dyn Executer>,
    require_affected_rows: bool,
}

impl DataContext {
    pub fn new(registry: Arc<Registry>, executer: Arc<dyn Executer>) -> Self {
        Self {
            registry,
            dialect: Dialect::default(),
            executer,
            require_affected_rows: true,
        }
    }

    /// Build a context using the dialect and query settings from `settings`.
    pub fn from_settings(
        settings: &Settings,
        registry: Arc<Registry>,
        executer: Arc<dyn Executer>,
    ) -> Result<Self, SettingsError> {
        Ok(Self::new(registry, executer)
            .with_dialect(settings.dialect()?)
            .require_affected_rows(settings.query.require_affected_rows))
    }

    pub fn with_dialect(mut self, dialect: Dialect) -> Self {
        self.dialect = dialect;
        self
    }

    pub fn require_affected_rows(mut self, require: bool) -> Self {
        self.require_affected_rows = require;
        self
    }

    pub fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Start a query with `entity` as the base table.
    pub fn from(&self, entity: &str, alias: &str) -> QueryResult<FromAdapter> {
        let graph = JoinGraph::new(self.registry.clone(), self.dialect, entity, alias)?;
        Ok(FromAdapter {
            graph,
            context: self.clone(),
        })
    }

    /// Insert one model, returning it with any generated key.
    pub async fn insert(&self, entity: &str, model: Model) -> QueryResult<Model> {
        let table = self.registry.table(entity)?.clone();
        Insert::new(table, self.dialect, self.executer.clone(), model)?
            .execute()
            .await
    }

    /// Insert models one after another.
    pub async fn insert_all(&self, entity: &str, models: Vec<Model>) -> QueryResult<Vec<Model>> {
        let mut saved = Vec::with_capacity(models.len());
        for model in models {
            saved.push(self.insert(entity, model).await?);
        }
        debug!(entity = %entity, count = saved.len(), "inserted models");
        Ok(saved)
    }

    /// Update the row identified by the model's primary key.
    pub async fn update_model(&self, entity: &str, model: &Model) -> QueryResult<MutateResult> {
        mutate::update_model(
            self.registry.clone(),
            self.dialect,
            self.executer.clone(),
            entity,
            model,
        )?
        .require_affected_rows(self.require_affected_rows)
        .execute()
        .await
    }

    /// Update models one after another, summing the affected rows.
    pub async fn update_models(&self, entity: &str, models: &[Model]) -> QueryResult<MutateResult> {
        let mut total = MutateResult::default();
        for model in models {
            total.affected_rows += self.update_model(entity, model).await?.affected_rows;
        }
        Ok(total)
    }

    /// Delete the row identified by the model's primary key.
    pub async fn delete_model(&self, entity: &str, model: &Model) -> QueryResult<MutateResult> {
        mutate::delete_model(
            self.registry.clone(),
            self.dialect,
            self.executer.clone(),
            entity,
            model,
        )?
        .require_affected_rows(self.require_affected_rows)
        .execute()
        .await
    }

    /// Delete models one after another, summing the affected rows.
    pub async fn delete_models(&self, entity: &str, models: &[Model]) -> QueryResult<MutateResult> {
        let mut total = MutateResult::default();
        for model in models {
            total.affected_rows += self.delete_model(entity, model).await?.affected_rows;
        }
        Ok(total)
    }
}

/// A join graph under construction, turned into a builder by its last call.
#[must_use = "FromAdapter has no effect until turned into a query"]
pub struct FromAdapter {
    graph: JoinGraph,
    context: DataContext,
}

impl FromAdapter {
    pub fn graph(&self) -> &JoinGraph {
        &self.graph
    }

    pub fn join(mut self, join_type: JoinType, spec: JoinSpec) -> QueryResult<Self> {
        self.graph.join(join_type, spec)?;
        Ok(self)
    }

    pub fn inner_join(self, spec: JoinSpec) -> QueryResult<Self> {
        self.join(JoinType::Inner, spec)
    }

    pub fn left_outer_join(self, spec: JoinSpec) -> QueryResult<Self> {
        self.join(JoinType::LeftOuter, spec)
    }

    pub fn right_outer_join(self, spec: JoinSpec) -> QueryResult<Self> {
        self.join(JoinType::RightOuter, spec)
    }

    pub fn filter(mut self, condition: Value, params: Params) -> QueryResult<Self> {
        self.graph.filter(condition, params)?;
        Ok(self)
    }

    /// Select every available column.
    pub fn select_all(self) -> Select {
        Select::new(self.graph, self.context.executer)
    }

    /// Select the given fully-qualified properties.
    pub fn select<S: Into<String>>(
        self,
        properties: impl IntoIterator<Item = S>,
    ) -> QueryResult<Select> {
        self.select_all().select(properties)
    }

    /// Count rows, or non-null values of `property`.
    pub fn count(self, property: Option<&str>) -> QueryResult<Count> {
        Count::new(self.graph, self.context.executer).count(property)
    }

    /// Update with fully-qualified property values.
    pub fn update(self, model: &Model) -> QueryResult<Update> {
        Ok(Update::new(self.graph, self.context.executer, model)?
            .require_affected_rows(self.context.require_affected_rows))
    }

    /// Delete from the base table.
    pub fn delete(self) -> Delete {
        Delete::new(self.graph, self.context.executer)
            .require_affected_rows(self.context.require_affected_rows)
    }

    /// Delete from the table joined as `alias`.
    pub fn delete_from(self, alias: &str) -> QueryResult<Delete> {
        self.delete().from_alias(alias)
    }
}
