//! Recording executer and fixture registry for unit tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::Value;

use crate::condition::Params;
use crate::metadata::{ColumnMetadata, Registry, RelationshipMetadata, TableMetadata};

use super::executer::{Executer, ExecuterResult, InsertResult, MutateResult, Row};

/// One recorded executer call: (kind, sql, params).
pub type Call = (&'static str, String, Params);

/// Executer returning canned results and recording every call.
#[derive(Default)]
pub struct MockExecuter {
    pub rows: Vec<Row>,
    pub insert_id: Option<Value>,
    pub affected_rows: u64,
    calls: Mutex<Vec<Call>>,
}

impl MockExecuter {
    pub fn with_rows(rows: Vec<Row>) -> Self {
        Self {
            rows,
            ..Self::default()
        }
    }

    pub fn with_affected_rows(affected_rows: u64) -> Self {
        Self {
            affected_rows,
            ..Self::default()
        }
    }

    pub fn with_insert_id(insert_id: Value) -> Self {
        Self {
            insert_id: Some(insert_id),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &'static str, sql: &str, params: &Params) {
        self.calls
            .lock()
            .unwrap()
            .push((kind, sql.to_string(), params.clone()));
    }
}

#[async_trait]
impl Executer for MockExecuter {
    async fn select(&self, sql: &str, params: &Params) -> ExecuterResult<Vec<Row>> {
        self.record("select", sql, params);
        Ok(self.rows.clone())
    }

    async fn insert(&self, sql: &str, params: &Params) -> ExecuterResult<InsertResult> {
        self.record("insert", sql, params);
        Ok(InsertResult {
            insert_id: self.insert_id.clone(),
        })
    }

    async fn update(&self, sql: &str, params: &Params) -> ExecuterResult<MutateResult> {
        self.record("update", sql, params);
        Ok(MutateResult {
            affected_rows: self.affected_rows,
        })
    }

    async fn delete(&self, sql: &str, params: &Params) -> ExecuterResult<MutateResult> {
        self.record("delete", sql, params);
        Ok(MutateResult {
            affected_rows: self.affected_rows,
        })
    }
}

/// Users with phone numbers.
pub fn registry() -> Arc<Registry> {
    Arc::new(
        Registry::builder()
            .table(
                TableMetadata::new("User", "users")
                    .column(ColumnMetadata::new("userID").property("id").primary().generated())
                    .column(ColumnMetadata::new("firstName")),
            )
            .table(
                TableMetadata::new("PhoneNumber", "phone_numbers")
                    .column(
                        ColumnMetadata::new("phoneNumberID")
                            .property("id")
                            .primary()
                            .generated(),
                    )
                    .column(ColumnMetadata::new("userID"))
                    .column(ColumnMetadata::new("phoneNumber")),
            )
            .relationship(
                RelationshipMetadata::one_to_many("User", "phoneNumbers", "PhoneNumber")
                    .on("id", "userID"),
            )
            .build()
            .unwrap(),
    )
}
