// tests/common/mod.rs
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use relfold::condition::Params;
use relfold::dialect::Dialect;
use relfold::mapper::Model;
use relfold::metadata::{converters, ColumnMetadata, Registry, RelationshipMetadata, TableMetadata};
use relfold::query::{Executer, ExecuterResult, InsertResult, MutateResult, Row};
use serde_json::Value;
use sqlparser::dialect::{DuckDbDialect, MsSqlDialect, MySqlDialect, PostgreSqlDialect};
use sqlparser::parser::Parser;

/// Users, their phone numbers, and the phone numbers' owners.
///
/// `User.phoneNumbers` is one-to-many, `PhoneNumber.user` is many-to-one.
pub fn registry() -> Arc<Registry> {
    Arc::new(
        Registry::builder()
            .table(
                TableMetadata::new("User", "users")
                    .column(
                        ColumnMetadata::new("userID")
                            .property("id")
                            .primary()
                            .generated()
                            .data_type("int(11)"),
                    )
                    .column(ColumnMetadata::new("firstName").data_type("varchar(255)"))
                    .column(
                        ColumnMetadata::new("active")
                            .data_type("bit(1)")
                            .with_converter(converters::bit()),
                    ),
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
                    .column(ColumnMetadata::new("phoneNumber").data_type("varchar(20)")),
            )
            .relationship(
                RelationshipMetadata::one_to_many("User", "phoneNumbers", "PhoneNumber")
                    .on("id", "userID"),
            )
            .relationship(
                RelationshipMetadata::many_to_one("PhoneNumber", "user", "User")
                    .on("userID", "id"),
            )
            .build()
            .unwrap(),
    )
}

pub fn row(value: Value) -> Row {
    value.as_object().cloned().unwrap()
}

pub fn model(value: Value) -> Model {
    value.as_object().cloned().unwrap()
}

pub fn models(values: Vec<Model>) -> Value {
    Value::Array(values.into_iter().map(Value::Object).collect())
}

/// One executer call: (kind, sql, params).
pub type Call = (&'static str, String, Params);

/// Executer returning canned results and recording every call.
#[derive(Default)]
pub struct MockExecuter {
    pub rows: Vec<Row>,
    pub insert_id: Option<Value>,
    pub affected_rows: u64,
    pub fail_with: Option<String>,
    calls: Mutex<Vec<Call>>,
}

impl MockExecuter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rows(mut self, rows: Vec<Row>) -> Self {
        self.rows = rows;
        self
    }

    pub fn insert_id(mut self, id: Value) -> Self {
        self.insert_id = Some(id);
        self
    }

    pub fn affected_rows(mut self, affected_rows: u64) -> Self {
        self.affected_rows = affected_rows;
        self
    }

    pub fn failing(mut self, message: &str) -> Self {
        self.fail_with = Some(message.to_string());
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, kind: &'static str, sql: &str, params: &Params) -> ExecuterResult<()> {
        self.calls
            .lock()
            .unwrap()
            .push((kind, sql.to_string(), params.clone()));
        match &self.fail_with {
            Some(message) => Err(message.clone().into()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl Executer for MockExecuter {
    async fn select(&self, sql: &str, params: &Params) -> ExecuterResult<Vec<Row>> {
        self.record("select", sql, params)?;
        Ok(self.rows.clone())
    }

    async fn insert(&self, sql: &str, params: &Params) -> ExecuterResult<InsertResult> {
        self.record("insert", sql, params)?;
        Ok(InsertResult {
            insert_id: self.insert_id.clone(),
        })
    }

    async fn update(&self, sql: &str, params: &Params) -> ExecuterResult<MutateResult> {
        self.record("update", sql, params)?;
        Ok(MutateResult {
            affected_rows: self.affected_rows,
        })
    }

    async fn delete(&self, sql: &str, params: &Params) -> ExecuterResult<MutateResult> {
        self.record("delete", sql, params)?;
        Ok(MutateResult {
            affected_rows: self.affected_rows,
        })
    }
}

/// Parse parameter-free SQL with sqlparser for `dialect`.
pub fn validate_sql(sql: &str, dialect: Dialect) {
    let parser_dialect: Box<dyn sqlparser::dialect::Dialect> = match dialect {
        Dialect::MySql => Box::new(MySqlDialect {}),
        Dialect::Postgres => Box::new(PostgreSqlDialect {}),
        Dialect::DuckDb => Box::new(DuckDbDialect {}),
        Dialect::TSql => Box::new(MsSqlDialect {}),
    };
    if let Err(e) = Parser::parse_sql(&*parser_dialect, sql) {
        panic!("invalid SQL for {dialect}: {e}\n{sql}");
    }
}
