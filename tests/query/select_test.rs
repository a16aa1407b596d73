// tests/query/select_test.rs
#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{models, registry, row, MockExecuter};
use insta::assert_snapshot;
use relfold::dialect::Dialect;
use relfold::query::{params, DataContext, JoinSpec, OrderBy};
use relfold::QueryError;
use serde::Deserialize;
use serde_json::json;

fn context(executer: Arc<MockExecuter>) -> DataContext {
    DataContext::new(registry(), executer)
}

fn user_rows() -> Vec<relfold::query::Row> {
    vec![
        row(json!({"u.id": 1, "u.firstName": "Joe", "u.active": 1, "pn.id": 10, "pn.userID": 1, "pn.phoneNumber": "555-1"})),
        row(json!({"u.id": 1, "u.firstName": "Joe", "u.active": 1, "pn.id": 11, "pn.userID": 1, "pn.phoneNumber": "555-2"})),
        row(json!({"u.id": 2, "u.firstName": "Ann", "u.active": 0, "pn.id": null, "pn.userID": null, "pn.phoneNumber": null})),
    ]
}

#[test]
fn test_default_select_lists_every_column() {
    let ctx = context(Arc::new(MockExecuter::new()));
    let select = ctx
        .from("User", "u")
        .unwrap()
        .left_outer_join(JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers"))
        .unwrap()
        .select_all();

    assert_snapshot!(select.to_sql(), @r###"
    SELECT `u`.`userID` AS `u.id`, `u`.`firstName` AS `u.firstName`, `u`.`active` AS `u.active`, `pn`.`phoneNumberID` AS `pn.id`, `pn`.`userID` AS `pn.userID`, `pn`.`phoneNumber` AS `pn.phoneNumber`
    FROM `users` AS `u`
    LEFT OUTER JOIN `phone_numbers` AS `pn` ON `u`.`userID` = `pn`.`userID`
    "###);
    common::validate_sql(&select.to_sql(), Dialect::MySql);
}

#[test]
fn test_paged_select_per_dialect() {
    for (dialect, paging) in [
        (Dialect::MySql, "LIMIT 40, 20"),
        (Dialect::Postgres, "LIMIT 20 OFFSET 40"),
        (Dialect::DuckDb, "LIMIT 20 OFFSET 40"),
        (Dialect::TSql, "OFFSET 40 ROWS FETCH NEXT 20 ROWS ONLY"),
    ] {
        let ctx = context(Arc::new(MockExecuter::new())).with_dialect(dialect);
        let sql = ctx
            .from("User", "u")
            .unwrap()
            .select(["u.id", "u.firstName"])
            .unwrap()
            .order_by(vec![OrderBy::asc("u.firstName"), OrderBy::desc("u.id")])
            .unwrap()
            .limit(20, Some(40))
            .unwrap()
            .to_sql();
        assert!(sql.ends_with(paging), "{dialect}: {sql}");
        common::validate_sql(&sql, dialect);
    }
}

#[test]
fn test_select_omitting_joined_primary_key_fails() {
    let ctx = context(Arc::new(MockExecuter::new()));
    let err = ctx
        .from("User", "u")
        .unwrap()
        .inner_join(JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers"))
        .unwrap()
        .select(["u.id", "pn.phoneNumber"])
        .err()
        .unwrap();
    assert!(matches!(err, QueryError::MissingPrimaryKey { ref table, .. } if table == "phone_numbers"));
    assert_eq!(
        err.to_string(),
        "primary key of table \"phone_numbers\" (alias \"pn\") must be selected"
    );
}

#[tokio::test]
async fn test_rows_fold_into_nested_users() {
    let executer = Arc::new(MockExecuter::new().rows(user_rows()));
    let users = context(executer.clone())
        .from("User", "u")
        .unwrap()
        .left_outer_join(JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers"))
        .unwrap()
        .filter(
            json!({"$like": {"u.firstName": ":name"}}),
            params([("name", "%")]),
        )
        .unwrap()
        .select_all()
        .execute()
        .await
        .unwrap();

    assert_eq!(
        models(users),
        json!([
            {
                "id": 1, "firstName": "Joe", "active": true,
                "phoneNumbers": [
                    {"id": 10, "userID": 1, "phoneNumber": "555-1"},
                    {"id": 11, "userID": 1, "phoneNumber": "555-2"}
                ]
            },
            {"id": 2, "firstName": "Ann", "active": false, "phoneNumbers": []}
        ])
    );

    let calls = executer.calls();
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].0, "select");
    assert!(calls[0].1.ends_with("WHERE `u`.`firstName` LIKE :name"));
    assert_eq!(calls[0].2.get("name"), Some(&json!("%")));
}

#[tokio::test]
async fn test_many_to_one_folds_into_object() {
    let rows = vec![
        row(json!({"pn.id": 10, "pn.phoneNumber": "555-1", "u.id": 1, "u.firstName": "Joe"})),
        row(json!({"pn.id": 12, "pn.phoneNumber": "555-3", "u.id": null, "u.firstName": null})),
    ];
    let phones = context(Arc::new(MockExecuter::new().rows(rows)))
        .from("PhoneNumber", "pn")
        .unwrap()
        .left_outer_join(JoinSpec::new("User", "u", "pn.user"))
        .unwrap()
        .select(["pn.id", "pn.phoneNumber", "u.id", "u.firstName"])
        .unwrap()
        .execute()
        .await
        .unwrap();

    assert_eq!(
        models(phones),
        json!([
            {"id": 10, "phoneNumber": "555-1", "user": {"id": 1, "firstName": "Joe"}},
            {"id": 12, "phoneNumber": "555-3", "user": null}
        ])
    );
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct User {
    id: i64,
    first_name: String,
    active: bool,
    phone_numbers: Vec<PhoneNumber>,
}

#[derive(Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
struct PhoneNumber {
    id: i64,
    phone_number: String,
}

#[tokio::test]
async fn test_execute_as_typed_models() {
    let users: Vec<User> = context(Arc::new(MockExecuter::new().rows(user_rows())))
        .from("User", "u")
        .unwrap()
        .left_outer_join(JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers"))
        .unwrap()
        .select_all()
        .execute_as()
        .await
        .unwrap();

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].phone_numbers[1].phone_number, "555-2");
    assert!(!users[1].active);
    assert!(users[1].phone_numbers.is_empty());
}

#[tokio::test]
async fn test_executer_error_passes_through() {
    let err = context(Arc::new(MockExecuter::new().failing("connection reset")))
        .from("User", "u")
        .unwrap()
        .select_all()
        .execute()
        .await
        .unwrap_err();
    assert!(matches!(err, QueryError::Executer(_)));
    assert_eq!(err.to_string(), "connection reset");
}

#[tokio::test]
async fn test_count() {
    let executer = Arc::new(MockExecuter::new().rows(vec![row(json!({"count": 3}))]));
    let count = context(executer.clone())
        .from("User", "u")
        .unwrap()
        .inner_join(JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers"))
        .unwrap()
        .count(Some("pn.id"))
        .unwrap();

    assert_snapshot!(count.to_sql(), @r###"
    SELECT COUNT(`pn`.`phoneNumberID`) AS `count`
    FROM `users` AS `u`
    INNER JOIN `phone_numbers` AS `pn` ON `u`.`userID` = `pn`.`userID`
    "###);
    assert_eq!(count.execute().await.unwrap(), 3);
}
