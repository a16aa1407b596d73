// tests/condition/mapper_roundtrip_test.rs
use std::collections::HashMap;

use relfold::condition::{self, ConditionCompiler, ConditionError, Params};
use relfold::dialect::Dialect;
use serde_json::{json, Value};

fn lookup(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

fn conditions() -> Vec<Value> {
    vec![
        json!({"$eq": {"u.id": ":id"}}),
        json!({"$neq": {"u.id": "pn.userID"}}),
        json!({"$is": {"u.firstName": null}}),
        json!({"$notIn": {"u.id": [1, ":two", "pn.userID"]}}),
        json!({"$and": [
            {"$like": {"u.firstName": ":name"}},
            {"$or": [{"$gt": {"pn.id": 10}}, {"$isnt": {"pn.userID": null}}]}
        ]}),
    ]
}

#[test]
fn test_map_then_compile_matches_compiling_mapped_text() {
    let forward = lookup(&[
        ("u.id", "u.userID"),
        ("u.firstName", "u.first_name"),
        ("pn.id", "pn.phoneNumberID"),
        ("pn.userID", "pn.userID"),
    ]);
    let compiler = ConditionCompiler::new(&Dialect::MySql);

    for condition in conditions() {
        let mapped = condition::map(&condition, &forward, None).unwrap();

        // Rewriting the text by hand gives the same SQL
        let mut text = condition.to_string();
        for (property, column) in &forward {
            text = text.replace(&format!("\"{property}\""), &format!("\"{column}\""));
        }
        assert_eq!(
            compiler.compile_condition(&mapped, None).unwrap(),
            compiler.compile_condition(text.as_str(), None).unwrap(),
            "condition {condition}"
        );
    }
}

#[test]
fn test_inverse_lookup_restores_condition() {
    let forward = lookup(&[
        ("u.id", "u.userID"),
        ("u.firstName", "u.first_name"),
        ("pn.id", "pn.phoneNumberID"),
        ("pn.userID", "pn.user_id"),
    ]);
    let inverse: HashMap<String, String> = forward
        .iter()
        .map(|(k, v)| (v.clone(), k.clone()))
        .collect();

    for condition in conditions() {
        let mapped = condition::map(&condition, &forward, None).unwrap();
        let restored = condition::map(&mapped, &inverse, None).unwrap();
        assert_eq!(
            condition::parse(&restored).unwrap(),
            condition::parse(&condition).unwrap()
        );
    }
}

#[test]
fn test_unmapped_column() {
    let err = condition::map(
        &json!({"$eq": {"u.id": "x.other"}}),
        &lookup(&[("u.id", "u.userID")]),
        None,
    )
    .unwrap_err();
    assert_eq!(
        err,
        ConditionError::UnmappedColumn {
            column: "x.other".into()
        }
    );
}

#[test]
fn test_map_checks_parameters_when_given() {
    let forward = lookup(&[("u.id", "u.userID")]);
    let condition = json!({"$eq": {"u.id": ":id"}});

    assert!(condition::map(&condition, &forward, None).is_ok());
    assert!(matches!(
        condition::map(&condition, &forward, Some(&Params::new())),
        Err(ConditionError::MissingParameter { name }) if name == "id"
    ));
}

#[test]
fn test_text_numbers_keep_their_spelling() {
    let forward = lookup(&[("u.id", "u.userID")]);
    let compiler = ConditionCompiler::new(&Dialect::MySql);
    let text = r#"{"$in": {"u.id": [1.50, 12345678901234567890123, 1e400]}}"#;

    let mapped = condition::map(text, &forward, None).unwrap();
    let by_hand = text.replace("\"u.id\"", "\"u.userID\"");

    let sql = compiler.compile_condition(&mapped, None).unwrap();
    assert_eq!(sql, compiler.compile_condition(by_hand.as_str(), None).unwrap());
    assert_eq!(sql, "`u`.`userID` IN (1.50, 12345678901234567890123, 1e400)");
}
