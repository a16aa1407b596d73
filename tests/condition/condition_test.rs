// tests/condition/condition_test.rs
use insta::assert_snapshot;
use relfold::condition::{self, ConditionCompiler, ConditionError, Operator, ParseTree, Params};
use relfold::dialect::Dialect;
use serde_json::json;

fn compile(dialect: Dialect, condition: serde_json::Value) -> String {
    ConditionCompiler::new(&dialect)
        .compile_condition(&condition, None)
        .unwrap()
}

#[test]
fn test_equality_with_parameter() {
    assert_eq!(
        compile(Dialect::MySql, json!({"$eq": {"u.id": ":id"}})),
        "`u`.`id` = :id"
    );
}

#[test]
fn test_nested_condition_per_dialect() {
    let condition = json!({"$or": [
        {"$and": [
            {"$like": {"u.firstName": ":name"}},
            {"$isnt": {"pn.phoneNumber": null}}
        ]},
        {"$in": {"u.id": [1, 2, ":extra"]}}
    ]});

    assert_snapshot!(
        compile(Dialect::MySql, condition.clone()),
        @"((`u`.`firstName` LIKE :name AND `pn`.`phoneNumber` IS NOT NULL) OR `u`.`id` IN (1, 2, :extra))"
    );
    assert_snapshot!(
        compile(Dialect::Postgres, condition.clone()),
        @r#"(("u"."firstName" LIKE :name AND "pn"."phoneNumber" IS NOT NULL) OR "u"."id" IN (1, 2, :extra))"#
    );
    assert_snapshot!(
        compile(Dialect::TSql, condition),
        @"(([u].[firstName] LIKE :name AND [pn].[phoneNumber] IS NOT NULL) OR [u].[id] IN (1, 2, :extra))"
    );
}

#[test]
fn test_condition_text_and_value_agree() {
    let text = r#"{"$gte": {"u.id": "pn.userID"}}"#;
    let from_text = condition::parse(text).unwrap();
    let from_value = condition::parse(&json!({"$gte": {"u.id": "pn.userID"}})).unwrap();
    assert_eq!(from_text, from_value);
    assert_eq!(from_text.operator(), Operator::Gte);
    assert_eq!(from_text.columns(), vec!["u.id", "pn.userID"]);
}

#[test]
fn test_parameters_listed_once() {
    let tree = condition::parse(&json!({"$and": [
        {"$eq": {"u.id": ":id"}},
        {"$in": {"pn.userID": [":id", ":other"]}}
    ]}))
    .unwrap();
    assert_eq!(tree.parameters(), vec!["id", "other"]);
    assert!(matches!(tree, ParseTree::Boolean { .. }));
}

#[test]
fn test_missing_parameter_reported_by_name() {
    let mut params = Params::new();
    params.insert("id".into(), json!(1));
    let err = ConditionCompiler::new(&Dialect::MySql)
        .compile_condition(
            &json!({"$and": [{"$eq": {"u.id": ":id"}}, {"$eq": {"u.firstName": ":name"}}]}),
            Some(&params),
        )
        .unwrap_err();
    assert_eq!(
        err,
        ConditionError::MissingParameter {
            name: "name".into()
        }
    );
    assert_eq!(
        err.to_string(),
        "replacement value for parameter \"name\" not present"
    );
}

#[test]
fn test_lex_errors() {
    assert!(matches!(
        condition::parse(r#"{"$eq": {"u.id": true}}"#),
        Err(ConditionError::UnexpectedText { .. })
    ));
    assert!(matches!(
        condition::parse(r#"{"$eq": {"u.id"#),
        Err(ConditionError::UnterminatedString { .. })
    ));
}

#[test]
fn test_syntax_errors() {
    for bad in [
        json!({}),
        json!({"$eq": {"u.id": null}}),
        json!({"$is": {"u.id": 1}}),
        json!({"$in": {"u.id": 1}}),
        json!({"$or": []}),
        json!({"$between": {"u.id": 1}}),
        json!({"$eq": {"u.id": 1, "u.name": 2}}),
    ] {
        assert!(
            matches!(condition::parse(&bad), Err(ConditionError::Syntax { .. })),
            "expected syntax error for {bad}"
        );
    }
}

#[test]
fn test_empty_condition_detection() {
    assert!(condition::is_empty_condition(&json!({})));
    assert!(!condition::is_empty_condition(&json!({"$is": {"u.id": null}})));
}
