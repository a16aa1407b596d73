// tests/query/join_graph_test.rs
#[path = "../common/mod.rs"]
mod common;

use common::registry;
use insta::assert_snapshot;
use relfold::condition::Params;
use relfold::dialect::Dialect;
use relfold::query::{params, JoinGraph, JoinSpec, JoinType, TableSpec};
use relfold::QueryError;
use serde_json::json;

fn graph(dialect: Dialect) -> JoinGraph {
    JoinGraph::new(registry(), dialect, "User", "u").unwrap()
}

#[test]
fn test_left_outer_join_from_relationship() {
    let mut g = graph(Dialect::MySql);
    g.join(
        JoinType::LeftOuter,
        JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers"),
    )
    .unwrap();

    assert_snapshot!(g.to_sql(), @r###"
    FROM `users` AS `u`
    LEFT OUTER JOIN `phone_numbers` AS `pn` ON `u`.`userID` = `pn`.`userID`
    "###);
}

#[test]
fn test_join_with_explicit_condition_and_filter() {
    let mut g = graph(Dialect::Postgres);
    g.join(
        JoinType::Inner,
        JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers").on(
            json!({"$and": [
                {"$eq": {"u.id": "pn.userID"}},
                {"$like": {"pn.phoneNumber": ":prefix"}}
            ]}),
            params([("prefix", "555%")]),
        ),
    )
    .unwrap();
    g.filter(
        json!({"$in": {"u.firstName": [":a", ":b"]}}),
        params([("a", "Ann"), ("b", "Bob")]),
    )
    .unwrap();

    assert_snapshot!(g.to_sql(), @r###"
    FROM "users" AS "u"
    INNER JOIN "phone_numbers" AS "pn" ON ("u"."userID" = "pn"."userID" AND "pn"."phoneNumber" LIKE :prefix)
    WHERE "u"."firstName" IN (:a, :b)
    "###);
    assert_eq!(g.params().len(), 3);
}

#[test]
fn test_duplicate_alias_rejected() {
    let mut g = graph(Dialect::MySql);
    let err = g
        .join(JoinType::Inner, JoinSpec::new("PhoneNumber", "u", "u.phoneNumbers"))
        .unwrap_err();
    assert!(matches!(err, QueryError::DuplicateAlias(a) if a == "u"));
}

#[test]
fn test_same_relationship_twice_under_one_parent_rejected() {
    let mut g = graph(Dialect::MySql);
    g.join(JoinType::Inner, JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers"))
        .unwrap();
    let err = g
        .join(JoinType::Inner, JoinSpec::new("PhoneNumber", "pn2", "u.phoneNumbers"))
        .unwrap_err();
    assert!(matches!(
        err,
        QueryError::MappingNotUnique { parent, relationship }
            if parent == "u" && relationship == "phoneNumbers"
    ));
}

#[test]
fn test_same_relationship_under_two_parents_allowed() {
    let mut g = JoinGraph::new(registry(), Dialect::MySql, "PhoneNumber", "pn").unwrap();
    g.join(JoinType::Inner, JoinSpec::new("User", "u", "pn.user"))
        .unwrap();
    g.join(JoinType::Inner, JoinSpec::new("PhoneNumber", "pn2", "u.phoneNumbers"))
        .unwrap();
    g.join(JoinType::Inner, JoinSpec::new("User", "u2", "pn2.user"))
        .unwrap();

    assert_eq!(g.tables().len(), 4);
    assert_eq!(g.children("pn2").count(), 1);
    assert!(g.is_column_available("u2.firstName"));
}

#[test]
fn test_unknown_relationship() {
    let mut g = graph(Dialect::MySql);
    let err = g
        .join(JoinType::Inner, JoinSpec::new("PhoneNumber", "pn", "u.emails"))
        .unwrap_err();
    assert!(matches!(err, QueryError::UnknownRelationship { property, .. } if property == "emails"));
}

#[test]
fn test_add_table_with_explicit_spec() {
    let mut g = graph(Dialect::DuckDb);
    g.add_table(
        TableSpec::new("PhoneNumber", "pn")
            .parent("u", "phoneNumbers")
            .join_type(JoinType::RightOuter)
            .on(json!({"$eq": {"pn.userID": "u.id"}}), Params::new()),
    )
    .unwrap();
    assert_eq!(
        g.join_sql(),
        vec![r#"RIGHT OUTER JOIN "phone_numbers" AS "pn" ON "pn"."userID" = "u"."userID""#]
    );
    common::validate_sql(&format!("SELECT 1\n{}", g.to_sql()), Dialect::DuckDb);
}

#[test]
fn test_filter_on_unavailable_column() {
    let mut g = graph(Dialect::MySql);
    let err = g
        .filter(json!({"$eq": {"pn.userID": 1}}), Params::new())
        .unwrap_err();
    assert!(matches!(err, QueryError::ColumnNotAvailable(ref c) if c == "pn.userID"));
    assert!(!err.is_condition_error());

    // A failed filter does not use up the slot
    g.filter(json!({"$eq": {"u.id": 1}}), Params::new()).unwrap();
}

#[test]
fn test_parameter_conflict_between_conditions() {
    let mut g = graph(Dialect::MySql);
    g.join(
        JoinType::Inner,
        JoinSpec::new("PhoneNumber", "pn", "u.phoneNumbers")
            .on(json!({"$eq": {"pn.userID": ":v"}}), params([("v", 1)])),
    )
    .unwrap();
    let err = g
        .filter(json!({"$eq": {"u.id": ":v"}}), params([("v", 2)]))
        .unwrap_err();
    assert!(matches!(err, QueryError::ParameterConflict { name } if name == "v"));
}

#[test]
fn test_unknown_entity() {
    let err = JoinGraph::new(registry(), Dialect::MySql, "Nope", "n").unwrap_err();
    assert!(matches!(err, QueryError::UnknownEntity(e) if e == "Nope"));
}
