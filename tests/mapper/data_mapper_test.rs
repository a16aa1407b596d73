// tests/mapper/data_mapper_test.rs
#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use common::{models, registry, row};
use relfold::mapper::{DataMapper, Schema};
use relfold::metadata::{ColumnMetadata, Registry, RelationshipMetadata, TableMetadata};
use relfold::QueryError;
use serde_json::json;

fn user_schema(registry: &Registry) -> Schema {
    let users = registry.table("User").unwrap().clone();
    let phones = registry.table("PhoneNumber").unwrap().clone();

    let mut phone = Schema::new(phones, vec!["pn.id".into()]);
    phone.add_column("pn.id", "id", None).unwrap();
    phone.add_column("pn.phoneNumber", "phoneNumber", None).unwrap();

    let mut user = Schema::new(users, vec!["u.id".into()]);
    user.add_column("u.id", "id", None).unwrap();
    user.add_column("u.firstName", "firstName", None).unwrap();
    user.add_schema(
        registry
            .relationship("User", "PhoneNumber", "phoneNumbers")
            .unwrap()
            .clone(),
        phone,
    )
    .unwrap();
    user
}

#[test]
fn test_users_with_phone_numbers() {
    let rows = vec![
        row(json!({"u.id": 1, "u.firstName": "Joe", "pn.id": 10, "pn.phoneNumber": "555-1"})),
        row(json!({"u.id": 1, "u.firstName": "Joe", "pn.id": 11, "pn.phoneNumber": "555-2"})),
        row(json!({"u.id": 2, "u.firstName": "Ann", "pn.id": null, "pn.phoneNumber": null})),
    ];
    let registry = registry();
    let users = DataMapper::new().serialize(&rows, &user_schema(&registry));

    assert_eq!(
        models(users),
        json!([
            {
                "id": 1,
                "firstName": "Joe",
                "phoneNumbers": [
                    {"id": 10, "phoneNumber": "555-1"},
                    {"id": 11, "phoneNumber": "555-2"}
                ]
            },
            {"id": 2, "firstName": "Ann", "phoneNumbers": []}
        ])
    );
}

#[test]
fn test_first_encounter_order_and_repeats() {
    // Rows are not grouped by user; repeats of a child are folded once
    let rows = vec![
        row(json!({"u.id": 2, "u.firstName": "Ann", "pn.id": 20, "pn.phoneNumber": "a"})),
        row(json!({"u.id": 1, "u.firstName": "Joe", "pn.id": 10, "pn.phoneNumber": "b"})),
        row(json!({"u.id": 2, "u.firstName": "Ann", "pn.id": 21, "pn.phoneNumber": "c"})),
        row(json!({"u.id": 2, "u.firstName": "Ann", "pn.id": 20, "pn.phoneNumber": "a"})),
    ];
    let registry = registry();
    let users = DataMapper::new().serialize(&rows, &user_schema(&registry));

    assert_eq!(users.len(), 2);
    assert_eq!(users[0].get("id"), Some(&json!(2)));
    assert_eq!(
        users[0].get("phoneNumbers"),
        Some(&json!([
            {"id": 20, "phoneNumber": "a"},
            {"id": 21, "phoneNumber": "c"}
        ]))
    );
}

#[test]
fn test_rows_without_base_key_are_skipped() {
    let rows = vec![
        row(json!({"u.id": null, "u.firstName": "ghost", "pn.id": 1, "pn.phoneNumber": "x"})),
        row(json!({"u.firstName": "no key"})),
    ];
    let registry = registry();
    assert!(DataMapper::new()
        .serialize(&rows, &user_schema(&registry))
        .is_empty());
}

#[test]
fn test_three_levels() {
    let registry = Registry::builder()
        .table(TableMetadata::new("Order", "orders").column(ColumnMetadata::new("id").primary()))
        .table(TableMetadata::new("Line", "lines").column(ColumnMetadata::new("id").primary()))
        .table(
            TableMetadata::new("Product", "products")
                .column(ColumnMetadata::new("sku").primary())
                .column(ColumnMetadata::new("name")),
        )
        .relationship(RelationshipMetadata::one_to_many("Order", "lines", "Line").on("id", "orderId"))
        .relationship(RelationshipMetadata::one_to_one("Line", "product", "Product").on("sku", "sku"))
        .build()
        .unwrap();

    let mut product = Schema::new(registry.table("Product").unwrap().clone(), vec!["p.sku".into()]);
    product.add_column("p.sku", "sku", None).unwrap();
    product.add_column("p.name", "name", None).unwrap();

    let mut line = Schema::new(registry.table("Line").unwrap().clone(), vec!["l.id".into()]);
    line.add_column("l.id", "id", None).unwrap();
    line.add_schema(
        registry.relationship("Line", "Product", "product").unwrap().clone(),
        product,
    )
    .unwrap();

    let mut order = Schema::new(registry.table("Order").unwrap().clone(), vec!["o.id".into()]);
    order.add_column("o.id", "id", None).unwrap();
    order
        .add_schema(
            Arc::clone(registry.relationship("Order", "Line", "lines").unwrap()),
            line,
        )
        .unwrap();

    let rows = vec![
        row(json!({"o.id": 1, "l.id": 1, "p.sku": "A", "p.name": "Apple"})),
        row(json!({"o.id": 1, "l.id": 2, "p.sku": null, "p.name": null})),
        row(json!({"o.id": 2, "l.id": null, "p.sku": null, "p.name": null})),
    ];

    assert_eq!(
        models(DataMapper::new().serialize(&rows, &order)),
        json!([
            {"id": 1, "lines": [
                {"id": 1, "product": {"sku": "A", "name": "Apple"}},
                {"id": 2, "product": null}
            ]},
            {"id": 2, "lines": []}
        ])
    );
}

#[test]
fn test_duplicate_schema_property() {
    let registry = registry();
    let mut schema = user_schema(&registry);
    let err = schema
        .add_column("u.other", "phoneNumbers", None)
        .unwrap_err();
    assert!(matches!(err, QueryError::DuplicateSchemaProperty(p) if p == "phoneNumbers"));
}
