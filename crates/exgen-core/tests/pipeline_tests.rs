use std::path::Path;

use exgen_core::ir::{SchemaNode, group_operations};
use exgen_core::parse;
use exgen_core::transform::{CrudKind, classify};

fn load(name: &str) -> exgen_core::ir::SpecDocument {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name);
    parse::load(&path).expect("fixture should load")
}

fn kinds(doc: &exgen_core::ir::SpecDocument, group: &str) -> Vec<(Option<String>, CrudKind)> {
    let grouping = group_operations(&doc.paths);
    grouping.groups[group]
        .operations
        .iter()
        .map(|op| {
            (
                op.operation_id.clone(),
                classify(op.operation_id.as_deref(), op.method, &op.path),
            )
        })
        .collect()
}

#[test]
fn products_group_and_classify() {
    let doc = load("products.yaml");
    let grouping = group_operations(&doc.paths);
    assert_eq!(grouping.groups.keys().collect::<Vec<_>>(), vec!["Product"]);

    let group = &grouping.groups["Product"];
    assert_eq!(group.name.pascal, "Product");
    assert_eq!(group.name.camel, "product");
    assert!(doc.find_schema(&group.name.pascal).is_some());

    let kinds: Vec<CrudKind> = kinds(&doc, "Product").into_iter().map(|(_, k)| k).collect();
    assert_eq!(
        kinds,
        vec![CrudKind::List, CrudKind::Create, CrudKind::Retrieve]
    );
}

#[test]
fn widgets_group_tags_and_skip() {
    let doc = load("widgets.yaml");
    let grouping = group_operations(&doc.paths);
    assert_eq!(
        grouping.groups.keys().collect::<Vec<_>>(),
        vec!["Widget", "User"]
    );
    // `/` has no literal segment and no tag
    assert_eq!(grouping.warnings.len(), 1);
    assert!(grouping.warnings[0].contains("`/`"));

    assert!(doc.find_schema("Widget").is_none());
    assert!(doc.find_schema("user").is_some());

    assert_eq!(
        kinds(&doc, "Widget"),
        vec![
            (Some("listWidgets".to_string()), CrudKind::List),
            (Some("updateWidget".to_string()), CrudKind::Replace),
        ]
    );
    assert_eq!(
        kinds(&doc, "User"),
        vec![
            (Some("listUsers".to_string()), CrudKind::List),
            (Some("createUser".to_string()), CrudKind::Create),
            (None, CrudKind::Custom),
        ]
    );
}

#[test]
fn user_schema_decoded() {
    let doc = load("widgets.yaml");
    let user = doc.schemas["User"].as_object().expect("object");
    assert_eq!(user.required().len(), 2);
    assert_eq!(user.properties["createdAt"].format(), Some("date-time"));
    match &user.properties["role"] {
        SchemaNode::String(s) => assert_eq!(s.enum_values, vec!["admin", "member"]),
        other => panic!("expected string enum, got {other:?}"),
    }
}
