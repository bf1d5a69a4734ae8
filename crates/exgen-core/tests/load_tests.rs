use std::fs;
use std::path::{Path, PathBuf};

use exgen_core::error::{ResolveError, SpecParseError};
use exgen_core::ir::{HttpMethod, SchemaNode};
use exgen_core::parse;

fn fixture(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

#[test]
fn load_products() {
    let doc = parse::load(&fixture("products.yaml")).expect("should load");
    assert_eq!(doc.info.title, "Shop API");
    assert_eq!(
        doc.paths.keys().collect::<Vec<_>>(),
        vec!["/products", "/products/{id}"]
    );

    let product = doc.schemas["Product"].as_object().expect("object");
    assert_eq!(
        product.properties.keys().collect::<Vec<_>>(),
        vec!["name", "price"]
    );
    assert!(product.is_required("name"));
    assert!(!product.is_required("price"));
    assert_eq!(product.properties["price"], SchemaNode::Number { format: None });

    let get = &doc.paths["/products/{id}"][&HttpMethod::Get];
    assert_eq!(get.operation_id.as_deref(), Some("getProductById"));
    assert_eq!(get.path_params(), vec!["id"]);
}

#[test]
fn load_resolves_external_files_and_cycles() {
    let doc = parse::load(&fixture("petstore-external.yaml")).expect("should load");
    let pet = doc.schemas["Pet"].as_object().expect("Pet is an object");
    assert_eq!(
        pet.properties.keys().collect::<Vec<_>>(),
        vec!["name", "tag", "owner"]
    );
    assert!(pet.is_required("name"));

    let owner = pet.properties["owner"].as_object().expect("owner inlined");
    assert_eq!(
        owner.properties["email"],
        SchemaNode::string_with_format("email")
    );
    // Owner.pets.items points back at Pet: the cycle is cut
    match &owner.properties["pets"] {
        SchemaNode::Array { items } => assert!(items.as_object().is_some()),
        other => panic!("expected array, got {other:?}"),
    }

    let list = &doc.paths["/pets"][&HttpMethod::Get];
    assert_eq!(list.tags, vec!["pets"]);
}

#[test]
fn load_missing_file() {
    let err = parse::load(&fixture("nope.yaml")).unwrap_err();
    assert!(matches!(err, SpecParseError::Read { .. }));
}

#[test]
fn load_rejects_dangling_ref() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.yaml");
    fs::write(
        &path,
        r##"openapi: 3.0.0
info: {title: T, version: "1"}
paths:
  /a:
    get:
      responses:
        "200":
          $ref: "#/components/responses/Missing"
"##,
    )
    .unwrap();
    let err = parse::load(&path).unwrap_err();
    assert!(matches!(
        err,
        SpecParseError::Resolve(ResolveError::RefTargetNotFound(_))
    ));
}

#[test]
fn load_breaks_cycles_across_files() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("schemas")).unwrap();
    let path = dir.path().join("api.yaml");
    fs::write(
        &path,
        r##"openapi: 3.0.0
info: {title: T, version: "1"}
paths:
  /nodes:
    get:
      responses:
        "200":
          description: OK
          content:
            application/json:
              schema:
                $ref: "#/components/schemas/Node"
components:
  schemas:
    Node:
      $ref: "schemas/node.yaml#/Node"
"##,
    )
    .unwrap();
    fs::write(
        dir.path().join("schemas/node.yaml"),
        r#"Node:
  type: object
  properties:
    label:
      type: string
    parent:
      $ref: "../api.yaml#/components/schemas/Node"
"#,
    )
    .unwrap();

    let spec = parse::load(&path).unwrap();
    let node = spec.find_schema("Node").and_then(SchemaNode::as_object).unwrap();
    assert!(matches!(node.properties["label"], SchemaNode::String(_)));
    // the recursion is cut to an empty object one hop in
    let parent = node.properties["parent"].as_object().unwrap();
    assert!(parent.properties.is_empty());
}

#[test]
fn load_json_spec() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("api.json");
    fs::write(
        &path,
        r##"{
  "openapi": "3.0.0",
  "info": {"title": "J", "version": "1"},
  "paths": {"/tags": {"get": {"operationId": "listTags"}}},
  "components": {"schemas": {
    "Tag": {"type": "object", "properties": {"label": {"$ref": "#/components/schemas/Label"}}},
    "Label": {"type": "string"}
  }}
}"##,
    )
    .unwrap();
    let doc = parse::load(&path).expect("should load json");
    let tag = doc.schemas["Tag"].as_object().unwrap();
    assert_eq!(tag.properties["label"], SchemaNode::string());
}

#[test]
fn load_source_accepts_paths() {
    let source = fixture("products.yaml");
    let doc = parse::load_source(source.to_str().unwrap()).expect("should load");
    assert_eq!(doc.operations().count(), 3);
}
