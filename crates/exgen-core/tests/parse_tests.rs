use exgen_core::error::SpecParseError;
use exgen_core::parse;

const PRODUCTS: &str = include_str!("fixtures/products.yaml");
const WIDGETS: &str = include_str!("fixtures/widgets.yaml");

#[test]
fn parse_products_yaml() {
    let spec = parse::from_yaml(PRODUCTS).expect("should parse products.yaml");
    assert_eq!(spec.openapi, "3.0.3");
    assert_eq!(spec.info.title, "Shop API");
    assert_eq!(spec.paths.len(), 2);

    let products = spec.paths.get("/products").expect("should have /products");
    let post = products.post.as_ref().expect("should have POST");
    assert_eq!(post.operation_id.as_deref(), Some("createProduct"));

    let components = spec.components.as_ref().expect("should have components");
    assert_eq!(components.schemas.len(), 1);
}

#[test]
fn parse_31_yaml() {
    let spec = parse::from_yaml(WIDGETS).expect("should parse 3.1 spec");
    assert_eq!(spec.openapi, "3.1.0");
    assert_eq!(spec.paths.len(), 5);
}

#[test]
fn parse_invalid_version() {
    let yaml = r#"
openapi: "2.0.0"
info:
  title: Test
  version: "1.0"
paths: {}
"#;
    let err = parse::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, SpecParseError::UnsupportedVersion(_)));
}

#[test]
fn parse_numeric_version() {
    let yaml = "openapi: 3.1\ninfo:\n  title: T\n  version: '1'\npaths: {}\n";
    let spec = parse::from_yaml(yaml).expect("numeric version should be accepted");
    assert_eq!(spec.openapi, "3.1");
}

#[test]
fn parse_missing_paths() {
    let yaml = "openapi: 3.0.0\ninfo:\n  title: T\n  version: '1'\n";
    let err = parse::from_yaml(yaml).unwrap_err();
    assert!(matches!(err, SpecParseError::MissingField(ref f) if f == "paths"));
}

#[test]
fn parse_missing_info() {
    let json = r#"{"openapi": "3.0.0", "paths": {}}"#;
    let err = parse::from_json(json).unwrap_err();
    assert!(matches!(err, SpecParseError::MissingField(ref f) if f == "info"));
}

#[test]
fn parse_malformed_yaml() {
    let err = parse::from_yaml("openapi: [unclosed").unwrap_err();
    assert!(matches!(err, SpecParseError::Yaml(_)));
}

#[test]
fn parse_ignores_fields_generation_does_not_read() {
    let yaml = r#"
openapi: 3.0.3
info: { title: T, version: '1' }
tags:
  - name: products
    description: Catalog
paths:
  /products:
    post:
      operationId: createProduct
      deprecated: true
      requestBody:
        content:
          application/json:
            schema: { type: object }
      responses: {}
components:
  schemas:
    Product:
      type: object
      nullable: true
      properties:
        name: { type: string, nullable: true }
"#;
    let spec = parse::from_yaml(yaml).expect("extra keywords should be accepted");
    let post = spec.paths["/products"].post.as_ref().expect("should have POST");
    assert_eq!(post.operation_id.as_deref(), Some("createProduct"));
}
