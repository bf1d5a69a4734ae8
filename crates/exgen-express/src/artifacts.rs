use std::collections::HashSet;

use exgen_core::config::OrmChoice;
use exgen_core::ir::{ApiOperation, ObjectSchema, ResourceGroup, SchemaNode};
use exgen_core::transform::name_normalizer::{
    express_param, method_identifier, route_to_name, to_express_path,
};
use exgen_core::transform::{CrudKind, ResourceName, classify};
use indexmap::IndexMap;
use serde::Serialize;

use crate::type_mapper::{DocumentFieldType, MappedField, map_fields};

/// Columns every generated Prisma model declares itself.
const RELATIONAL_RESERVED: [&str; 4] = ["id", "_id", "createdAt", "updatedAt"];

/// Everything the emitters need to render one resource. Names are built once
/// and threaded through every artifact.
#[derive(Debug, Clone, Serialize)]
pub struct ResourcePlan {
    pub name: ResourceName,
    pub orm: OrmChoice,
    /// Named database connection the model or client is bound to.
    pub connection: Option<String>,
    /// Where the route module is mounted on the central router.
    pub mount: String,
    pub fields: Vec<FieldPlan>,
    pub has_validator: bool,
    pub methods: Vec<MethodPlan>,
}

/// One model field with its rendered declarations.
#[derive(Debug, Clone, Serialize)]
pub struct FieldPlan {
    #[serde(flatten)]
    pub field: MappedField,
    /// Object key in the Mongoose schema (quoted when not an identifier).
    pub key: String,
    /// Mongoose path options: `{ type: String, required: true }`.
    pub mongoose: String,
    /// Prisma field line without indentation: `price Float?`.
    pub prisma: String,
    pub create_rule: String,
    pub update_rule: String,
}

/// One controller method and the route that reaches it.
#[derive(Debug, Clone, Serialize)]
pub struct MethodPlan {
    pub name: String,
    pub kind: CrudKind,
    pub verb: &'static str,
    /// Express path, `:param` style.
    pub path: String,
    /// Expression reading the record id from the request.
    pub id_expr: String,
    pub summary: Option<String>,
    /// Middleware chain ending in the controller method.
    pub handlers: String,
}

impl ResourcePlan {
    /// Plan an OpenAPI resource group. A group without a usable object schema
    /// gets a placeholder model, no validator, and a warning.
    pub fn from_group(
        group: &ResourceGroup,
        schema: Option<&SchemaNode>,
        orm: OrmChoice,
        warnings: &mut Vec<String>,
    ) -> Self {
        let name = group.name.clone();
        let (fields, has_validator) = match schema.and_then(SchemaNode::as_object) {
            Some(object) => (plan_fields(object, orm, warnings), true),
            None => {
                let warning = format!(
                    "no schema found for resource `{}`; emitting a placeholder model without a validator",
                    name.pascal
                );
                log::warn!("{warning}");
                warnings.push(warning);
                (plan_fields(&placeholder_schema(), orm, warnings), false)
            }
        };

        let mut used = HashSet::new();
        let methods = group
            .operations
            .iter()
            .map(|op| {
                let kind = classify(op.operation_id.as_deref(), op.method, &op.path);
                let method_name = unique_name(operation_method_name(op), &mut used);
                let id = op
                    .path_params()
                    .last()
                    .map(|p| express_param(p))
                    .unwrap_or_else(|| "id".to_string());
                MethodPlan::new(
                    &name,
                    method_name,
                    kind,
                    op.method.verb(),
                    to_express_path(&op.path),
                    &id,
                    op.summary.as_deref(),
                    has_validator,
                )
            })
            .collect();

        Self {
            name,
            orm,
            connection: None,
            mount: "/".to_string(),
            fields,
            has_validator,
            methods,
        }
    }

    /// Plan a `make:*` resource: placeholder field, the five canonical CRUD
    /// methods on relative paths, mounted at the plural path.
    pub fn crud(name: ResourceName, orm: OrmChoice, has_validator: bool) -> Self {
        let mut warnings = Vec::new();
        let fields = plan_fields(&placeholder_schema(), orm, &mut warnings);
        let canonical = [
            (format!("getAll{}", name.plural_pascal), CrudKind::List, "get", "/"),
            (format!("create{}", name.pascal), CrudKind::Create, "post", "/"),
            (format!("get{}ById", name.pascal), CrudKind::Retrieve, "get", "/:id"),
            (format!("update{}", name.pascal), CrudKind::Replace, "put", "/:id"),
            (format!("delete{}", name.pascal), CrudKind::Delete, "delete", "/:id"),
        ];
        let methods = canonical
            .into_iter()
            .map(|(method, kind, verb, path)| {
                MethodPlan::new(&name, method, kind, verb, path.to_string(), "id", None, has_validator)
            })
            .collect();

        Self {
            mount: name.mount_path(),
            name,
            orm,
            connection: None,
            fields,
            has_validator,
            methods,
        }
    }

    pub fn with_connection(mut self, connection: Option<String>) -> Self {
        self.connection = connection.filter(|c| !c.trim().is_empty());
        self
    }

    /// The connection name as a JavaScript string literal.
    pub fn connection_literal(&self) -> Option<String> {
        self.connection.as_deref().map(js_str)
    }

    pub fn model_path(&self) -> String {
        match self.orm {
            OrmChoice::Mongoose => format!("src/models/{}.model.js", self.name.camel),
            OrmChoice::Prisma => format!("prisma/schema/{}.prisma", self.name.camel),
        }
    }

    pub fn validator_path(&self) -> String {
        format!("src/validators/{}.validator.js", self.name.camel)
    }

    pub fn controller_path(&self) -> String {
        controller_path(&self.name)
    }

    pub fn routes_path(&self) -> String {
        routes_path(&self.name)
    }

    /// Module specifier of the route file, relative to `src/routes`.
    pub fn route_module(&self) -> String {
        format!("{}.routes", self.name.camel)
    }
}

pub fn controller_path(name: &ResourceName) -> String {
    format!("src/controllers/{}.controller.js", name.camel)
}

pub fn routes_path(name: &ResourceName) -> String {
    format!("src/routes/{}.routes.js", name.camel)
}

impl MethodPlan {
    #[allow(clippy::too_many_arguments)]
    fn new(
        resource: &ResourceName,
        name: String,
        kind: CrudKind,
        verb: &'static str,
        path: String,
        id_param: &str,
        summary: Option<&str>,
        has_validator: bool,
    ) -> Self {
        let mut handlers = Vec::new();
        if has_validator && kind.takes_validated_body() {
            let rules = match kind {
                CrudKind::Create => format!("create{}Rules", resource.pascal),
                _ => format!("update{}Rules", resource.pascal),
            };
            handlers.push(rules);
            handlers.push("validate".to_string());
        }
        handlers.push(format!("{}.{}", resource.controller_var(), name));

        Self {
            kind,
            verb,
            path,
            id_expr: format!("req.params.{id_param}"),
            summary: summary
                .and_then(|s| s.lines().next())
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            handlers: handlers.join(", "),
            name,
        }
    }
}

/// `name`, a required string. Stands in for a missing schema.
fn placeholder_schema() -> ObjectSchema {
    ObjectSchema::new(IndexMap::from([("name".to_string(), SchemaNode::string())]), ["name"])
}

fn plan_fields(object: &ObjectSchema, orm: OrmChoice, warnings: &mut Vec<String>) -> Vec<FieldPlan> {
    map_fields(&SchemaNode::Object(object.clone()))
        .into_iter()
        .filter(|field| {
            let reserved = orm == OrmChoice::Prisma && RELATIONAL_RESERVED.contains(&field.name.as_str());
            if reserved {
                log::debug!("skipping `{}`: declared by every Prisma model", field.name);
            }
            !reserved
        })
        .filter_map(|field| match FieldPlan::new(field) {
            Ok(plan) => Some(plan),
            Err(name) => {
                let warning = format!("skipping property `{name}`: no usable identifier");
                log::warn!("{warning}");
                warnings.push(warning);
                None
            }
        })
        .collect()
}

impl FieldPlan {
    fn new(field: MappedField) -> Result<Self, String> {
        let prisma = prisma_line(&field).ok_or_else(|| field.name.clone())?;
        Ok(Self {
            key: js_key(&field.name),
            mongoose: mongoose_options(&field),
            create_rule: validation_chain(&field, field.required),
            update_rule: validation_chain(&field, false),
            prisma,
            field,
        })
    }
}

/// Controller method name: the operationId when usable, otherwise derived
/// from method and path.
fn operation_method_name(op: &ApiOperation) -> String {
    op.operation_id
        .as_deref()
        .and_then(|id| method_identifier(id).ok())
        .or_else(|| method_identifier(&route_to_name(op.method.as_str(), &op.path)).ok())
        .unwrap_or_else(|| op.method.verb().to_string())
}

/// Append a numeric suffix until the name is unused: `list`, `list2`, ...
fn unique_name(base: String, used: &mut HashSet<String>) -> String {
    let mut candidate = base.clone();
    let mut n = 2;
    while used.contains(&candidate) {
        candidate = format!("{base}{n}");
        n += 1;
    }
    used.insert(candidate.clone());
    candidate
}

fn is_js_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
}

/// Single-quoted JavaScript string literal.
pub fn js_str(value: &str) -> String {
    format!("'{}'", value.replace('\\', "\\\\").replace('\'', "\\'"))
}

fn js_key(name: &str) -> String {
    if is_js_identifier(name) {
        name.to_string()
    } else {
        js_str(name)
    }
}

fn mongoose_options(field: &MappedField) -> String {
    let mut options = vec![format!("type: {}", field.document.as_mongoose())];
    if field.required {
        options.push("required: true".to_string());
    }
    if field.trim {
        options.push("trim: true".to_string());
    }
    if field.document == DocumentFieldType::String && !field.enum_values().is_empty() {
        let values: Vec<String> = field.enum_values().iter().map(|v| js_str(v)).collect();
        options.push(format!("enum: [{}]", values.join(", ")));
    }
    format!("{{ {} }}", options.join(", "))
}

fn prisma_line(field: &MappedField) -> Option<String> {
    let optional = if field.required { "" } else { "?" };
    let ty = field.relational.as_prisma();
    let is_ident = field.name.starts_with(|c: char| c.is_ascii_alphabetic())
        && field.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
    if is_ident {
        return Some(format!("{} {ty}{optional}", field.name));
    }
    let ident = method_identifier(&field.name).ok()?;
    let ident = ident.trim_start_matches('_');
    if ident.is_empty() {
        return None;
    }
    Some(format!("{ident} {ty}{optional} @map(\"{}\")", field.name))
}

/// express-validator chain for one field. `required` decides between
/// `exists()` and `optional()`; the type checks are the same either way.
fn validation_chain(field: &MappedField, required: bool) -> String {
    let name = &field.name;
    let message = |text: &str| format!(".withMessage({})", js_str(&format!("{name} {text}")));
    let mut chain = format!("body({})", js_str(name));

    if required {
        chain.push_str(".exists({ checkNull: true })");
        chain.push_str(&message("is required"));
        chain.push_str(".bail()");
    } else {
        chain.push_str(".optional()");
    }

    match &field.schema {
        SchemaNode::String(s) => {
            let format = s.format.as_deref();
            if !s.enum_values.is_empty() {
                let values: Vec<String> = s.enum_values.iter().map(|v| js_str(v)).collect();
                chain.push_str(&format!(".isIn([{}])", values.join(", ")));
                chain.push_str(&message(&format!("must be one of: {}", s.enum_values.join(", "))));
            } else if matches!(format, Some("date" | "date-time")) {
                chain.push_str(".isISO8601()");
                chain.push_str(&message("must be a valid date"));
            } else if format == Some("email") || name.to_ascii_lowercase().contains("email") {
                chain.push_str(".isEmail()");
                chain.push_str(&message("must be a valid email"));
                chain.push_str(".normalizeEmail()");
            } else {
                chain.push_str(".isString()");
                chain.push_str(&message("must be a string"));
                chain.push_str(".trim()");
            }
        }
        SchemaNode::Integer { .. } => {
            chain.push_str(".isInt()");
            chain.push_str(&message("must be an integer"));
        }
        SchemaNode::Number { .. } => {
            chain.push_str(".isFloat()");
            chain.push_str(&message("must be a number"));
        }
        SchemaNode::Boolean => {
            chain.push_str(".isBoolean()");
            chain.push_str(&message("must be a boolean"));
        }
        SchemaNode::Array { .. } => {
            chain.push_str(".isArray()");
            chain.push_str(&message("must be an array"));
        }
        SchemaNode::Object(_) => {
            chain.push_str(".isObject()");
            chain.push_str(&message("must be an object"));
        }
        SchemaNode::Untyped => {}
    }
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use exgen_core::ir::{HttpMethod, StringSchema};

    fn product_schema() -> SchemaNode {
        SchemaNode::Object(ObjectSchema::new(
            IndexMap::from([
                ("name".to_string(), SchemaNode::string()),
                ("price".to_string(), SchemaNode::Number { format: None }),
            ]),
            ["name"],
        ))
    }

    fn product_group() -> ResourceGroup {
        ResourceGroup {
            name: ResourceName::from_group_key("products").unwrap(),
            operations: vec![
                ApiOperation::new(HttpMethod::Get, "/products").with_operation_id("listProducts"),
                ApiOperation::new(HttpMethod::Post, "/products").with_operation_id("createProduct"),
                ApiOperation::new(HttpMethod::Get, "/products/{id}")
                    .with_operation_id("getProductById"),
            ],
        }
    }

    #[test]
    fn test_group_plan() {
        let mut warnings = Vec::new();
        let schema = product_schema();
        let plan = ResourcePlan::from_group(
            &product_group(),
            Some(&schema),
            OrmChoice::Mongoose,
            &mut warnings,
        );
        assert!(warnings.is_empty());
        assert!(plan.has_validator);
        assert_eq!(plan.mount, "/");
        let kinds: Vec<CrudKind> = plan.methods.iter().map(|m| m.kind).collect();
        assert_eq!(kinds, vec![CrudKind::List, CrudKind::Create, CrudKind::Retrieve]);
        assert_eq!(plan.methods[0].handlers, "ProductController.listProducts");
        assert_eq!(
            plan.methods[1].handlers,
            "createProductRules, validate, ProductController.createProduct"
        );
        assert_eq!(plan.methods[2].path, "/products/:id");
        assert_eq!(plan.methods[2].id_expr, "req.params.id");
        assert_eq!(plan.model_path(), "src/models/product.model.js");
        assert_eq!(plan.route_module(), "product.routes");
    }

    #[test]
    fn test_missing_schema_warns() {
        let mut warnings = Vec::new();
        let plan =
            ResourcePlan::from_group(&product_group(), None, OrmChoice::Prisma, &mut warnings);
        assert_eq!(warnings.len(), 1);
        assert!(!plan.has_validator);
        assert_eq!(plan.fields.len(), 1);
        assert_eq!(plan.fields[0].prisma, "name String");
        assert!(plan.methods.iter().all(|m| !m.handlers.contains("validate")));
        assert_eq!(plan.model_path(), "prisma/schema/product.prisma");
    }

    #[test]
    fn test_unnamed_operations_get_unique_names() {
        let group = ResourceGroup {
            name: ResourceName::from_group_key("users").unwrap(),
            operations: vec![
                ApiOperation::new(HttpMethod::Post, "/users/{id}/activate"),
                ApiOperation::new(HttpMethod::Post, "/users/{userId}/activate"),
            ],
        };
        let plan = ResourcePlan::from_group(&group, None, OrmChoice::Mongoose, &mut Vec::new());
        assert_eq!(plan.methods[0].name, "createUsersActivate");
        assert_eq!(plan.methods[1].name, "createUsersActivate2");
        assert_eq!(plan.methods[1].id_expr, "req.params.userId");
        assert!(plan.methods.iter().all(|m| m.kind == CrudKind::Custom));
    }

    #[test]
    fn test_crud_plan() {
        let plan = ResourcePlan::crud(
            ResourceName::from_model_name("Order").unwrap(),
            OrmChoice::Mongoose,
            false,
        );
        let names: Vec<&str> = plan.methods.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["getAllOrders", "createOrder", "getOrderById", "updateOrder", "deleteOrder"]
        );
        assert_eq!(plan.mount, "/orders");
        assert_eq!(plan.methods[2].path, "/:id");
    }

    #[test]
    fn test_prisma_skips_reserved_columns() {
        let schema = ObjectSchema::new(
            IndexMap::from([
                ("id".to_string(), SchemaNode::Integer { format: None }),
                ("createdAt".to_string(), SchemaNode::string_with_format("date-time")),
                ("first-name".to_string(), SchemaNode::string()),
            ]),
            ["first-name"],
        );
        let fields = plan_fields(&schema, OrmChoice::Prisma, &mut Vec::new());
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].prisma, "firstName String @map(\"first-name\")");
        assert_eq!(fields[0].key, "'first-name'");

        let fields = plan_fields(&schema, OrmChoice::Mongoose, &mut Vec::new());
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn test_mongoose_options() {
        let field = MappedField::new(
            "role",
            &SchemaNode::String(StringSchema {
                format: None,
                enum_values: vec!["admin".into(), "member".into()],
            }),
            true,
        );
        assert_eq!(
            mongoose_options(&field),
            "{ type: String, required: true, trim: true, enum: ['admin', 'member'] }"
        );
        let field = MappedField::new("tags", &SchemaNode::Array { items: Box::new(SchemaNode::string()) }, false);
        assert_eq!(mongoose_options(&field), "{ type: [mongoose.Schema.Types.Mixed] }");
    }

    #[test]
    fn test_validation_chains() {
        let email = MappedField::new("email", &SchemaNode::string_with_format("email"), true);
        assert_eq!(
            validation_chain(&email, true),
            "body('email').exists({ checkNull: true }).withMessage('email is required').bail()\
             .isEmail().withMessage('email must be a valid email').normalizeEmail()"
        );
        assert_eq!(
            validation_chain(&email, false),
            "body('email').optional().isEmail().withMessage('email must be a valid email').normalizeEmail()"
        );

        let price = MappedField::new("price", &SchemaNode::Number { format: None }, false);
        assert_eq!(
            validation_chain(&price, false),
            "body('price').optional().isFloat().withMessage('price must be a number')"
        );
        let born = MappedField::new("born", &SchemaNode::string_with_format("date"), false);
        assert!(validation_chain(&born, false).contains(".isISO8601()"));
    }

    #[test]
    fn test_js_str_escapes() {
        assert_eq!(js_str("it's"), "'it\\'s'");
        assert_eq!(js_key("first_name"), "first_name");
        assert_eq!(js_key("2nd"), "'2nd'");
    }
}
