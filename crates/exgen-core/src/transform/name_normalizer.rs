use heck::{ToKebabCase, ToLowerCamelCase, ToPascalCase};
use serde::Serialize;

use crate::error::NameError;

/// The canonical spellings of one resource. Built once per resource and
/// threaded through every artifact so model, validator, controller and route
/// file can never disagree on casing or plurality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ResourceName {
    /// The sanitized name the resource was derived from.
    pub original: String,
    /// Singular, capitalized: `Product`.
    pub pascal: String,
    /// Singular, first letter lowercased: `product`.
    pub camel: String,
    /// Plural, capitalized: `Products`.
    pub plural_pascal: String,
    /// Plural, first letter lowercased: `products`.
    pub plural_camel: String,
}

impl ResourceName {
    /// Names for a grouped OpenAPI resource. A trailing `s` is stripped for
    /// the singular; the group key itself is the plural, whether or not it
    /// ends in `s`.
    pub fn from_group_key(key: &str) -> Result<Self, NameError> {
        let sanitized = sanitize_identifier(key)?;
        let plural = capitalize(&sanitized);
        let singular = strip_plural(&plural).to_string();
        Ok(Self::build(sanitized, singular, plural))
    }

    /// Names for a `make:*` argument. The singular follows the same trailing
    /// `s` rule; a name without one gets an `s` appended for the plural.
    pub fn from_model_name(name: &str) -> Result<Self, NameError> {
        let sanitized = sanitize_identifier(name)?;
        let capitalized = capitalize(&sanitized);
        let singular = strip_plural(&capitalized).to_string();
        let plural = if capitalized.ends_with('s') {
            capitalized
        } else {
            format!("{capitalized}s")
        };
        Ok(Self::build(sanitized, singular, plural))
    }

    fn build(original: String, singular: String, plural: String) -> Self {
        Self {
            original,
            camel: decapitalize(&singular),
            pascal: singular,
            plural_camel: decapitalize(&plural),
            plural_pascal: plural,
        }
    }

    /// Where the resource's router is mounted: `/products`.
    pub fn mount_path(&self) -> String {
        format!("/{}", self.plural_camel)
    }

    /// Variable holding the required route module: `productRoutes`.
    pub fn routes_var(&self) -> String {
        format!("{}Routes", self.camel)
    }

    /// Variable holding the required controller module: `ProductController`.
    pub fn controller_var(&self) -> String {
        format!("{}Controller", self.pascal)
    }
}

/// Strip every non-alphanumeric character. Fails when nothing is left.
pub fn sanitize_identifier(name: &str) -> Result<String, NameError> {
    let sanitized: String = name.chars().filter(|c| c.is_alphanumeric()).collect();
    if sanitized.is_empty() {
        return Err(NameError::Empty(name.to_string()));
    }
    Ok(sanitized)
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Lowercase the first character, leave the rest untouched.
pub fn decapitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Naive singularization: strips one trailing `s`. Irregular plurals
/// (`Categories`) are deliberately left alone.
pub fn strip_plural(word: &str) -> &str {
    match word.strip_suffix('s') {
        Some(stem) if !stem.is_empty() => stem,
        _ => word,
    }
}

/// Turn an operationId (or any label) into a JavaScript method identifier.
pub fn method_identifier(raw: &str) -> Result<String, NameError> {
    let camel = raw.to_lower_camel_case();
    if camel.is_empty() {
        return Err(NameError::Empty(raw.to_string()));
    }
    if camel.starts_with(|c: char| c.is_ascii_digit()) {
        return Ok(format!("_{camel}"));
    }
    Ok(camel)
}

/// Express parameter name for an OpenAPI path placeholder: `{pet-id}` → `petId`.
pub fn express_param(name: &str) -> String {
    let camel = name.to_lower_camel_case();
    if camel.is_empty() { "id".to_string() } else { camel }
}

/// Rewrite `{param}` placeholders as Express `:param` segments.
pub fn to_express_path(template: &str) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let Some(len) = rest[start..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        out.push(':');
        out.push_str(&express_param(&rest[start + 1..start + len]));
        rest = &rest[start + len + 1..];
    }
    out.push_str(rest);
    out
}

/// URL segment for an appended stub route: `archiveAll` → `archive-all`.
pub fn route_segment(method: &str) -> String {
    method.to_kebab_case()
}

/// Derive a camelCase operation name from HTTP method + path.
///
/// Examples:
/// - `GET /users` → `listUsers`
/// - `POST /users` → `createUsers`
/// - `GET /users/{userId}` → `getUser`
/// - `PUT /users/{userId}` → `updateUser`
/// - `DELETE /users/{userId}` → `deleteUser`
/// - `GET /users/{userId}/messages` → `listUsersMessages`
pub fn route_to_name(method: &str, path: &str) -> String {
    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

    let mut resource_parts: Vec<&str> = Vec::new();
    let mut ends_with_param = false;

    for seg in &segments {
        if seg.starts_with('{') && seg.ends_with('}') {
            ends_with_param = true;
        } else {
            resource_parts.push(seg);
            ends_with_param = false;
        }
    }

    let method_upper = method.to_uppercase();
    let prefix = match method_upper.as_str() {
        "GET" if ends_with_param => "get",
        "GET" => "list",
        "POST" => "create",
        "PUT" => "update",
        "DELETE" => "delete",
        "PATCH" => "patch",
        "OPTIONS" => "options",
        "HEAD" => "head",
        "TRACE" => "trace",
        _ => "handle",
    };

    if resource_parts.is_empty() {
        return prefix.to_string();
    }

    // Single-resource ops (ending with a param) use the singular last segment
    let mut pascal_parts = String::new();
    for (i, part) in resource_parts.iter().enumerate() {
        let word = part.to_pascal_case();
        let is_last = i == resource_parts.len() - 1;
        if is_last && ends_with_param {
            pascal_parts.push_str(strip_plural(&word));
        } else {
            pascal_parts.push_str(&word);
        }
    }

    format!("{prefix}{pascal_parts}")
}

/// Split an `update:*` target like `Product.archive`.
pub fn parse_method_target(target: &str) -> Result<(ResourceName, String), NameError> {
    let invalid = || NameError::InvalidMethodTarget(target.to_string());
    let (resource, method) = target.split_once('.').ok_or_else(invalid)?;
    if resource.trim().is_empty() || method.trim().is_empty() || method.contains('.') {
        return Err(invalid());
    }
    let name = ResourceName::from_model_name(resource).map_err(|_| invalid())?;
    let method = method_identifier(method).map_err(|_| invalid())?;
    Ok((name, method))
}
