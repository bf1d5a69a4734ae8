use std::fmt;

/// HTTP method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Options,
    Head,
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Lowercase verb, as used by `router.<verb>(...)`.
    pub fn verb(&self) -> &'static str {
        match self {
            HttpMethod::Get => "get",
            HttpMethod::Post => "post",
            HttpMethod::Put => "put",
            HttpMethod::Delete => "delete",
            HttpMethod::Patch => "patch",
            HttpMethod::Options => "options",
            HttpMethod::Head => "head",
            HttpMethod::Trace => "trace",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            "OPTIONS" => Ok(HttpMethod::Options),
            "HEAD" => Ok(HttpMethod::Head),
            "TRACE" => Ok(HttpMethod::Trace),
            other => Err(format!("unknown HTTP method `{other}`")),
        }
    }
}

/// One operation of the document.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiOperation {
    pub operation_id: Option<String>,
    pub method: HttpMethod,
    /// Route template with `{param}` placeholders.
    pub path: String,
    /// Ordered; the first tag is the grouping hint.
    pub tags: Vec<String>,
    pub summary: Option<String>,
}

impl ApiOperation {
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            operation_id: None,
            method,
            path: path.into(),
            tags: Vec::new(),
            summary: None,
        }
    }

    pub fn with_operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = Some(id.into());
        self
    }

    pub fn with_tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags = tags.into_iter().map(Into::into).collect();
        self
    }

    /// Names of the `{param}` placeholders in the route template.
    pub fn path_params(&self) -> Vec<&str> {
        path_params(&self.path)
    }
}

/// Names of the `{param}` placeholders in a route template, in order.
pub fn path_params(template: &str) -> Vec<&str> {
    let mut params = Vec::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1..];
        match after.find('}') {
            Some(end) => {
                if end > 0 {
                    params.push(&after[..end]);
                }
                rest = &after[end + 1..];
            }
            None => break,
        }
    }
    params
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_params() {
        assert!(path_params("/products").is_empty());
        assert_eq!(path_params("/products/{id}"), vec!["id"]);
        assert_eq!(
            path_params("/users/{userId}/posts/{postId}"),
            vec!["userId", "postId"]
        );
        assert!(path_params("/broken/{").is_empty());
        assert!(path_params("/empty/{}").is_empty());
    }

    #[test]
    fn test_method_parse() {
        assert_eq!("patch".parse::<HttpMethod>().unwrap(), HttpMethod::Patch);
        assert_eq!(HttpMethod::Delete.verb(), "delete");
        assert!("fetch".parse::<HttpMethod>().is_err());
    }
}
