//! Route extraction from annotated declarations.
//!
//! The [`RouteExtractor`] walks a [`DeclarationModel`], keeps only endpoint
//! classes (those carrying the controller marker), matches every method against
//! the [`MappingRegistry`] and places one [`OperationEntry`] per match into a
//! [`RouteTable`] keyed by path template and HTTP method.
//!
//! # Example
//!
//! ```
//! use webdoc_routes::declaration::DeclarationModel;
//! use webdoc_routes::extractor::RouteExtractor;
//! use webdoc_routes::mapping::default_registry;
//!
//! let model = DeclarationModel::default();
//! let table = RouteExtractor::new(default_registry()).extract(&model).unwrap();
//! assert!(table.is_empty());
//! ```

pub mod parameter;

use crate::declaration::{Annotation, ClassDecl, DeclarationModel, MethodDecl};
use crate::error::{Error, Result};
use crate::mapping::{
    MappingRegistry, MappingSchema, CONTROLLER_ANNOTATION, DEPRECATED_ANNOTATION,
};
use crate::resolver::resolve;
use indexmap::IndexMap;
use log::{debug, info};
use parameter::ParameterExtractor;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// HTTP methods a route table slot can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Trace,
    Options,
}

impl HttpMethod {
    pub const ALL: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Post,
        HttpMethod::Put,
        HttpMethod::Patch,
        HttpMethod::Delete,
        HttpMethod::Head,
        HttpMethod::Trace,
        HttpMethod::Options,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
            HttpMethod::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = String;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let trimmed = s.trim();
        HttpMethod::ALL
            .into_iter()
            .find(|m| m.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| s.to_string())
    }
}

/// Describes one formal parameter of an operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    pub name: String,
    /// Documentation text, empty when there is none
    pub description: String,
    pub deprecated: bool,
    /// `false` only when the parameter carries the nullability marker
    pub required: bool,
    /// Declared type, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
}

/// Everything known about one (path, method) slot.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEntry {
    /// Name of the method serving the route
    pub operation_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub produces: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub consumes: Option<String>,
    /// Parameters in declaration order
    pub parameters: Vec<ParameterDescriptor>,
}

/// Operations registered for one path template, at most one per method.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathRecord {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<OperationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<OperationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<OperationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<OperationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<OperationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<OperationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<OperationEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<OperationEntry>,
}

impl PathRecord {
    fn slot_mut(&mut self, method: HttpMethod) -> &mut Option<OperationEntry> {
        match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Trace => &mut self.trace,
            HttpMethod::Options => &mut self.options,
        }
    }

    /// The operation registered for `method`, if any.
    pub fn operation(&self, method: HttpMethod) -> Option<&OperationEntry> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
        }
    }

    /// Registered operations in method order.
    pub fn operations(&self) -> impl Iterator<Item = (HttpMethod, &OperationEntry)> {
        HttpMethod::ALL
            .into_iter()
            .filter_map(move |m| self.operation(m).map(|op| (m, op)))
    }
}

/// Path template → per-method operations, in first-insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RouteTable {
    paths: IndexMap<String, PathRecord>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Places `operation` at (path, method), replacing any previous entry.
    pub fn insert(&mut self, path: String, method: HttpMethod, operation: OperationEntry) {
        let slot = self.paths.entry(path).or_default().slot_mut(method);
        if slot.is_some() {
            debug!("Overwriting existing {} operation", method);
        }
        *slot = Some(operation);
    }

    pub fn get(&self, path: &str) -> Option<&PathRecord> {
        self.paths.get(path)
    }

    /// Shorthand for `get(path)` followed by `operation(method)`.
    pub fn operation(&self, path: &str, method: HttpMethod) -> Option<&OperationEntry> {
        self.get(path).and_then(|record| record.operation(method))
    }

    pub fn paths(&self) -> impl Iterator<Item = (&String, &PathRecord)> {
        self.paths.iter()
    }

    /// Number of distinct path templates.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Total number of operations across all paths.
    pub fn operation_count(&self) -> usize {
        self.paths.values().map(|r| r.operations().count()).sum()
    }
}

/// A method matched against a mapping schema, before it becomes a table entry.
#[derive(Debug, Clone)]
pub struct RouteMatch<'a> {
    pub schema: &'a MappingSchema,
    pub annotation: &'a Annotation,
    pub method: HttpMethod,
    pub path: String,
}

/// Builds a [`RouteTable`] from a declaration model.
pub struct RouteExtractor<'r> {
    registry: &'r MappingRegistry,
}

impl<'r> RouteExtractor<'r> {
    pub fn new(registry: &'r MappingRegistry) -> Self {
        Self { registry }
    }

    /// Extracts every route of every endpoint class.
    ///
    /// Classes and methods are visited in declaration order, so when two
    /// methods map to the same path and method the later one wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnresolvableHttpMethod`] as soon as a matched mapping
    /// annotation names something that is not an HTTP method.
    pub fn extract(&self, model: &DeclarationModel) -> Result<RouteTable> {
        let mut table = RouteTable::new();

        for class in model.classes() {
            if !class.has_annotation(CONTROLLER_ANNOTATION) {
                continue;
            }
            self.extract_class(class, &mut table)?;
        }

        info!(
            "Extracted {} operations on {} paths",
            table.operation_count(),
            table.len()
        );
        Ok(table)
    }

    fn extract_class(&self, class: &ClassDecl, table: &mut RouteTable) -> Result<()> {
        debug!("Extracting routes from endpoint class {}", class.name);
        let base_path = self.class_base_path(class);

        for method in &class.methods {
            let Some(route) = self.match_method(class, method)? else {
                continue;
            };

            let path = combine_paths(&base_path, &route.path);
            debug!("Found route: {} {} -> {}", route.method, path, method.name);

            let operation = Self::build_operation(class, method, &route);
            table.insert(path, route.method, operation);
        }

        Ok(())
    }

    /// Matches a method against the registry.
    ///
    /// Only the first schema whose annotation the method carries is
    /// considered. `Ok(None)` means no schema matched or the match has no path.
    pub fn match_method<'a>(
        &'a self,
        class: &ClassDecl,
        method: &'a MethodDecl,
    ) -> Result<Option<RouteMatch<'a>>> {
        let matched = self.registry.schemas().iter().find_map(|schema| {
            method
                .annotation(&schema.annotation_name)
                .map(|annotation| (schema, annotation))
        });
        let Some((schema, annotation)) = matched else {
            return Ok(None);
        };

        let http_method = match schema.fixed_method {
            Some(fixed) => fixed,
            None => {
                let value = resolve(annotation.attribute(&schema.method_attribute_name));
                value
                    .parse::<HttpMethod>()
                    .map_err(|value| Error::UnresolvableHttpMethod {
                        class: class.name.clone(),
                        method: method.name.clone(),
                        value,
                    })?
            }
        };

        let Some(path) = resolve_path(schema, annotation) else {
            debug!(
                "Skipping {}::{}: mapping annotation has no path",
                class.name, method.name
            );
            return Ok(None);
        };

        Ok(Some(RouteMatch {
            schema,
            annotation,
            method: http_method,
            path,
        }))
    }

    /// Path prefix declared by the generic mapping annotation on the class itself.
    fn class_base_path(&self, class: &ClassDecl) -> String {
        self.registry
            .generic()
            .and_then(|schema| {
                class
                    .annotation(&schema.annotation_name)
                    .and_then(|annotation| resolve_path(schema, annotation))
            })
            .unwrap_or_default()
    }

    fn build_operation(class: &ClassDecl, method: &MethodDecl, route: &RouteMatch<'_>) -> OperationEntry {
        let (summary, description) = split_doc(method.doc_comment.as_deref());
        let non_empty = |s: String| if s.is_empty() { None } else { Some(s) };

        OperationEntry {
            operation_id: method.name.clone(),
            summary,
            description,
            tags: vec![class.name.clone()],
            deprecated: method.has_annotation(DEPRECATED_ANNOTATION),
            produces: non_empty(resolve(
                route.annotation.attribute(&route.schema.produces_attribute_name),
            )),
            consumes: non_empty(resolve(
                route.annotation.attribute(&route.schema.consumes_attribute_name),
            )),
            parameters: ParameterExtractor::extract(method),
        }
    }
}

/// First path attribute that resolves to a non-empty string.
fn resolve_path(schema: &MappingSchema, annotation: &Annotation) -> Option<String> {
    schema
        .path_attribute_names
        .iter()
        .map(|name| resolve(annotation.attribute(name)))
        .find(|path| !path.is_empty())
}

/// Combine base path and path, handling slashes correctly
fn combine_paths(base: &str, path: &str) -> String {
    if base.is_empty() {
        return path.to_string();
    }

    let base = base.trim_end_matches('/');
    let path = path.trim_start_matches('/');

    if path.is_empty() {
        if base.is_empty() {
            "/".to_string()
        } else {
            base.to_string()
        }
    } else {
        format!("{}/{}", base, path)
    }
}

/// Splits a doc comment into a one-line summary and the remaining description.
///
/// Parameter documentation (`# Arguments` sections, `@param` lines) is left out.
fn split_doc(doc: Option<&str>) -> (Option<String>, Option<String>) {
    let doc = strip_parameter_section(doc.unwrap_or_default());
    if doc.is_empty() {
        return (None, None);
    }

    let mut paragraphs = doc.splitn(2, "\n\n");
    let summary = paragraphs.next().map(|s| s.trim().replace('\n', " "));
    let description = paragraphs
        .next()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    (summary, description)
}

fn strip_parameter_section(text: &str) -> String {
    let kept: Vec<&str> = text
        .lines()
        .take_while(|line| {
            let line = line.trim();
            line != "# Arguments" && !line.starts_with("@param")
        })
        .collect();
    kept.join("\n").trim().to_string()
}
