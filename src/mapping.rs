//! Mapping annotation schemas.
//!
//! A [`MappingSchema`] describes how to read one route-bearing annotation: which
//! attributes hold the path, which one holds the HTTP method (or which method
//! the annotation implies), and where produces/consumes/params metadata lives.
//! The registry is plain data tried in order by the route extractor, so adding
//! a new verb shorthand is one more entry rather than new matching code.

use crate::extractor::HttpMethod;
use std::sync::OnceLock;

/// Marker annotation designating an endpoint class.
pub const CONTROLLER_ANNOTATION: &str = "infra::web::annotation::rest_controller";
/// The generic mapping annotation.
pub const REQUEST_MAPPING_ANNOTATION: &str = "infra::web::annotation::request_mapping";
/// Marks a parameter or method as deprecated.
pub const DEPRECATED_ANNOTATION: &str = "deprecated";
/// Marks a parameter as possibly absent.
pub const NULLABLE_ANNOTATION: &str = "infra::lang::nullable";

/// Verb shorthand annotations, each short form followed by its long form.
const VERB_ANNOTATIONS: [(&str, HttpMethod); 10] = [
    ("infra::web::annotation::get", HttpMethod::Get),
    ("infra::web::annotation::get_mapping", HttpMethod::Get),
    ("infra::web::annotation::post", HttpMethod::Post),
    ("infra::web::annotation::post_mapping", HttpMethod::Post),
    ("infra::web::annotation::put", HttpMethod::Put),
    ("infra::web::annotation::put_mapping", HttpMethod::Put),
    ("infra::web::annotation::patch", HttpMethod::Patch),
    ("infra::web::annotation::patch_mapping", HttpMethod::Patch),
    ("infra::web::annotation::delete", HttpMethod::Delete),
    ("infra::web::annotation::delete_mapping", HttpMethod::Delete),
];

/// Attribute layout of one mapping annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingSchema {
    /// Qualified annotation name
    pub annotation_name: String,
    /// Attributes that may hold the path, tried in order
    pub path_attribute_names: Vec<String>,
    /// Attribute holding the method when `fixed_method` is unset
    pub method_attribute_name: String,
    /// Method implied by the annotation itself
    pub fixed_method: Option<HttpMethod>,
    pub produces_attribute_name: String,
    pub consumes_attribute_name: String,
    pub params_attribute_name: String,
}

impl MappingSchema {
    pub fn new(
        annotation_name: impl Into<String>,
        path_attribute_names: Vec<String>,
        method_attribute_name: impl Into<String>,
        fixed_method: Option<HttpMethod>,
        produces_attribute_name: impl Into<String>,
        consumes_attribute_name: impl Into<String>,
        params_attribute_name: impl Into<String>,
    ) -> Self {
        Self {
            annotation_name: annotation_name.into(),
            path_attribute_names,
            method_attribute_name: method_attribute_name.into(),
            fixed_method,
            produces_attribute_name: produces_attribute_name.into(),
            consumes_attribute_name: consumes_attribute_name.into(),
            params_attribute_name: params_attribute_name.into(),
        }
    }

    /// Same layout, different annotation.
    pub fn with_annotation(&self, annotation_name: impl Into<String>) -> Self {
        Self {
            annotation_name: annotation_name.into(),
            ..self.clone()
        }
    }

    pub fn with_path(&self, path_attribute_names: Vec<String>) -> Self {
        Self {
            path_attribute_names,
            ..self.clone()
        }
    }

    pub fn with_produces(&self, produces_attribute_name: impl Into<String>) -> Self {
        Self {
            produces_attribute_name: produces_attribute_name.into(),
            ..self.clone()
        }
    }

    pub fn with_consumes(&self, consumes_attribute_name: impl Into<String>) -> Self {
        Self {
            consumes_attribute_name: consumes_attribute_name.into(),
            ..self.clone()
        }
    }

    pub fn with_method(&self, fixed_method: Option<HttpMethod>) -> Self {
        Self {
            fixed_method,
            ..self.clone()
        }
    }
}

/// Ordered list of schemas tried against each candidate method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingRegistry {
    schemas: Vec<MappingSchema>,
}

impl MappingRegistry {
    /// Builds the standard registry: the generic mapping first, then every
    /// verb shorthand derived from it.
    pub fn new() -> Self {
        let generic = MappingSchema::new(
            REQUEST_MAPPING_ANNOTATION,
            vec!["value".to_string(), "path".to_string()],
            "method",
            None,
            "produces",
            "consumes",
            "params",
        );

        let mut schemas = Vec::with_capacity(VERB_ANNOTATIONS.len() + 1);
        schemas.push(generic.clone());
        for (name, method) in VERB_ANNOTATIONS {
            schemas.push(generic.with_annotation(name).with_method(Some(method)));
        }

        Self { schemas }
    }

    /// A registry made of exactly the given schemas, in order.
    pub fn from_schemas(schemas: Vec<MappingSchema>) -> Self {
        Self { schemas }
    }

    pub fn schemas(&self) -> &[MappingSchema] {
        &self.schemas
    }

    /// The generic (first) schema, used for class-level base paths.
    pub fn generic(&self) -> Option<&MappingSchema> {
        self.schemas.first()
    }
}

impl Default for MappingRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide standard registry.
pub fn default_registry() -> &'static MappingRegistry {
    static REGISTRY: OnceLock<MappingRegistry> = OnceLock::new();
    REGISTRY.get_or_init(MappingRegistry::new)
}
