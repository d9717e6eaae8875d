use crate::declaration::{MethodDecl, ParamDecl};
use crate::extractor::ParameterDescriptor;
use crate::mapping::{DEPRECATED_ANNOTATION, NULLABLE_ANNOTATION};

/// Builds parameter descriptors for a matched method.
pub struct ParameterExtractor;

impl ParameterExtractor {
    /// One descriptor per formal parameter, in declaration order.
    ///
    /// Nothing is filtered, reordered or deduplicated.
    pub fn extract(method: &MethodDecl) -> Vec<ParameterDescriptor> {
        method.parameters.iter().map(Self::describe).collect()
    }

    /// A parameter is required unless it carries the nullability marker.
    pub fn describe(param: &ParamDecl) -> ParameterDescriptor {
        ParameterDescriptor {
            name: param.name.clone(),
            description: param
                .doc_comment
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            deprecated: param.has_annotation(DEPRECATED_ANNOTATION),
            required: !param.has_annotation(NULLABLE_ANNOTATION),
            type_name: param.type_name.clone(),
        }
    }
}
