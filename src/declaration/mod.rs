//! Read-only declaration model consumed by the route extractor.
//!
//! The model is a language-neutral view of annotated source code: classes with
//! methods and parameters, each carrying annotations and documentation text, and
//! fields whose initializer expressions can be referenced from annotation
//! attributes. Front ends build it:
//!
//! - [`rust::RustDeclarationLoader`] projects parsed Rust sources onto the model
//! - [`load_model`] reads a model that another tool serialized to JSON or YAML
//!
//! The extraction engine never mutates a model once it has been built.

pub mod rust;

use crate::error::{Error, Result};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// A snapshot of every class visible to one extraction run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclarationModel {
    /// Classes in declaration order
    #[serde(default)]
    pub classes: Vec<ClassDecl>,
}

/// A class (or, for Rust sources, an `impl` block) declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassDecl {
    /// Simple name, e.g. `UserHttpHandler`
    pub name: String,
    /// Fully qualified name, e.g. `demo::UserHttpHandler`
    #[serde(default)]
    pub qualified_name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Methods in declaration order
    #[serde(default)]
    pub methods: Vec<MethodDecl>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

/// A method declared on a class.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MethodDecl {
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    /// Formal parameters in declaration order
    #[serde(default)]
    pub parameters: Vec<ParamDecl>,
    #[serde(default)]
    pub doc_comment: Option<String>,
}

/// A formal parameter of a method.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParamDecl {
    pub name: String,
    #[serde(default)]
    pub annotations: Vec<Annotation>,
    #[serde(default)]
    pub doc_comment: Option<String>,
    /// Declared type as written (`u64`, `Vec<String>`), when the front end knows it
    #[serde(default)]
    pub type_name: Option<String>,
}

/// A field (constant) that annotation attributes may reference.
///
/// `initializer` is `None` when the field is declared outside the analyzed
/// sources, or when its value could not be followed.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldDecl {
    pub name: String,
    #[serde(default)]
    pub initializer: Option<Box<Expression>>,
}

/// An annotation instance attached to a declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    /// Qualified annotation name
    pub name: String,
    #[serde(default)]
    pub attributes: Vec<AnnotationAttribute>,
}

/// One `name = value` pair of an annotation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationAttribute {
    pub name: String,
    pub value: Expression,
}

/// Unevaluated annotation attribute value, as written in source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expression {
    /// A literal, holding its textual value
    Literal(String),
    /// `left + right`
    Concatenation(Box<Expression>, Box<Expression>),
    /// A reference to another declaration's field
    FieldReference(FieldDecl),
    /// `[a, b, ..]`, used for path aliases
    Array(Vec<Expression>),
    /// Any shape the resolver does not understand
    Other,
}

impl Expression {
    /// Shorthand for a literal expression.
    pub fn literal(value: impl Into<String>) -> Self {
        Expression::Literal(value.into())
    }

    /// Shorthand for `left + right`.
    pub fn concat(left: Expression, right: Expression) -> Self {
        Expression::Concatenation(Box::new(left), Box::new(right))
    }

    /// Shorthand for a reference to a field with an optional initializer.
    pub fn field(name: impl Into<String>, initializer: Option<Expression>) -> Self {
        Expression::FieldReference(FieldDecl {
            name: name.into(),
            initializer: initializer.map(Box::new),
        })
    }
}

impl Annotation {
    /// Create an annotation without attributes
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
        }
    }

    /// Builder-style helper appending an attribute
    pub fn with_attribute(mut self, name: impl Into<String>, value: Expression) -> Self {
        self.attributes.push(AnnotationAttribute {
            name: name.into(),
            value,
        });
        self
    }

    /// Returns the raw value expression of the named attribute.
    pub fn attribute(&self, name: &str) -> Option<&Expression> {
        self.attributes
            .iter()
            .find(|attr| attr.name == name)
            .map(|attr| &attr.value)
    }
}

/// Finds the first annotation with the given qualified name.
pub fn annotation<'a>(annotations: &'a [Annotation], name: &str) -> Option<&'a Annotation> {
    annotations.iter().find(|a| a.name == name)
}

/// Whether an annotation with the given qualified name is present.
pub fn is_annotation_present(annotations: &[Annotation], name: &str) -> bool {
    annotation(annotations, name).is_some()
}

macro_rules! annotated {
    ($($ty:ty),*) => {
        $(
            impl $ty {
                /// Looks up an annotation on this declaration by qualified name.
                pub fn annotation(&self, name: &str) -> Option<&Annotation> {
                    annotation(&self.annotations, name)
                }

                /// Whether this declaration carries the named annotation.
                pub fn has_annotation(&self, name: &str) -> bool {
                    is_annotation_present(&self.annotations, name)
                }
            }
        )*
    };
}

annotated!(ClassDecl, MethodDecl, ParamDecl);

impl DeclarationModel {
    pub fn new(classes: Vec<ClassDecl>) -> Self {
        Self { classes }
    }

    /// All classes, in declaration order.
    pub fn classes(&self) -> &[ClassDecl] {
        &self.classes
    }
}

/// Loads a serialized declaration model.
///
/// Files ending in `.json` are read as JSON, anything else as YAML.
pub fn load_model(path: &Path) -> Result<DeclarationModel> {
    debug!("Loading declaration model from {}", path.display());

    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let model: DeclarationModel = if is_json {
        serde_json::from_str(&content).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        serde_yaml::from_str(&content).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?
    };

    debug!("Loaded {} classes", model.classes.len());
    Ok(model)
}
