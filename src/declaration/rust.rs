//! Declaration model front end for Rust sources.
//!
//! Rust has no annotations or classes, so the model is projected as follows:
//!
//! - every `impl` block is a class named after its self type
//! - attributes (other than `doc`) are annotations; attribute paths are
//!   qualified through the file's `use` declarations
//! - `fn` items of the block are methods, typed arguments are parameters
//! - `const` and `static` items (module level or associated) are fields that
//!   attribute arguments may reference
//!
//! ```ignore
//! use infra::web::annotation::{get, request_mapping, rest_controller};
//!
//! const BASE: &str = "/api";
//!
//! #[rest_controller]
//! #[request_mapping(BASE + "/users")]
//! impl UserHttpHandler {
//!     /// Get user by id
//!     #[get("/{id}")]
//!     fn get_by_id(&self, id: u64) -> User { .. }
//! }
//! ```

use crate::declaration::{
    Annotation, AnnotationAttribute, ClassDecl, DeclarationModel, Expression, MethodDecl,
    ParamDecl,
};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use syn::punctuated::Punctuated;
use syn::visit::Visit;
use syn::{
    Attribute, BinOp, Expr, FnArg, GenericArgument, ImplItem, ImplItemFn, ItemImpl, Lit, Meta,
    Pat, PathArguments, Token, Type, UseTree,
};

/// A Rust source file together with its syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    pub path: PathBuf,
    pub syntax_tree: syn::File,
}

/// Reads and parses one Rust source file.
///
/// # Errors
///
/// Returns an error if the file cannot be read or is not valid Rust.
pub fn parse_file(path: &Path) -> Result<ParsedFile> {
    debug!("Parsing file: {}", path.display());

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read file: {}", path.display()))?;
    let syntax_tree = syn::parse_file(&content)
        .with_context(|| format!("Failed to parse Rust syntax in file: {}", path.display()))?;

    Ok(ParsedFile {
        path: path.to_path_buf(),
        syntax_tree,
    })
}

/// Parses every file, logging and dropping the ones that fail.
pub fn parse_files(paths: &[PathBuf]) -> Vec<ParsedFile> {
    let parsed: Vec<ParsedFile> = paths
        .iter()
        .filter_map(|path| match parse_file(path) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                None
            }
        })
        .collect();

    debug!("Parsed {} of {} files", parsed.len(), paths.len());
    parsed
}

/// Builds a [`DeclarationModel`] from parsed Rust files.
pub struct RustDeclarationLoader;

impl RustDeclarationLoader {
    /// Projects all `impl` blocks of all files onto the declaration model.
    ///
    /// Constants are indexed across every file first, so attribute arguments
    /// may reference constants declared in another file.
    pub fn load(parsed_files: &[ParsedFile]) -> DeclarationModel {
        let mut constants = ConstantCollector::default();
        for parsed in parsed_files {
            constants.visit_file(&parsed.syntax_tree);
        }
        debug!("Indexed {} constants", constants.index.len());

        let mut classes = Vec::new();
        for parsed in parsed_files {
            let mut imports = ImportCollector::default();
            imports.visit_file(&parsed.syntax_tree);

            let mut collector = ClassCollector {
                constants: &constants.index,
                imports: &imports.aliases,
                classes: Vec::new(),
            };
            collector.visit_file(&parsed.syntax_tree);

            debug!(
                "Found {} impl blocks in {}",
                collector.classes.len(),
                parsed.path.display()
            );
            classes.extend(collector.classes);
        }

        DeclarationModel::new(classes)
    }
}

/// Collects `const` and `static` initializers by name.
#[derive(Default)]
struct ConstantCollector {
    index: HashMap<String, Expr>,
}

impl ConstantCollector {
    fn insert(&mut self, key: String, expr: &Expr) {
        if self.index.contains_key(&key) {
            debug!("Constant '{}' declared more than once, keeping the first", key);
            return;
        }
        self.index.insert(key, expr.clone());
    }
}

impl<'ast> Visit<'ast> for ConstantCollector {
    fn visit_item_const(&mut self, node: &'ast syn::ItemConst) {
        self.insert(node.ident.to_string(), &node.expr);
        syn::visit::visit_item_const(self, node);
    }

    fn visit_item_static(&mut self, node: &'ast syn::ItemStatic) {
        self.insert(node.ident.to_string(), &node.expr);
        syn::visit::visit_item_static(self, node);
    }

    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        if let Some(type_name) = self_type_name(node) {
            for item in &node.items {
                if let ImplItem::Const(constant) = item {
                    self.insert(format!("{}::{}", type_name, constant.ident), &constant.expr);
                }
            }
        }
        syn::visit::visit_item_impl(self, node);
    }
}

/// Maps names brought into scope by `use` to their full paths.
#[derive(Default)]
struct ImportCollector {
    aliases: HashMap<String, String>,
}

impl ImportCollector {
    fn collect(&mut self, tree: &UseTree, prefix: &mut Vec<String>) {
        match tree {
            UseTree::Path(path) => {
                prefix.push(path.ident.to_string());
                self.collect(&path.tree, prefix);
                prefix.pop();
            }
            UseTree::Name(name) => {
                let ident = name.ident.to_string();
                if ident == "self" {
                    if let Some(last) = prefix.last() {
                        self.aliases.insert(last.clone(), prefix.join("::"));
                    }
                } else {
                    let full = join_path(prefix, &ident);
                    self.aliases.insert(ident, full);
                }
            }
            UseTree::Rename(rename) => {
                let original = rename.ident.to_string();
                let full = if original == "self" {
                    prefix.join("::")
                } else {
                    join_path(prefix, &original)
                };
                self.aliases.insert(rename.rename.to_string(), full);
            }
            UseTree::Group(group) => {
                for item in &group.items {
                    self.collect(item, prefix);
                }
            }
            // Glob imports can't be qualified without resolving the module
            UseTree::Glob(_) => {}
        }
    }
}

impl<'ast> Visit<'ast> for ImportCollector {
    fn visit_item_use(&mut self, node: &'ast syn::ItemUse) {
        self.collect(&node.tree, &mut Vec::new());
    }
}

fn join_path(prefix: &[String], last: &str) -> String {
    if prefix.is_empty() {
        last.to_string()
    } else {
        format!("{}::{}", prefix.join("::"), last)
    }
}

/// Turns `impl` blocks into classes.
struct ClassCollector<'a> {
    constants: &'a HashMap<String, Expr>,
    imports: &'a HashMap<String, String>,
    classes: Vec<ClassDecl>,
}

impl<'ast> Visit<'ast> for ClassCollector<'_> {
    fn visit_item_impl(&mut self, node: &'ast ItemImpl) {
        if let Some(class) = self.convert_impl(node) {
            self.classes.push(class);
        }
        syn::visit::visit_item_impl(self, node);
    }
}

impl ClassCollector<'_> {
    fn convert_impl(&self, item: &ItemImpl) -> Option<ClassDecl> {
        let Type::Path(type_path) = item.self_ty.as_ref() else {
            return None;
        };
        let name = type_path.path.segments.last()?.ident.to_string();
        let qualified_name = path_to_string(&type_path.path);

        let methods = item
            .items
            .iter()
            .filter_map(|impl_item| match impl_item {
                ImplItem::Fn(method) => Some(self.convert_method(method, &name)),
                _ => None,
            })
            .collect();

        Some(ClassDecl {
            annotations: self.convert_attributes(&item.attrs, &name),
            doc_comment: doc_text(&item.attrs),
            name,
            qualified_name,
            methods,
        })
    }

    fn convert_method(&self, method: &ImplItemFn, self_type: &str) -> MethodDecl {
        let doc_comment = doc_text(&method.attrs);

        let parameters = method
            .sig
            .inputs
            .iter()
            .enumerate()
            .filter_map(|(index, input)| match input {
                FnArg::Receiver(_) => None,
                FnArg::Typed(typed) => {
                    let name = pattern_name(&typed.pat).unwrap_or_else(|| format!("arg{}", index));
                    let doc = doc_text(&typed.attrs).or_else(|| {
                        doc_comment
                            .as_deref()
                            .and_then(|doc| parameter_doc(doc, &name))
                    });
                    Some(ParamDecl {
                        annotations: self.convert_attributes(&typed.attrs, self_type),
                        doc_comment: doc,
                        type_name: render_type(&typed.ty),
                        name,
                    })
                }
            })
            .collect();

        MethodDecl {
            name: method.sig.ident.to_string(),
            annotations: self.convert_attributes(&method.attrs, self_type),
            parameters,
            doc_comment,
        }
    }

    fn convert_attributes(&self, attrs: &[Attribute], self_type: &str) -> Vec<Annotation> {
        attrs
            .iter()
            .filter(|attr| !attr.path().is_ident("doc"))
            .map(|attr| self.convert_attribute(attr, self_type))
            .collect()
    }

    fn convert_attribute(&self, attr: &Attribute, self_type: &str) -> Annotation {
        let name = self.qualify(attr.path());
        let mut converter = ExpressionConverter::new(self.constants, self_type);

        let attributes = match &attr.meta {
            Meta::Path(_) => Vec::new(),
            Meta::NameValue(name_value) => vec![AnnotationAttribute {
                name: "value".to_string(),
                value: converter.convert(&name_value.value),
            }],
            Meta::List(list) => {
                match list.parse_args_with(Punctuated::<Expr, Token![,]>::parse_terminated) {
                    Ok(args) => converter.convert_arguments(&args),
                    Err(e) => {
                        debug!("Ignoring arguments of attribute '{}': {}", name, e);
                        Vec::new()
                    }
                }
            }
        };

        Annotation { name, attributes }
    }

    /// Expands the first path segment through the file's imports.
    fn qualify(&self, path: &syn::Path) -> String {
        let mut segments = path.segments.iter().map(|s| s.ident.to_string());
        let Some(first) = segments.next() else {
            return String::new();
        };

        let mut qualified = self.imports.get(&first).cloned().unwrap_or(first);
        for segment in segments {
            qualified.push_str("::");
            qualified.push_str(&segment);
        }
        qualified
    }
}

/// Upper bound on constant expansions inlined into one attribute.
const MAX_CONSTANT_EXPANSIONS: usize = 1024;

/// Converts `syn` expressions to model expressions, following constants.
struct ExpressionConverter<'a> {
    constants: &'a HashMap<String, Expr>,
    self_type: &'a str,
    /// Constants currently being expanded, to stop on cycles
    expanding: Vec<String>,
    /// Complete expansions with the number of constants they inline
    expanded: HashMap<String, (Expression, usize)>,
    expansions: usize,
    /// Bumped whenever an expansion is cut short, so partial values are not cached
    cuts: usize,
}

impl<'a> ExpressionConverter<'a> {
    fn new(constants: &'a HashMap<String, Expr>, self_type: &'a str) -> Self {
        Self {
            constants,
            self_type,
            expanding: Vec::new(),
            expanded: HashMap::new(),
            expansions: 0,
            cuts: 0,
        }
    }

    /// `path = expr` arguments become named attributes; positional ones
    /// become `value` (an array when there are several).
    fn convert_arguments(&mut self, args: &Punctuated<Expr, Token![,]>) -> Vec<AnnotationAttribute> {
        let mut attributes = Vec::new();
        let mut positional = Vec::new();

        for arg in args {
            match arg {
                Expr::Assign(assign) => {
                    let Expr::Path(left) = assign.left.as_ref() else {
                        continue;
                    };
                    let Some(ident) = left.path.get_ident() else {
                        continue;
                    };
                    attributes.push(AnnotationAttribute {
                        name: ident.to_string(),
                        value: self.convert(&assign.right),
                    });
                }
                other => positional.push(self.convert(other)),
            }
        }

        let value = match positional.len() {
            0 => None,
            1 => positional.pop(),
            _ => Some(Expression::Array(positional)),
        };
        if let Some(value) = value {
            attributes.insert(
                0,
                AnnotationAttribute {
                    name: "value".to_string(),
                    value,
                },
            );
        }

        attributes
    }

    fn convert(&mut self, expr: &Expr) -> Expression {
        match expr {
            Expr::Lit(lit) => literal_text(&lit.lit)
                .map(Expression::Literal)
                .unwrap_or(Expression::Other),
            Expr::Binary(binary) if matches!(binary.op, BinOp::Add(_)) => {
                let left = self.convert(&binary.left);
                let right = self.convert(&binary.right);
                Expression::concat(left, right)
            }
            Expr::Path(path) => self.field_reference(&path.path),
            Expr::Array(array) => {
                Expression::Array(array.elems.iter().map(|e| self.convert(e)).collect())
            }
            Expr::Paren(paren) => self.convert(&paren.expr),
            Expr::Group(group) => self.convert(&group.expr),
            Expr::Reference(reference) => self.convert(&reference.expr),
            Expr::Macro(mac) if mac.mac.path.is_ident("concat") => self.convert_concat(&mac.mac),
            _ => Expression::Other,
        }
    }

    /// `concat!(a, b, c)` as `(a + b) + c`.
    fn convert_concat(&mut self, mac: &syn::Macro) -> Expression {
        let Ok(args) = mac.parse_body_with(Punctuated::<Expr, Token![,]>::parse_terminated) else {
            return Expression::Other;
        };

        let mut parts = args.iter().map(|arg| self.convert(arg)).collect::<Vec<_>>().into_iter();
        let Some(first) = parts.next() else {
            return Expression::literal("");
        };
        parts.fold(first, Expression::concat)
    }

    fn field_reference(&mut self, path: &syn::Path) -> Expression {
        let mut segments: Vec<String> = path.segments.iter().map(|s| s.ident.to_string()).collect();
        if segments.first().map(String::as_str) == Some("Self") {
            segments[0] = self.self_type.to_string();
        }
        let name = segments.join("::");

        // Full path first, then `Type::CONST`, then the bare constant name
        let mut candidates = vec![name.clone()];
        if segments.len() > 2 {
            candidates.push(segments[segments.len() - 2..].join("::"));
        }
        if segments.len() > 1 {
            candidates.extend(segments.last().cloned());
        }

        let constants = self.constants;
        let found = candidates
            .into_iter()
            .find_map(|key| constants.get(&key).map(|expr| (key, expr)));

        let Some((key, initializer)) = found else {
            return Expression::field(name, None);
        };
        if let Some((value, weight)) = self.expanded.get(&key).cloned() {
            if self.expansions + weight > MAX_CONSTANT_EXPANSIONS {
                debug!("Constant expansion limit reached at '{}'", key);
                self.cuts += 1;
                return Expression::field(name, None);
            }
            self.expansions += weight;
            return Expression::field(name, Some(value));
        }
        if self.expanding.contains(&key) {
            debug!("Constant '{}' refers to itself", key);
            self.cuts += 1;
            return Expression::field(name, None);
        }
        if self.expansions >= MAX_CONSTANT_EXPANSIONS {
            debug!("Constant expansion limit reached at '{}'", key);
            self.cuts += 1;
            return Expression::field(name, None);
        }

        let (expansions_before, cuts_before) = (self.expansions, self.cuts);
        self.expansions += 1;
        self.expanding.push(key.clone());
        let value = self.convert(initializer);
        self.expanding.pop();

        if self.cuts == cuts_before {
            self.expanded
                .insert(key, (value.clone(), self.expansions - expansions_before));
        }
        Expression::field(name, Some(value))
    }
}

fn literal_text(lit: &Lit) -> Option<String> {
    match lit {
        Lit::Str(s) => Some(s.value()),
        Lit::Char(c) => Some(c.value().to_string()),
        Lit::Int(i) => Some(i.base10_digits().to_string()),
        Lit::Float(f) => Some(f.base10_digits().to_string()),
        Lit::Bool(b) => Some(b.value.to_string()),
        _ => None,
    }
}

fn self_type_name(item: &ItemImpl) -> Option<String> {
    match item.self_ty.as_ref() {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.to_string()),
        _ => None,
    }
}

fn path_to_string(path: &syn::Path) -> String {
    path.segments
        .iter()
        .map(|s| s.ident.to_string())
        .collect::<Vec<_>>()
        .join("::")
}

/// Name bound by a parameter pattern: `id`, `mut id` or `Path(id)`.
fn pattern_name(pat: &Pat) -> Option<String> {
    match pat {
        Pat::Ident(ident) => Some(ident.ident.to_string()),
        Pat::TupleStruct(tuple) if tuple.elems.len() == 1 => tuple.elems.first().and_then(pattern_name),
        Pat::Reference(reference) => pattern_name(&reference.pat),
        _ => None,
    }
}

/// Joined `///` lines, or `None` when there are none.
fn doc_text(attrs: &[Attribute]) -> Option<String> {
    let lines: Vec<String> = attrs
        .iter()
        .filter(|attr| attr.path().is_ident("doc"))
        .filter_map(|attr| match &attr.meta {
            Meta::NameValue(name_value) => match &name_value.value {
                Expr::Lit(syn::ExprLit {
                    lit: Lit::Str(s), ..
                }) => Some(s.value()),
                _ => None,
            },
            _ => None,
        })
        .map(|line| line.strip_prefix(' ').map(str::to_string).unwrap_or(line))
        .collect();

    let text = lines.join("\n").trim().to_string();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

/// Looks up a parameter's description in its method's docs.
///
/// Understands rustdoc argument lists (`` * `id` - user id ``) and
/// `@param id user id` lines.
fn parameter_doc(method_doc: &str, name: &str) -> Option<String> {
    for line in method_doc.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("* `").or_else(|| line.strip_prefix("- `")) {
            if let Some((param, text)) = rest.split_once('`') {
                if param == name {
                    let text = text.trim_start().trim_start_matches(['-', ':']).trim();
                    return Some(text.to_string());
                }
            }
        }

        if let Some(rest) = line.strip_prefix("@param ") {
            let mut parts = rest.trim().splitn(2, char::is_whitespace);
            if parts.next() == Some(name) {
                return Some(parts.next().unwrap_or_default().trim().to_string());
            }
        }
    }
    None
}

/// Renders a parameter type from last path segments: `Vec<User>`, `[u8]`.
fn render_type(ty: &Type) -> Option<String> {
    match ty {
        Type::Path(type_path) => {
            let segment = type_path.path.segments.last()?;
            let name = segment.ident.to_string();
            let PathArguments::AngleBracketed(args) = &segment.arguments else {
                return Some(name);
            };

            let inner: Vec<String> = args
                .args
                .iter()
                .filter_map(|arg| match arg {
                    GenericArgument::Type(ty) => render_type(ty),
                    _ => None,
                })
                .collect();
            if inner.is_empty() {
                Some(name)
            } else {
                Some(format!("{}<{}>", name, inner.join(", ")))
            }
        }
        Type::Reference(reference) => render_type(&reference.elem),
        Type::Slice(slice) => render_type(&slice.elem).map(|t| format!("[{}]", t)),
        Type::Array(array) => render_type(&array.elem).map(|t| format!("[{}]", t)),
        Type::Paren(paren) => render_type(&paren.elem),
        _ => None,
    }
}
