//! Route documentation from annotated handler declarations.
//!
//! This library statically derives an HTTP route table from annotated source
//! declarations and projects it onto an OpenAPI 3.0 document. Nothing is
//! compiled or executed; routes come from mapping annotations alone.
//!
//! # Architecture
//!
//! 1. [`scanner`] - Recursively scans project directories for Rust files
//! 2. [`declaration`] - Declaration model, built from Rust sources by
//!    [`declaration::rust`] or loaded from JSON/YAML
//! 3. [`resolver`] - Evaluates annotation attribute expressions to strings
//! 4. [`mapping`] - Registry of route-bearing annotations and their attributes
//! 5. [`extractor`] - Builds the route table from endpoint classes
//! 6. [`openapi_builder`] / [`schema`] - Constructs the OpenAPI document
//! 7. [`serializer`] - Serializes the document to YAML or JSON
//!
//! # Example Usage
//!
//! ```no_run
//! use webdoc_routes::{
//!     declaration::rust::{parse_files, RustDeclarationLoader},
//!     extractor::RouteExtractor,
//!     mapping::default_registry,
//!     openapi_builder::OpenApiBuilder,
//!     scanner::FileScanner,
//!     serializer::serialize_yaml,
//! };
//! use std::path::PathBuf;
//!
//! let scan_result = FileScanner::new(PathBuf::from("./my-project")).scan().unwrap();
//! let parsed_files = parse_files(&scan_result.rust_files);
//! let model = RustDeclarationLoader::load(&parsed_files);
//!
//! let table = RouteExtractor::new(default_registry()).extract(&model).unwrap();
//!
//! let mut builder = OpenApiBuilder::new();
//! builder.add_route_table(&table);
//! println!("{}", serialize_yaml(&builder.build()).unwrap());
//! ```
//!
//! # Command-Line Interface
//!
//! For command-line usage, see the [`cli`] module.

pub mod cli;
pub mod config;
pub mod scanner;
pub mod declaration;
pub mod resolver;
pub mod mapping;
pub mod extractor;
pub mod schema;
pub mod openapi_builder;
pub mod serializer;
pub mod error;
