use crate::config::DocConfig;
use crate::declaration::rust::{parse_files, RustDeclarationLoader};
use crate::declaration::{load_model, DeclarationModel};
use crate::extractor::RouteExtractor;
use crate::mapping::default_registry;
use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
use crate::scanner::FileScanner;
use crate::serializer::{serialize_json, serialize_yaml, write_to_file};
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{debug, info, warn};
use std::path::{Path, PathBuf};

/// Route documentation generator - Extracts HTTP routes from annotated handler classes
#[derive(Parser, Debug)]
#[command(name = "webdoc-routes")]
#[command(author, version, about, long_about = None)]
pub struct CliArgs {
    /// Path to the project directory
    #[arg(value_name = "PROJECT_PATH", required_unless_present = "declarations")]
    pub project_path: Option<PathBuf>,

    /// Output format (yaml or json)
    #[arg(short = 'f', long = "format", value_enum, default_value = "yaml")]
    pub output_format: OutputFormat,

    /// Output file path (if not specified, outputs to stdout)
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output_path: Option<PathBuf>,

    /// JSON configuration file
    #[arg(short = 'c', long = "config", value_name = "FILE")]
    pub config_path: Option<PathBuf>,

    /// Read a prebuilt declaration model (JSON or YAML) instead of scanning sources
    #[arg(long = "declarations", value_name = "FILE", conflicts_with = "project_path")]
    pub declarations: Option<PathBuf>,

    /// API title, overrides the config file
    #[arg(long = "title")]
    pub title: Option<String>,

    /// API version, overrides the config file
    #[arg(long = "api-version")]
    pub api_version: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long = "verbose")]
    pub verbose: bool,
}

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML format
    Yaml,
    /// JSON format
    Json,
}

/// Validate and log already-parsed arguments
pub fn parse_args_from_parsed(args: CliArgs) -> Result<CliArgs> {
    debug!("Parsed arguments: {:?}", args);

    if let Some(project_path) = &args.project_path {
        if !project_path.exists() {
            anyhow::bail!("Project path does not exist: {}", project_path.display());
        }
        if !project_path.is_dir() {
            anyhow::bail!("Project path is not a directory: {}", project_path.display());
        }
        info!("Project path: {}", project_path.display());
    }

    if let Some(declarations) = &args.declarations {
        if !declarations.is_file() {
            anyhow::bail!("Declaration model file not found: {}", declarations.display());
        }
        info!("Declaration model: {}", declarations.display());
    }

    if args.project_path.is_none() && args.declarations.is_none() {
        anyhow::bail!("Either a project path or --declarations must be given");
    }

    if let Some(config) = &args.config_path {
        if !config.is_file() {
            anyhow::bail!("Config file not found: {}", config.display());
        }
    }

    info!("Output format: {:?}", args.output_format);
    if let Some(ref output) = args.output_path {
        info!("Output file: {}", output.display());
    } else {
        info!("Output: stdout");
    }

    Ok(args)
}

/// Builds the OpenAPI document described by the arguments
pub fn generate_document(args: &CliArgs) -> Result<OpenApiDocument> {
    let config = match &args.config_path {
        Some(path) => DocConfig::load(path)
            .with_context(|| format!("Failed to load config file {}", path.display()))?,
        None => DocConfig::default(),
    }
    .with_overrides(args.title.clone(), args.api_version.clone());

    let model = match (&args.declarations, &args.project_path) {
        (Some(declarations), _) => load_model(declarations).with_context(|| {
            format!("Failed to load declaration model {}", declarations.display())
        })?,
        (None, Some(project_path)) => scan_project(project_path, &config)?,
        (None, None) => anyhow::bail!("Either a project path or --declarations must be given"),
    };

    info!("Extracting routes from {} classes...", model.classes().len());
    let table = RouteExtractor::new(default_registry()).extract(&model)?;
    if table.is_empty() {
        warn!("No routes found");
    }

    let mut builder = OpenApiBuilder::new()
        .with_info(
            config.title().to_string(),
            config.version().to_string(),
            config.description.clone(),
        )
        .with_servers(config.servers.clone());
    builder.add_route_table(&table);

    Ok(builder.build())
}

fn scan_project(project_path: &Path, config: &DocConfig) -> Result<DeclarationModel> {
    info!("Scanning project directory...");
    let scanner = FileScanner::new(project_path.to_path_buf()).with_filter(config.source_filter()?);
    let scan_result = scanner.scan()?;

    info!("Found {} Rust files", scan_result.rust_files.len());
    if scan_result.rust_files.is_empty() {
        anyhow::bail!("No Rust files found in the project directory");
    }

    let parsed_files = parse_files(&scan_result.rust_files);
    info!("Successfully parsed {} files", parsed_files.len());
    if parsed_files.is_empty() {
        anyhow::bail!("No files could be parsed successfully");
    }

    Ok(RustDeclarationLoader::load(&parsed_files))
}

/// Run the main workflow
pub fn run(args: CliArgs) -> Result<()> {
    info!("Starting route documentation generation...");

    let document = generate_document(&args)?;
    let operations: usize = document
        .paths
        .values()
        .map(|item| {
            [
                &item.get,
                &item.post,
                &item.put,
                &item.patch,
                &item.delete,
                &item.head,
                &item.trace,
                &item.options,
            ]
            .into_iter()
            .filter(|op| op.is_some())
            .count()
        })
        .sum();

    info!("Serializing to {:?} format...", args.output_format);
    let content = match args.output_format {
        OutputFormat::Yaml => serialize_yaml(&document)?,
        OutputFormat::Json => serialize_json(&document)?,
    };

    if let Some(output_path) = &args.output_path {
        write_to_file(&content, output_path)?;
        info!("Successfully wrote document to {}", output_path.display());
    } else {
        println!("{}", content);
    }

    info!("Generation complete!");
    info!("  - Paths: {}", document.paths.len());
    info!("  - Operations: {}", operations);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_project_path_or_declarations_required() {
        assert!(CliArgs::try_parse_from(["webdoc-routes"]).is_err());
        assert!(CliArgs::try_parse_from(["webdoc-routes", "--declarations", "model.json"]).is_ok());
    }

    #[test]
    fn test_project_path_conflicts_with_declarations() {
        let result =
            CliArgs::try_parse_from(["webdoc-routes", ".", "--declarations", "model.json"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_defaults() {
        let args = CliArgs::try_parse_from(["webdoc-routes", "./project"]).unwrap();

        assert_eq!(args.project_path, Some(PathBuf::from("./project")));
        assert_eq!(args.output_format, OutputFormat::Yaml);
        assert!(args.output_path.is_none());
        assert!(args.config_path.is_none());
        assert!(!args.verbose);
    }

    #[test]
    fn test_all_flags() {
        let args = CliArgs::try_parse_from([
            "webdoc-routes",
            "./project",
            "-f",
            "json",
            "-o",
            "out.json",
            "-c",
            "webdoc.json",
            "--title",
            "Users",
            "--api-version",
            "3.0.1",
            "-v",
        ])
        .unwrap();

        assert_eq!(args.output_format, OutputFormat::Json);
        assert_eq!(args.output_path, Some(PathBuf::from("out.json")));
        assert_eq!(args.config_path, Some(PathBuf::from("webdoc.json")));
        assert_eq!(args.title.as_deref(), Some("Users"));
        assert_eq!(args.api_version.as_deref(), Some("3.0.1"));
        assert!(args.verbose);
    }

    #[test]
    fn test_validation_rejects_missing_project() {
        let args = CliArgs::try_parse_from(["webdoc-routes", "/definitely/not/here"]).unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_validation_rejects_file_as_project() {
        let temp_dir = TempDir::new().unwrap();
        let file = temp_dir.path().join("lib.rs");
        fs::write(&file, "").unwrap();

        let args = CliArgs::try_parse_from(["webdoc-routes", file.to_str().unwrap()]).unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_validation_rejects_missing_config() {
        let temp_dir = TempDir::new().unwrap();
        let args = CliArgs::try_parse_from([
            "webdoc-routes",
            temp_dir.path().to_str().unwrap(),
            "-c",
            "missing.json",
        ])
        .unwrap();
        assert!(parse_args_from_parsed(args).is_err());
    }

    #[test]
    fn test_generate_from_declaration_model() {
        let temp_dir = TempDir::new().unwrap();
        let model_path = temp_dir.path().join("model.json");
        fs::write(
            &model_path,
            r#"{
              "classes": [{
                "name": "PingHandler",
                "annotations": [{"name": "infra::web::annotation::rest_controller"}],
                "methods": [{
                  "name": "ping",
                  "annotations": [{
                    "name": "infra::web::annotation::get",
                    "attributes": [{"name": "value", "value": {"literal": "\"/ping\""}}]
                  }]
                }]
              }]
            }"#,
        )
        .unwrap();

        let args = CliArgs::try_parse_from([
            "webdoc-routes",
            "--declarations",
            model_path.to_str().unwrap(),
            "--title",
            "Ping",
        ])
        .unwrap();
        let doc = generate_document(&args).unwrap();

        assert_eq!(doc.info.title, "Ping");
        assert_eq!(doc.info.version, "1.0.0");
        let op = doc.paths["/ping"].get.as_ref().unwrap();
        assert_eq!(op.operation_id.as_deref(), Some("ping"));
    }

    #[test]
    fn test_generate_fails_on_empty_project() {
        let temp_dir = TempDir::new().unwrap();
        let args =
            CliArgs::try_parse_from(["webdoc-routes", temp_dir.path().to_str().unwrap()]).unwrap();

        assert!(generate_document(&args).is_err());
    }
}
