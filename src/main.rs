//! webdoc-routes - Command-line tool for generating route documentation.
//!
//! Scans a project for handler classes carrying mapping annotations and writes
//! the resulting OpenAPI 3.0 document.
//!
//! # Usage
//!
//! ```bash
//! webdoc-routes [OPTIONS] <PROJECT_PATH>
//! webdoc-routes [OPTIONS] --declarations <FILE>
//! ```
//!
//! # Examples
//!
//! Generate YAML documentation:
//! ```bash
//! webdoc-routes ./user-service -o openapi.yaml
//! ```
//!
//! Generate JSON with a config file:
//! ```bash
//! webdoc-routes ./user-service -c webdoc.json -f json -o openapi.json
//! ```
//!
//! Enable verbose logging:
//! ```bash
//! webdoc-routes ./user-service -v
//! ```

mod cli;
mod config;
mod scanner;
mod declaration;
mod resolver;
mod mapping;
mod extractor;
mod schema;
mod openapi_builder;
mod serializer;
mod error;

use anyhow::Result;
use clap::Parser;
use log::info;

fn main() -> Result<()> {
    // Parse once to read the verbose flag, validate after the logger is up
    let args_for_verbose = cli::CliArgs::parse();

    let log_level = if args_for_verbose.verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };

    env_logger::Builder::from_default_env()
        .filter_level(log_level)
        .init();

    info!("webdoc-routes starting...");

    let args = cli::parse_args_from_parsed(args_for_verbose)?;
    cli::run(args)?;

    info!("Route documentation generated successfully");

    Ok(())
}
