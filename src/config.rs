//! Optional JSON configuration file.
//!
//! ```json
//! {
//!   "title": "User Service",
//!   "version": "2.1.0",
//!   "servers": ["https://api.example.com"],
//!   "exclude": ["tests/.*", ".*_test\\.rs"]
//! }
//! ```
//!
//! Every field is optional. Command-line flags take precedence over values
//! read from the file.

use crate::error::{Error, Result};
use crate::scanner::SourceFilter;
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_TITLE: &str = "Generated API";
pub const DEFAULT_VERSION: &str = "1.0.0";

/// Document metadata and source selection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DocConfig {
    pub title: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
    /// Server base URLs
    pub servers: Vec<String>,
    /// Regex patterns of source paths to keep
    pub include: Vec<String>,
    /// Regex patterns of source paths to drop
    pub exclude: Vec<String>,
}

impl DocConfig {
    /// Reads a config file.
    ///
    /// # Errors
    ///
    /// I/O failures and malformed JSON are reported with the file path.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading configuration from {}", path.display());
        let content = fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Applies command-line overrides on top of file values.
    pub fn with_overrides(mut self, title: Option<String>, version: Option<String>) -> Self {
        if title.is_some() {
            self.title = title;
        }
        if version.is_some() {
            self.version = version;
        }
        self
    }

    pub fn title(&self) -> &str {
        self.title.as_deref().unwrap_or(DEFAULT_TITLE)
    }

    pub fn version(&self) -> &str {
        self.version.as_deref().unwrap_or(DEFAULT_VERSION)
    }

    /// Compiles the include/exclude patterns.
    pub fn source_filter(&self) -> Result<SourceFilter> {
        SourceFilter::new(&self.include, &self.exclude)
    }
}
