//! Serialization of generated documents to YAML or JSON.
//!
//! Works for any `Serialize` value, so both OpenAPI documents and raw route
//! tables go through the same functions.

use anyhow::{Context, Result};
use log::debug;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serializes a value to YAML format.
///
/// # Example
///
/// ```
/// use webdoc_routes::openapi_builder::OpenApiBuilder;
/// use webdoc_routes::serializer::serialize_yaml;
///
/// let doc = OpenApiBuilder::new().build();
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.contains("openapi:"));
/// ```
pub fn serialize_yaml<T: Serialize>(value: &T) -> Result<String> {
    debug!("Serializing document to YAML");
    serde_yaml::to_string(value).context("Failed to serialize document to YAML")
}

/// Serializes a value to JSON format with pretty printing.
pub fn serialize_json<T: Serialize>(value: &T) -> Result<String> {
    debug!("Serializing document to JSON");
    serde_json::to_string_pretty(value).context("Failed to serialize document to JSON")
}

/// Writes string content to a file.
///
/// Creates the file and any missing parent directories, or overwrites an
/// existing file.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::{HttpMethod, OperationEntry, RouteTable};
    use crate::openapi_builder::{OpenApiBuilder, OpenApiDocument};
    use tempfile::TempDir;

    fn create_test_document() -> OpenApiDocument {
        let mut table = RouteTable::new();
        table.insert(
            "/api/users".to_string(),
            HttpMethod::Get,
            OperationEntry {
                operation_id: "list".to_string(),
                ..Default::default()
            },
        );

        let mut builder = OpenApiBuilder::new().with_info(
            "Test API".to_string(),
            "1.0.0".to_string(),
            Some("A test API".to_string()),
        );
        builder.add_route_table(&table);
        builder.build()
    }

    #[test]
    fn test_serialize_yaml() {
        let yaml = serialize_yaml(&create_test_document()).unwrap();

        assert!(yaml.contains("openapi:"));
        assert!(yaml.contains("3.0.0"));
        assert!(yaml.contains("title: Test API"));
        assert!(yaml.contains("description: A test API"));
        assert!(yaml.contains("/api/users:"));
        assert!(yaml.contains("operationId: list"));
    }

    #[test]
    fn test_serialize_json_pretty_format() {
        let json = serialize_json(&create_test_document()).unwrap();

        assert!(json.contains('\n'));
        assert!(json.lines().count() > 5);

        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["openapi"], "3.0.0");
        assert_eq!(parsed["paths"]["/api/users"]["get"]["operationId"], "list");
    }

    #[test]
    fn test_serialize_route_table() {
        let mut table = RouteTable::new();
        table.insert(
            "/ping".to_string(),
            HttpMethod::Head,
            OperationEntry {
                operation_id: "ping".to_string(),
                ..Default::default()
            },
        );

        let json = serialize_json(&table).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["/ping"]["head"]["operation_id"], "ping");
    }

    #[test]
    fn test_write_to_file_creates_directories() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("subdir").join("nested").join("openapi.yaml");

        write_to_file("test content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "test content");
    }

    #[test]
    fn test_write_to_file_overwrites_existing() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.json");

        write_to_file("initial content", &file_path).unwrap();
        write_to_file("new content", &file_path).unwrap();

        assert_eq!(fs::read_to_string(&file_path).unwrap(), "new content");
    }

    #[test]
    fn test_written_yaml_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let file_path = temp_dir.path().join("openapi.yaml");

        let yaml = serialize_yaml(&create_test_document()).unwrap();
        write_to_file(&yaml, &file_path).unwrap();

        let content = fs::read_to_string(&file_path).unwrap();
        let doc: OpenApiDocument = serde_yaml::from_str(&content).unwrap();
        assert_eq!(doc.info.title, "Test API");
        assert!(doc.paths["/api/users"].get.is_some());
    }
}
