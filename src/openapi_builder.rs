use crate::extractor::{HttpMethod, OperationEntry, ParameterDescriptor, RouteTable};
use crate::schema::{schema_for_type, Schema};
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

/// OpenAPI document builder
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    /// Server base URLs
    servers: Vec<Server>,
    /// Paths collection (URL path -> PathItem), in insertion order
    paths: IndexMap<String, PathItem>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API version
    pub version: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Server object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
}

impl PathItem {
    fn set(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Trace => &mut self.trace,
            HttpMethod::Options => &mut self.options,
        };
        *slot = Some(operation);
    }
}

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Operation {
    /// Operation summary
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    /// Operation description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Operation ID
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameters (path, query)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Vec<Parameter>>,
    /// Responses
    pub responses: IndexMap<String, Response>,
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query)
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required
    pub required: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub deprecated: bool,
    /// Parameter schema
    pub schema: Schema,
    /// Parameter description
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// OpenAPI Response object
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Response {
    /// Response description
    pub description: String,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    /// API info
    pub info: Info,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// API paths
    pub paths: IndexMap<String, PathItem>,
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        Self {
            info: Info {
                title: "Generated API".to_string(),
                version: "1.0.0".to_string(),
                description: Some("API documentation generated from annotated source".to_string()),
            },
            servers: Vec::new(),
            paths: IndexMap::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(mut self, title: String, version: String, description: Option<String>) -> Self {
        self.info = Info {
            title,
            version,
            description,
        };
        self
    }

    /// Set the server base URLs
    pub fn with_servers(mut self, urls: Vec<String>) -> Self {
        self.servers = urls.into_iter().map(|url| Server { url }).collect();
        self
    }

    /// Add every operation of a route table, keeping the table's path order
    pub fn add_route_table(&mut self, table: &RouteTable) {
        for (path, record) in table.paths() {
            for (method, entry) in record.operations() {
                debug!("Adding route: {} {}", method, path);
                let operation = Self::convert_operation(path, entry);
                self.paths
                    .entry(path.clone())
                    .or_default()
                    .set(method, operation);
            }
        }
    }

    fn convert_operation(path: &str, entry: &OperationEntry) -> Operation {
        let parameters = if entry.parameters.is_empty() {
            None
        } else {
            Some(
                entry
                    .parameters
                    .iter()
                    .map(|p| Self::convert_parameter(path, p))
                    .collect(),
            )
        };

        let mut responses = IndexMap::new();
        responses.insert(
            "200".to_string(),
            Response {
                description: "Successful response".to_string(),
            },
        );

        Operation {
            summary: entry.summary.clone(),
            description: entry.description.clone(),
            operation_id: Some(entry.operation_id.clone()),
            tags: entry.tags.clone(),
            deprecated: entry.deprecated,
            parameters,
            responses,
        }
    }

    fn convert_parameter(path: &str, param: &ParameterDescriptor) -> Parameter {
        let in_path = path.contains(&format!("{{{}}}", param.name));
        Parameter {
            name: param.name.clone(),
            location: if in_path { "path" } else { "query" }.to_string(),
            required: in_path || param.required,
            deprecated: param.deprecated,
            schema: schema_for_type(param.type_name.as_deref()),
            description: (!param.description.is_empty()).then(|| param.description.clone()),
        }
    }

    /// Build the final OpenAPI document
    pub fn build(self) -> OpenApiDocument {
        debug!("Building final OpenAPI document with {} paths", self.paths.len());
        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            servers: self.servers,
            paths: self.paths,
        }
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn descriptor(name: &str, required: bool, type_name: Option<&str>) -> ParameterDescriptor {
        ParameterDescriptor {
            name: name.to_string(),
            description: String::new(),
            deprecated: false,
            required,
            type_name: type_name.map(str::to_string),
        }
    }

    fn entry(operation_id: &str, parameters: Vec<ParameterDescriptor>) -> OperationEntry {
        OperationEntry {
            operation_id: operation_id.to_string(),
            tags: vec!["UserHttpHandler".to_string()],
            parameters,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_builder() {
        let doc = OpenApiBuilder::new().build();

        assert_eq!(doc.openapi, "3.0.0");
        assert_eq!(doc.info.title, "Generated API");
        assert_eq!(doc.info.version, "1.0.0");
        assert!(doc.info.description.is_some());
        assert!(doc.servers.is_empty());
        assert!(doc.paths.is_empty());
    }

    #[test]
    fn test_with_info_and_servers() {
        let doc = OpenApiBuilder::new()
            .with_info("My API".to_string(), "2.0.0".to_string(), None)
            .with_servers(vec!["https://api.example.com".to_string()])
            .build();

        assert_eq!(doc.info.title, "My API");
        assert_eq!(doc.info.version, "2.0.0");
        assert_eq!(doc.info.description, None);
        assert_eq!(
            doc.servers,
            vec![Server {
                url: "https://api.example.com".to_string()
            }]
        );
    }

    #[test]
    fn test_path_and_query_parameter_locations() {
        let mut table = RouteTable::new();
        table.insert(
            "/api/users/{id}".to_string(),
            HttpMethod::Get,
            entry(
                "get_user",
                vec![
                    descriptor("id", false, Some("u64")),
                    descriptor("fields", false, None),
                    descriptor("verbose", true, Some("bool")),
                ],
            ),
        );

        let mut builder = OpenApiBuilder::new();
        builder.add_route_table(&table);
        let doc = builder.build();

        let operation = doc.paths["/api/users/{id}"].get.as_ref().unwrap();
        let params = operation.parameters.as_ref().unwrap();
        assert_eq!(params[0].location, "path");
        assert!(params[0].required, "path parameters are always required");
        assert_eq!(params[0].schema.format.as_deref(), Some("int64"));
        assert_eq!(params[1].location, "query");
        assert!(!params[1].required);
        assert_eq!(params[1].schema, Schema::string());
        assert_eq!(params[2].location, "query");
        assert!(params[2].required);
        assert_eq!(params[2].schema.schema_type, "boolean");
    }

    #[test]
    fn test_operation_metadata_is_copied() {
        let mut table = RouteTable::new();
        let mut op = entry("remove", vec![]);
        op.summary = Some("Deletes a user.".to_string());
        op.description = Some("Soft delete only.".to_string());
        op.deprecated = true;
        table.insert("/api/users".to_string(), HttpMethod::Delete, op);

        let mut builder = OpenApiBuilder::new();
        builder.add_route_table(&table);
        let doc = builder.build();

        let operation = doc.paths["/api/users"].delete.as_ref().unwrap();
        assert_eq!(operation.operation_id.as_deref(), Some("remove"));
        assert_eq!(operation.summary.as_deref(), Some("Deletes a user."));
        assert_eq!(operation.description.as_deref(), Some("Soft delete only."));
        assert_eq!(operation.tags, vec!["UserHttpHandler"]);
        assert!(operation.deprecated);
        assert!(operation.parameters.is_none());
        assert_eq!(operation.responses["200"].description, "Successful response");
    }

    #[test]
    fn test_paths_keep_table_order() {
        let mut table = RouteTable::new();
        table.insert("/z".to_string(), HttpMethod::Get, entry("z", vec![]));
        table.insert("/a".to_string(), HttpMethod::Trace, entry("a", vec![]));
        table.insert("/m".to_string(), HttpMethod::Post, entry("m", vec![]));

        let mut builder = OpenApiBuilder::new();
        builder.add_route_table(&table);
        let doc = builder.build();

        let paths: Vec<_> = doc.paths.keys().cloned().collect();
        assert_eq!(paths, vec!["/z", "/a", "/m"]);
        assert!(doc.paths["/a"].trace.is_some());
    }

    #[test]
    fn test_serialized_field_names() {
        let mut table = RouteTable::new();
        table.insert(
            "/api/users/{id}".to_string(),
            HttpMethod::Get,
            entry("get_user", vec![descriptor("id", true, Some("i32"))]),
        );

        let mut builder = OpenApiBuilder::new();
        builder.add_route_table(&table);
        let json = serde_json::to_value(builder.build()).unwrap();

        let op = &json["paths"]["/api/users/{id}"]["get"];
        assert_eq!(op["operationId"], "get_user");
        assert_eq!(op["parameters"][0]["in"], "path");
        assert_eq!(op["parameters"][0]["schema"]["type"], "integer");
        assert!(op.get("deprecated").is_none());
        assert!(json.get("servers").is_none());
    }
}
