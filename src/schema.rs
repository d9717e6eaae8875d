use serde::{Deserialize, Serialize};

/// OpenAPI schema of a parameter value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// The type of the schema (string, integer, number, boolean, array)
    #[serde(rename = "type")]
    pub schema_type: String,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
}

impl Schema {
    fn primitive(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: schema_type.to_string(),
            format: format.map(str::to_string),
            items: None,
        }
    }

    fn array(items: Schema) -> Self {
        Self {
            schema_type: "array".to_string(),
            format: None,
            items: Some(Box::new(items)),
        }
    }

    pub fn string() -> Self {
        Self::primitive("string", None)
    }
}

/// Maps a declared parameter type to a schema.
///
/// Unknown or missing types fall back to `string`.
pub fn schema_for_type(type_name: Option<&str>) -> Schema {
    let Some(type_name) = type_name else {
        return Schema::string();
    };
    let compact: String = type_name.chars().filter(|c| !c.is_whitespace()).collect();
    schema_for_compact(strip_reference(&compact))
}

fn schema_for_compact(type_name: &str) -> Schema {
    if let Some(inner) = generic_argument(type_name, "Option") {
        return schema_for_compact(strip_reference(inner));
    }
    if let Some(inner) = generic_argument(type_name, "Vec") {
        return Schema::array(schema_for_compact(strip_reference(inner)));
    }
    if let Some(inner) = type_name.strip_prefix('[').and_then(|s| s.strip_suffix(']')) {
        let element = inner.split(';').next().unwrap_or(inner);
        return Schema::array(schema_for_compact(strip_reference(element)));
    }

    match last_segment(type_name) {
        "i8" | "i16" | "i32" | "u8" | "u16" | "u32" => Schema::primitive("integer", Some("int32")),
        "i64" | "i128" | "u64" | "u128" | "isize" | "usize" => {
            Schema::primitive("integer", Some("int64"))
        }
        "f32" => Schema::primitive("number", Some("float")),
        "f64" => Schema::primitive("number", Some("double")),
        "bool" => Schema::primitive("boolean", None),
        _ => Schema::string(),
    }
}

/// `Option<T>` → `T` for the given wrapper, also when path-qualified.
fn generic_argument<'a>(type_name: &'a str, wrapper: &str) -> Option<&'a str> {
    let open = type_name.find('<')?;
    let inner = type_name[open + 1..].strip_suffix('>')?;
    (last_segment(&type_name[..open]) == wrapper).then_some(inner)
}

fn last_segment(type_name: &str) -> &str {
    type_name.rsplit("::").next().unwrap_or(type_name)
}

fn strip_reference(type_name: &str) -> &str {
    let mut rest = type_name;
    while let Some(stripped) = rest.strip_prefix('&') {
        rest = stripped.strip_prefix("mut").unwrap_or(stripped);
    }
    rest
}
