//! JSON schema and example generation from parsed signatures

use orbu_domain::{JsonType, MethodSignature, ParameterInfo, TypeInfo};
use serde_json::{json, Map, Value};

use super::types::inner_type;

/// Request schema: one property per parameter.
///
/// `required` is omitted when every parameter has a default. Defaults are
/// carried verbatim as strings.
pub fn request_schema(signature: &MethodSignature) -> Value {
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &signature.parameters {
        let mut property = Map::new();
        property.insert("type".into(), json!(param.type_info.json_type.as_str()));
        property.insert(
            "description".into(),
            json!(format!("Type: {}", param.type_info.source_type)),
        );
        if let Some(default) = &param.default {
            property.insert("default".into(), json!(default));
        }
        properties.insert(param.name.clone(), Value::Object(property));

        if param.required {
            required.push(json!(param.name));
        }
    }

    let mut schema = Map::new();
    schema.insert("type".into(), json!("object"));
    schema.insert("properties".into(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".into(), Value::Array(required));
    }
    Value::Object(schema)
}

/// Response schema: the gateway envelope with `data` inferred from the
/// return type, or from the method name when no return type is declared.
pub fn response_schema(signature: &MethodSignature) -> Value {
    let data = match &signature.return_type {
        Some(return_type) => data_schema_from_type(return_type),
        None => data_schema_from_name(&signature.method_name),
    };

    json!({
        "type": "object",
        "properties": {
            "success": {"type": "boolean"},
            "data": data,
            "meta": {
                "type": "object",
                "properties": {
                    "duration_ms": {"type": "integer"},
                    "endpoint_id": {"type": "string"},
                    "executed_at": {"type": "string", "format": "date-time"}
                }
            },
            "error": {"type": "string"}
        },
        "required": ["success", "data"]
    })
}

/// Example request body with one placeholder value per parameter.
pub fn example_request(signature: &MethodSignature) -> Value {
    let example: Map<String, Value> = signature
        .parameters
        .iter()
        .map(|param| (param.name.clone(), example_value(param)))
        .collect();
    Value::Object(example)
}

fn example_value(param: &ParameterInfo) -> Value {
    match param.default.as_deref() {
        Some(default) if default != "None" => json!(default),
        _ => type_example(param.type_info.json_type),
    }
}

fn type_example(json_type: JsonType) -> Value {
    match json_type {
        JsonType::String => json!(""),
        JsonType::Integer => json!(0),
        JsonType::Number => json!(0.0),
        JsonType::Boolean => json!(true),
        JsonType::Array => json!([]),
        JsonType::Object => json!({}),
        JsonType::Null | JsonType::Any => Value::Null,
    }
}

fn data_schema_from_type(return_type: &TypeInfo) -> Value {
    let source = &return_type.source_type;
    let lower = source.to_lowercase();

    if return_type.json_type == JsonType::Array || lower.contains("list") {
        let item = inner_type(source).unwrap_or(source);
        return json!({
            "type": "array",
            "items": {"type": "object"},
            "description": format!("Array of {item} objects"),
        });
    }

    match return_type.json_type {
        JsonType::Boolean => status_schema(format!("Operation status - Type: {source}")),
        JsonType::String | JsonType::Integer | JsonType::Number => json!({
            "type": return_type.json_type.as_str(),
            "description": format!("Type: {source}"),
        }),
        JsonType::Object => json!({
            "type": "object",
            "description": format!("Single object - Type: {source}"),
        }),
        JsonType::Array | JsonType::Null | JsonType::Any => json!({
            "type": return_type.json_type.as_str(),
            "description": format!("Type: {source}"),
        }),
    }
}

const ARRAY_NAME_KEYWORDS: [&str; 4] = ["list", "query", "search", "get_all"];
const STATUS_NAME_KEYWORDS: [&str; 4] = ["delete", "remove", "update", "put"];

fn data_schema_from_name(method_name: &str) -> Value {
    let lower = method_name.to_lowercase();

    if ARRAY_NAME_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        json!({
            "type": "array",
            "items": {"type": "object"},
            "description": "Array of objects",
        })
    } else if STATUS_NAME_KEYWORDS.iter().any(|keyword| lower.contains(keyword)) {
        status_schema("Operation status".to_string())
    } else {
        json!({"type": "object"})
    }
}

fn status_schema(description: String) -> Value {
    json!({
        "type": "object",
        "properties": {
            "status": {"type": "string"},
            "message": {"type": "string"}
        },
        "description": description,
    })
}
