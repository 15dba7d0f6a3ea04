//! Parameter validation against a tool schema

use serde_json::Value;

use super::error::ToolError;
use super::types::ToolSchema;

/// Check `params` against the object schema in `schema.parameters`.
///
/// Covers what declarations actually use: the top level must be an object,
/// every `required` property must be present and non-null, and declared
/// properties must have their declared JSON type. Unknown properties are
/// rejected.
pub fn validate_params(schema: &ToolSchema, params: &Value) -> Result<(), ToolError> {
    let Some(object) = params.as_object() else {
        return Err(ToolError::InvalidParameters(format!(
            "parameters for '{}' must be a JSON object",
            schema.name
        )));
    };

    let properties = schema
        .parameters
        .get("properties")
        .and_then(Value::as_object);

    if let Some(required) = schema.parameters.get("required").and_then(Value::as_array) {
        for name in required.iter().filter_map(Value::as_str) {
            match object.get(name) {
                None | Some(Value::Null) => {
                    return Err(ToolError::InvalidParameters(format!(
                        "missing required parameter '{}'",
                        name
                    )));
                }
                Some(_) => {}
            }
        }
    }

    let Some(properties) = properties else {
        return Ok(());
    };

    for (name, value) in object {
        let Some(declared) = properties.get(name) else {
            return Err(ToolError::InvalidParameters(format!(
                "unknown parameter '{}'",
                name
            )));
        };
        if value.is_null() {
            continue;
        }
        if let Some(expected) = declared.get("type").and_then(Value::as_str) {
            if !json_type_matches(expected, value) {
                return Err(ToolError::InvalidParameters(format!(
                    "parameter '{}' must be of type {}",
                    name, expected
                )));
            }
        }
    }

    Ok(())
}

/// Whether `value` has the JSON schema type `expected`
pub(crate) fn json_type_matches(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        _ => true,
    }
}
