use crate::{error::AgentError, schemas::SchemaHandle};
use jsonschema::{Draft, JSONSchema};
use serde_json::{json, Value};

const MAX_SCHEMA_ERRORS: usize = 3;

/// Validate a structured payload against a schema
pub fn validate_structured_payload(
    schema: &SchemaHandle,
    payload: &Value,
) -> std::result::Result<(), AgentError> {
    if !payload.is_object() {
        return Err(AgentError::Validation(format!(
            "structured payload must be a JSON object that matches the `{}` schema",
            schema.schema_name()
        )));
    }

    let validator = JSONSchema::options()
        .with_draft(Draft::Draft7)
        .compile(schema.schema_json())
        .map_err(|err| {
            AgentError::Validation(format!(
                "Failed to prepare `{}` schema for validation: {}",
                schema.schema_name(),
                err
            ))
        })?;

    if let Err(errors) = validator.validate(payload) {
        let mut details = Vec::new();
        let mut truncated = false;

        for (idx, error) in errors.enumerate() {
            if idx < MAX_SCHEMA_ERRORS {
                let mut path = error.instance_path.to_string();
                if path.is_empty() {
                    path = "<root>".to_string();
                }
                details.push(format!("{}: {}", path, error));
            } else {
                truncated = true;
                break;
            }
        }

        let mut detail_str = if details.is_empty() {
            "structured payload failed schema validation".to_string()
        } else {
            details.join("; ")
        };

        if truncated {
            detail_str.push_str("; additional errors truncated");
        }

        return Err(AgentError::Validation(format!(
            "Structured payload does not match `{}` schema: {}",
            schema.schema_name(),
            detail_str
        )));
    }

    Ok(())
}

/// The schema as function parameters: the root document minus its meta keys
pub(crate) fn schema_parameters(schema: &SchemaHandle) -> Value {
    let mut parameters = schema.schema_json().clone();
    if let Some(obj) = parameters.as_object_mut() {
        obj.remove("$schema");
        obj.remove("title");
    }
    parameters
}

/// Function definition the model is forced to call for the structured answer
pub(crate) fn structured_function_definition(schema: &SchemaHandle) -> Value {
    let description = schema
        .description()
        .map(str::to_string)
        .unwrap_or_else(|| format!("Respond with a {} object.", schema.schema_name()));

    json!({
        "type": "function",
        "function": {
            "name": schema.schema_name(),
            "description": description,
            "parameters": schema_parameters(schema)
        }
    })
}

/// `tool_choice` that forces the structured function
pub(crate) fn forced_tool_choice(schema: &SchemaHandle) -> Value {
    json!({
        "type": "function",
        "function": { "name": schema.schema_name() }
    })
}

/// `response_format` for endpoints with native JSON-schema output
pub(crate) fn response_format(schema: &SchemaHandle) -> Value {
    json!({
        "type": "json_schema",
        "json_schema": {
            "name": schema.schema_name(),
            "schema": schema_parameters(schema)
        }
    })
}
