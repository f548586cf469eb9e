use super::{openai_client::ChatCompletionRequest, response_parser::first_choice_message};
use crate::{
    config::{AgentConfig, StructuredOutputMethod},
    core::{conversation::Message, tool_call::ToolCall},
    error::{AgentError, Result},
    schemas::{
        validation::{forced_tool_choice, response_format, structured_function_definition},
        validate_structured_payload, CompletionSchema, SchemaHandle,
    },
    types::response::deserialize_structured_response,
};
use serde_json::Value;
use tracing::debug;

/// Request for the final structured answer: one fresh user message carrying
/// `source`, constrained to the schema.
pub(crate) fn structured_request(
    config: &AgentConfig,
    schema: &SchemaHandle,
    source: &str,
) -> Value {
    let messages = vec![Message::user(source).to_openai_message()];
    let request = ChatCompletionRequest::new(config.model.clone(), messages).with_config(config);

    let request = match config.structured_method {
        StructuredOutputMethod::FunctionCalling => request
            .with_tools(vec![structured_function_definition(schema)])
            .with_tool_choice(forced_tool_choice(schema)),
        StructuredOutputMethod::JsonSchema => request.with_response_format(response_format(schema)),
    };

    request.into_value()
}

/// Pull the raw structured payload out of the model's reply
pub(crate) fn extract_structured_payload(
    response: &Value,
    schema: &SchemaHandle,
    method: StructuredOutputMethod,
) -> Result<Value> {
    let message = first_choice_message(response)?;

    match method {
        StructuredOutputMethod::FunctionCalling => {
            let calls = message
                .get("tool_calls")
                .and_then(Value::as_array)
                .map(Vec::as_slice)
                .unwrap_or_default();

            let call = calls
                .iter()
                .map(ToolCall::from_openai_format)
                .collect::<Result<Vec<_>>>()?
                .into_iter()
                .find(|call| call.name == schema.schema_name())
                .ok_or_else(|| {
                    AgentError::Validation(format!(
                        "model did not call the `{}` function",
                        schema.schema_name()
                    ))
                })?;

            Ok(call.arguments)
        }
        StructuredOutputMethod::JsonSchema => {
            let content = message
                .get("content")
                .and_then(Value::as_str)
                .ok_or_else(|| {
                    AgentError::Validation(format!(
                        "model returned no content for the `{}` schema",
                        schema.schema_name()
                    ))
                })?;

            serde_json::from_str(strip_code_fence(content)).map_err(|err| {
                AgentError::Validation(format!(
                    "content is not valid `{}` JSON: {}",
                    schema.schema_name(),
                    err
                ))
            })
        }
    }
}

/// Validate the payload against the schema, then deserialize it into `T`
pub(crate) fn coerce_structured_response<T: CompletionSchema>(payload: &Value) -> Result<T> {
    let schema = T::schema();

    if let Err(err) = validate_structured_payload(schema, payload) {
        debug!(
            target: "weather_agent::schema",
            schema = schema.schema_name(),
            error = %err,
            payload = %payload
        );
        return Err(err);
    }

    deserialize_structured_response::<T>(payload, schema)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}
