use crate::{
    core::conversation::Message,
    error::{AgentError, Result},
    types::result::TokenUsage,
};
use serde_json::Value;

/// The `message` object of the first choice of a chat completion
pub(crate) fn first_choice_message(response: &Value) -> Result<&Value> {
    let choices = response
        .get("choices")
        .and_then(|value| value.as_array())
        .ok_or_else(|| {
            AgentError::MalformedResponse(
                "Missing 'choices' array in completion response".to_string(),
            )
        })?;

    let first_choice = choices.first().ok_or_else(|| {
        AgentError::MalformedResponse("Completion response contained no choices".to_string())
    })?;

    first_choice.get("message").ok_or_else(|| {
        AgentError::MalformedResponse("Completion response missing assistant message".to_string())
    })
}

/// Parse the assistant reply of a chat completion into a conversation entry
pub(crate) fn parse_assistant_reply(response: &Value) -> Result<Message> {
    Message::from_openai_assistant(first_choice_message(response)?)
}

/// Add the response's token usage to the running total
pub(crate) fn accumulate_usage(total: &mut Option<TokenUsage>, response: &Value) {
    if let Some(usage) = TokenUsage::from_response(response) {
        total.get_or_insert_with(TokenUsage::default).add(usage);
    }
}
