use super::tool_call::ToolCall;
use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

/// A single conversation entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum Message {
    System {
        content: String,
    },
    User {
        content: String,
    },
    Assistant {
        #[serde(default)]
        content: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    Tool {
        tool_call_id: String,
        name: String,
        content: String,
    },
}

impl Message {
    pub fn system(content: impl Into<String>) -> Self {
        Message::System {
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Message::User {
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Message::Assistant {
            content: Some(content.into()),
            tool_calls: Vec::new(),
        }
    }

    pub fn tool(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Message::Tool {
            tool_call_id: tool_call_id.into(),
            name: name.into(),
            content: content.into(),
        }
    }

    pub fn role(&self) -> &'static str {
        match self {
            Message::System { .. } => "system",
            Message::User { .. } => "user",
            Message::Assistant { .. } => "assistant",
            Message::Tool { .. } => "tool",
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            Message::System { content } | Message::User { content } => Some(content),
            Message::Assistant { content, .. } => content.as_deref(),
            Message::Tool { content, .. } => Some(content),
        }
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Message::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }

    pub fn is_assistant(&self) -> bool {
        matches!(self, Message::Assistant { .. })
    }

    /// Convert to OpenAI chat message format
    pub fn to_openai_message(&self) -> Value {
        match self {
            Message::System { content } => json!({ "role": "system", "content": content }),
            Message::User { content } => json!({ "role": "user", "content": content }),
            Message::Assistant {
                content,
                tool_calls,
            } => {
                let mut message = json!({ "role": "assistant", "content": content });
                if !tool_calls.is_empty() {
                    message["tool_calls"] =
                        tool_calls.iter().map(ToolCall::to_openai_format).collect();
                }
                message
            }
            Message::Tool {
                tool_call_id,
                name,
                content,
            } => json!({
                "role": "tool",
                "tool_call_id": tool_call_id,
                "name": name,
                "content": content
            }),
        }
    }

    /// Parse an assistant reply from a chat completion choice
    pub fn from_openai_assistant(message: &Value) -> Result<Self> {
        let role = message
            .get("role")
            .and_then(Value::as_str)
            .unwrap_or("assistant");
        if role != "assistant" {
            return Err(AgentError::MalformedResponse(format!(
                "expected an assistant message, got role `{role}`"
            )));
        }

        let content = message
            .get("content")
            .and_then(Value::as_str)
            .map(str::to_string);

        let tool_calls = match message.get("tool_calls") {
            Some(Value::Array(calls)) => calls
                .iter()
                .map(ToolCall::from_openai_format)
                .collect::<Result<Vec<_>>>()?,
            Some(Value::Null) | None => Vec::new(),
            Some(other) => {
                return Err(AgentError::MalformedResponse(format!(
                    "`tool_calls` must be an array, got {other}"
                )))
            }
        };

        Ok(Message::Assistant {
            content,
            tool_calls,
        })
    }

    /// Get a human-readable description of the message
    pub fn describe(&self) -> String {
        match self {
            Message::System { content } => format!("⚙️ System: {}", content),
            Message::User { content } => format!("🧭 User: {}", content),
            Message::Assistant {
                content,
                tool_calls,
            } if !tool_calls.is_empty() => {
                let calls = tool_calls
                    .iter()
                    .map(ToolCall::describe)
                    .collect::<Vec<_>>()
                    .join(", ");
                match content.as_deref().map(str::trim) {
                    Some(text) if !text.is_empty() => {
                        format!("🔧 Assistant: {} → {}", text, calls)
                    }
                    _ => format!("🔧 Assistant: {}", calls),
                }
            }
            Message::Assistant { content, .. } => {
                format!("🤖 Assistant: {}", content.as_deref().unwrap_or(""))
            }
            Message::Tool { name, content, .. } => format!("👁 Tool ({}): {}", name, content),
        }
    }
}

/// Append-only message history for one run
#[derive(Clone, Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_messages(messages: Vec<Message>) -> Self {
        for message in &messages {
            info!(target: "weather_agent::conversation", "{}", message.describe());
        }
        Self { messages }
    }

    pub fn push(&mut self, message: Message) {
        info!(target: "weather_agent::conversation", "{}", message.describe());
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Tool calls requested by the latest message, if it is an assistant reply
    pub fn pending_tool_calls(&self) -> &[ToolCall] {
        self.last().map(Message::tool_calls).unwrap_or(&[])
    }

    pub fn to_openai_messages(&self) -> Vec<Value> {
        self.messages
            .iter()
            .map(Message::to_openai_message)
            .collect()
    }

    /// Content the structured answer is derived from: the entry immediately
    /// preceding the final assistant reply (the user prompt, or the latest
    /// tool result when a tool was called).
    pub fn respond_source(&self) -> Result<&str> {
        let [.., previous, last] = self.messages.as_slice() else {
            return Err(AgentError::ConversationState(
                "a structured answer needs a request followed by a model reply".to_string(),
            ));
        };

        if !last.is_assistant() {
            return Err(AgentError::ConversationState(format!(
                "last entry must be an assistant reply, got `{}`",
                last.role()
            )));
        }

        if !last.tool_calls().is_empty() {
            return Err(AgentError::ConversationState(
                "last assistant reply still has pending tool calls".to_string(),
            ));
        }

        previous.content().ok_or_else(|| {
            AgentError::ConversationState(format!(
                "entry before the final reply (`{}`) has no content",
                previous.role()
            ))
        })
    }

    pub fn into_messages(self) -> Vec<Message> {
        self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_assistant_reply_with_tool_call_is_parsed() {
        let reply = json!({
            "role": "assistant",
            "content": null,
            "tool_calls": [{
                "id": "call_1",
                "type": "function",
                "function": { "name": "get_weather", "arguments": "{\"city\":\"sf\"}" }
            }]
        });

        let message = Message::from_openai_assistant(&reply).unwrap();
        assert_eq!(message.content(), None);
        assert_eq!(message.tool_calls().len(), 1);
        assert_eq!(message.tool_calls()[0].arguments["city"], "sf");
    }

    #[test]
    fn test_assistant_reply_without_tool_calls() {
        let reply = json!({ "role": "assistant", "content": "Hello" });
        let message = Message::from_openai_assistant(&reply).unwrap();
        assert_eq!(message, Message::assistant("Hello"));
        assert!(message.to_openai_message().get("tool_calls").is_none());
    }

    #[test]
    fn test_non_assistant_reply_is_rejected() {
        let reply = json!({ "role": "user", "content": "Hello" });
        assert!(matches!(
            Message::from_openai_assistant(&reply),
            Err(AgentError::MalformedResponse(_))
        ));
    }

    #[test]
    fn test_tool_message_wire_format() {
        let wire = Message::tool("call_1", "get_weather", "sunny").to_openai_message();
        assert_eq!(wire["role"], "tool");
        assert_eq!(wire["tool_call_id"], "call_1");
        assert_eq!(wire["content"], "sunny");
    }

    #[test]
    fn test_respond_source_uses_user_prompt_without_tool_call() {
        let conversation = Conversation::with_messages(vec![
            Message::user("what's the weather in SF?"),
            Message::assistant("Let me think."),
        ]);
        assert_eq!(
            conversation.respond_source().unwrap(),
            "what's the weather in SF?"
        );
    }

    #[test]
    fn test_respond_source_uses_latest_tool_result() {
        let conversation = Conversation::with_messages(vec![
            Message::user("what's the weather in SF?"),
            Message::Assistant {
                content: None,
                tool_calls: vec![ToolCall::new("call_1", "get_weather", json!({"city": "sf"}))],
            },
            Message::tool("call_1", "get_weather", "It is sunny"),
            Message::assistant("It is sunny in SF."),
        ]);
        assert_eq!(conversation.respond_source().unwrap(), "It is sunny");
    }

    #[test]
    fn test_respond_source_rejects_pending_tool_call() {
        let conversation = Conversation::with_messages(vec![
            Message::user("what's the weather in SF?"),
            Message::Assistant {
                content: None,
                tool_calls: vec![ToolCall::new("call_1", "get_weather", json!({"city": "sf"}))],
            },
        ]);
        assert_eq!(conversation.pending_tool_calls().len(), 1);
        assert!(matches!(
            conversation.respond_source(),
            Err(AgentError::ConversationState(_))
        ));
    }

    #[test]
    fn test_respond_source_needs_two_entries() {
        let conversation = Conversation::with_messages(vec![Message::assistant("hi")]);
        assert!(conversation.respond_source().is_err());
    }
}
