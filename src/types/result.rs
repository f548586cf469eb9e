use crate::core::conversation::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Result of an agent run
#[derive(Debug, Clone)]
pub struct RunResult<T> {
    /// Full conversation of the run, in order
    pub messages: Vec<Message>,
    /// Typed structured answer
    pub final_response: T,
    /// Validated payload the answer was deserialized from
    pub structured: Value,
    /// Total tokens used across all model calls (if reported by the API)
    pub tokens: Option<TokenUsage>,
    /// Total execution duration
    pub duration: Duration,
    /// Number of tool-bound model calls
    pub iterations: usize,
}

/// Token usage information from the API
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl TokenUsage {
    /// Read the `usage` block of a chat completion response
    pub fn from_response(response: &Value) -> Option<Self> {
        let usage = response.get("usage")?;
        let field = |name: &str| {
            usage
                .get(name)
                .and_then(Value::as_u64)
                .and_then(|value| u32::try_from(value).ok())
        };
        Some(TokenUsage {
            prompt_tokens: field("prompt_tokens")?,
            completion_tokens: field("completion_tokens")?,
            total_tokens: field("total_tokens")?,
        })
    }

    pub fn add(&mut self, other: TokenUsage) {
        self.prompt_tokens += other.prompt_tokens;
        self.completion_tokens += other.completion_tokens;
        self.total_tokens += other.total_tokens;
    }
}

impl<T> RunResult<T> {
    /// Number of tool calls the model requested during the run
    pub fn tool_call_count(&self) -> usize {
        self.messages
            .iter()
            .map(|message| message.tool_calls().len())
            .sum()
    }

    /// Number of tool results appended during the run
    pub fn tool_result_count(&self) -> usize {
        self.messages
            .iter()
            .filter(|message| matches!(message, Message::Tool { .. }))
            .count()
    }

    /// Human-readable trace of the run
    pub fn trace(&self) -> String {
        let mut lines = Vec::new();

        lines.push("=== Agent Execution Trace ===".to_string());
        lines.push(format!("Duration: {:.2}s", self.duration.as_secs_f64()));
        lines.push(format!("Iterations: {}", self.iterations));

        if let Some(tokens) = &self.tokens {
            lines.push(format!(
                "Tokens: {} prompt + {} completion = {} total",
                tokens.prompt_tokens, tokens.completion_tokens, tokens.total_tokens
            ));
        }

        lines.push(String::new());
        lines.push("--- Messages ---".to_string());

        for (idx, message) in self.messages.iter().enumerate() {
            lines.push(format!("{}. {}", idx + 1, message.describe()));
        }

        lines.join("\n")
    }

    /// Structured payload as pretty JSON
    pub fn structured_json(&self) -> String {
        serde_json::to_string_pretty(&self.structured).unwrap_or_else(|_| self.structured.to_string())
    }
}
