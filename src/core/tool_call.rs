use crate::error::{AgentError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::{Duration, Instant};

/// Represents a tool call request from the LLM
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Unique identifier for this tool call
    pub id: String,
    /// Name of the tool to execute
    pub name: String,
    /// Arguments to pass to the tool
    pub arguments: Value,
}

impl ToolCall {
    /// Create a new tool call
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Value) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Parse a tool call from OpenAI response format.
    ///
    /// The wire form carries `arguments` as a JSON-encoded string; an empty
    /// string is read as an empty object.
    pub fn from_openai_format(tool_call: &Value) -> Result<Self> {
        let id = tool_call
            .get("id")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        let function = tool_call.get("function").ok_or_else(|| {
            AgentError::MalformedResponse(format!("tool call `{id}` is missing `function`"))
        })?;

        let name = match function.get("name").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                return Err(AgentError::MalformedResponse(format!(
                    "tool call `{id}` is missing a function name"
                )))
            }
        };

        let arguments = match function.get("arguments") {
            Some(Value::String(raw)) if raw.trim().is_empty() => Value::Object(Default::default()),
            Some(Value::String(raw)) => serde_json::from_str(raw).map_err(|err| {
                AgentError::InvalidFunctionCall(format!(
                    "Failed to parse arguments for tool '{}': {}",
                    name, err
                ))
            })?,
            // Some OpenAI-compatible servers inline the object instead of a string.
            Some(inline @ Value::Object(_)) => inline.clone(),
            _ => Value::Object(Default::default()),
        };

        Ok(Self {
            id,
            name,
            arguments,
        })
    }

    /// Convert to OpenAI tool call format
    pub fn to_openai_format(&self) -> Value {
        serde_json::json!({
            "id": self.id,
            "type": "function",
            "function": {
                "name": self.name,
                "arguments": self.arguments.to_string()
            }
        })
    }

    /// Get a human-readable description
    pub fn describe(&self) -> String {
        format!("{}({})", self.name, self.arguments)
    }
}

/// Represents the output from a tool execution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The tool call ID this output corresponds to
    pub tool_call_id: String,
    /// The tool name that was executed
    pub tool_name: String,
    /// The output/result from the tool
    pub output: Value,
    /// Execution duration in milliseconds
    pub duration_ms: Option<u128>,
}

impl ToolOutput {
    pub fn new(tool_call: &ToolCall, output: Value) -> Self {
        Self {
            tool_call_id: tool_call.id.clone(),
            tool_name: tool_call.name.clone(),
            output,
            duration_ms: None,
        }
    }

    /// Set the execution duration
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = Some(duration.as_millis());
        self
    }

    /// Get the output as a string for message content
    pub fn as_string(&self) -> String {
        match &self.output {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

/// Tracks the execution of a tool call with timing information
#[derive(Debug)]
pub struct ToolExecution<'a> {
    tool_call: &'a ToolCall,
    start_time: Instant,
}

impl<'a> ToolExecution<'a> {
    /// Start tracking a tool execution
    pub fn start(tool_call: &'a ToolCall) -> Self {
        Self {
            tool_call,
            start_time: Instant::now(),
        }
    }

    /// Complete the execution and get the output with timing
    pub fn complete(self, output: Value) -> ToolOutput {
        ToolOutput::new(self.tool_call, output).with_duration(self.start_time.elapsed())
    }
}
