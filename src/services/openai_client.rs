use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use crate::{
    config::{AgentConfig, DEFAULT_BASE_URL},
    core::model::ChatModel,
    error::{AgentError, Result},
};

/// Client for an OpenAI-compatible chat-completions endpoint (Groq by default)
#[derive(Clone, Debug)]
pub struct OpenAIClient {
    api_key: String,
    base_url: String,
    http: reqwest::Client,
}

impl OpenAIClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_config(config: &AgentConfig) -> Result<Self> {
        Self::new(config.api_key.clone())
            .with_base_url(config.base_url.clone())
            .with_timeout(config.timeout)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        self.http = builder.build()?;
        Ok(self)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn send(&self, body: &Value) -> Result<Value> {
        let request_url = build_chat_url(&self.base_url);
        debug!(target: "weather_agent::http", url = %request_url, "POST chat completion");

        let response = self
            .http
            .post(&request_url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        let response_text = response.text().await?;

        let response_json: Value = match serde_json::from_str(&response_text) {
            Ok(value) => value,
            Err(_) if !status.is_success() => {
                return Err(AgentError::Api {
                    status: status.as_u16(),
                    message: response_text,
                })
            }
            Err(err) => {
                return Err(AgentError::MalformedResponse(format!(
                    "Failed to parse JSON: {err}"
                )))
            }
        };

        if !status.is_success() {
            let api_message = response_json
                .get("error")
                .and_then(|error| error.get("message"))
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or(response_text);

            return Err(AgentError::Api {
                status: status.as_u16(),
                message: api_message,
            });
        }

        if let Some(error) = response_json.get("error").filter(|error| !error.is_null()) {
            let error_message = error
                .get("message")
                .and_then(|value| value.as_str())
                .map(|s| s.to_string())
                .unwrap_or_else(|| error.to_string());
            return Err(AgentError::Api {
                status: status.as_u16(),
                message: error_message,
            });
        }

        Ok(response_json)
    }
}

#[async_trait]
impl ChatModel for OpenAIClient {
    async fn chat_completion(&self, request: &Value) -> Result<Value> {
        self.send(request).await
    }
}

fn build_chat_url(base_url: &str) -> String {
    let trimmed = base_url.trim_end_matches('/');
    if trimmed.ends_with("/chat/completions") {
        trimmed.to_string()
    } else {
        format!("{}/chat/completions", trimmed)
    }
}

#[derive(Clone, Debug)]
pub struct ChatCompletionRequest {
    model: String,
    messages: Vec<Value>,
    tools: Vec<Value>,
    tool_choice: Option<Value>,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
    response_format: Option<Value>,
}

impl ChatCompletionRequest {
    pub fn new(model: impl Into<String>, messages: Vec<Value>) -> Self {
        Self {
            model: model.into(),
            messages,
            tools: Vec::new(),
            tool_choice: None,
            max_tokens: None,
            temperature: None,
            response_format: None,
        }
    }

    /// Apply the sampling settings shared by every call of a run
    pub fn with_config(self, config: &AgentConfig) -> Self {
        self.with_max_tokens(config.max_tokens)
            .with_temperature(config.temperature)
    }

    pub fn with_tools(mut self, tools: Vec<Value>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_tool_choice(mut self, tool_choice: Value) -> Self {
        self.tool_choice = Some(tool_choice);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: Option<u32>) -> Self {
        self.max_tokens = max_tokens;
        self
    }

    pub fn with_temperature(mut self, temperature: Option<f32>) -> Self {
        self.temperature = temperature;
        self
    }

    pub fn with_response_format(mut self, response_format: Value) -> Self {
        self.response_format = Some(response_format);
        self
    }

    pub fn into_value(self) -> Value {
        let mut body = json!({
            "model": self.model,
            "messages": self.messages,
        });

        if !self.tools.is_empty() {
            body["tools"] = Value::Array(self.tools);
        }

        if let Some(tool_choice) = self.tool_choice {
            body["tool_choice"] = tool_choice;
        }

        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = json!(max_tokens);
        }

        if let Some(temperature) = self.temperature {
            body["temperature"] = json!(temperature);
        }

        if let Some(response_format) = self.response_format {
            body["response_format"] = response_format;
        }

        body
    }
}
