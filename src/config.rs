use crate::error::{AgentError, Result};
use std::{env, str::FromStr, time::Duration};
use tracing::warn;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "qwen-2.5-32b";
pub const DEFAULT_MAX_ITERATIONS: usize = 25;

pub const API_KEY_ENV: &str = "GROQ_API_KEY";
pub const BASE_URL_ENV: &str = "GROQ_BASE_URL";
pub const MODEL_ENV: &str = "GROQ_MODEL";

/// How the final call coerces the model into the response schema
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StructuredOutputMethod {
    /// Declare the schema as a function and force the model to call it
    #[default]
    FunctionCalling,
    /// Ask for a `json_schema` response format and parse the content
    JsonSchema,
}

impl StructuredOutputMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            StructuredOutputMethod::FunctionCalling => "function_calling",
            StructuredOutputMethod::JsonSchema => "json_schema",
        }
    }
}

impl FromStr for StructuredOutputMethod {
    type Err = AgentError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "function_calling" => Ok(StructuredOutputMethod::FunctionCalling),
            "json_schema" => Ok(StructuredOutputMethod::JsonSchema),
            other => Err(AgentError::Config(format!(
                "unknown structured output method `{other}` (expected function_calling or json_schema)"
            ))),
        }
    }
}

/// Settings for one agent
#[derive(Debug, Clone)]
pub struct AgentConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub max_iterations: usize,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    /// HTTP timeout per model call; none by default
    pub timeout: Option<Duration>,
    pub structured_method: StructuredOutputMethod,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            max_tokens: None,
            temperature: None,
            timeout: None,
            structured_method: StructuredOutputMethod::default(),
        }
    }
}

impl AgentConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Load settings from the environment, reading a local `.env` first.
    ///
    /// A missing key is not an error here: the endpoint rejects the request.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let api_key = env::var(API_KEY_ENV).unwrap_or_else(|_| {
            warn!("{API_KEY_ENV} is not set; model calls will fail authentication");
            String::new()
        });

        let mut config = Self::new(api_key);
        if let Ok(base_url) = env::var(BASE_URL_ENV) {
            config.base_url = base_url;
        }
        if let Ok(model) = env::var(MODEL_ENV) {
            config.model = model;
        }
        config
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
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

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_structured_method(mut self, method: StructuredOutputMethod) -> Self {
        self.structured_method = method;
        self
    }
}
