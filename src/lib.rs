//! weather-agent: a tool-calling LLM agent with a schema-validated final answer
//!
//! The agent sends the conversation to an OpenAI-compatible chat endpoint with
//! the `get_weather` tool bound, runs any tool calls the model asks for, and
//! finishes with one more call constrained to a [`WeatherResponse`] schema.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use weather_agent::{Agent, AgentConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let agent = Agent::weather(AgentConfig::from_env())?;
//!
//!     let result = agent.run("what's the weather in SF?").await?;
//!     println!("{}", result.trace());
//!     println!("{:?}", result.final_response);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod schemas;
pub(crate) mod services;
pub mod tools;
pub mod types;

pub use crate::config::{AgentConfig, StructuredOutputMethod};
pub use crate::core::{
    Agent, AgentState, ChatModel, Conversation, Message, ToolCall, ToolExecution, ToolOutput,
};
pub use error::{AgentError, Result};
pub use schemas::{CompletionSchema, SchemaHandle};
pub use services::openai_client::{ChatCompletionRequest, OpenAIClient};
pub use tools::{get_weather, City, GetWeatherTool, Tool, ToolRegistry};
pub use types::{deserialize_structured_response, RunResult, TokenUsage, WeatherResponse};

#[cfg(feature = "cli")]
pub mod cli;
