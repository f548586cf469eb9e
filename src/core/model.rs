use crate::error::Result;
use async_trait::async_trait;
use serde_json::Value;

/// A chat-completions endpoint.
///
/// Takes an OpenAI-style request body and returns the raw response body.
/// Implementations must not retry; a failure ends the run.
#[async_trait]
pub trait ChatModel: Send + Sync + std::fmt::Debug {
    async fn chat_completion(&self, request: &Value) -> Result<Value>;
}
