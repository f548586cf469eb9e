use crate::{
    config::AgentConfig,
    core::model::ChatModel,
    error::Result,
    services::openai_client::OpenAIClient,
    tools::{GetWeatherTool, ToolRegistry},
};

/// Main agent
#[derive(Debug)]
pub struct Agent {
    model: Box<dyn ChatModel>,
    tools: ToolRegistry,
    config: AgentConfig,
}

impl Agent {
    /// Agent talking to the configured OpenAI-compatible endpoint
    pub fn new(config: AgentConfig, tools: ToolRegistry) -> Result<Self> {
        let client = OpenAIClient::from_config(&config)?;
        Ok(Self::with_chat_model(client, config, tools))
    }

    /// Agent driven by any chat model implementation
    pub fn with_chat_model(
        model: impl ChatModel + 'static,
        config: AgentConfig,
        tools: ToolRegistry,
    ) -> Self {
        Self {
            model: Box::new(model),
            tools,
            config,
        }
    }

    /// Agent with the weather tool bound
    pub fn weather(config: AgentConfig) -> Result<Self> {
        Self::new(config, ToolRegistry::new().with_tool(GetWeatherTool::new()))
    }

    /// Weather agent configured from the environment
    pub fn from_env() -> Result<Self> {
        Self::weather(AgentConfig::from_env())
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub(crate) fn chat_model(&self) -> &dyn ChatModel {
        self.model.as_ref()
    }
}
